//! Monthly aggregation over the transaction ledger.
//!
//! Always computed fresh from the full collection; nothing here is cached.

use rust_decimal::Decimal;

use crate::models::{Transaction, TransactionKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlySummary {
    pub(crate) month: String,
    pub(crate) total_income: Decimal,
    pub(crate) total_expenses: Decimal,
    pub(crate) balance: Decimal,
    /// Percentage of income kept (balance / income * 100); exactly zero when
    /// the month has no income.
    pub(crate) savings_rate: Decimal,
    pub(crate) transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryAmount {
    pub(crate) category: String,
    pub(crate) amount: Decimal,
}

pub(crate) fn monthly_stats(transactions: &[Transaction], month: &str) -> MonthlySummary {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut transaction_count = 0;

    for txn in transactions.iter().filter(|t| t.date.starts_with(month)) {
        transaction_count += 1;
        match txn.kind {
            TransactionKind::Income => total_income += txn.amount,
            TransactionKind::Expense => total_expenses += txn.amount,
        }
    }

    let balance = total_income - total_expenses;
    let savings_rate = if total_income > Decimal::ZERO {
        balance / total_income * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    MonthlySummary {
        month: month.to_string(),
        total_income,
        total_expenses,
        balance,
        savings_rate,
        transaction_count,
    }
}

/// Per-category totals for one transaction kind in one month, sorted by
/// amount descending. Ties keep first-encountered order.
pub(crate) fn category_breakdown(
    transactions: &[Transaction],
    kind: TransactionKind,
    month: &str,
) -> Vec<CategoryAmount> {
    let mut breakdown: Vec<CategoryAmount> = Vec::new();

    for txn in transactions
        .iter()
        .filter(|t| t.kind == kind && t.date.starts_with(month))
    {
        match breakdown.iter_mut().find(|e| e.category == txn.category) {
            Some(entry) => entry.amount += txn.amount,
            None => breakdown.push(CategoryAmount {
                category: txn.category.clone(),
                amount: txn.amount,
            }),
        }
    }

    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdown
}

#[cfg(test)]
mod tests;
