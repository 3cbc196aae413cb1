#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn txn(kind: TransactionKind, category: &str, amount: rust_decimal::Decimal, date: &str) -> Transaction {
    Transaction::new(
        kind,
        category.into(),
        amount,
        date.into(),
        String::new(),
        false,
        None,
    )
}

// ── Monthly summary ───────────────────────────────────────────

#[test]
fn test_monthly_stats_basic() {
    let txns = vec![
        txn(TransactionKind::Income, "Salário", dec!(1000), "2024-05-01"),
        txn(TransactionKind::Expense, "Alimentação", dec!(300), "2024-05-10"),
    ];
    let summary = monthly_stats(&txns, "2024-05");
    assert_eq!(summary.total_income, dec!(1000));
    assert_eq!(summary.total_expenses, dec!(300));
    assert_eq!(summary.balance, dec!(700));
    assert_eq!(summary.savings_rate, dec!(70));
    assert_eq!(summary.transaction_count, 2);
}

#[test]
fn test_monthly_stats_filters_by_month_prefix() {
    let txns = vec![
        txn(TransactionKind::Income, "Salário", dec!(1000), "2024-05-01"),
        txn(TransactionKind::Income, "Salário", dec!(1000), "2024-06-01"),
        txn(TransactionKind::Expense, "Lazer", dec!(50), "2023-05-20"),
    ];
    let summary = monthly_stats(&txns, "2024-05");
    assert_eq!(summary.total_income, dec!(1000));
    assert_eq!(summary.total_expenses, dec!(0));
    assert_eq!(summary.transaction_count, 1);
}

#[test]
fn test_monthly_stats_empty_month() {
    let summary = monthly_stats(&[], "2024-05");
    assert_eq!(summary.total_income, dec!(0));
    assert_eq!(summary.total_expenses, dec!(0));
    assert_eq!(summary.balance, dec!(0));
    assert_eq!(summary.savings_rate, dec!(0));
    assert_eq!(summary.transaction_count, 0);
}

#[test]
fn test_savings_rate_zero_without_income() {
    let txns = vec![txn(TransactionKind::Expense, "Contas", dec!(500), "2024-05-05")];
    let summary = monthly_stats(&txns, "2024-05");
    assert_eq!(summary.balance, dec!(-500));
    // No income means no rate, not a division error or negative infinity.
    assert_eq!(summary.savings_rate, dec!(0));
}

#[test]
fn test_savings_rate_negative_when_overspent() {
    let txns = vec![
        txn(TransactionKind::Income, "Salário", dec!(1000), "2024-05-01"),
        txn(TransactionKind::Expense, "Compras", dec!(1500), "2024-05-15"),
    ];
    let summary = monthly_stats(&txns, "2024-05");
    assert_eq!(summary.savings_rate, dec!(-50));
}

// ── Category breakdown ────────────────────────────────────────

#[test]
fn test_breakdown_groups_and_sorts_descending() {
    let txns = vec![
        txn(TransactionKind::Expense, "Alimentação", dec!(100), "2024-05-02"),
        txn(TransactionKind::Expense, "Transporte", dec!(250), "2024-05-03"),
        txn(TransactionKind::Expense, "Alimentação", dec!(200), "2024-05-20"),
    ];
    let breakdown = category_breakdown(&txns, TransactionKind::Expense, "2024-05");
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].category, "Alimentação");
    assert_eq!(breakdown[0].amount, dec!(300));
    assert_eq!(breakdown[1].category, "Transporte");
    assert_eq!(breakdown[1].amount, dec!(250));
}

#[test]
fn test_breakdown_ties_keep_first_encountered_order() {
    let txns = vec![
        txn(TransactionKind::Expense, "Lazer", dec!(100), "2024-05-02"),
        txn(TransactionKind::Expense, "Saúde", dec!(100), "2024-05-03"),
    ];
    let breakdown = category_breakdown(&txns, TransactionKind::Expense, "2024-05");
    assert_eq!(breakdown[0].category, "Lazer");
    assert_eq!(breakdown[1].category, "Saúde");
}

#[test]
fn test_breakdown_filters_kind_and_month() {
    let txns = vec![
        txn(TransactionKind::Income, "Salário", dec!(5000), "2024-05-01"),
        txn(TransactionKind::Expense, "Contas", dec!(300), "2024-05-10"),
        txn(TransactionKind::Expense, "Contas", dec!(300), "2024-04-10"),
    ];
    let breakdown = category_breakdown(&txns, TransactionKind::Expense, "2024-05");
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0].amount, dec!(300));

    let income = category_breakdown(&txns, TransactionKind::Income, "2024-05");
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category, "Salário");
}
