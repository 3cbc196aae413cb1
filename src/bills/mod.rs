//! Monthly recurrence resolution and the bill→transaction payment protocol.
//!
//! Everything here is a pure function over the bill collection and a target
//! "YYYY-MM" month; mutation lives in the store. Paid-state is re-derived on
//! every call because a fixed bill's status differs month to month.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{month_of, Bill, BillSchedule, Transaction, TransactionKind};

/// The subset of `bills` visible in `month`, in collection order.
pub(crate) fn resolve_bills_for_month<'a>(bills: &'a [Bill], month: &str) -> Vec<&'a Bill> {
    bills
        .iter()
        .filter(|b| is_bill_visible_for_month(b, month))
        .collect()
}

/// Cancellation takes effect starting the month of cancellation, inclusive.
/// Fixed bills appear from their creation month onward; one-time bills only
/// in the exact month they were entered (not the month of their due date).
pub(crate) fn is_bill_visible_for_month(bill: &Bill, month: &str) -> bool {
    if let Some(cancelled_at) = &bill.cancelled_at {
        if month_of(cancelled_at) <= month {
            return false;
        }
    }
    match bill.schedule {
        BillSchedule::Fixed { .. } => month_of(&bill.created_at) <= month,
        BillSchedule::OneTime { .. } => month_of(&bill.created_at) == month,
    }
}

pub(crate) fn is_bill_paid_for_month(bill: &Bill, month: &str) -> bool {
    match &bill.schedule {
        BillSchedule::Fixed { paid_month, .. } => paid_month.as_deref() == Some(month),
        BillSchedule::OneTime { is_paid, .. } => *is_paid,
    }
}

/// Pending and paid totals over an already-resolved set of bills.
pub(crate) fn pending_and_paid_totals(bills: &[&Bill], month: &str) -> (Decimal, Decimal) {
    let mut pending = Decimal::ZERO;
    let mut paid = Decimal::ZERO;
    for bill in bills {
        if is_bill_paid_for_month(bill, month) {
            paid += bill.amount;
        } else {
            pending += bill.amount;
        }
    }
    (pending, paid)
}

/// The expense transaction generated when `bill` is marked paid for `month`.
pub(crate) fn payment_transaction(bill: &Bill, month: &str) -> Result<Transaction> {
    let date = payment_date(bill, month)?;
    let description = match bill.description.as_deref() {
        Some(extra) if !extra.is_empty() => format!("{} - {}", bill.name, extra),
        _ => bill.name.clone(),
    };
    Ok(Transaction::new(
        TransactionKind::Expense,
        bill.category.clone(),
        bill.amount,
        date,
        description,
        bill.is_fixed(),
        None,
    ))
}

/// Fixed bills are dated on their due day, clamped to the month's length;
/// one-time bills on the first of the month.
fn payment_date(bill: &Bill, month: &str) -> Result<String> {
    let (year, mon) = parse_month(month)?;
    let day = match bill.schedule {
        BillSchedule::Fixed { due_day, .. } => due_day.clamp(1, days_in_month(year, mon)),
        BillSchedule::OneTime { .. } => 1,
    };
    Ok(format!("{year:04}-{mon:02}-{day:02}"))
}

pub(crate) fn parse_month(month: &str) -> Result<(i32, u32)> {
    let parsed = (|| {
        let (y, m) = month.split_once('-')?;
        if y.len() != 4 || m.len() != 2 {
            return None;
        }
        let year: i32 = y.parse().ok()?;
        let mon: u32 = m.parse().ok()?;
        (1..=12).contains(&mon).then_some((year, mon))
    })();
    parsed.with_context(|| format!("Invalid month '{month}', expected YYYY-MM"))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}
