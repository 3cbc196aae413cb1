use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two mutually exclusive scheduling modes of a bill. The tag keeps the
/// per-mode fields (`due_day`/`paid_month` vs `due_date`/`is_paid`) from ever
/// coexisting on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schedule", rename_all = "camelCase")]
pub enum BillSchedule {
    /// Recurs every calendar month from its creation month until cancelled.
    /// Paid-state is tracked per month and resets implicitly each month.
    #[serde(rename_all = "camelCase")]
    Fixed {
        /// Day of month (1-31) the bill is nominally due.
        due_day: u32,
        /// The "YYYY-MM" month the bill is currently marked paid for, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paid_month: Option<String>,
    },
    /// A single occurrence tied to one due date.
    #[serde(rename_all = "camelCase")]
    OneTime {
        /// Format: "YYYY-MM-DD"
        due_date: String,
        #[serde(default)]
        is_paid: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    /// Category name reference, same convention as Transaction.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub schedule: BillSchedule,
    /// RFC 3339 timestamp; its month anchors when the bill becomes visible.
    pub created_at: String,
    /// Soft delete: a fixed bill stops appearing from this timestamp's month
    /// (inclusive) onward, preserving history in earlier months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    /// When payment was confirmed. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
    /// Back-reference to the transaction generated by the most recent
    /// mark-as-paid, enabling exact reversal. Not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Bill {
    pub fn new_fixed(
        name: String,
        amount: Decimal,
        category: String,
        description: Option<String>,
        due_day: u32,
        created_at: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            amount,
            category,
            description,
            schedule: BillSchedule::Fixed {
                due_day,
                paid_month: None,
            },
            created_at,
            cancelled_at: None,
            paid_date: None,
            transaction_id: None,
        }
    }

    pub fn new_one_time(
        name: String,
        amount: Decimal,
        category: String,
        description: Option<String>,
        due_date: String,
        created_at: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            amount,
            category,
            description,
            schedule: BillSchedule::OneTime {
                due_date,
                is_paid: false,
            },
            created_at,
            cancelled_at: None,
            paid_date: None,
            transaction_id: None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.schedule, BillSchedule::Fixed { .. })
    }
}

/// The "YYYY-MM" prefix of an ISO date or timestamp. Falls back to the whole
/// string when it is shorter than a month prefix.
pub fn month_of(date: &str) -> &str {
    date.get(..7).unwrap_or(date)
}
