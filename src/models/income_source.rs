use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Frequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeSourceKind {
    Fixed,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IncomeSourceKind,
    pub amount: Decimal,
    pub frequency: Frequency,
    /// Format: "YYYY-MM-DD"
    pub start_date: String,
    pub active: bool,
}

impl IncomeSource {
    pub fn new(
        name: String,
        kind: IncomeSourceKind,
        amount: Decimal,
        frequency: Frequency,
        start_date: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            kind,
            amount,
            frequency,
            start_date,
            active: true,
        }
    }
}
