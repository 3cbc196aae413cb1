use serde::{Deserialize, Serialize};

use super::TransactionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    /// Name doubles as the join key from transactions and bills.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub icon: String,
    pub color: String,
}

impl Category {
    pub fn new(name: String, kind: TransactionKind, icon: String, color: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            kind,
            icon,
            color,
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Categories seeded into a fresh ledger. Fixed ids so a re-seeded ledger
/// stays comparable with an old export.
pub fn default_categories() -> Vec<Category> {
    let defaults: [(&str, &str, TransactionKind, &str, &str); 12] = [
        ("1", "Salário", TransactionKind::Income, "Briefcase", "primary"),
        ("2", "Freelance", TransactionKind::Income, "Laptop", "accent"),
        ("3", "Investimentos", TransactionKind::Income, "TrendingUp", "chart-4"),
        ("4", "Outros", TransactionKind::Income, "Plus", "chart-5"),
        ("5", "Alimentação", TransactionKind::Expense, "Utensils", "expense"),
        ("6", "Transporte", TransactionKind::Expense, "Car", "chart-3"),
        ("7", "Moradia", TransactionKind::Expense, "Home", "chart-4"),
        ("8", "Saúde", TransactionKind::Expense, "Heart", "destructive"),
        ("9", "Educação", TransactionKind::Expense, "GraduationCap", "chart-5"),
        ("10", "Lazer", TransactionKind::Expense, "Gamepad2", "warning"),
        ("11", "Compras", TransactionKind::Expense, "ShoppingBag", "accent"),
        ("12", "Contas", TransactionKind::Expense, "Receipt", "muted"),
    ];

    defaults
        .into_iter()
        .map(|(id, name, kind, icon, color)| Category {
            id: id.into(),
            name: name.into(),
            kind,
            icon: icon.into(),
            color: color.into(),
        })
        .collect()
}
