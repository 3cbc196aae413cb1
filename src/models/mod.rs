mod bill;
mod category;
mod income_source;
mod preferences;
mod transaction;

pub use bill::{month_of, Bill, BillSchedule};
pub use category::{default_categories, Category};
pub use income_source::{IncomeSource, IncomeSourceKind};
pub use preferences::{Preferences, PreferencesPatch, Theme};
pub use transaction::{Frequency, Transaction, TransactionKind};
