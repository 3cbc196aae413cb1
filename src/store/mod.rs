//! The ledger store: canonical collections plus persistence.
//!
//! One JSON document on disk, sealed with AES-256-GCM, rewritten after every
//! mutation. Only one mutation runs at a time (single-threaded CLI), so each
//! save is a consistent snapshot.

mod crypto;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::bills;
use crate::models::{
    default_categories, Bill, BillSchedule, Category, IncomeSource, Preferences, PreferencesPatch,
    Transaction,
};

pub(crate) const DATA_FILE: &str = "bolso.json";
pub(crate) const KEY_FILE: &str = "bolso.key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct LedgerData {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) categories: Vec<Category>,
    pub(crate) income_sources: Vec<IncomeSource>,
    pub(crate) bills: Vec<Bill>,
    pub(crate) preferences: Preferences,
}

impl Default for LedgerData {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            categories: default_categories(),
            income_sources: Vec::new(),
            bills: Vec::new(),
            preferences: Preferences::default(),
        }
    }
}

pub(crate) struct Store {
    data: LedgerData,
    data_path: PathBuf,
    key: [u8; crypto::KEY_LEN],
}

impl Store {
    /// Open the ledger in `dir`, creating key and default dataset on first
    /// run. A missing or malformed document degrades to the default dataset;
    /// a document that fails to decrypt is surfaced as an error instead,
    /// since silently replacing unreadable data would lose it.
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        let key = load_or_create_key(&dir.join(KEY_FILE))?;
        let data_path = dir.join(DATA_FILE);

        let data = match fs::read_to_string(&data_path) {
            Ok(raw) => parse_document(&raw, &key)?,
            Err(e) if e.kind() == ErrorKind::NotFound => LedgerData::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", data_path.display()))
            }
        };

        Ok(Self {
            data,
            data_path,
            key,
        })
    }

    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.data.transactions
    }

    pub(crate) fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub(crate) fn income_sources(&self) -> &[IncomeSource] {
        &self.data.income_sources
    }

    pub(crate) fn bills(&self) -> &[Bill] {
        &self.data.bills
    }

    pub(crate) fn preferences(&self) -> &Preferences {
        &self.data.preferences
    }

    // ── Transactions ──────────────────────────────────────────

    /// Newest entries go to the front, matching display order.
    pub(crate) fn add_transaction(&mut self, txn: Transaction) -> Result<Transaction> {
        self.data.transactions.insert(0, txn.clone());
        self.save()?;
        Ok(txn)
    }

    pub(crate) fn update_transaction_description(
        &mut self,
        id: &str,
        description: &str,
    ) -> Result<()> {
        let txn = self.transaction_mut(id)?;
        txn.description = description.to_string();
        self.save()
    }

    pub(crate) fn update_transaction_category(&mut self, id: &str, category: &str) -> Result<()> {
        let txn = self.transaction_mut(id)?;
        txn.category = category.to_string();
        self.save()
    }

    pub(crate) fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        let before = self.data.transactions.len();
        self.data.transactions.retain(|t| t.id != id);
        if self.data.transactions.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn add_category(&mut self, category: Category) -> Result<Category> {
        if Category::find_by_name(&self.data.categories, &category.name).is_some() {
            bail!("Category '{}' already exists", category.name);
        }
        self.data.categories.push(category.clone());
        self.save()?;
        Ok(category)
    }

    /// No cascade: transactions and bills keep referencing the deleted name.
    pub(crate) fn delete_category(&mut self, id: &str) -> Result<bool> {
        let before = self.data.categories.len();
        self.data.categories.retain(|c| c.id != id);
        if self.data.categories.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    // ── Income sources ────────────────────────────────────────

    pub(crate) fn add_income_source(&mut self, source: IncomeSource) -> Result<IncomeSource> {
        self.data.income_sources.push(source.clone());
        self.save()?;
        Ok(source)
    }

    pub(crate) fn set_income_source_active(&mut self, id: &str, active: bool) -> Result<()> {
        let source = self
            .data
            .income_sources
            .iter_mut()
            .find(|s| s.id == id)
            .with_context(|| format!("No income source with id {id}"))?;
        source.active = active;
        self.save()
    }

    pub(crate) fn delete_income_source(&mut self, id: &str) -> Result<bool> {
        let before = self.data.income_sources.len();
        self.data.income_sources.retain(|s| s.id != id);
        if self.data.income_sources.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    // ── Bills ─────────────────────────────────────────────────

    pub(crate) fn add_bill(&mut self, bill: Bill) -> Result<Bill> {
        self.data.bills.push(bill.clone());
        self.save()?;
        Ok(bill)
    }

    pub(crate) fn update_bill_amount(&mut self, id: &str, amount: Decimal) -> Result<()> {
        let idx = self.bill_index(id)?;
        self.data.bills[idx].amount = amount;
        self.save()
    }

    /// Fixed bills are soft-deleted so past months keep their history; the
    /// bill disappears from the cancellation month onward. One-time bills are
    /// removed outright.
    pub(crate) fn cancel_bill(&mut self, id: &str) -> Result<()> {
        let idx = self.bill_index(id)?;
        if self.data.bills[idx].is_fixed() {
            self.data.bills[idx].cancelled_at = Some(now_timestamp());
        } else {
            self.data.bills.remove(idx);
        }
        self.save()
    }

    // ── Payment reconciliation ────────────────────────────────

    /// Create the payment transaction and flip the bill to paid for `month`,
    /// as one store mutation. Preconditions are checked before anything is
    /// touched, and both writes land in a single flush, so a failure leaves
    /// the stored document at the previous consistent state.
    pub(crate) fn mark_bill_paid(
        &mut self,
        bill_id: &str,
        month: &str,
    ) -> Result<(Transaction, Bill)> {
        bills::parse_month(month)?;
        let idx = self.bill_index(bill_id)?;
        {
            let bill = &self.data.bills[idx];
            if !bills::is_bill_visible_for_month(bill, month) {
                bail!("Bill '{}' is not active in {month}", bill.name);
            }
            if bills::is_bill_paid_for_month(bill, month) {
                bail!("Bill '{}' is already paid for {month}", bill.name);
            }
        }

        let txn = bills::payment_transaction(&self.data.bills[idx], month)?;
        self.data.transactions.insert(0, txn.clone());

        let bill = &mut self.data.bills[idx];
        match &mut bill.schedule {
            BillSchedule::Fixed { paid_month, .. } => *paid_month = Some(month.to_string()),
            BillSchedule::OneTime { is_paid, .. } => *is_paid = true,
        }
        bill.paid_date = Some(now_timestamp());
        bill.transaction_id = Some(txn.id.clone());
        let updated = bill.clone();

        self.save()?;
        Ok((txn, updated))
    }

    /// Reverse the latest mark-as-paid: delete the generated transaction and
    /// clear the bill's paid fields. A dangling `transaction_id` (the
    /// transaction was deleted on its own) is tolerated; the bill is still
    /// reset to unpaid.
    pub(crate) fn unmark_bill_paid(&mut self, bill_id: &str) -> Result<Bill> {
        let idx = self.bill_index(bill_id)?;
        let Some(txn_id) = self.data.bills[idx].transaction_id.clone() else {
            bail!("Bill '{}' is not marked as paid", self.data.bills[idx].name);
        };

        self.data.transactions.retain(|t| t.id != txn_id);

        let bill = &mut self.data.bills[idx];
        match &mut bill.schedule {
            BillSchedule::Fixed { paid_month, .. } => *paid_month = None,
            BillSchedule::OneTime { is_paid, .. } => *is_paid = false,
        }
        bill.paid_date = None;
        bill.transaction_id = None;
        let updated = bill.clone();

        self.save()?;
        Ok(updated)
    }

    // ── Preferences ───────────────────────────────────────────

    pub(crate) fn update_preferences(&mut self, patch: PreferencesPatch) -> Result<()> {
        self.data.preferences.apply(patch);
        self.save()
    }

    // ── Whole-document operations ─────────────────────────────

    pub(crate) fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.data).context("Failed to serialize ledger data")
    }

    pub(crate) fn import_json(&mut self, json: &str) -> Result<()> {
        self.data = serde_json::from_str(json).context("Not a valid ledger document")?;
        self.save()
    }

    pub(crate) fn clear_all(&mut self) -> Result<()> {
        self.data = LedgerData::default();
        self.save()
    }

    // ── Internals ─────────────────────────────────────────────

    fn bill_index(&self, id: &str) -> Result<usize> {
        self.data
            .bills
            .iter()
            .position(|b| b.id == id)
            .with_context(|| format!("No bill with id {id}"))
    }

    fn transaction_mut(&mut self, id: &str) -> Result<&mut Transaction> {
        self.data
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .with_context(|| format!("No transaction with id {id}"))
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.data).context("Failed to serialize ledger data")?;
        let sealed = crypto::encrypt(&json, &self.key).context("Failed to encrypt ledger data")?;
        fs::write(&self.data_path, sealed)
            .with_context(|| format!("Failed to write {}", self.data_path.display()))
    }
}

fn parse_document(raw: &str, key: &[u8; crypto::KEY_LEN]) -> Result<LedgerData> {
    // Documents written before encryption was enabled are plain JSON; they
    // get sealed on the next save.
    let json = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        crypto::decrypt(raw, key).context("Failed to decrypt ledger data")?
    };

    // A hand-edited or truncated document degrades to the default dataset
    // rather than blocking the app.
    Ok(serde_json::from_str(&json).unwrap_or_default())
}

fn load_or_create_key(path: &Path) -> Result<[u8; crypto::KEY_LEN]> {
    match fs::read_to_string(path) {
        Ok(encoded) => crypto::decode_key(&encoded)
            .with_context(|| format!("Invalid key file: {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let key = crypto::generate_key();
            fs::write(path, crypto::encode_key(&key))
                .with_context(|| format!("Failed to write key file: {}", path.display()))?;
            Ok(key)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read key file: {}", path.display())),
    }
}

pub(crate) fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub(crate) fn current_month() -> String {
    chrono::Local::now().format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests;
