#![allow(clippy::unwrap_used)]

use super::*;
use crate::models::{Frequency, IncomeSourceKind, Theme, TransactionKind};
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(dir.path()).unwrap()
}

fn sample_txn(amount: Decimal, date: &str) -> Transaction {
    Transaction::new(
        TransactionKind::Expense,
        "Alimentação".into(),
        amount,
        date.into(),
        "Mercado".into(),
        false,
        None,
    )
}

fn sample_fixed_bill() -> Bill {
    Bill::new_fixed(
        "Aluguel".into(),
        dec!(1200),
        "Moradia".into(),
        None,
        10,
        "2024-01-05T10:00:00-03:00".into(),
    )
}

// ── Open / defaults ───────────────────────────────────────────

#[test]
fn test_fresh_store_seeds_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    assert_eq!(store.categories().len(), 12);
    assert!(store.transactions().is_empty());
    assert!(store.bills().is_empty());
    assert!(store.income_sources().is_empty());
    assert_eq!(store.preferences().currency, "BRL");
    assert!(dir.path().join(KEY_FILE).exists());
}

#[test]
fn test_data_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        store.add_transaction(sample_txn(dec!(45.90), "2024-03-10")).unwrap();
    }
    let store = open_store(&dir);
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(store.transactions()[0].amount, dec!(45.90));
}

#[test]
fn test_stored_document_is_not_plaintext() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.add_transaction(sample_txn(dec!(10), "2024-03-10")).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
    assert!(!raw.trim_start().starts_with('{'));
    assert!(!raw.contains("Mercado"));
}

#[test]
fn test_transactions_newest_first() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.add_transaction(sample_txn(dec!(1), "2024-03-01")).unwrap();
    store.add_transaction(sample_txn(dec!(2), "2024-03-02")).unwrap();
    assert_eq!(store.transactions()[0].amount, dec!(2));
    assert_eq!(store.transactions()[1].amount, dec!(1));
}

#[test]
fn test_delete_transaction_missing_returns_false() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    assert!(!store.delete_transaction("nope").unwrap());
    let txn = store.add_transaction(sample_txn(dec!(1), "2024-03-01")).unwrap();
    assert!(store.delete_transaction(&txn.id).unwrap());
}

#[test]
fn test_duplicate_category_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let dupe = Category::new(
        "moradia".into(),
        TransactionKind::Expense,
        String::new(),
        String::new(),
    );
    assert!(store.add_category(dupe).is_err());
}

#[test]
fn test_income_source_toggle() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let source = store
        .add_income_source(IncomeSource::new(
            "Salário CLT".into(),
            IncomeSourceKind::Fixed,
            dec!(5000),
            Frequency::Monthly,
            "2024-01-01".into(),
        ))
        .unwrap();
    store.set_income_source_active(&source.id, false).unwrap();
    assert!(!store.income_sources()[0].active);
    assert!(store.delete_income_source(&source.id).unwrap());
    assert!(store.income_sources().is_empty());
}

// ── Payment reconciliation ────────────────────────────────────

#[test]
fn test_mark_bill_paid_creates_transaction() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();

    let (txn, updated) = store.mark_bill_paid(&bill.id, "2024-03").unwrap();
    assert_eq!(txn.date, "2024-03-10");
    assert_eq!(txn.category, "Moradia");
    assert_eq!(txn.amount, dec!(1200));
    assert_eq!(store.transactions()[0].id, txn.id);
    assert_eq!(
        updated.schedule,
        BillSchedule::Fixed {
            due_day: 10,
            paid_month: Some("2024-03".into()),
        }
    );
    assert_eq!(updated.transaction_id.as_deref(), Some(txn.id.as_str()));
    assert!(updated.paid_date.is_some());

    // Both writes land together.
    let reopened = open_store(&dir);
    assert_eq!(reopened.transactions().len(), 1);
    assert_eq!(reopened.bills()[0].transaction_id.as_deref(), Some(txn.id.as_str()));
}

#[test]
fn test_mark_bill_paid_twice_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();
    store.mark_bill_paid(&bill.id, "2024-03").unwrap();
    assert!(store.mark_bill_paid(&bill.id, "2024-03").is_err());
    // Nothing was half-applied.
    assert_eq!(store.transactions().len(), 1);
}

#[test]
fn test_mark_bill_paid_outside_visibility_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();
    assert!(store.mark_bill_paid(&bill.id, "2023-12").is_err());
    assert!(store.mark_bill_paid(&bill.id, "not-a-month").is_err());
    assert!(store.transactions().is_empty());
}

#[test]
fn test_unmark_restores_previous_state() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();

    store.mark_bill_paid(&bill.id, "2024-03").unwrap();
    let restored = store.unmark_bill_paid(&bill.id).unwrap();

    assert!(store.transactions().is_empty());
    assert_eq!(restored, bill);
}

#[test]
fn test_unmark_without_payment_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();
    assert!(store.unmark_bill_paid(&bill.id).is_err());
}

#[test]
fn test_unmark_tolerates_deleted_transaction() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();

    let (txn, _) = store.mark_bill_paid(&bill.id, "2024-03").unwrap();
    store.delete_transaction(&txn.id).unwrap();

    let restored = store.unmark_bill_paid(&bill.id).unwrap();
    assert!(restored.transaction_id.is_none());
    assert!(!crate::bills::is_bill_paid_for_month(&restored, "2024-03"));
}

#[test]
fn test_mark_one_time_bill_paid() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store
        .add_bill(Bill::new_one_time(
            "IPVA".into(),
            dec!(350),
            "Contas".into(),
            None,
            "2024-02-15".into(),
            "2024-02-01T09:00:00-03:00".into(),
        ))
        .unwrap();

    let (txn, updated) = store.mark_bill_paid(&bill.id, "2024-02").unwrap();
    assert_eq!(txn.date, "2024-02-01");
    assert!(!txn.is_recurring);
    assert_eq!(
        updated.schedule,
        BillSchedule::OneTime {
            due_date: "2024-02-15".into(),
            is_paid: true,
        }
    );
}

// ── Bill lifecycle ────────────────────────────────────────────

#[test]
fn test_update_bill_amount() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();
    store.update_bill_amount(&bill.id, dec!(1350)).unwrap();
    assert_eq!(store.bills()[0].amount, dec!(1350));
}

#[test]
fn test_cancel_fixed_bill_soft_deletes() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store.add_bill(sample_fixed_bill()).unwrap();
    store.cancel_bill(&bill.id).unwrap();

    assert_eq!(store.bills().len(), 1);
    assert!(store.bills()[0].cancelled_at.is_some());
    // History before the cancellation month survives.
    assert!(crate::bills::is_bill_visible_for_month(&store.bills()[0], "2024-02"));
}

#[test]
fn test_cancel_one_time_bill_removes_it() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    let bill = store
        .add_bill(Bill::new_one_time(
            "IPVA".into(),
            dec!(350),
            "Contas".into(),
            None,
            "2024-02-15".into(),
            "2024-02-01T09:00:00-03:00".into(),
        ))
        .unwrap();
    store.cancel_bill(&bill.id).unwrap();
    assert!(store.bills().is_empty());
}

// ── Document handling ─────────────────────────────────────────

#[test]
fn test_plaintext_document_is_read_and_sealed() {
    let dir = TempDir::new().unwrap();
    // First open just creates the key file.
    drop(open_store(&dir));

    let mut data = LedgerData::default();
    data.transactions.push(sample_txn(dec!(99), "2024-03-10"));
    let json = serde_json::to_string(&data).unwrap();
    std::fs::write(dir.path().join(DATA_FILE), json).unwrap();

    let mut store = open_store(&dir);
    assert_eq!(store.transactions().len(), 1);

    // Any save re-writes the document sealed.
    store.update_preferences(PreferencesPatch::default()).unwrap();
    let raw = std::fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
    assert!(!raw.trim_start().starts_with('{'));

    let reopened = open_store(&dir);
    assert_eq!(reopened.transactions().len(), 1);
}

#[test]
fn test_malformed_plaintext_degrades_to_default() {
    let dir = TempDir::new().unwrap();
    drop(open_store(&dir));
    std::fs::write(dir.path().join(DATA_FILE), "{ definitely not json").unwrap();

    let store = open_store(&dir);
    assert!(store.transactions().is_empty());
    assert_eq!(store.categories().len(), 12);
}

#[test]
fn test_undecryptable_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    drop(open_store(&dir));

    let other_key = crypto::generate_key();
    let sealed = crypto::encrypt("{}", &other_key).unwrap();
    std::fs::write(dir.path().join(DATA_FILE), sealed).unwrap();

    assert!(Store::open(dir.path()).is_err());
}

#[test]
fn test_backup_and_restore_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.add_transaction(sample_txn(dec!(45.90), "2024-03-10")).unwrap();
    store.add_bill(sample_fixed_bill()).unwrap();
    let backup = store.export_json().unwrap();

    let other_dir = TempDir::new().unwrap();
    let mut other = open_store(&other_dir);
    other.import_json(&backup).unwrap();
    assert_eq!(other.transactions(), store.transactions());
    assert_eq!(other.bills(), store.bills());

    assert!(other.import_json("not json").is_err());
}

#[test]
fn test_clear_all_resets_to_defaults() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store.add_transaction(sample_txn(dec!(1), "2024-03-01")).unwrap();
    store.clear_all().unwrap();
    assert!(store.transactions().is_empty());
    assert_eq!(store.categories().len(), 12);

    let reopened = open_store(&dir);
    assert!(reopened.transactions().is_empty());
}

#[test]
fn test_update_preferences() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    store
        .update_preferences(PreferencesPatch {
            currency: Some("USD".into()),
            theme: Some(Theme::Light),
            whatsapp_number: None,
        })
        .unwrap();
    let reopened = open_store(&dir);
    assert_eq!(reopened.preferences().currency, "USD");
    assert_eq!(reopened.preferences().theme, Theme::Light);
}

// ── Crypto ────────────────────────────────────────────────────

#[test]
fn test_encrypt_decrypt_round_trip() {
    let key = crypto::generate_key();
    let sealed = crypto::encrypt("{\"hello\":\"mundo\"}", &key).unwrap();
    assert_ne!(sealed, "{\"hello\":\"mundo\"}");
    assert_eq!(crypto::decrypt(&sealed, &key).unwrap(), "{\"hello\":\"mundo\"}");
}

#[test]
fn test_decrypt_with_wrong_key_fails() {
    let key = crypto::generate_key();
    let sealed = crypto::encrypt("data", &key).unwrap();
    let other = crypto::generate_key();
    assert!(matches!(
        crypto::decrypt(&sealed, &other),
        Err(crypto::CryptoError::Decrypt)
    ));
}

#[test]
fn test_decrypt_rejects_malformed_input() {
    let key = crypto::generate_key();
    assert!(matches!(
        crypto::decrypt("@@not base64@@", &key),
        Err(crypto::CryptoError::Encoding(_))
    ));
    // Valid base64 but shorter than an IV.
    assert!(matches!(
        crypto::decrypt("AAAA", &key),
        Err(crypto::CryptoError::Malformed)
    ));
}

#[test]
fn test_key_encode_decode() {
    let key = crypto::generate_key();
    let decoded = crypto::decode_key(&crypto::encode_key(&key)).unwrap();
    assert_eq!(decoded, key);
    assert!(matches!(
        crypto::decode_key("c2hvcnQ="),
        Err(crypto::CryptoError::InvalidKey)
    ));
}
