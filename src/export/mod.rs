//! Semicolon-delimited CSV export of the transaction ledger, shaped for
//! spreadsheet apps: UTF-8 BOM, pt-BR headers and labels, decimal comma,
//! and a trailing RESUMO block with totals.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;

use crate::models::{Transaction, TransactionKind};

#[derive(Debug, Clone)]
pub(crate) struct ExportFilter {
    /// Inclusive "YYYY-MM-DD" bounds; `None` means unbounded.
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    /// Empty means all categories.
    pub(crate) categories: Vec<String>,
    pub(crate) include_income: bool,
    pub(crate) include_expenses: bool,
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            categories: Vec::new(),
            include_income: true,
            include_expenses: true,
        }
    }
}

impl ExportFilter {
    /// Bounds covering a single "YYYY-MM" month.
    pub(crate) fn for_month(month: &str) -> Self {
        Self {
            start_date: Some(format!("{month}-01")),
            end_date: Some(format!("{month}-31")),
            ..Self::default()
        }
    }
}

pub(crate) fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &ExportFilter,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| {
            let date_ok = filter
                .start_date
                .as_deref()
                .map_or(true, |start| t.date.as_str() >= start)
                && filter
                    .end_date
                    .as_deref()
                    .map_or(true, |end| t.date.as_str() <= end);
            let category_ok =
                filter.categories.is_empty() || filter.categories.iter().any(|c| c == &t.category);
            let kind_ok = match t.kind {
                TransactionKind::Income => filter.include_income,
                TransactionKind::Expense => filter.include_expenses,
            };
            date_ok && category_ok && kind_ok
        })
        .collect()
}

/// Write the filtered transactions to `path`. Returns the row count
/// (excluding the summary block).
pub(crate) fn export_to_csv(path: &str, transactions: &[&Transaction]) -> Result<usize> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {path}"))?;
    // BOM keeps Excel from mangling accented characters.
    file.write_all("\u{FEFF}".as_bytes())
        .context("Failed to write BOM")?;

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(file);

    wtr.write_record([
        "Data",
        "Tipo",
        "Categoria",
        "Valor",
        "Descrição",
        "Recorrente",
        "Tags",
    ])?;

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    for txn in transactions {
        match txn.kind {
            TransactionKind::Income => total_income += txn.amount,
            TransactionKind::Expense => total_expenses += txn.amount,
        }
        wtr.write_record([
            display_date(&txn.date),
            kind_label(txn.kind).to_string(),
            txn.category.clone(),
            display_amount(&txn.amount),
            txn.description.clone(),
            if txn.is_recurring { "Sim" } else { "Não" }.to_string(),
            txn.tags.as_ref().map(|t| t.join(", ")).unwrap_or_default(),
        ])?;
    }

    let balance = total_income - total_expenses;
    wtr.write_record([""; 7])?;
    wtr.write_record(["RESUMO", "", "", "", "", "", ""])?;
    summary_row(&mut wtr, "Total Entradas", &total_income)?;
    summary_row(&mut wtr, "Total Saídas", &total_expenses)?;
    summary_row(&mut wtr, "Saldo", &balance)?;

    wtr.flush().context("Failed to flush export file")?;
    Ok(transactions.len())
}

fn summary_row<W: Write>(wtr: &mut csv::Writer<W>, label: &str, amount: &Decimal) -> Result<()> {
    wtr.write_record([label, "", "", &display_amount(amount), "", "", ""])?;
    Ok(())
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Entrada",
        TransactionKind::Expense => "Saída",
    }
}

fn display_amount(amount: &Decimal) -> String {
    format!("{amount:.2}").replace('.', ",")
}

/// "2024-03-10" -> "10/03/2024". Unparseable dates pass through untouched.
fn display_date(iso: &str) -> String {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| iso.to_string())
}
