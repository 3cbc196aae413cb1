use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::bills;
use crate::export::{self, ExportFilter};
use crate::models::{
    Bill, BillSchedule, Category, Frequency, IncomeSource, IncomeSourceKind, Preferences,
    PreferencesPatch, Theme, Transaction, TransactionKind,
};
use crate::stats;
use crate::store::{self, Store};

pub(crate) fn as_cli(args: &[String], store: &mut Store) -> Result<()> {
    match args[1].as_str() {
        "summary" | "s" => summary(&args[2..], store),
        "bills" | "b" => cli_bills(&args[2..], store),
        "pay" => cli_pay(&args[2..], store),
        "unpay" => cli_unpay(&args[2..], store),
        "add" => cli_add(&args[2..], store),
        "txn" => cli_txn(&args[2..], store),
        "income" => cli_income(&args[2..], store),
        "categories" => cli_categories(&args[2..], store),
        "export" => cli_export(&args[2..], store),
        "config" => cli_config(&args[2..], store),
        "backup" => cli_backup(&args[2..], store),
        "restore" => cli_restore(&args[2..], store),
        "reset" => cli_reset(&args[2..], store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("bolso {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Bolso — local-only personal finance and bill tracker");
    println!();
    println!("Usage: bolso [command]");
    println!();
    println!("Commands:");
    println!("  (none) | summary [YYYY-MM]    Monthly financial summary");
    println!("  bills [YYYY-MM]               List bills for a month");
    println!("  bills add fixed <name> <amount> <category> [--due-day <1-31>] [--desc <text>]");
    println!("  bills add once <name> <amount> <category> --due-date <YYYY-MM-DD> [--desc <text>]");
    println!("  bills amount <name> <value>   Change a bill's amount");
    println!("  bills cancel <name>           Cancel a fixed bill / delete a one-time bill");
    println!("  pay <name> [--month YYYY-MM]  Mark a bill paid (records the expense)");
    println!("  unpay <name>                  Undo a payment (removes the expense)");
    println!("  add income|expense <amount> <category> [description] [--date <YYYY-MM-DD>]");
    println!("  txn list [YYYY-MM]            List transactions");
    println!("  txn rm <id>                   Delete a transaction");
    println!("  txn edit <id> [--desc <text>] [--category <name>]");
    println!("  income add <name> <amount> fixed|variable [--start <YYYY-MM-DD>]");
    println!("  income list | pause <name> | resume <name> | rm <name>");
    println!("  categories [add <name> income|expense | rm <name>]");
    println!("  export [path] [--month YYYY-MM | --all]");
    println!("  config [--currency <code>] [--theme light|dark] [--whatsapp <number>]");
    println!("  backup [path] | restore <path> | reset --yes");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

// ── Summary ──────────────────────────────────────────────────

pub(crate) fn summary(args: &[String], store: &Store) -> Result<()> {
    let month = month_arg(args)?;
    let prefs = store.preferences();
    let summary = stats::monthly_stats(store.transactions(), &month);
    let breakdown =
        stats::category_breakdown(store.transactions(), TransactionKind::Expense, &month);

    println!("Bolso — {month}");
    println!("{}", "─".repeat(40));
    println!("  Income:       {}", money(prefs, &summary.total_income));
    println!("  Expenses:     {}", money(prefs, &summary.total_expenses));
    println!("  Balance:      {}", money(prefs, &summary.balance));
    println!("  Savings rate: {:.1}%", summary.savings_rate);
    println!("  Transactions: {}", summary.transaction_count);

    if !breakdown.is_empty() {
        println!();
        println!("Expenses by category:");
        for entry in &breakdown {
            println!("  {:<24} {}", entry.category, money(prefs, &entry.amount));
        }
    }

    let due = bills::resolve_bills_for_month(store.bills(), &month);
    let unpaid: Vec<_> = due
        .iter()
        .filter(|b| !bills::is_bill_paid_for_month(b, &month))
        .collect();
    if !unpaid.is_empty() {
        println!();
        println!("Unpaid bills:");
        for bill in unpaid {
            println!("  {:<24} {}", bill.name, money(prefs, &bill.amount));
        }
    }

    Ok(())
}

// ── Bills ────────────────────────────────────────────────────

fn cli_bills(args: &[String], store: &mut Store) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => cli_bill_add(&args[1..], store),
        Some("amount") => cli_bill_amount(&args[1..], store),
        Some("cancel") => cli_bill_cancel(&args[1..], store),
        _ => cli_bill_list(args, store),
    }
}

fn cli_bill_list(args: &[String], store: &Store) -> Result<()> {
    let month = month_arg(args)?;
    let prefs = store.preferences();
    let resolved = bills::resolve_bills_for_month(store.bills(), &month);

    if resolved.is_empty() {
        println!("No bills for {month}");
        return Ok(());
    }

    let (pending, paid) = bills::pending_and_paid_totals(&resolved, &month);
    println!(
        "Bills for {month}  (pending: {} | paid: {})",
        money(prefs, &pending),
        money(prefs, &paid)
    );
    println!("{}", "─".repeat(60));

    for bill in resolved {
        let mark = if bills::is_bill_paid_for_month(bill, &month) {
            "x"
        } else {
            " "
        };
        let due = match &bill.schedule {
            BillSchedule::Fixed { due_day, .. } => format!("every month, day {due_day}"),
            BillSchedule::OneTime { due_date, .. } => format!("due {due_date}"),
        };
        println!(
            "  [{mark}] {:<24} {:<22} {}",
            bill.name,
            due,
            money(prefs, &bill.amount)
        );
    }

    Ok(())
}

fn cli_bill_add(args: &[String], store: &mut Store) -> Result<()> {
    let value_flags = &["--due-day", "--due-date", "--desc"];
    let positional = positional_args(args, value_flags);
    let [mode, name, amount, category] = positional.as_slice() else {
        anyhow::bail!("Usage: bolso bills add fixed|once <name> <amount> <category> [flags]");
    };

    let amount = parse_amount(amount)?;
    let description = flag_value(args, "--desc").map(str::to_string);
    let created_at = store::now_timestamp();

    let bill = match *mode {
        "fixed" => {
            let due_day: u32 = flag_value(args, "--due-day")
                .map(str::parse)
                .transpose()?
                .unwrap_or(1);
            if !(1..=31).contains(&due_day) {
                anyhow::bail!("--due-day must be between 1 and 31");
            }
            Bill::new_fixed(
                name.to_string(),
                amount,
                category.to_string(),
                description,
                due_day,
                created_at,
            )
        }
        "once" => {
            let due_date = flag_value(args, "--due-date")
                .ok_or_else(|| anyhow::anyhow!("One-time bills need --due-date <YYYY-MM-DD>"))?;
            parse_date(due_date)?;
            Bill::new_one_time(
                name.to_string(),
                amount,
                category.to_string(),
                description,
                due_date.to_string(),
                created_at,
            )
        }
        other => anyhow::bail!("Unknown bill mode '{other}', expected 'fixed' or 'once'"),
    };

    let bill = store.add_bill(bill)?;
    let kind = if bill.is_fixed() { "fixed" } else { "one-time" };
    println!(
        "Added {kind} bill '{}' ({})",
        bill.name,
        money(store.preferences(), &bill.amount)
    );
    Ok(())
}

fn cli_bill_amount(args: &[String], store: &mut Store) -> Result<()> {
    let positional = positional_args(args, &[]);
    let [name, value] = positional.as_slice() else {
        anyhow::bail!("Usage: bolso bills amount <name> <value>");
    };
    let id = find_bill_id(store, name)?;
    let amount = parse_amount(value)?;
    store.update_bill_amount(&id, amount)?;
    println!("Updated '{name}' to {}", money(store.preferences(), &amount));
    Ok(())
}

fn cli_bill_cancel(args: &[String], store: &mut Store) -> Result<()> {
    let Some(name) = args.first() else {
        anyhow::bail!("Usage: bolso bills cancel <name>");
    };
    let id = find_bill_id(store, name)?;
    let fixed = store
        .bills()
        .iter()
        .find(|b| b.id == id)
        .is_some_and(Bill::is_fixed);
    store.cancel_bill(&id)?;
    if fixed {
        println!("Cancelled '{name}'; it stays visible in past months");
    } else {
        println!("Deleted one-time bill '{name}'");
    }
    Ok(())
}

fn cli_pay(args: &[String], store: &mut Store) -> Result<()> {
    let positional = positional_args(args, &["--month"]);
    let Some(name) = positional.first() else {
        anyhow::bail!("Usage: bolso pay <name> [--month YYYY-MM]");
    };
    let month = flag_value(args, "--month")
        .map(str::to_string)
        .unwrap_or_else(store::current_month);

    let id = find_bill_id(store, name)?;
    let (txn, bill) = store.mark_bill_paid(&id, &month)?;
    println!(
        "Paid '{}' for {month}: {} on {}",
        bill.name,
        money(store.preferences(), &txn.amount),
        txn.date
    );
    Ok(())
}

fn cli_unpay(args: &[String], store: &mut Store) -> Result<()> {
    let Some(name) = args.first() else {
        anyhow::bail!("Usage: bolso unpay <name>");
    };
    let id = find_bill_id(store, name)?;
    let bill = store.unmark_bill_paid(&id)?;
    println!("Removed payment for '{}'", bill.name);
    Ok(())
}

fn find_bill_id(store: &Store, needle: &str) -> Result<String> {
    let lower = needle.to_lowercase();
    store
        .bills()
        .iter()
        .find(|b| b.name.to_lowercase() == lower || b.id == needle)
        .map(|b| b.id.clone())
        .ok_or_else(|| anyhow::anyhow!("No bill named '{needle}'"))
}

// ── Transactions ─────────────────────────────────────────────

fn cli_add(args: &[String], store: &mut Store) -> Result<()> {
    let positional = positional_args(args, &["--date"]);
    let (kind_str, amount_str, category, description) = match positional.as_slice() {
        [k, a, c, rest @ ..] => (*k, *a, *c, rest.join(" ")),
        _ => anyhow::bail!(
            "Usage: bolso add income|expense <amount> <category> [description] [--date <YYYY-MM-DD>]"
        ),
    };

    let kind = match kind_str {
        "income" => TransactionKind::Income,
        "expense" => TransactionKind::Expense,
        other => anyhow::bail!("Unknown transaction type '{other}', expected income or expense"),
    };
    let amount = parse_amount(amount_str)?;
    let date = match flag_value(args, "--date") {
        Some(d) => {
            parse_date(d)?;
            d.to_string()
        }
        None => store::today(),
    };
    let recurring = args.iter().any(|a| a == "--recurring");
    let frequency = recurring.then_some(Frequency::Monthly);

    let txn = store.add_transaction(Transaction::new(
        kind,
        category.to_string(),
        amount,
        date,
        description,
        recurring,
        frequency,
    ))?;
    println!(
        "Added {kind_str}: {} in {} on {}",
        money(store.preferences(), &txn.amount),
        txn.category,
        txn.date
    );
    Ok(())
}

fn cli_txn(args: &[String], store: &mut Store) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("list") | None => {
            let month = month_arg(args.get(1..).unwrap_or(&[]))?;
            let prefs = store.preferences();
            let matching: Vec<&Transaction> = store
                .transactions()
                .iter()
                .filter(|t| t.date.starts_with(&month))
                .collect();
            if matching.is_empty() {
                println!("No transactions for {month}");
                return Ok(());
            }
            println!("{:<12} {:<8} {:<18} {:<12} Description", "Date", "Type", "Category", "Amount");
            println!("{}", "─".repeat(70));
            for txn in matching {
                let kind = if txn.is_income() { "in" } else { "out" };
                println!(
                    "{:<12} {:<8} {:<18} {:<12} {}  ({})",
                    txn.date,
                    kind,
                    txn.category,
                    money(prefs, &txn.amount),
                    txn.description,
                    &txn.id[..8.min(txn.id.len())],
                );
            }
            Ok(())
        }
        Some("rm") => {
            let Some(id) = args.get(1) else {
                anyhow::bail!("Usage: bolso txn rm <id>");
            };
            let full_id = find_transaction_id(store, id)?;
            store.delete_transaction(&full_id)?;
            println!("Deleted transaction {id}");
            Ok(())
        }
        Some("edit") => {
            let Some(id) = args.get(1) else {
                anyhow::bail!("Usage: bolso txn edit <id> [--desc <text>] [--category <name>]");
            };
            let full_id = find_transaction_id(store, id)?;
            if let Some(desc) = flag_value(args, "--desc") {
                store.update_transaction_description(&full_id, desc)?;
            }
            if let Some(category) = flag_value(args, "--category") {
                store.update_transaction_category(&full_id, category)?;
            }
            println!("Updated transaction {id}");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown txn subcommand: {other}"),
    }
}

/// Accepts a full id or an unambiguous prefix (the listing prints prefixes).
fn find_transaction_id(store: &Store, needle: &str) -> Result<String> {
    let matches: Vec<&Transaction> = store
        .transactions()
        .iter()
        .filter(|t| t.id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [txn] => Ok(txn.id.clone()),
        [] => anyhow::bail!("No transaction with id {needle}"),
        _ => anyhow::bail!("Transaction id {needle} is ambiguous"),
    }
}

// ── Income sources ───────────────────────────────────────────

fn cli_income(args: &[String], store: &mut Store) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let positional = positional_args(&args[1..], &["--start"]);
            let [name, amount, kind] = positional.as_slice() else {
                anyhow::bail!("Usage: bolso income add <name> <amount> fixed|variable");
            };
            let kind = match *kind {
                "fixed" => IncomeSourceKind::Fixed,
                "variable" => IncomeSourceKind::Variable,
                other => anyhow::bail!("Unknown income type '{other}'"),
            };
            let start_date = match flag_value(args, "--start") {
                Some(d) => {
                    parse_date(d)?;
                    d.to_string()
                }
                None => store::today(),
            };
            let source = store.add_income_source(IncomeSource::new(
                name.to_string(),
                kind,
                parse_amount(amount)?,
                Frequency::Monthly,
                start_date,
            ))?;
            println!("Added income source '{}'", source.name);
            Ok(())
        }
        Some("list") | None => {
            if store.income_sources().is_empty() {
                println!("No income sources");
                return Ok(());
            }
            let prefs = store.preferences();
            println!("{:<24} {:<10} {:<12} Active", "Name", "Type", "Amount");
            println!("{}", "─".repeat(55));
            for source in store.income_sources() {
                let kind = match source.kind {
                    IncomeSourceKind::Fixed => "fixed",
                    IncomeSourceKind::Variable => "variable",
                };
                println!(
                    "{:<24} {:<10} {:<12} {}",
                    source.name,
                    kind,
                    money(prefs, &source.amount),
                    if source.active { "yes" } else { "no" }
                );
            }
            Ok(())
        }
        Some(action @ ("pause" | "resume" | "rm")) => {
            let Some(name) = args.get(1) else {
                anyhow::bail!("Usage: bolso income {action} <name>");
            };
            let id = find_income_source_id(store, name)?;
            match action {
                "pause" => store.set_income_source_active(&id, false)?,
                "resume" => store.set_income_source_active(&id, true)?,
                _ => {
                    store.delete_income_source(&id)?;
                }
            }
            println!("Income source '{name}' updated");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown income subcommand: {other}"),
    }
}

fn find_income_source_id(store: &Store, needle: &str) -> Result<String> {
    let lower = needle.to_lowercase();
    store
        .income_sources()
        .iter()
        .find(|s| s.name.to_lowercase() == lower || s.id == needle)
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow::anyhow!("No income source named '{needle}'"))
}

// ── Categories ───────────────────────────────────────────────

fn cli_categories(args: &[String], store: &mut Store) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("add") => {
            let positional = positional_args(&args[1..], &[]);
            let [name, kind] = positional.as_slice() else {
                anyhow::bail!("Usage: bolso categories add <name> income|expense");
            };
            let kind = match *kind {
                "income" => TransactionKind::Income,
                "expense" => TransactionKind::Expense,
                other => anyhow::bail!("Unknown category type '{other}'"),
            };
            let category =
                store.add_category(Category::new(name.to_string(), kind, String::new(), String::new()))?;
            println!("Added category '{}'", category.name);
            Ok(())
        }
        Some("rm") => {
            let Some(name) = args.get(1) else {
                anyhow::bail!("Usage: bolso categories rm <name>");
            };
            let id = Category::find_by_name(store.categories(), name)
                .map(|c| c.id.clone())
                .or_else(|| {
                    store
                        .categories()
                        .iter()
                        .find(|c| c.id == *name)
                        .map(|c| c.id.clone())
                })
                .ok_or_else(|| anyhow::anyhow!("No category named '{name}'"))?;
            store.delete_category(&id)?;
            println!("Deleted category '{name}' (existing records keep the name)");
            Ok(())
        }
        _ => {
            println!("{:<24} Type", "Name");
            println!("{}", "─".repeat(32));
            for category in store.categories() {
                let kind = match category.kind {
                    TransactionKind::Income => "income",
                    TransactionKind::Expense => "expense",
                };
                println!("{:<24} {kind}", category.name);
            }
            Ok(())
        }
    }
}

// ── Export / backup ──────────────────────────────────────────

fn cli_export(args: &[String], store: &Store) -> Result<()> {
    let month = flag_value(args, "--month")
        .map(str::to_string)
        .unwrap_or_else(store::current_month);
    let all = args.iter().any(|a| a == "--all");

    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let suffix = if all { "all".to_string() } else { month.clone() };
            format!("{home}/bolso-export-{suffix}.csv")
        });

    let filter = if all {
        ExportFilter::default()
    } else {
        bills::parse_month(&month)?;
        ExportFilter::for_month(&month)
    };
    let filtered = export::filter_transactions(store.transactions(), &filter);
    let count = export::export_to_csv(&output_path, &filtered)?;
    if count == 0 {
        println!("No transactions to export (file written with summary only)");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}

fn cli_backup(args: &[String], store: &Store) -> Result<()> {
    let path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/bolso-backup-{}.json", store::today())
        });
    std::fs::write(&path, store.export_json()?)?;
    println!("Backup written to {path}");
    Ok(())
}

fn cli_restore(args: &[String], store: &mut Store) -> Result<()> {
    let Some(path) = args.first() else {
        anyhow::bail!("Usage: bolso restore <path>");
    };
    let json = std::fs::read_to_string(shellexpand(path))?;
    store.import_json(&json)?;
    println!(
        "Restored {} transactions and {} bills",
        store.transactions().len(),
        store.bills().len()
    );
    Ok(())
}

fn cli_reset(args: &[String], store: &mut Store) -> Result<()> {
    if !args.iter().any(|a| a == "--yes") {
        anyhow::bail!("This deletes all local data. Run 'bolso reset --yes' to confirm");
    }
    store.clear_all()?;
    println!("All data cleared");
    Ok(())
}

// ── Preferences ──────────────────────────────────────────────

fn cli_config(args: &[String], store: &mut Store) -> Result<()> {
    let currency = flag_value(args, "--currency").map(str::to_string);
    let theme = match flag_value(args, "--theme") {
        Some("light") => Some(Theme::Light),
        Some("dark") => Some(Theme::Dark),
        Some(other) => anyhow::bail!("Unknown theme '{other}', expected light or dark"),
        None => None,
    };
    let whatsapp_number = flag_value(args, "--whatsapp").map(str::to_string);

    if currency.is_some() || theme.is_some() || whatsapp_number.is_some() {
        store.update_preferences(PreferencesPatch {
            currency,
            theme,
            whatsapp_number,
        })?;
    }

    let prefs = store.preferences();
    println!("currency: {}", prefs.currency);
    println!(
        "theme:    {}",
        match prefs.theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    );
    if let Some(number) = &prefs.whatsapp_number {
        println!("whatsapp: {number}");
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────

fn month_arg(args: &[String]) -> Result<String> {
    let month = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .unwrap_or_else(store::current_month);
    bills::parse_month(&month)?;
    Ok(month)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Positional arguments, skipping flags and the values of `value_flags`.
fn positional_args<'a>(args: &'a [String], value_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if value_flags.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|_| anyhow::anyhow!("Could not parse '{raw}' as an amount"))?;
    if amount < Decimal::ZERO {
        anyhow::bail!("Amounts must be non-negative (the type decides the sign)");
    }
    Ok(amount)
}

fn parse_date(raw: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Could not parse '{raw}' as a date (expected YYYY-MM-DD)"))
}

fn money(prefs: &Preferences, amount: &Decimal) -> String {
    match prefs.currency.as_str() {
        "BRL" => format!("R$ {amount:.2}"),
        "USD" => format!("$ {amount:.2}"),
        "EUR" => format!("€ {amount:.2}"),
        other => format!("{other} {amount:.2}"),
    }
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
