use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::{flag_value, positionals};
use crate::config::{Config, USER_VAR};
use crate::dashboard::{self, LAST_MONTH_KEY};
use crate::db::{Database, TransactionFilter};
use crate::format::{column, format_brl, format_date, format_percent};
use crate::identity;
use crate::models::{Category, MonthSelector, Transaction, TransactionType, User};
use crate::validate::{validate_transaction, TransactionInput};

pub(crate) fn as_cli(
    args: &[String],
    db: &mut Database,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];
    match command.as_str() {
        "summary" | "s" => cli_summary(rest, db, config, today),
        "months" => cli_months(db, config, today),
        "add" => cli_add(rest, db, config, today),
        "edit" => cli_edit(rest, db, config),
        "delete" | "rm" => cli_delete(rest, db, config),
        "list" | "ls" => cli_list(rest, db, config, today),
        "show" => cli_show(rest, db, config),
        "categories" => cli_categories(db, config),
        "category" => cli_category(rest, db, config),
        "user" => cli_user(rest, db, config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("saldo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Saldo - personal finance tracker with a monthly dashboard");
    println!();
    println!("Usage: saldo [command]");
    println!();
    println!("Commands:");
    println!("  summary [YYYY-MM]                     Monthly totals and spending by category");
    println!("  months                                List selectable months");
    println!("  add <type> <amount> <description>     Record an income, expense or saving");
    println!("    --date <YYYY-MM-DD|DD/MM/YYYY>      Day of the transaction (default: today)");
    println!("    --category <name|id>                Category to file it under");
    println!("  edit <id> <type> <amount> <description> [--date D] [--category C]");
    println!("  delete <id>                           Delete a transaction");
    println!("  list [--type T] [--month YYYY-MM]     List a month's transactions");
    println!("    --limit <N>                         Show only the N newest");
    println!("  show <id>                             Show one transaction");
    println!("  categories                            List categories");
    println!("  category add <name>                   Create a custom category");
    println!("  category rename <id> <name>           Rename a custom category");
    println!("  category delete <id>                  Delete a custom category");
    println!("  user sync <event.json>                Apply an identity provider event");
    println!("  user show                             Show the current user");
    println!("  --help, -h                            Show this help");
    println!("  --version, -V                         Show version");
    println!();
    println!("Environment: {USER_VAR} selects the user, SALDO_DB the database file,");
    println!("SALDO_LOG the log filter.");
}

fn current_user(db: &Database, config: &Config) -> Result<User> {
    let id = config.require_user_id()?;
    db.require_user(id)
        .with_context(|| format!("Run `saldo user sync <event.json>` to register {id}"))
}

fn parse_month(raw: &str) -> Result<MonthSelector> {
    MonthSelector::parse(raw).with_context(|| format!("Invalid month \"{raw}\", expected YYYY-MM"))
}

fn parse_id(raw: Option<&str>, usage: &str) -> Result<i64> {
    let raw = raw.with_context(|| format!("Usage: {usage}"))?;
    raw.parse()
        .with_context(|| format!("Invalid id \"{raw}\""))
}

/// Accepts a category id or a (case-insensitive) name.
fn resolve_category(db: &Database, user: &User, raw: &str) -> Result<i64> {
    let categories = db.get_categories(user)?;
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| Category::find_by_id(&categories, id))
        .or_else(|| Category::find_by_name(&categories, raw))
        .map(|c| c.id)
        .with_context(|| format!("Category '{raw}' not found"))
}

// ── Dashboard ─────────────────────────────────────────────────

fn cli_summary(args: &[String], db: &mut Database, config: &Config, today: NaiveDate) -> Result<()> {
    let user = current_user(db, config)?;
    let requested = positionals(args).first().map(|m| parse_month(m)).transpose()?;
    let month = dashboard::select_month(db, &user, requested, today)?;
    let summary = dashboard::load_summary(db, &user, month)?;
    let name = dashboard::month_name(month);

    println!("Saldo: {name} {}", month.year());
    println!("{}", "─".repeat(44));
    println!("  {:<18}{}", "Rendas:", format_brl(summary.total_income));
    println!("  {:<18}{}", "Despesas:", format_brl(summary.total_expenses));
    println!("  {:<18}{}", "Economias:", format_brl(summary.total_savings));
    println!("  {:<18}{}", "Saldo Restante:", format_brl(summary.remaining_balance));

    println!();
    println!("Gastos por categoria no mês de {name}");
    if summary.expense_by_category.is_empty() {
        println!("  Nenhuma despesa registrada neste mês.");
    }
    for entry in &summary.expense_by_category {
        println!(
            "  {} {:>16} {:>5}",
            column(entry.label.as_str(), 24),
            format_brl(entry.total),
            format_percent(summary.share_percent(entry)),
        );
    }
    Ok(())
}

fn cli_months(db: &mut Database, config: &Config, today: NaiveDate) -> Result<()> {
    let user = current_user(db, config)?;
    let stored = db.get_preference(&user, LAST_MONTH_KEY)?;
    let selected = dashboard::resolve_month(None, stored.as_deref(), today);
    for option in dashboard::month_options(today) {
        let marker = if option.month == selected { "*" } else { " " };
        println!("{marker} {}  {}", option.value, option.label);
    }
    Ok(())
}

// ── Transactions ──────────────────────────────────────────────

fn transaction_input<'a>(
    fields: &[&'a str],
    description: &'a str,
    date: &'a str,
    category_id: Option<i64>,
) -> TransactionInput<'a> {
    TransactionInput {
        kind: fields.first().copied().unwrap_or(""),
        amount: fields.get(1).copied().unwrap_or(""),
        description,
        date,
        category_id,
    }
}

fn cli_add(args: &[String], db: &mut Database, config: &Config, today: NaiveDate) -> Result<()> {
    let user = current_user(db, config)?;
    let fields = positionals(args);
    if fields.len() < 3 {
        anyhow::bail!("Usage: saldo add <income|expense|saving> <amount> <description> [--date D] [--category C]");
    }
    let description = fields[2..].join(" ");
    let default_date = today.format("%Y-%m-%d").to_string();
    let date = flag_value(args, "--date").unwrap_or(&default_date);
    let category_id = flag_value(args, "--category")
        .map(|c| resolve_category(db, &user, c))
        .transpose()?;

    let valid = validate_transaction(&transaction_input(&fields, &description, date, category_id))?;
    let txn = db.create_transaction(&user, &valid)?;
    println!("Added transaction {}", txn.id);
    print_transaction(&txn);
    Ok(())
}

fn cli_edit(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    const USAGE: &str = "saldo edit <id> <type> <amount> <description> [--date D] [--category C]";
    let user = current_user(db, config)?;
    let fields = positionals(args);
    let id = parse_id(fields.first().copied(), USAGE)?;
    if fields.len() < 4 {
        anyhow::bail!("Usage: {USAGE}");
    }
    let existing = db
        .get_transaction(&user, id)
        .with_context(|| format!("Transaction {id}"))?;
    let description = fields[3..].join(" ");
    let existing_date = existing.date.format("%Y-%m-%d").to_string();
    // Without --date the stored day is kept.
    let date = flag_value(args, "--date").unwrap_or(&existing_date);
    let category_id = flag_value(args, "--category")
        .map(|c| resolve_category(db, &user, c))
        .transpose()?;

    let valid =
        validate_transaction(&transaction_input(&fields[1..], &description, date, category_id))?;
    let txn = db.update_transaction(&user, id, &valid)?;
    println!("Updated transaction {}", txn.id);
    print_transaction(&txn);
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let user = current_user(db, config)?;
    let id = parse_id(positionals(args).first().copied(), "saldo delete <id>")?;
    db.delete_transaction(&user, id)
        .with_context(|| format!("Transaction {id}"))?;
    println!("Deleted transaction {id}");
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database, config: &Config, today: NaiveDate) -> Result<()> {
    let user = current_user(db, config)?;
    let kind = flag_value(args, "--type")
        .map(|t| {
            TransactionType::parse_input(t)
                .with_context(|| format!("Unknown type \"{t}\", expected income, expense or saving"))
        })
        .transpose()?;
    let limit = flag_value(args, "--limit")
        .map(|n| {
            n.parse::<u32>()
                .with_context(|| format!("Invalid limit \"{n}\", expected a whole number"))
        })
        .transpose()?;
    let requested = flag_value(args, "--month").map(parse_month).transpose()?;
    let stored = db.get_preference(&user, LAST_MONTH_KEY)?;
    let month = dashboard::resolve_month(requested, stored.as_deref(), today);

    let filter = TransactionFilter::for_month(month)
        .with_type(kind)
        .with_limit(limit);
    let txns = db.get_transactions(&user, &filter)?;
    let heading = kind.map_or("Transações", |k| k.plural_label());
    println!("{heading}: {} {}", dashboard::month_name(month), month.year());
    if txns.is_empty() {
        println!("  Nenhuma transação encontrada.");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {} {} {:<9} {:>16}",
        "ID",
        "Data",
        column("Descrição", 28),
        column("Categoria", 16),
        "Tipo",
        "Valor"
    );
    println!("{}", "─".repeat(92));
    for txn in &txns {
        println!(
            "{:<6} {:<10} {} {} {:<9} {:>16}",
            txn.id,
            format_date(txn.date),
            column(&txn.description, 28),
            column(txn.category_name.as_deref().unwrap_or("-"), 16),
            txn.transaction_type.as_str(),
            format_brl(txn.amount),
        );
    }
    println!("{}", "─".repeat(92));
    let total_of = |pred: fn(&Transaction) -> bool| {
        txns.iter()
            .filter(|t| pred(t))
            .map(|t| t.amount)
            .sum::<rust_decimal::Decimal>()
    };
    match kind {
        Some(kind) => println!(
            "Total de {}: {}",
            kind.plural_label().to_lowercase(),
            format_brl(total_of(|_| true))
        ),
        None => println!(
            "Rendas: {}  Despesas: {}  Economias: {}",
            format_brl(total_of(Transaction::is_income)),
            format_brl(total_of(Transaction::is_expense)),
            format_brl(total_of(Transaction::is_saving)),
        ),
    }
    Ok(())
}

fn cli_show(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let user = current_user(db, config)?;
    let id = parse_id(positionals(args).first().copied(), "saldo show <id>")?;
    let txn = db
        .get_transaction(&user, id)
        .with_context(|| format!("Transaction {id}"))?;
    print_transaction(&txn);
    Ok(())
}

fn print_transaction(txn: &Transaction) {
    println!("  ID:         {}", txn.id);
    println!("  Tipo:       {}", txn.transaction_type);
    println!("  Valor:      {}", format_brl(txn.amount));
    println!("  Descrição:  {}", txn.description);
    println!("  Data:       {}", format_date(txn.date));
    println!(
        "  Categoria:  {}",
        txn.category_name.as_deref().unwrap_or("-")
    );
}

// ── Categories ────────────────────────────────────────────────

fn cli_categories(db: &mut Database, config: &Config) -> Result<()> {
    let user = current_user(db, config)?;
    let categories = db.get_categories(&user)?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }
    println!("{:<6} {:<30} Tipo", "ID", "Nome");
    println!("{}", "─".repeat(50));
    for cat in &categories {
        let origin = if cat.is_custom { "personalizada" } else { "padrão" };
        println!("{:<6} {} {origin}", cat.id, column(&cat.name, 30));
    }
    Ok(())
}

fn cli_category(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    const USAGE: &str = "saldo category <add|rename|delete> ...";
    let user = current_user(db, config)?;
    let fields = positionals(args);
    match fields.first().copied() {
        Some("add") => {
            let name = fields[1..].join(" ");
            let cat = db.create_category(&user, &name)?;
            println!("Created category {} ({})", cat.name, cat.id);
        }
        Some("rename") => {
            let id = parse_id(fields.get(1).copied(), "saldo category rename <id> <name>")?;
            let name = fields.get(2..).map(|n| n.join(" ")).unwrap_or_default();
            let cat = db
                .rename_category(&user, id, &name)
                .with_context(|| format!("Category {id}"))?;
            println!("Renamed category {} to {}", cat.id, cat.name);
        }
        Some("delete") | Some("rm") => {
            let id = parse_id(fields.get(1).copied(), "saldo category delete <id>")?;
            db.delete_category(&user, id)
                .with_context(|| format!("Category {id}"))?;
            println!("Deleted category {id}");
        }
        _ => anyhow::bail!("Usage: {USAGE}"),
    }
    Ok(())
}

// ── Users ─────────────────────────────────────────────────────

fn cli_user(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let fields = positionals(args);
    match fields.first().copied() {
        Some("sync") => {
            let path = fields
                .get(1)
                .context("Usage: saldo user sync <event.json>")?;
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path}"))?;
            let event = identity::parse_event(&json)
                .with_context(|| format!("{path} is not a valid identity event"))?;
            let outcome = identity::apply_event(db, &event)?;
            println!("{outcome}");
        }
        Some("show") => {
            let user = current_user(db, config)?;
            println!("  Nome:       {}", user.display_name());
            println!("  Email:      {}", user.email);
            println!("  ID:         {}", user.external_id);
            println!("  Desde:      {}", user.created_at);
            println!("  Transações: {}", db.get_transaction_count(&user)?);
        }
        _ => anyhow::bail!("Usage: saldo user <sync|show> ..."),
    }
    Ok(())
}
