use anyhow::{Context, Result};
use std::path::Path;

use expensetrack::aggregate;
use expensetrack::config::Config;
use expensetrack::csv_io::{self, CsvImporter};
use expensetrack::db::Database;
use expensetrack::models::{ExpenseFilter, Period};

pub(crate) fn as_cli(args: &[String], config: &Config) -> Result<()> {
    match args[1].as_str() {
        "import" => cli_import(&args[2..], config),
        "export" => cli_export(&args[2..], config),
        "summary" | "s" => cli_summary(&args[2..], config),
        "categories" => cli_categories(config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("expensetrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("expensetrack: local-only personal expense tracker");
    println!();
    println!("Usage: expensetrack [command]");
    println!();
    println!("Commands:");
    println!("  (none), serve                 Serve the HTTP API");
    println!("  import <file.csv>             Import expenses from a CSV file");
    println!("  export [path]                 Export expenses to CSV");
    println!("    --month <YYYY-MM>           Only this month");
    println!("    --category <name>           Only this category");
    println!("  summary [YYYY-MM]             Print budget vs. actual for a month");
    println!("  categories                    List all categories");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn open_db(config: &Config) -> Result<Database> {
    Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn cli_import(args: &[String], config: &Config) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: expensetrack import <file.csv>");
    };
    let file_path = shellexpand(file_path);
    let path = Path::new(&file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let expenses = CsvImporter::read_path(path)?;
    println!("Parsed {} expenses", expenses.len());

    let mut db = open_db(config)?;
    let count = db.insert_expenses_batch(&expenses)?;
    println!("Imported {count} expenses");
    Ok(())
}

fn cli_export(args: &[String], config: &Config) -> Result<()> {
    let month: Option<Period> = flag(args, "--month")
        .map(str::parse::<Period>)
        .transpose()?;
    let category = flag(args, "--category");

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            match month {
                Some(m) => format!("{home}/expenses-{m}.csv"),
                None => format!("{home}/expenses.csv"),
            }
        });

    let filter = ExpenseFilter {
        month,
        category: category.map(str::to_string),
        ..ExpenseFilter::default()
    };
    let db = open_db(config)?;
    let expenses = db.get_expenses(&filter)?;
    if expenses.is_empty() {
        println!("No expenses to export");
        return Ok(());
    }
    let count = csv_io::export_to_path(Path::new(&output_path), &expenses)?;
    println!("Exported {count} expenses to {output_path}");
    Ok(())
}

fn cli_summary(args: &[String], config: &Config) -> Result<()> {
    let period = match args.first().filter(|a| !a.starts_with('-')) {
        Some(raw) => raw.parse::<Period>()?,
        None => Period::current(),
    };

    let db = open_db(config)?;
    let summary = aggregate::load_period_summary(&db, period, &config.thresholds)?;

    println!("expensetrack: {period}");
    println!("{}", "─".repeat(40));
    println!("  Spent:      ${:.2}", summary.total_spent);
    println!("  Budgeted:   ${:.2}", summary.total_budgeted);
    println!("  Remaining:  ${:.2}", summary.remaining);
    if let Some(pct) = summary.percent_used {
        println!("  Used:       {pct}%");
    }

    if !summary.categories.is_empty() {
        println!();
        println!(
            "{:<20} {:>10} {:>10} {:>10}  Status",
            "Category", "Spent", "Limit", "Delta"
        );
        for c in &summary.categories {
            let limit = c.limit.map(|l| format!("{l:.2}")).unwrap_or_else(|| "-".into());
            let delta = c.delta.map(|d| format!("{d:+.2}")).unwrap_or_else(|| "-".into());
            println!(
                "{:<20} {:>10.2} {:>10} {:>10}  {}",
                c.category, c.spent, limit, delta, c.status
            );
        }
    }

    let alerts = summary.alerts();
    if !alerts.is_empty() {
        println!();
        println!("Alerts:");
        for c in alerts {
            println!("  {} is {}", c.category, c.status);
        }
    }
    Ok(())
}

fn cli_categories(config: &Config) -> Result<()> {
    let db = open_db(config)?;
    let categories = db.get_categories()?;
    if categories.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!("{:<4} Name", "ID");
    println!("{}", "─".repeat(30));
    for cat in &categories {
        println!("{:<4} {}", cat.id.unwrap_or(0), cat.name);
    }
    Ok(())
}

fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
