use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{EngineError, Ledger, LedgerRecord, compute_balance, format_money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "finpal_admin")]
#[command(about = "Admin utilities for Finpal (inspect and bootstrap ledgers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./finpal.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ledger(LedgerArgs),
}

#[derive(Args, Debug)]
struct LedgerArgs {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Create an empty ledger row for a user (no-op if present).
    Register(RegisterArgs),
    /// Print one user's ledger and balance.
    Show(ShowArgs),
    /// Print every ledger with its balance.
    List,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    user_id: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[arg(long)]
    user_id: String,
    /// Print the record as JSON.
    #[arg(long)]
    json: bool,
}

fn render(record: &LedgerRecord) -> String {
    let balance = compute_balance(record);
    let mut out = format!(
        "{} ({})\n  income:   {}\n",
        record.user_id,
        record.display_name,
        format_money(record.income)
    );
    for (idx, line) in record.expenses.iter().enumerate() {
        let category = line.category.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "  expense{}: {category} {}\n",
            idx + 1,
            format_money(line.amount)
        ));
    }
    out.push_str(&format!("  {balance}"));
    out
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let ledger = Ledger::builder().database(db).build()?;

    let Command::Ledger(LedgerArgs { command }) = cli.command;
    match command {
        LedgerCommand::Register(args) => {
            ledger.ensure_user(&args.user_id, &args.name).await?;
            println!("ledger ready: {}", args.user_id);
        }
        LedgerCommand::Show(args) => match ledger.record(&args.user_id).await {
            Ok(record) if args.json => println!("{}", serde_json::to_string_pretty(&record)?),
            Ok(record) => println!("{}", render(&record)),
            Err(EngineError::AbsentRecord(user_id)) => {
                eprintln!("no ledger for user {user_id}");
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
        LedgerCommand::List => {
            let records = ledger.records().await?;
            if records.is_empty() {
                println!("no ledgers");
            }
            for record in &records {
                println!("{}", render(record));
            }
        }
    }

    Ok(())
}
