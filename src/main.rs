//! Ledger CLI
//!
//! Command-line front end for the ledger engine. Records live in one JSON
//! document per user under the data directory.
//!
//! # Usage
//!
//! ```bash
//! ledger login
//! ledger add-transaction --type income --amount 50000 --category gaji
//! ledger dashboard
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `LEDGER_DATA_DIR`: Where records and the session are kept
//! - `LEDGER_URGENT_DAYS`, `LEDGER_URGENT_LIMIT`, `LEDGER_RECENT_LIMIT`:
//!   Dashboard limits

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use ledger_engine::{
    Action, DebtForm, HistoryFilter, JsonFileStore, Ledger, LedgerConfig, LedgerError, RecordId,
    Result, SessionFile, TransactionForm,
};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Track income, expenses and debts")]
struct Cli {
    /// Directory holding ledger documents and the session
    #[arg(long, global = true, env = "LEDGER_DATA_DIR", default_value = "ledger-data")]
    data_dir: PathBuf,

    #[command(flatten)]
    limits: Limits,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Limits {
    /// Days ahead a pending debt counts as urgent
    #[arg(long, global = true, env = "LEDGER_URGENT_DAYS", default_value_t = LedgerConfig::DEFAULT_URGENT_HORIZON_DAYS)]
    urgent_days: u32,

    /// Urgent debts shown on the dashboard
    #[arg(long, global = true, env = "LEDGER_URGENT_LIMIT", default_value_t = LedgerConfig::DEFAULT_URGENT_LIMIT)]
    urgent_limit: usize,

    /// Recent transactions shown on the dashboard
    #[arg(long, global = true, env = "LEDGER_RECENT_LIMIT", default_value_t = LedgerConfig::DEFAULT_RECENT_LIMIT)]
    recent_limit: usize,
}

impl From<&Limits> for LedgerConfig {
    fn from(limits: &Limits) -> Self {
        LedgerConfig {
            urgent_horizon_days: limits.urgent_days,
            urgent_limit: limits.urgent_limit,
            recent_limit: limits.recent_limit,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in anonymously (keeps the current session if there is one)
    Login,
    /// Sign out; records stay on disk
    Logout,
    /// Show the signed-in user id
    Whoami,
    /// Record an income or expense
    AddTransaction(TransactionArgs),
    /// Delete a transaction
    DeleteTransaction { id: RecordId },
    /// Record a debt
    AddDebt(DebtArgs),
    /// Mark a pending debt as paid
    PayDebt { id: RecordId },
    /// Delete a debt
    DeleteDebt { id: RecordId },
    /// Balance, monthly totals, recent transactions and urgent debts
    Dashboard,
    /// Transactions, newest first
    History {
        /// all, income or expense
        #[arg(long, default_value = "all")]
        filter: String,

        /// Write CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Every debt, soonest deadline first
    Debts,
    /// Delete every transaction and debt
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct TransactionArgs {
    /// income or expense
    #[arg(long = "type")]
    tx_type: String,
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    note: String,
}

#[derive(Args, Debug)]
struct DebtArgs {
    #[arg(long)]
    name: String,
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    deadline: String,
    #[arg(long, default_value = "")]
    note: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let sessions = SessionFile::in_dir(&cli.data_dir);

    match cli.command {
        Command::Login => {
            let session = sessions.load_or_login()?;
            println!("Signed in as {}", session.user_id());
            return Ok(());
        }
        Command::Logout => {
            if sessions.clear()? {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
            return Ok(());
        }
        _ => {}
    }

    let session = sessions.load()?.ok_or(LedgerError::NoSession)?;
    let store = JsonFileStore::new(&cli.data_dir);
    let mut ledger = Ledger::open(session, store, LedgerConfig::from(&cli.limits))?;

    match cli.command {
        Command::Login | Command::Logout => {}
        Command::Whoami => println!("{}", ledger.session().user_id()),
        Command::AddTransaction(args) => {
            let change = ledger.dispatch(Action::AddTransaction(TransactionForm {
                tx_type: args.tx_type,
                amount: args.amount,
                category: args.category,
                note: args.note,
            }))?;
            print_record_id("Added transaction", change.record_id());
        }
        Command::DeleteTransaction { id } => {
            ledger.dispatch(Action::DeleteTransaction(id))?;
            println!("Deleted transaction {}", id);
        }
        Command::AddDebt(args) => {
            let change = ledger.dispatch(Action::AddDebt(DebtForm {
                name: args.name,
                amount: args.amount,
                deadline: args.deadline,
                note: args.note,
            }))?;
            print_record_id("Added debt", change.record_id());
        }
        Command::PayDebt { id } => {
            ledger.dispatch(Action::MarkDebtPaid(id))?;
            println!("Debt {} marked paid", id);
        }
        Command::DeleteDebt { id } => {
            ledger.dispatch(Action::DeleteDebt(id))?;
            println!("Deleted debt {}", id);
        }
        Command::Dashboard => print_dashboard(&ledger),
        Command::History { filter, csv } => {
            let filter: HistoryFilter = filter.parse()?;
            if csv {
                let stdout = io::stdout();
                ledger.export_history(filter, stdout.lock())?;
            } else {
                print_history(&ledger, filter);
            }
        }
        Command::Debts => print_debts(&ledger),
        Command::Reset { yes } => {
            if !yes {
                return Err(LedgerError::Validation(
                    "reset deletes every transaction and debt; pass --yes to confirm".to_string(),
                ));
            }
            ledger.dispatch(Action::ResetAll)?;
            println!("All records deleted");
        }
    }

    Ok(())
}

fn print_record_id(label: &str, id: Option<RecordId>) {
    match id {
        Some(id) => println!("{} {}", label, id),
        None => println!("{}", label),
    }
}

fn signed(tx: &ledger_engine::Transaction) -> String {
    if tx.is_income() {
        format!("+{}", tx.amount.to_rupiah())
    } else {
        format!("-{}", tx.amount.to_rupiah())
    }
}

fn print_dashboard(ledger: &Ledger<JsonFileStore>) {
    let now = Utc::now();
    let dashboard = ledger.dashboard(now);

    println!("Balance: {}", dashboard.balance.to_rupiah());
    println!("Income this month: {}", dashboard.monthly.income.to_rupiah());
    println!("Expense this month: {}", dashboard.monthly.expense.to_rupiah());
    println!("Outstanding debt: {}", dashboard.total_debt.to_rupiah());

    println!();
    println!("Recent transactions:");
    if dashboard.recent.is_empty() {
        println!("  (none)");
    }
    for tx in &dashboard.recent {
        println!(
            "  {}  {}  {}",
            signed(tx),
            tx.category,
            tx.note.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("Urgent debts:");
    if dashboard.urgent.is_empty() {
        println!("  (none)");
    }
    for debt in &dashboard.urgent {
        println!(
            "  {}  {}  {}",
            debt.name,
            debt.amount.to_rupiah(),
            debt.standing(now)
        );
    }
}

fn print_history(ledger: &Ledger<JsonFileStore>, filter: HistoryFilter) {
    let history = ledger.filtered_history(filter);
    if history.is_empty() {
        println!("No transactions");
    }
    for tx in history {
        println!(
            "{}  {}  {}  {}  {}",
            tx.id,
            tx.created_at.format("%Y-%m-%d"),
            signed(tx),
            tx.category,
            tx.note.as_deref().unwrap_or("-")
        );
    }
}

fn print_debts(ledger: &Ledger<JsonFileStore>) {
    let now = Utc::now();
    let debts = ledger.debts_by_deadline();
    if debts.is_empty() {
        println!("No debts");
    }
    for debt in debts {
        println!(
            "{}  {}  {}  due {}  {}",
            debt.id,
            debt.name,
            debt.amount.to_rupiah(),
            debt.deadline.format("%Y-%m-%d"),
            debt.standing(now)
        );
    }
}
