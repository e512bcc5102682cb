//! # Ledger Engine
//!
//! A single-user personal finance ledger: income and expense transactions,
//! debts with deadlines, and the balances and rankings derived from them.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: amounts are 2-decimal `rust_decimal` values
//! - **Injected persistence**: the engine talks to a [`RecordStore`], never
//!   to a concrete backend
//! - **Store first**: a mutation only lands in memory after the store
//!   accepted it
//! - **Deterministic views**: timestamp ties are broken by record id
//!
//! ## Example
//!
//! ```
//! use ledger_engine::{Ledger, LedgerConfig, MemoryStore, Money, Session, TxType};
//!
//! let mut ledger = Ledger::open(Session::anonymous(), MemoryStore::new(), LedgerConfig::default()).unwrap();
//! ledger.add_transaction(TxType::Income, Money::from_units(50_000), "gaji", None).unwrap();
//! ledger.add_transaction(TxType::Expense, Money::from_units(20_000), "makan", None).unwrap();
//! assert_eq!(ledger.balance(), Money::from_units(30_000));
//! ```

pub mod command;
pub mod config;
pub mod debt;
pub mod engine;
pub mod error;
pub mod money;
pub mod record;
pub mod session;
pub mod store;
pub mod transaction;

pub use command::{Action, Change};
pub use config::LedgerConfig;
pub use debt::{days_until, Debt, DebtForm, DebtStanding, DebtStatus, NewDebt};
pub use engine::{Dashboard, Ledger, MonthlyStats};
pub use error::{LedgerError, Result, StoreError, StoreResult};
pub use money::Money;
pub use record::{RecordId, RecordKind};
pub use session::{Session, SessionFile, UserId};
pub use store::{DebtPatch, JsonFileStore, MemoryStore, RecordStore, Snapshot};
pub use transaction::{HistoryFilter, NewTransaction, Transaction, TransactionForm, TxType};
