//! Core ledger engine.
//!
//! Owns the in-memory transaction and debt collections of one session and
//! derives every read-side view from them. Mutations go to the record store
//! first; the in-memory collections only change once the store has accepted
//! the write, so memory never runs ahead of durable state.

use crate::command::{Action, Change};
use crate::config::LedgerConfig;
use crate::debt::{Debt, DebtStatus};
use crate::error::{LedgerError, Result};
use crate::money::Money;
use crate::record::{RecordId, RecordKind};
use crate::session::Session;
use crate::store::{DebtPatch, RecordStore};
use crate::transaction::{ensure_valid_amount, HistoryFilter, Transaction, TxType};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::io::Write;

type Clock = Box<dyn Fn() -> DateTime<Utc>>;
type Subscriber = Box<dyn FnMut(&Change)>;

/// Income and expense totals for the current month so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonthlyStats {
    pub income: Money,
    pub expense: Money,
}

impl MonthlyStats {
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

/// Everything the summary screen shows, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub balance: Money,
    pub monthly: MonthlyStats,
    pub total_debt: Money,
    pub recent: Vec<Transaction>,
    pub urgent: Vec<Debt>,
}

/// The ledger engine for one signed-in user.
///
/// # Ordering
///
/// Views sorted by a timestamp break ties by ascending record id, so output
/// is deterministic even when records share a timestamp.
pub struct Ledger<S: RecordStore> {
    session: Session,
    store: S,
    config: LedgerConfig,

    /// Transactions in insertion order.
    transactions: Vec<Transaction>,

    /// Debts in insertion order.
    debts: Vec<Debt>,

    clock: Clock,
    subscribers: Vec<Subscriber>,
}

impl<S: RecordStore> Ledger<S> {
    /// Opens the ledger of `session`'s user, loading its records from `store`.
    pub fn open(session: Session, mut store: S, config: LedgerConfig) -> Result<Self> {
        let snapshot = store.load_all(session.user_id())?;
        info!(
            "Loaded {} transactions and {} debts for {}",
            snapshot.transactions.len(),
            snapshot.debts.len(),
            session.user_id()
        );

        Ok(Ledger {
            session,
            store,
            config,
            transactions: snapshot.transactions,
            debts: snapshot.debts,
            clock: Box::new(Utc::now),
            subscribers: Vec::new(),
        })
    }

    /// Replaces the wall clock used to stamp new records.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Ends the session and hands the store back.
    pub fn logout(self) -> S {
        info!("Closing ledger for {}", self.session.user_id());
        self.store
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All transactions in the order they were recorded.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// All debts in the order they were recorded.
    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    /// Registers a listener called after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&Change) + 'static) {
        self.subscribers.push(Box::new(listener));
    }

    fn notify(&mut self, change: Change) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&change);
        }
    }

    // ==================== COMMANDS ====================

    /// Runs a user action, validating any raw form input first.
    pub fn dispatch(&mut self, action: Action) -> Result<Change> {
        match action {
            Action::AddTransaction(form) => {
                let new = form.parse()?;
                let tx = self.add_transaction(new.tx_type, new.amount, new.category, new.note)?;
                Ok(Change::TransactionAdded(tx.id))
            }
            Action::DeleteTransaction(id) => {
                self.delete_transaction(id)?;
                Ok(Change::TransactionDeleted(id))
            }
            Action::AddDebt(form) => {
                let new = form.parse()?;
                let debt = self.add_debt(new.name, new.amount, new.deadline, new.note)?;
                Ok(Change::DebtAdded(debt.id))
            }
            Action::DeleteDebt(id) => {
                self.delete_debt(id)?;
                Ok(Change::DebtDeleted(id))
            }
            Action::MarkDebtPaid(id) => {
                self.mark_debt_paid(id)?;
                Ok(Change::DebtPaid(id))
            }
            Action::ResetAll => {
                self.reset_all()?;
                Ok(Change::Reset)
            }
        }
    }

    /// Records a new income or expense.
    ///
    /// Fails with [`LedgerError::Validation`] unless `0 < amount <= Money::MAX_AMOUNT`.
    pub fn add_transaction(
        &mut self,
        tx_type: TxType,
        amount: Money,
        category: impl Into<String>,
        note: Option<String>,
    ) -> Result<Transaction> {
        ensure_valid_amount(amount)?;

        let tx = Transaction {
            id: RecordId::generate(),
            tx_type,
            amount,
            category: category.into(),
            note,
            created_at: (self.clock)(),
        };

        let stored = self
            .store
            .append_transaction(self.session.user_id(), &tx)
            .map_err(|e| {
                warn!("Failed to store transaction {}: {}", tx.id, e);
                e
            })?;
        self.transactions.push(stored.clone());

        debug!("Added {} of {} ({})", stored.tx_type, stored.amount, stored.id);
        self.notify(Change::TransactionAdded(stored.id));
        Ok(stored)
    }

    /// Permanently removes a transaction.
    pub fn delete_transaction(&mut self, id: RecordId) -> Result<()> {
        let index = self
            .transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or(LedgerError::NotFound {
                kind: RecordKind::Transaction,
                id,
            })?;

        self.store.remove_transaction(self.session.user_id(), id)?;
        self.transactions.remove(index);

        debug!("Deleted transaction {}", id);
        self.notify(Change::TransactionDeleted(id));
        Ok(())
    }

    /// Records a new pending debt.
    ///
    /// Fails with [`LedgerError::Validation`] if `name` is blank or
    /// `amount` is outside `(0, Money::MAX_AMOUNT]`.
    pub fn add_debt(
        &mut self,
        name: impl Into<String>,
        amount: Money,
        deadline: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<Debt> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("debt name is required"));
        }
        ensure_valid_amount(amount)?;

        let debt = Debt {
            id: RecordId::generate(),
            name,
            amount,
            deadline,
            note,
            status: DebtStatus::Pending,
            created_at: (self.clock)(),
            paid_at: None,
        };

        let stored = self.store.append_debt(self.session.user_id(), &debt)?;
        self.debts.push(stored.clone());

        debug!("Added debt '{}' of {} due {}", stored.name, stored.amount, stored.deadline);
        self.notify(Change::DebtAdded(stored.id));
        Ok(stored)
    }

    /// Permanently removes a debt, paid or not.
    pub fn delete_debt(&mut self, id: RecordId) -> Result<()> {
        let index = self
            .debts
            .iter()
            .position(|debt| debt.id == id)
            .ok_or(LedgerError::NotFound {
                kind: RecordKind::Debt,
                id,
            })?;

        self.store.remove_debt(self.session.user_id(), id)?;
        self.debts.remove(index);

        debug!("Deleted debt {}", id);
        self.notify(Change::DebtDeleted(id));
        Ok(())
    }

    /// Settles a pending debt.
    ///
    /// Fails with [`LedgerError::NotFound`] if there is no *pending* debt
    /// with this id, which makes a second call on the same debt an error
    /// rather than a double settlement.
    pub fn mark_debt_paid(&mut self, id: RecordId) -> Result<Debt> {
        let index = self
            .debts
            .iter()
            .position(|debt| debt.id == id && debt.is_pending())
            .ok_or(LedgerError::NotFound {
                kind: RecordKind::Debt,
                id,
            })?;

        let patch = DebtPatch::paid((self.clock)());
        let updated = self.store.update_debt(self.session.user_id(), id, &patch)?;
        self.debts[index] = updated.clone();

        debug!("Debt '{}' ({}) marked paid", updated.name, id);
        self.notify(Change::DebtPaid(id));
        Ok(updated)
    }

    /// Deletes every transaction and debt of the session's user.
    pub fn reset_all(&mut self) -> Result<()> {
        self.store.reset_all(self.session.user_id())?;

        info!(
            "Reset ledger for {}: dropped {} transactions and {} debts",
            self.session.user_id(),
            self.transactions.len(),
            self.debts.len()
        );
        self.transactions.clear();
        self.debts.clear();

        self.notify(Change::Reset);
        Ok(())
    }

    // ==================== QUERIES ====================

    /// Sum of all income minus sum of all expenses.
    pub fn balance(&self) -> Money {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    /// Income and expense since the first instant (UTC) of `reference`'s
    /// calendar month. There is no upper bound.
    pub fn monthly_stats(&self, reference: DateTime<Utc>) -> MonthlyStats {
        let start = month_start(reference);

        self.transactions
            .iter()
            .filter(|tx| tx.created_at >= start)
            .fold(MonthlyStats::default(), |mut stats, tx| {
                match tx.tx_type {
                    TxType::Income => stats.income += tx.amount,
                    TxType::Expense => stats.expense += tx.amount,
                }
                stats
            })
    }

    /// The `n` most recently created transactions, newest first.
    pub fn recent_transactions(&self, n: usize) -> Vec<&Transaction> {
        let mut recent = self.filtered_history(HistoryFilter::All);
        recent.truncate(n);
        recent
    }

    /// Pending debts due on or before `reference + horizon_days`, soonest
    /// first, at most `n`. Overdue debts are included. A horizon reaching
    /// past the last representable instant has no upper bound.
    pub fn urgent_debts(&self, reference: DateTime<Utc>, horizon_days: u32, n: usize) -> Vec<&Debt> {
        let cutoff = reference
            .checked_add_signed(Duration::days(i64::from(horizon_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut urgent: Vec<&Debt> = self
            .debts
            .iter()
            .filter(|debt| debt.is_pending() && debt.deadline <= cutoff)
            .collect();
        urgent.sort_by(|a, b| by_deadline(a, b));
        urgent.truncate(n);
        urgent
    }

    /// Sum of the amounts of every pending debt.
    pub fn total_outstanding_debt(&self) -> Money {
        self.debts
            .iter()
            .filter(|debt| debt.is_pending())
            .map(|debt| debt.amount)
            .sum()
    }

    /// Transactions matching `filter`, newest first.
    pub fn filtered_history(&self, filter: HistoryFilter) -> Vec<&Transaction> {
        let mut history: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .collect();
        history.sort_by(|a, b| newest_first(a, b));
        history
    }

    /// Every debt, soonest deadline first.
    pub fn debts_by_deadline(&self) -> Vec<&Debt> {
        let mut debts: Vec<&Debt> = self.debts.iter().collect();
        debts.sort_by(|a, b| by_deadline(a, b));
        debts
    }

    /// Debts that are pending and past their deadline at `reference`.
    pub fn overdue_debts(&self, reference: DateTime<Utc>) -> Vec<&Debt> {
        self.debts_by_deadline()
            .into_iter()
            .filter(|debt| debt.is_overdue(reference))
            .collect()
    }

    /// The summary screen, using the configured limits.
    pub fn dashboard(&self, reference: DateTime<Utc>) -> Dashboard {
        Dashboard {
            balance: self.balance(),
            monthly: self.monthly_stats(reference),
            total_debt: self.total_outstanding_debt(),
            recent: self
                .recent_transactions(self.config.recent_limit)
                .into_iter()
                .cloned()
                .collect(),
            urgent: self
                .urgent_debts(
                    reference,
                    self.config.urgent_horizon_days,
                    self.config.urgent_limit,
                )
                .into_iter()
                .cloned()
                .collect(),
        }
    }

    /// Writes the filtered history as CSV, newest first.
    pub fn export_history<W: Write>(&self, filter: HistoryFilter, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "type", "amount", "category", "note", "created_at"])?;

        for tx in self.filtered_history(filter) {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.tx_type.to_string(),
                tx.amount.to_string(),
                tx.category.clone(),
                tx.note.clone().unwrap_or_default(),
                tx.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// First instant of `reference`'s calendar month, in UTC.
fn month_start(reference: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(reference.year(), reference.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(reference)
}

fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

fn by_deadline(a: &Debt, b: &Debt) -> Ordering {
    a.deadline.cmp(&b.deadline).then_with(|| a.id.cmp(&b.id))
}
