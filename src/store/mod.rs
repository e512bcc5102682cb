//! Durable persistence boundary for transactions and debts.
//!
//! The engine only talks to the [`RecordStore`] trait, so backends can be
//! swapped without touching ledger logic. Every call is scoped to one user.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::debt::{Debt, DebtStatus};
use crate::error::{StoreError, StoreResult};
use crate::record::{RecordId, RecordKind};
use crate::session::UserId;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Both record collections of one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub debts: Vec<Debt>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.debts.is_empty()
    }

    pub(crate) fn remove_transaction(&mut self, id: RecordId) -> StoreResult<()> {
        let before = self.transactions.len();
        self.transactions.retain(|tx| tx.id != id);
        if self.transactions.len() == before {
            return Err(StoreError::MissingRecord {
                kind: RecordKind::Transaction,
                id,
            });
        }
        Ok(())
    }

    pub(crate) fn remove_debt(&mut self, id: RecordId) -> StoreResult<()> {
        let before = self.debts.len();
        self.debts.retain(|debt| debt.id != id);
        if self.debts.len() == before {
            return Err(StoreError::MissingRecord {
                kind: RecordKind::Debt,
                id,
            });
        }
        Ok(())
    }

    pub(crate) fn update_debt(&mut self, id: RecordId, patch: &DebtPatch) -> StoreResult<Debt> {
        let debt = self
            .debts
            .iter_mut()
            .find(|debt| debt.id == id)
            .ok_or(StoreError::MissingRecord {
                kind: RecordKind::Debt,
                id,
            })?;
        patch.apply(debt);
        Ok(debt.clone())
    }
}

/// Partial update of a stored debt. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtPatch {
    pub status: Option<DebtStatus>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl DebtPatch {
    /// The patch that settles a debt at `at`.
    pub fn paid(at: DateTime<Utc>) -> Self {
        DebtPatch {
            status: Some(DebtStatus::Paid),
            paid_at: Some(at),
        }
    }

    pub fn apply(&self, debt: &mut Debt) {
        if let Some(status) = self.status {
            debt.status = status;
        }
        if let Some(paid_at) = self.paid_at {
            debt.paid_at = Some(paid_at);
        }
    }
}

/// Storage contract consumed by the ledger engine.
///
/// Implementations must not report success before the change is durable
/// for their medium.
pub trait RecordStore {
    /// Loads every record of `user`. Unknown users load as empty.
    fn load_all(&mut self, user: &UserId) -> StoreResult<Snapshot>;

    fn append_transaction(&mut self, user: &UserId, tx: &Transaction) -> StoreResult<Transaction>;

    fn append_debt(&mut self, user: &UserId, debt: &Debt) -> StoreResult<Debt>;

    /// Applies `patch` to the stored debt and returns the updated record.
    fn update_debt(&mut self, user: &UserId, id: RecordId, patch: &DebtPatch) -> StoreResult<Debt>;

    fn remove_transaction(&mut self, user: &UserId, id: RecordId) -> StoreResult<()>;

    fn remove_debt(&mut self, user: &UserId, id: RecordId) -> StoreResult<()>;

    /// Deletes every record of `user`.
    fn reset_all(&mut self, user: &UserId) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load_all(&mut self, user: &UserId) -> StoreResult<Snapshot> {
        (**self).load_all(user)
    }

    fn append_transaction(&mut self, user: &UserId, tx: &Transaction) -> StoreResult<Transaction> {
        (**self).append_transaction(user, tx)
    }

    fn append_debt(&mut self, user: &UserId, debt: &Debt) -> StoreResult<Debt> {
        (**self).append_debt(user, debt)
    }

    fn update_debt(&mut self, user: &UserId, id: RecordId, patch: &DebtPatch) -> StoreResult<Debt> {
        (**self).update_debt(user, id, patch)
    }

    fn remove_transaction(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        (**self).remove_transaction(user, id)
    }

    fn remove_debt(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        (**self).remove_debt(user, id)
    }

    fn reset_all(&mut self, user: &UserId) -> StoreResult<()> {
        (**self).reset_all(user)
    }
}
