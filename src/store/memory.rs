use super::{DebtPatch, RecordStore, Snapshot};
use crate::debt::Debt;
use crate::error::StoreResult;
use crate::record::RecordId;
use crate::session::UserId;
use crate::transaction::Transaction;
use std::collections::HashMap;

/// Process-local store. Nothing survives the process; useful for tests and
/// for embedding the engine where persistence is handled elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: HashMap<UserId, Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn user_mut(&mut self, user: &UserId) -> &mut Snapshot {
        self.users.entry(user.clone()).or_default()
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&mut self, user: &UserId) -> StoreResult<Snapshot> {
        Ok(self.users.get(user).cloned().unwrap_or_default())
    }

    fn append_transaction(&mut self, user: &UserId, tx: &Transaction) -> StoreResult<Transaction> {
        self.user_mut(user).transactions.push(tx.clone());
        Ok(tx.clone())
    }

    fn append_debt(&mut self, user: &UserId, debt: &Debt) -> StoreResult<Debt> {
        self.user_mut(user).debts.push(debt.clone());
        Ok(debt.clone())
    }

    fn update_debt(&mut self, user: &UserId, id: RecordId, patch: &DebtPatch) -> StoreResult<Debt> {
        self.user_mut(user).update_debt(id, patch)
    }

    fn remove_transaction(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        self.user_mut(user).remove_transaction(id)
    }

    fn remove_debt(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        self.user_mut(user).remove_debt(id)
    }

    fn reset_all(&mut self, user: &UserId) -> StoreResult<()> {
        self.users.remove(user);
        Ok(())
    }
}
