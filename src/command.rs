//! Commands a presentation layer sends to the engine, and the change
//! notifications it gets back.

use crate::debt::DebtForm;
use crate::record::RecordId;
use crate::transaction::TransactionForm;

/// A user action, still carrying raw form input where there is any.
#[derive(Debug, Clone)]
pub enum Action {
    AddTransaction(TransactionForm),
    DeleteTransaction(RecordId),
    AddDebt(DebtForm),
    DeleteDebt(RecordId),
    MarkDebtPaid(RecordId),
    ResetAll,
}

/// What a successful mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    TransactionAdded(RecordId),
    TransactionDeleted(RecordId),
    DebtAdded(RecordId),
    DebtDeleted(RecordId),
    DebtPaid(RecordId),
    Reset,
}

impl Change {
    /// Id of the record the change touched, if it touched exactly one.
    pub fn record_id(&self) -> Option<RecordId> {
        match *self {
            Change::TransactionAdded(id)
            | Change::TransactionDeleted(id)
            | Change::DebtAdded(id)
            | Change::DebtDeleted(id)
            | Change::DebtPaid(id) => Some(id),
            Change::Reset => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id() {
        let id = RecordId::generate();
        assert_eq!(Change::DebtPaid(id).record_id(), Some(id));
        assert_eq!(Change::TransactionDeleted(id).record_id(), Some(id));
        assert_eq!(Change::Reset.record_id(), None);
    }
}
