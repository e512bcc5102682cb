use super::{DebtPatch, RecordStore, Snapshot};
use crate::debt::Debt;
use crate::error::StoreResult;
use crate::record::RecordId;
use crate::session::UserId;
use crate::transaction::Transaction;
use log::{debug, warn};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Keeps one JSON document per user under a data directory:
/// `<dir>/ledger-<user>.json` holding `{"transactions": [...], "debts": [...]}`.
///
/// Each write rewrites the whole document through a temporary file that is
/// renamed into place, so a crash mid-write leaves the previous version.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    /// Location of the document holding `user`'s records.
    ///
    /// ASCII letters, digits and `-` are kept; every other byte is written
    /// as `_` plus two hex digits, so distinct users never share a file.
    pub fn path_for(&self, user: &UserId) -> PathBuf {
        let mut encoded = String::with_capacity(user.as_str().len());
        for byte in user.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                encoded.push(char::from(byte));
            } else {
                encoded.push_str(&format!("_{:02x}", byte));
            }
        }
        self.dir.join(format!("ledger-{}.json", encoded))
    }

    fn read(&self, user: &UserId) -> StoreResult<Snapshot> {
        let path = self.path_for(user);
        match fs::read(&path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No ledger document at {}, starting empty", path.display());
                Ok(Snapshot::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, user: &UserId, snapshot: &Snapshot) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(user);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, snapshot)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            warn!("Failed to move {} into place: {}", tmp.display(), e);
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(
            "Wrote {} transactions and {} debts to {}",
            snapshot.transactions.len(),
            snapshot.debts.len(),
            path.display()
        );
        Ok(())
    }

    /// Read-modify-write cycle over one user's document.
    fn modify<T>(
        &mut self,
        user: &UserId,
        change: impl FnOnce(&mut Snapshot) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut snapshot = self.read(user)?;
        let out = change(&mut snapshot)?;
        self.write(user, &snapshot)?;
        Ok(out)
    }
}

impl RecordStore for JsonFileStore {
    fn load_all(&mut self, user: &UserId) -> StoreResult<Snapshot> {
        self.read(user)
    }

    fn append_transaction(&mut self, user: &UserId, tx: &Transaction) -> StoreResult<Transaction> {
        self.modify(user, |snapshot| {
            snapshot.transactions.push(tx.clone());
            Ok(tx.clone())
        })
    }

    fn append_debt(&mut self, user: &UserId, debt: &Debt) -> StoreResult<Debt> {
        self.modify(user, |snapshot| {
            snapshot.debts.push(debt.clone());
            Ok(debt.clone())
        })
    }

    fn update_debt(&mut self, user: &UserId, id: RecordId, patch: &DebtPatch) -> StoreResult<Debt> {
        self.modify(user, |snapshot| snapshot.update_debt(id, patch))
    }

    fn remove_transaction(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        self.modify(user, |snapshot| snapshot.remove_transaction(id))
    }

    fn remove_debt(&mut self, user: &UserId, id: RecordId) -> StoreResult<()> {
        self.modify(user, |snapshot| snapshot.remove_debt(id))
    }

    fn reset_all(&mut self, user: &UserId) -> StoreResult<()> {
        match fs::remove_file(self.path_for(user)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::DebtStatus;
    use crate::error::StoreError;
    use crate::money::Money;
    use crate::transaction::TxType;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            transactions: vec![
                Transaction {
                    id: RecordId::generate(),
                    tx_type: TxType::Income,
                    amount: Money::from_units(50_000),
                    category: "gaji".to_string(),
                    note: Some("oktober".to_string()),
                    created_at: at("2026-10-01T09:00:00Z"),
                },
                Transaction {
                    id: RecordId::generate(),
                    tx_type: TxType::Expense,
                    amount: "20000.75".parse().unwrap(),
                    category: "makan".to_string(),
                    note: None,
                    created_at: at("2026-10-02T12:30:00Z"),
                },
            ],
            debts: vec![Debt {
                id: RecordId::generate(),
                name: "pinjaman".to_string(),
                amount: Money::from_units(100_000),
                deadline: at("2026-10-19T00:00:00Z"),
                note: None,
                status: DebtStatus::Paid,
                created_at: at("2026-10-03T00:00:00Z"),
                paid_at: Some(at("2026-10-10T00:00:00Z")),
            }],
        }
    }

    #[test]
    fn test_missing_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        assert!(store.load_all(&UserId::new("nobody")).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId::new("anon-1");
        let expected = snapshot();

        let mut store = JsonFileStore::new(dir.path());
        for tx in &expected.transactions {
            store.append_transaction(&user, tx).unwrap();
        }
        for debt in &expected.debts {
            store.append_debt(&user, debt).unwrap();
        }

        let mut reopened = JsonFileStore::new(dir.path());
        assert_eq!(reopened.load_all(&user).unwrap(), expected);
    }

    #[test]
    fn test_remove_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId::new("anon-1");
        let data = snapshot();
        let mut store = JsonFileStore::new(dir.path());
        store.append_transaction(&user, &data.transactions[0]).unwrap();

        store.remove_transaction(&user, data.transactions[0].id).unwrap();
        assert!(matches!(
            store.remove_transaction(&user, data.transactions[0].id),
            Err(StoreError::MissingRecord { .. })
        ));

        store.append_debt(&user, &data.debts[0]).unwrap();
        store.reset_all(&user).unwrap();
        assert!(!store.path_for(&user).exists());
        assert!(store.load_all(&user).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId::new("anon-1");
        let mut store = JsonFileStore::new(dir.path());
        fs::write(store.path_for(&user), "{ not json").unwrap();

        assert!(matches!(store.load_all(&user), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_user_id_is_encoded_in_path() {
        let store = JsonFileStore::new("/data");
        assert_eq!(
            store.path_for(&UserId::new("anon-1f3a")),
            PathBuf::from("/data/ledger-anon-1f3a.json")
        );
        assert_eq!(
            store.path_for(&UserId::new("../evil/id")),
            PathBuf::from("/data/ledger-_2e_2e_2fevil_2fid.json")
        );
    }

    #[test]
    fn test_lookalike_user_ids_get_separate_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        let dotted = UserId::new("a.b");
        let underscored = UserId::new("a_b");
        assert_ne!(store.path_for(&dotted), store.path_for(&underscored));

        let data = snapshot();
        store.append_transaction(&dotted, &data.transactions[0]).unwrap();
        assert!(store.load_all(&underscored).unwrap().is_empty());
        assert_eq!(store.load_all(&dotted).unwrap().transactions.len(), 1);
    }
}
