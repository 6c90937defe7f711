use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("seq");

fn storage_err(e: impl std::fmt::Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust
/// embedded key-value database. Writes are serialized by redb, so each
/// write transaction is atomic with respect to every other writer.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage_err)?;

        // Ensure both tables exist by doing a write transaction.
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage_err)?;
            let _seq = write_txn.open_table(SEQUENCES).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        debug!("opened redb store at {}", path.display());

        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let inserted = {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            let exists = table.get(key).map_err(storage_err)?.is_some();
            if !exists {
                table.insert(key, value).map_err(storage_err)?;
            }
            !exists
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(inserted)
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage_err)?;
            table.remove(key).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(TABLE).map_err(storage_err)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage_err)?;

        for entry in iter {
            let entry = entry.map_err(storage_err)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }

    fn next_sequence(&self, name: &str) -> Result<u64, KVError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let next = {
            let mut table = write_txn.open_table(SEQUENCES).map_err(storage_err)?;
            let current = table
                .get(name)
                .map_err(storage_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            let next = current + 1;
            table.insert(name, next).map_err(storage_err)?;
            next
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(next)
    }
}
