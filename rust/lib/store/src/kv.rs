//! KvModel trait + KvOps CRUD operations.

use std::marker::PhantomData;
use std::sync::Arc;

use pizza_core::ServiceError;
use pizza_kv::{KVError, KVStore};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Trait implemented by models to declare KV storage behavior.
///
/// Records are keyed by a numeric id, zero-padded so that a prefix scan
/// returns them in allocation order. Hooks have default no-op impls.
pub trait KvModel: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource name, used for the id sequence and in error messages.
    const RESOURCE: &'static str;

    /// KV key prefix: "{module}:{resource}:".
    fn kv_prefix() -> &'static str;

    /// The record's id. Zero means "not yet assigned".
    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    /// Called before inserting a new record, after the id is assigned.
    fn before_create(&mut self) {}

    /// Called before overwriting an existing record.
    fn before_update(&mut self) {}
}

/// Map a KV backend failure onto the service error taxonomy.
pub fn storage_error(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// CRUD operations for a KvModel. Holds a reference to the KV backend.
pub struct KvOps<T: KvModel> {
    kv: Arc<dyn KVStore>,
    _phantom: PhantomData<T>,
}

impl<T: KvModel> Clone for KvOps<T> {
    fn clone(&self) -> Self {
        Self::new(self.kv.clone())
    }
}

impl<T: KvModel> KvOps<T> {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            _phantom: PhantomData,
        }
    }

    fn make_key(id: u64) -> String {
        format!("{}{:020}", T::kv_prefix(), id)
    }

    /// Get a record by id. Returns None if not found.
    pub fn get(&self, id: u64) -> Result<Option<T>, ServiceError> {
        let key = Self::make_key(id);
        match self.kv.get(&key).map_err(storage_error)? {
            Some(bytes) => {
                let record: T = serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Get a record or return NotFound error.
    pub fn get_or_err(&self, id: u64) -> Result<T, ServiceError> {
        self.get(id)?.ok_or_else(|| {
            ServiceError::NotFound(format!("{} {} not found", T::RESOURCE, id))
        })
    }

    /// List all records in id order.
    pub fn list(&self) -> Result<Vec<T>, ServiceError> {
        let entries = self.kv.scan(T::kv_prefix()).map_err(storage_error)?;
        let mut records = Vec::with_capacity(entries.len());
        for (_key, bytes) in entries {
            let record: T = serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))?;
            records.push(record);
        }
        Ok(records)
    }

    /// List records matching a predicate, in id order.
    pub fn list_where(&self, pred: impl Fn(&T) -> bool) -> Result<Vec<T>, ServiceError> {
        Ok(self.list()?.into_iter().filter(|r| pred(r)).collect())
    }

    /// Create a new record. Allocates an id when none is set, then calls
    /// the before_create hook.
    pub fn save_new(&self, mut record: T) -> Result<T, ServiceError> {
        if record.id() == 0 {
            let id = self.kv.next_sequence(T::RESOURCE).map_err(storage_error)?;
            record.set_id(id);
        }
        record.before_create();

        let key = Self::make_key(record.id());
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))?;
        if !self.kv.set_if_absent(&key, &bytes).map_err(storage_error)? {
            return Err(ServiceError::Conflict(format!(
                "{} {} already exists",
                T::RESOURCE,
                record.id()
            )));
        }
        debug!("created {} {}", T::RESOURCE, record.id());

        Ok(record)
    }

    /// Update an existing record. Calls before_update hook.
    pub fn save(&self, mut record: T) -> Result<T, ServiceError> {
        record.before_update();

        let key = Self::make_key(record.id());
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))?;
        self.kv.set(&key, &bytes).map_err(storage_error)?;

        Ok(record)
    }

    /// Delete a record by id. Missing records are NotFound.
    pub fn delete(&self, id: u64) -> Result<(), ServiceError> {
        self.get_or_err(id)?;
        self.kv.delete(&Self::make_key(id)).map_err(storage_error)?;
        debug!("deleted {} {}", T::RESOURCE, id);
        Ok(())
    }
}
