use crate::error::KVError;

/// KVStore provides a byte-oriented key-value storage interface.
///
/// Keys follow a namespaced convention: `pizza:user:00000000000000000001`,
/// `pizza:user_email:a@jwt.com`, etc. Implementations must make
/// `next_sequence` and `set_if_absent` atomic with respect to concurrent
/// callers.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, overwriting any existing value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Set a key only if it is not present. Returns false if the key existed.
    fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Allocate the next value of the named sequence, starting at 1.
    fn next_sequence(&self, name: &str) -> Result<u64, KVError>;
}
