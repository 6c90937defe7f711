//! KvModel implementations for pizza models, plus password helpers.

use pizza_core::now_rfc3339;
use pizza_store::KvModel;

use crate::model::*;

// ── Password helpers ──

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, String> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| e.to_string())
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::{PasswordHash, PasswordVerifier};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ── User ──

impl KvModel for UserRecord {
    const RESOURCE: &'static str = "user";

    fn kv_prefix() -> &'static str {
        "pizza:user:"
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn before_create(&mut self) {
        let now = now_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
    }

    fn before_update(&mut self) {
        self.updated_at = now_rfc3339();
    }
}

// ── Menu ──

impl KvModel for MenuItem {
    const RESOURCE: &'static str = "menu";

    fn kv_prefix() -> &'static str {
        "pizza:menu:"
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

// ── Order ──

impl KvModel for Order {
    const RESOURCE: &'static str = "order";

    fn kv_prefix() -> &'static str {
        "pizza:order:"
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.date.is_empty() {
            self.date = now_rfc3339();
        }
        for (i, item) in self.items.iter_mut().enumerate() {
            item.id = i as u64 + 1;
        }
    }
}

// ── Franchise ──

impl KvModel for Franchise {
    const RESOURCE: &'static str = "franchise";

    fn kv_prefix() -> &'static str {
        "pizza:franchise:"
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.created_at.is_empty() {
            self.created_at = now_rfc3339();
        }
    }
}

// ── Store ──

impl KvModel for Store {
    const RESOURCE: &'static str = "store";

    fn kv_prefix() -> &'static str {
        "pizza:store:"
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}
