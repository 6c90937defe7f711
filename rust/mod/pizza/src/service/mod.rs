pub mod auth;
pub mod user;
pub mod menu;
pub mod order;
pub mod franchise;

use std::sync::Arc;

use pizza_core::ServiceError;
use pizza_kv::KVStore;
use pizza_store::{storage_error, KvOps};

use crate::factory::Factory;
use crate::model::{Franchise, MenuItem, Order, Store, UserRecord};

/// Configuration for the pizza service.
#[derive(Debug, Clone)]
pub struct PizzaConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 24h).
    pub token_ttl: i64,
    /// Orders returned per page of `GET /api/order`.
    pub order_page_size: usize,
    /// Factory base URL, shown in the API docs.
    pub factory_url: String,
}

impl Default for PizzaConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "pizza-dev-secret-change-me".to_string(),
            token_ttl: 86400,
            order_page_size: 10,
            factory_url: String::new(),
        }
    }
}

/// The pizza service. Holds storage backends, the factory client, and
/// configuration.
pub struct PizzaService {
    pub(crate) kv: Arc<dyn KVStore>,
    /// Live sessions. Injected separately so that it can be process-local.
    pub(crate) sessions: Arc<dyn KVStore>,
    pub(crate) factory: Arc<dyn Factory>,
    pub(crate) config: PizzaConfig,
    pub(crate) users: KvOps<UserRecord>,
    pub(crate) menu: KvOps<MenuItem>,
    pub(crate) orders: KvOps<Order>,
    pub(crate) franchises: KvOps<Franchise>,
    pub(crate) stores: KvOps<Store>,
}

impl PizzaService {
    pub fn new(
        kv: Arc<dyn KVStore>,
        sessions: Arc<dyn KVStore>,
        factory: Arc<dyn Factory>,
        config: PizzaConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            users: KvOps::new(kv.clone()),
            menu: KvOps::new(kv.clone()),
            orders: KvOps::new(kv.clone()),
            franchises: KvOps::new(kv.clone()),
            stores: KvOps::new(kv.clone()),
            kv,
            sessions,
            factory,
            config,
        })
    }

    pub fn config(&self) -> &PizzaConfig {
        &self.config
    }

    // ── Unique index helpers ──
    //
    // An index entry maps a normalized value to the owning record id.

    pub(crate) fn index_key(index: &str, value: &str) -> String {
        format!("pizza:{}:{}", index, value.trim().to_lowercase())
    }

    /// Claim `value` in `index` for `id`. Returns false if already taken.
    pub(crate) fn claim_unique(&self, index: &str, value: &str, id: u64) -> Result<bool, ServiceError> {
        self.kv
            .set_if_absent(&Self::index_key(index, value), id.to_string().as_bytes())
            .map_err(storage_error)
    }

    pub(crate) fn release_unique(&self, index: &str, value: &str) -> Result<(), ServiceError> {
        self.kv
            .delete(&Self::index_key(index, value))
            .map_err(storage_error)
    }

    pub(crate) fn lookup_unique(&self, index: &str, value: &str) -> Result<Option<u64>, ServiceError> {
        let Some(bytes) = self
            .kv
            .get(&Self::index_key(index, value))
            .map_err(storage_error)?
        else {
            return Ok(None);
        };
        let id = std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| ServiceError::Internal(format!("corrupt {} index entry", index)))?;
        Ok(Some(id))
    }
}

/// Case-insensitive name filter where `*` matches any run of characters.
/// No pattern (or an empty one) matches everything.
pub(crate) fn name_matches(pattern: Option<&str>, name: &str) -> bool {
    let pattern = match pattern {
        Some(p) if !p.is_empty() => p.to_lowercase(),
        _ => return true,
    };
    let name = name.to_lowercase();

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return name == pattern;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if name.len() < first.len() + last.len() || !name.starts_with(first) || !name.ends_with(last) {
        return false;
    }
    let mut rest = &name[first.len()..name.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}
