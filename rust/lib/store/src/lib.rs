//! Typed record storage on top of a [`pizza_kv::KVStore`].
//!
//! Models implement [`KvModel`] to declare their key prefix and id;
//! [`KvOps`] provides get/save/list/delete over any KV backend.

mod kv;

pub use kv::{storage_error, KvModel, KvOps};
