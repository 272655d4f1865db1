//! # Durable Storage Adapters
//!
//! Enable the `rocksdb` feature to build these:
//!
//! ```toml
//! key-manager-node = { path = "...", features = ["rocksdb"] }
//! ```
//!
//! Without it the node only offers the in-memory store from
//! `pk_01_key_lifecycle::adapters`.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbKeyStore, COLUMN_FAMILIES};
