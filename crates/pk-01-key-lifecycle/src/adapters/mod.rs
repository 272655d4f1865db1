//! Adapters for the key lifecycle
//!
//! In-memory implementations of the outbound ports. Production adapters
//! (HTTP clients, RocksDB) live in `key-manager-node`.

pub mod memory;

pub use memory::{FixedClock, InMemoryDirectory, InMemoryKeyStore, InMemoryRegistry};
