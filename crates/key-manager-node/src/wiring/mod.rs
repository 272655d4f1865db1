//! # Component Wiring
//!
//! Builds the key store, the outbound clients and the orchestrator from a
//! validated [`NodeConfig`].

use std::sync::Arc;

use pk_01_key_lifecycle::adapters::InMemoryKeyStore;
use pk_01_key_lifecycle::{KeyOrchestrator, KeyStore, SystemClock};
use thiserror::Error;
use tracing::info;

use crate::adapters::{ClientError, HttpAccountDirectory, HttpKeyRegistry};
use crate::container::{NodeConfig, StorageBackend, StorageConfig};

/// Errors assembling the node.
#[derive(Debug, Error)]
pub enum WiringError {
    #[error("{client} client: {source}")]
    Client {
        client: &'static str,
        #[source]
        source: ClientError,
    },

    #[error("key store: {0}")]
    Storage(String),

    #[error("storage backend {0:?} is not compiled in (enable the `rocksdb` feature)")]
    BackendUnavailable(StorageBackend),
}

/// Open the configured key store.
pub fn build_store(config: &StorageConfig) -> Result<Arc<dyn KeyStore>, WiringError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory key store");
            Ok(Arc::new(InMemoryKeyStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StorageBackend::RocksDb => {
            use crate::adapters::{RocksDbConfig, RocksDbKeyStore};

            let store = RocksDbKeyStore::open(RocksDbConfig {
                path: config.data_dir.clone(),
                sync_writes: config.sync_writes,
                ..Default::default()
            })
            .map_err(|e| WiringError::Storage(e.to_string()))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StorageBackend::RocksDb => Err(WiringError::BackendUnavailable(StorageBackend::RocksDb)),
    }
}

/// Assemble the orchestrator with production adapters.
pub fn build_orchestrator(config: &NodeConfig) -> Result<Arc<KeyOrchestrator>, WiringError> {
    let store = build_store(&config.storage)?;
    let registry = HttpKeyRegistry::new(&config.registry).map_err(|source| WiringError::Client {
        client: "registry",
        source,
    })?;
    let directory =
        HttpAccountDirectory::new(&config.directory).map_err(|source| WiringError::Client {
            client: "directory",
            source,
        })?;

    info!(
        participant = %config.lifecycle.participant_id,
        registry = %config.registry.base_url,
        directory = %config.directory.base_url,
        "Key lifecycle wired"
    );

    Ok(Arc::new(KeyOrchestrator::new(
        config.lifecycle.clone(),
        store,
        Arc::new(registry),
        Arc::new(directory),
        Arc::new(SystemClock),
    )))
}
