//! # Node Container
//!
//! Configuration for every component the node wires together.

pub mod config;

pub use config::{
    ConfigError, HttpClientConfig, LoggingConfig, NodeConfig, StorageBackend, StorageConfig,
};
