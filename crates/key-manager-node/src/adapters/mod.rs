//! # Outbound Adapters
//!
//! Production implementations of the key lifecycle's outbound ports:
//!
//! - [`HttpKeyRegistry`] - central registry over HTTP/JSON
//! - [`HttpAccountDirectory`] - account directory over HTTP/JSON
//! - `RocksDbKeyStore` - durable key store (feature `rocksdb`)

pub mod directory_client;
pub mod registry_client;
pub mod storage;

pub use directory_client::HttpAccountDirectory;
pub use registry_client::HttpKeyRegistry;
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbKeyStore};

use reqwest::Url;
use thiserror::Error;

/// Errors building an outbound HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
pub(crate) fn segment_url(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
