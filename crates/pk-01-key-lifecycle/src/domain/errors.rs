//! Error types for the key lifecycle
//!
//! `KeyError` is what the orchestrator returns to callers. The port errors
//! (`StoreError`, `RegistryError`, `DirectoryError`) are what collaborators
//! return to the orchestrator; they never reach a caller untranslated.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-checkable failure class of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing input. Not retryable without change.
    InvalidArgument,
    /// Duplicate non-random key value.
    AlreadyExists,
    /// Referenced key, client, account or registry entry is absent.
    NotFound,
    /// The key belongs to another owner.
    PermissionDenied,
    /// A downstream call failed. The whole operation may be retried later.
    Aborted,
}

impl ErrorKind {
    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All errors a key workflow can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key value does not satisfy its type's format.
    #[error("invalid key value")]
    InvalidKeyValue,

    /// Request identifiers are missing or malformed.
    #[error("invalid arguments")]
    InvalidArguments,

    /// A non-random key was submitted without a value.
    #[error("key value is required")]
    KeyValueRequired,

    /// Another record already holds this value.
    #[error("pix key already registered")]
    AlreadyRegistered,

    /// Directory has no account of this type for the owner.
    #[error("client does not exist with this account type")]
    ClientAccountNotFound,

    /// Directory does not know the owner at all.
    #[error("client does not exist")]
    ClientNotFound,

    /// No local record with this id.
    #[error("key does not exist")]
    KeyNotFound,

    /// Record is owned by someone else.
    #[error("key does not belong to this owner")]
    NotOwner,

    /// Registry lookup for a public search missed or failed.
    #[error("key does not exist in registry")]
    RegistryEntryNotFound,

    /// Registry could not confirm the key before deletion.
    #[error("key does not exist in registry")]
    RegistryExistenceUnconfirmed,

    /// Registry did not accept the new key.
    #[error("error trying to save in registry")]
    RegistrySaveFailed,

    /// Registry did not delete the key.
    #[error("unable to delete key in registry, retry")]
    RegistryDeleteFailed,

    /// Registry does not currently hold a locally known key.
    #[error("key value does not exist in registry")]
    RegistryConfirmationFailed,

    /// Local store failed outside its uniqueness constraint.
    #[error("local key store failure: {0}")]
    Storage(String),
}

impl KeyError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeyError::InvalidKeyValue | KeyError::InvalidArguments | KeyError::KeyValueRequired => {
                ErrorKind::InvalidArgument
            }
            KeyError::AlreadyRegistered => ErrorKind::AlreadyExists,
            KeyError::ClientAccountNotFound
            | KeyError::ClientNotFound
            | KeyError::KeyNotFound
            | KeyError::RegistryEntryNotFound => ErrorKind::NotFound,
            KeyError::NotOwner => ErrorKind::PermissionDenied,
            KeyError::RegistryExistenceUnconfirmed
            | KeyError::RegistrySaveFailed
            | KeyError::RegistryDeleteFailed
            | KeyError::RegistryConfirmationFailed
            | KeyError::Storage(_) => ErrorKind::Aborted,
        }
    }
}

/// Local key store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Uniqueness constraint on non-random values fired.
    #[error("value already stored: {value}")]
    DuplicateValue { value: String },

    /// Backend I/O or corruption.
    #[error("key store backend error: {0}")]
    Backend(String),
}

/// Central registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry has no entry for this value.
    #[error("key not found in registry")]
    NotFound,

    /// Registry refused the request.
    #[error("registry rejected request: {0}")]
    Rejected(String),

    /// Registry could not be reached or answered garbage.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its time budget.
    #[error("registry call timed out")]
    Timeout,
}

/// Account directory errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No such client or no account of the requested type.
    #[error("client or account not found")]
    NotFound,

    /// Directory could not be reached or answered garbage.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its time budget.
    #[error("directory call timed out")]
    Timeout,
}
