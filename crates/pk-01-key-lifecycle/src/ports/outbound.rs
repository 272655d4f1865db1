//! Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the orchestrator needs the host application to provide.
//!
//! Production: HTTP clients and the RocksDB store in `key-manager-node`.
//! Testing: in-memory adapters in [`crate::adapters::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{AccountType, KeyId};

use crate::domain::entities::{KeyRecord, NewKeyRecord};
use crate::domain::errors::{DirectoryError, RegistryError, StoreError};
use crate::domain::value_objects::{AccountDetails, RegistryEntry, RegistrySaveRequest};

/// Durable local mapping from key value to owner and metadata.
///
/// ## Uniqueness
///
/// `insert` MUST reject a non-random value that is already stored with
/// [`StoreError::DuplicateValue`], atomically with the write. Callers may
/// pre-check with `find_by_value`, but only `insert` is authoritative.
pub trait KeyStore: Send + Sync {
    /// Store a new record and return it with its assigned id.
    fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError>;

    /// Record by id.
    fn find_by_id(&self, id: KeyId) -> Result<Option<KeyRecord>, StoreError>;

    /// Record holding `value`, if any.
    fn find_by_value(&self, value: &str) -> Result<Option<KeyRecord>, StoreError>;

    /// All records of an owner, ordered by id.
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<KeyRecord>, StoreError>;

    /// Remove a record. Returns whether it existed.
    fn delete(&self, id: KeyId) -> Result<bool, StoreError>;
}

/// Central key registry shared by all participants.
#[async_trait]
pub trait KeyRegistry: Send + Sync {
    /// Register a key. The returned entry carries the registry's final value.
    async fn save(&self, request: RegistrySaveRequest) -> Result<RegistryEntry, RegistryError>;

    /// Whether the registry currently holds `key`.
    async fn exists(&self, key: &str) -> Result<bool, RegistryError>;

    /// Entry for `key`. Missing entries are [`RegistryError::NotFound`].
    async fn lookup(&self, key: &str) -> Result<RegistryEntry, RegistryError>;

    /// Remove `key` on behalf of `participant`.
    async fn delete(&self, key: &str, participant: &str) -> Result<(), RegistryError>;
}

/// Account-of-record directory.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Account of `account_type` held by `owner_id`.
    async fn lookup(
        &self,
        owner_id: &str,
        account_type: AccountType,
    ) -> Result<AccountDetails, DirectoryError>;

    /// Whether the directory knows `owner_id` at all.
    async fn client_exists(&self, owner_id: &str) -> Result<bool, DirectoryError>;
}

/// Abstract interface for time operations (for testability).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Default clock using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
