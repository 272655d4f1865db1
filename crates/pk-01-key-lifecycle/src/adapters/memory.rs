//! In-memory adapters
//!
//! Used by tests across the workspace and by the node's `memory` storage
//! backend. Registry and directory fakes can be told to fail so that
//! every translation rule of the orchestrator is reachable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use shared_types::{AccountType, KeyId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::domain::entities::{KeyRecord, NewKeyRecord};
use crate::domain::errors::{DirectoryError, RegistryError, StoreError};
use crate::domain::value_objects::{AccountDetails, RegistryEntry, RegistrySaveRequest};
use crate::ports::outbound::{AccountDirectory, Clock, KeyRegistry, KeyStore};

// =============================================================================
// KEY STORE
// =============================================================================

#[derive(Default)]
struct StoreState {
    records: BTreeMap<KeyId, KeyRecord>,
    /// Non-random values only.
    by_value: HashMap<String, KeyId>,
}

/// In-memory key store.
///
/// The value index check and the insert happen under one write lock.
pub struct InMemoryKeyStore {
    state: RwLock<StoreState>,
    next_id: AtomicU64,
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyStore for InMemoryKeyStore {
    fn insert(&self, record: NewKeyRecord) -> Result<KeyRecord, StoreError> {
        let mut state = self.state.write();
        let unique = !record.key_type.is_random();

        if unique && state.by_value.contains_key(&record.value) {
            return Err(StoreError::DuplicateValue {
                value: record.value,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = record.into_record(id);
        if unique {
            state.by_value.insert(record.value().to_string(), id);
        }
        state.records.insert(id, record.clone());
        Ok(record)
    }

    fn find_by_id(&self, id: KeyId) -> Result<Option<KeyRecord>, StoreError> {
        Ok(self.state.read().records.get(&id).cloned())
    }

    fn find_by_value(&self, value: &str) -> Result<Option<KeyRecord>, StoreError> {
        let state = self.state.read();
        if let Some(id) = state.by_value.get(value) {
            return Ok(state.records.get(id).cloned());
        }
        // Random values are not indexed.
        Ok(state
            .records
            .values()
            .find(|r| !r.is_unique_value() && r.value() == value)
            .cloned())
    }

    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<KeyRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .records
            .values()
            .filter(|r| r.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    fn delete(&self, id: KeyId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        match state.records.remove(&id) {
            Some(record) => {
                if record.is_unique_value() {
                    state.by_value.remove(record.value());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Which registry operations should fail.
#[derive(Debug, Default, Clone)]
struct RegistryFailures {
    save: Option<RegistryError>,
    exists: Option<RegistryError>,
    lookup: Option<RegistryError>,
    delete: Option<RegistryError>,
}

/// In-memory central registry.
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
    failures: Mutex<RegistryFailures>,
    /// Value the registry substitutes for the next random key.
    assigned_values: Mutex<Vec<String>>,
    created_at: DateTime<Utc>,
    save_calls: AtomicU32,
    lookup_calls: AtomicU32,
    delete_calls: AtomicU32,
}

impl InMemoryRegistry {
    /// Registry stamping every new entry with `created_at`.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            failures: Mutex::new(RegistryFailures::default()),
            assigned_values: Mutex::new(Vec::new()),
            created_at,
            save_calls: AtomicU32::new(0),
            lookup_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
        }
    }

    /// Seed an entry registered by any participant.
    pub fn with_entry(self, entry: RegistryEntry) -> Self {
        self.entries.write().insert(entry.key.clone(), entry);
        self
    }

    /// Queue the value to assign to the next random key.
    pub fn assign_next_random(&self, value: impl Into<String>) {
        self.assigned_values.lock().push(value.into());
    }

    pub fn fail_save(&self, error: RegistryError) {
        self.failures.lock().save = Some(error);
    }

    pub fn fail_exists(&self, error: RegistryError) {
        self.failures.lock().exists = Some(error);
    }

    pub fn fail_lookup(&self, error: RegistryError) {
        self.failures.lock().lookup = Some(error);
    }

    pub fn fail_delete(&self, error: RegistryError) {
        self.failures.lock().delete = Some(error);
    }

    /// Forget an entry without going through `delete`.
    pub fn forget(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> u32 {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

#[async_trait]
impl KeyRegistry for InMemoryRegistry {
    async fn save(&self, request: RegistrySaveRequest) -> Result<RegistryEntry, RegistryError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().save.clone() {
            return Err(error);
        }

        let mut key = request.key;
        if request.key_type.is_random() {
            let mut queued = self.assigned_values.lock();
            if !queued.is_empty() {
                key = queued.remove(0);
            }
        }

        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(RegistryError::Rejected(format!("key {key} already registered")));
        }
        let entry = RegistryEntry {
            key_type: request.key_type,
            key: key.clone(),
            bank_account: request.bank_account,
            owner: request.owner,
            created_at: self.created_at,
        };
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    async fn exists(&self, key: &str) -> Result<bool, RegistryError> {
        if let Some(error) = self.failures.lock().exists.clone() {
            return Err(error);
        }
        Ok(self.contains(key))
    }

    async fn lookup(&self, key: &str) -> Result<RegistryEntry, RegistryError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().lookup.clone() {
            return Err(error);
        }
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    async fn delete(&self, key: &str, participant: &str) -> Result<(), RegistryError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().delete.clone() {
            return Err(error);
        }
        let mut entries = self.entries.write();
        match entries.get(key) {
            None => Err(RegistryError::NotFound),
            Some(entry) if entry.bank_account.participant != participant => Err(
                RegistryError::Rejected(format!("participant {participant} does not own {key}")),
            ),
            Some(_) => {
                entries.remove(key);
                Ok(())
            }
        }
    }
}

// =============================================================================
// ACCOUNT DIRECTORY
// =============================================================================

/// In-memory account directory.
#[derive(Default)]
pub struct InMemoryDirectory {
    accounts: RwLock<HashMap<(String, AccountType), AccountDetails>>,
    clients: RwLock<HashSet<String>>,
    unavailable: Mutex<Option<DirectoryError>>,
    lookup_calls: AtomicU32,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account for `owner_id`. The owner becomes a known client.
    pub fn with_account(self, owner_id: impl Into<String>, account: AccountDetails) -> Self {
        let owner_id = owner_id.into();
        self.clients.write().insert(owner_id.clone());
        self.accounts
            .write()
            .insert((owner_id, account.account_type), account);
        self
    }

    /// Register a client without accounts.
    pub fn with_client(self, owner_id: impl Into<String>) -> Self {
        self.clients.write().insert(owner_id.into());
        self
    }

    /// Make every call fail with `error`.
    pub fn fail_with(&self, error: DirectoryError) {
        *self.unavailable.lock() = Some(error);
    }

    pub fn lookup_calls(&self) -> u32 {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn lookup(
        &self,
        owner_id: &str,
        account_type: AccountType,
    ) -> Result<AccountDetails, DirectoryError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.unavailable.lock().clone() {
            return Err(error);
        }
        self.accounts
            .read()
            .get(&(owner_id.to_string(), account_type))
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn client_exists(&self, owner_id: &str) -> Result<bool, DirectoryError> {
        if let Some(error) = self.unavailable.lock().clone() {
            return Err(error);
        }
        Ok(self.clients.read().contains(owner_id))
    }
}

// =============================================================================
// CLOCK
// =============================================================================

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
