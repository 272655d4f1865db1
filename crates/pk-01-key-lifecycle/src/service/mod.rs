//! # Key Orchestrator
//!
//! Implements [`KeyManagementApi`] on top of the outbound ports.
//!
//! ## Workflow rules
//!
//! - Input validation happens before any external call.
//! - Each step is terminal on failure. Port errors are translated into a
//!   [`KeyError`] at the call site and never leak to the caller.
//! - Registry writes run once. Idempotent reads follow the configured
//!   [`CallPolicy`](crate::config::CallPolicy).
//! - A key is stored locally only after the registry accepted it. If the
//!   local insert then fails on the backend, the registry entry is removed
//!   again. A uniqueness conflict leaves it alone: the entry belongs to the
//!   record that won.


use async_trait::async_trait;
use shared_types::{AccountType, KeyId, KeyType};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::LifecycleConfig;
use crate::domain::entities::{KeyRecord, NewKeyRecord};
use crate::domain::errors::{KeyError, RegistryError, StoreError};
use crate::domain::generator;
use crate::domain::validation::{self, is_blank};
use crate::domain::value_objects::{
    AccountDetails, CreateKeyRequest, CreatedKey, InternalKeyDetails, KeyBank, KeyDetails,
    KeyOwner, KeySummary, OwnerKeys, RegistryEntry, RegistrySaveRequest,
};
use crate::ports::inbound::KeyManagementApi;
use crate::ports::outbound::{AccountDirectory, Clock, KeyRegistry, KeyStore};
use crate::resilience::{call_idempotent, call_once};

/// Coordinates the local store, the central registry and the account
/// directory for every key workflow.
pub struct KeyOrchestrator {
    config: LifecycleConfig,
    store: Arc<dyn KeyStore>,
    registry: Arc<dyn KeyRegistry>,
    directory: Arc<dyn AccountDirectory>,
    clock: Arc<dyn Clock>,
}

impl KeyOrchestrator {
    pub fn new(
        config: LifecycleConfig,
        store: Arc<dyn KeyStore>,
        registry: Arc<dyn KeyRegistry>,
        directory: Arc<dyn AccountDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            registry,
            directory,
            clock,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn within_length(&self, value: &str) -> bool {
        value.chars().count() <= self.config.max_key_length
    }

    /// Bank name for an account held at `participant`.
    fn bank_name_for(&self, participant: &str) -> String {
        if participant == self.config.participant_id {
            self.config.institution_name.clone()
        } else {
            participant.to_string()
        }
    }

    async fn lookup_account(
        &self,
        owner_id: &str,
        account_type: AccountType,
    ) -> Result<AccountDetails, KeyError> {
        call_idempotent(&self.config.directory_policy, "directory.lookup", || {
            self.directory.lookup(owner_id, account_type)
        })
        .await
        .map_err(|e| {
            warn!(owner_id, %account_type, error = %e, "Account lookup failed");
            KeyError::ClientAccountNotFound
        })
    }

    async fn lookup_registry(&self, key: &str) -> Result<RegistryEntry, RegistryError> {
        call_idempotent(&self.config.registry_policy, "registry.lookup", || {
            self.registry.lookup(key)
        })
        .await
    }

    fn find_record(&self, key_id: KeyId) -> Result<KeyRecord, KeyError> {
        self.store
            .find_by_id(key_id)
            .map_err(storage_error)?
            .ok_or_else(|| {
                debug!(key_id, "Key not found locally");
                KeyError::KeyNotFound
            })
    }

    fn ensure_owner(record: &KeyRecord, owner_id: &str) -> Result<(), KeyError> {
        if record.is_owned_by(owner_id) {
            Ok(())
        } else {
            warn!(key_id = record.id(), owner_id, "Key requested by foreign owner");
            Err(KeyError::NotOwner)
        }
    }

    /// Remove a key the registry accepted but the store refused.
    async fn compensate_registry(&self, key: &str) {
        let result = call_once(
            self.config.registry_policy.timeout,
            self.registry.delete(key, &self.config.participant_id),
        )
        .await;

        match result {
            Ok(()) => debug!(key, "Compensating registry delete succeeded"),
            Err(e) => error!(key, error = %e, "Compensating registry delete failed"),
        }
    }
}

fn storage_error(e: StoreError) -> KeyError {
    error!(error = %e, "Local key store failure");
    KeyError::Storage(e.to_string())
}

#[async_trait]
impl KeyManagementApi for KeyOrchestrator {
    async fn create_key(&self, request: CreateKeyRequest) -> Result<CreatedKey, KeyError> {
        let CreateKeyRequest {
            owner_id,
            key_type,
            key_value,
            account_type,
        } = request;

        if !self.within_length(&key_value) || !validation::is_valid(key_type, &key_value) {
            warn!(%owner_id, %key_type, "Rejected key value");
            return Err(KeyError::InvalidKeyValue);
        }

        if !key_type.is_random()
            && self
                .store
                .find_by_value(&key_value)
                .map_err(storage_error)?
                .is_some()
        {
            warn!(%owner_id, %key_type, "Key value already registered");
            return Err(KeyError::AlreadyRegistered);
        }

        let account = self.lookup_account(&owner_id, account_type).await?;
        let effective_value = generator::generate(key_type, &key_value)?;

        let save_request = RegistrySaveRequest::for_account(
            key_type,
            effective_value.clone(),
            &self.config.participant_id,
            &account,
        );
        let entry = call_once(
            self.config.registry_policy.timeout,
            self.registry.save(save_request),
        )
        .await
        .map_err(|e| {
            warn!(%owner_id, %key_type, error = %e, "Registry save failed");
            KeyError::RegistrySaveFailed
        })?;

        let value = match key_type {
            KeyType::Random => entry.key,
            _ => effective_value,
        };

        let inserted = self.store.insert(NewKeyRecord {
            owner_id: owner_id.clone(),
            key_type,
            value: value.clone(),
            account_type,
            created_at: self.clock.now(),
        });

        let record = match inserted {
            Ok(record) => record,
            Err(StoreError::DuplicateValue { .. }) => {
                warn!(%owner_id, %key_type, "Lost create race, value already stored");
                return Err(KeyError::AlreadyRegistered);
            }
            Err(e) => {
                let err = storage_error(e);
                self.compensate_registry(&value).await;
                return Err(err);
            }
        };

        info!(
            key_id = record.id(),
            owner_id = %record.owner_id(),
            %key_type,
            "Key created"
        );

        Ok(CreatedKey {
            key_id: record.id(),
            key_value: record.value().to_string(),
            key_type: record.key_type(),
            account_type: record.account_type(),
        })
    }

    async fn delete_key(&self, key_id: KeyId, owner_id: &str) -> Result<KeyId, KeyError> {
        if key_id == 0 || is_blank(owner_id) {
            warn!(key_id, owner_id, "Rejected delete arguments");
            return Err(KeyError::InvalidArguments);
        }

        let record = self.find_record(key_id)?;
        Self::ensure_owner(&record, owner_id)?;

        let confirmed = call_idempotent(&self.config.registry_policy, "registry.exists", || {
            self.registry.exists(record.value())
        })
        .await;
        match confirmed {
            Ok(true) => {}
            Ok(false) => {
                warn!(key_id, "Key missing from registry, refusing delete");
                return Err(KeyError::RegistryExistenceUnconfirmed);
            }
            Err(e) => {
                warn!(key_id, error = %e, "Registry existence check failed");
                return Err(KeyError::RegistryExistenceUnconfirmed);
            }
        }

        call_once(
            self.config.registry_policy.timeout,
            self.registry.delete(record.value(), &self.config.participant_id),
        )
        .await
        .map_err(|e| {
            warn!(key_id, error = %e, "Registry delete failed");
            KeyError::RegistryDeleteFailed
        })?;

        self.store.delete(key_id).map_err(storage_error)?;

        info!(key_id, owner_id, "Key deleted");
        Ok(key_id)
    }

    async fn search_key(&self, key_value: &str) -> Result<KeyDetails, KeyError> {
        if is_blank(key_value) || !self.within_length(key_value) {
            warn!("Rejected search value");
            return Err(KeyError::InvalidArguments);
        }

        let Some(record) = self.store.find_by_value(key_value).map_err(storage_error)? else {
            let entry = self.lookup_registry(key_value).await.map_err(|e| {
                debug!(error = %e, "Key absent locally and in registry");
                KeyError::RegistryEntryNotFound
            })?;

            debug!("Key served from registry");
            return Ok(KeyDetails {
                key_type: entry.key_type,
                key_value: entry.key.clone(),
                owner: entry.key_owner(),
                bank: KeyBank {
                    branch: entry.bank_account.branch.clone(),
                    account_number: entry.bank_account.account_number.clone(),
                    account_type: entry.bank_account.account_type.account_type(),
                    bank_name: self.bank_name_for(&entry.bank_account.participant),
                },
                created_at: entry.created_at,
            });
        };

        let account = self
            .lookup_account(record.owner_id(), record.account_type())
            .await?;

        debug!(key_id = record.id(), "Key served from local store");
        Ok(KeyDetails {
            key_type: record.key_type(),
            key_value: record.value().to_string(),
            owner: KeyOwner {
                name: account.owner_name,
                tax_id: account.owner_tax_id,
            },
            bank: KeyBank {
                branch: account.branch,
                account_number: account.account_number,
                account_type: record.account_type(),
                bank_name: account.institution_name,
            },
            created_at: record.created_at(),
        })
    }

    async fn internal_search_key(
        &self,
        key_id: KeyId,
        owner_id: &str,
    ) -> Result<InternalKeyDetails, KeyError> {
        let record = self.find_record(key_id)?;
        Self::ensure_owner(&record, owner_id)?;

        let entry = self.lookup_registry(record.value()).await.map_err(|e| {
            warn!(key_id, error = %e, "Registry does not confirm local key");
            KeyError::RegistryConfirmationFailed
        })?;

        Ok(InternalKeyDetails {
            key_id: record.id(),
            owner_id: record.owner_id().to_string(),
            details: KeyDetails {
                key_type: record.key_type(),
                key_value: record.value().to_string(),
                owner: entry.key_owner(),
                bank: KeyBank {
                    branch: entry.bank_account.branch,
                    account_number: entry.bank_account.account_number,
                    account_type: record.account_type(),
                    bank_name: self.config.institution_name.clone(),
                },
                created_at: record.created_at(),
            },
        })
    }

    async fn list_keys(&self, owner_id: &str) -> Result<OwnerKeys, KeyError> {
        if is_blank(owner_id) {
            warn!("Rejected blank owner id");
            return Err(KeyError::InvalidArguments);
        }

        let exists = call_idempotent(
            &self.config.directory_policy,
            "directory.client_exists",
            || self.directory.client_exists(owner_id),
        )
        .await;
        match exists {
            Ok(true) => {}
            Ok(false) => return Err(KeyError::ClientNotFound),
            Err(e) => {
                warn!(owner_id, error = %e, "Client lookup failed");
                return Err(KeyError::ClientNotFound);
            }
        }

        let keys: Vec<KeySummary> = self
            .store
            .find_by_owner(owner_id)
            .map_err(storage_error)?
            .iter()
            .map(KeySummary::from)
            .collect();

        debug!(owner_id, count = keys.len(), "Listed keys");
        Ok(OwnerKeys {
            owner_id: owner_id.to_string(),
            keys,
        })
    }
}
