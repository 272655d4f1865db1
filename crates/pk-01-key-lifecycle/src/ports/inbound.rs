//! Inbound Ports (Driving Ports / API)

use async_trait::async_trait;
use shared_types::KeyId;

use crate::domain::errors::KeyError;
use crate::domain::value_objects::{
    CreateKeyRequest, CreatedKey, InternalKeyDetails, KeyDetails, OwnerKeys,
};

/// Primary key management API.
///
/// Every operation either completes all of its steps or stops at the first
/// failing one without committing local state.
#[async_trait]
pub trait KeyManagementApi: Send + Sync {
    /// Register a key with the central registry, then store it locally.
    async fn create_key(&self, request: CreateKeyRequest) -> Result<CreatedKey, KeyError>;

    /// Remove an owner's key from the registry, then locally.
    async fn delete_key(&self, key_id: KeyId, owner_id: &str) -> Result<KeyId, KeyError>;

    /// Public lookup by key value: local store first, registry on a miss.
    async fn search_key(&self, key_value: &str) -> Result<KeyDetails, KeyError>;

    /// Owner-scoped lookup by id, confirmed against the registry.
    async fn internal_search_key(
        &self,
        key_id: KeyId,
        owner_id: &str,
    ) -> Result<InternalKeyDetails, KeyError>;

    /// All locally stored keys of an owner known to the directory.
    async fn list_keys(&self, owner_id: &str) -> Result<OwnerKeys, KeyError>;
}
