//! Domain entities for the key lifecycle
//!
//! `KeyRecord` is the locally persisted mapping. Its fields are private and
//! there are no setters: every field, including `value`, is fixed when the
//! record is built from a [`NewKeyRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{AccountType, KeyId, KeyType, OwnerId};

/// A key accepted by the registry and not yet stored locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKeyRecord {
    /// Owning client.
    pub owner_id: OwnerId,
    /// Key type.
    pub key_type: KeyType,
    /// Final value (registry-assigned for random keys).
    pub value: String,
    /// Account the key points at.
    pub account_type: AccountType,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl NewKeyRecord {
    /// Bind the store-assigned id.
    pub fn into_record(self, id: KeyId) -> KeyRecord {
        KeyRecord {
            id,
            owner_id: self.owner_id,
            key_type: self.key_type,
            value: self.value,
            account_type: self.account_type,
            created_at: self.created_at,
        }
    }
}

/// A stored Pix key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    id: KeyId,
    owner_id: OwnerId,
    key_type: KeyType,
    value: String,
    account_type: AccountType,
    created_at: DateTime<Utc>,
}

impl KeyRecord {
    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `owner_id` owns this record.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    /// Whether this record takes part in the value uniqueness constraint.
    pub fn is_unique_value(&self) -> bool {
        !self.key_type.is_random()
    }
}
