//! Value objects for the key lifecycle
//!
//! Workflow inputs and outputs, plus the data exchanged with the account
//! directory and the central registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{AccountType, KeyId, KeyType, OwnerId, PersonType, RegistryAccountType};

use crate::domain::entities::KeyRecord;

// =============================================================================
// WORKFLOW INPUTS AND OUTPUTS
// =============================================================================

/// Input of the Create workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub owner_id: OwnerId,
    pub key_type: KeyType,
    /// Must be blank for random keys.
    #[serde(default)]
    pub key_value: String,
    pub account_type: AccountType,
}

/// Output of the Create workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedKey {
    pub key_id: KeyId,
    pub key_value: String,
    pub key_type: KeyType,
    pub account_type: AccountType,
}

/// Identity of a key owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOwner {
    pub name: String,
    pub tax_id: String,
}

/// Account a key points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBank {
    pub branch: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub bank_name: String,
}

/// Output of the public Search workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetails {
    pub key_type: KeyType,
    pub key_value: String,
    pub owner: KeyOwner,
    pub bank: KeyBank,
    pub created_at: DateTime<Utc>,
}

/// Output of the owner-scoped InternalSearch workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalKeyDetails {
    pub key_id: KeyId,
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub details: KeyDetails,
}

/// One entry of an owner's key listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    pub key_id: KeyId,
    pub key_type: KeyType,
    pub key_value: String,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

impl From<&KeyRecord> for KeySummary {
    fn from(record: &KeyRecord) -> Self {
        Self {
            key_id: record.id(),
            key_type: record.key_type(),
            key_value: record.value().to_string(),
            account_type: record.account_type(),
            created_at: record.created_at(),
        }
    }
}

/// Output of the ListKeysForOwner workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerKeys {
    pub owner_id: OwnerId,
    pub keys: Vec<KeySummary>,
}

// =============================================================================
// ACCOUNT DIRECTORY DATA
// =============================================================================

/// Account of record resolved by the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub branch: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub owner_name: String,
    pub owner_tax_id: String,
    pub institution_name: String,
}

// =============================================================================
// CENTRAL REGISTRY DATA
// =============================================================================

/// Bank account section of a registry entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryBankAccount {
    /// Settlement participant holding the account.
    pub participant: String,
    pub branch: String,
    pub account_number: String,
    pub account_type: RegistryAccountType,
}

/// Owner section of a registry entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOwner {
    pub person_type: PersonType,
    pub name: String,
    pub tax_id: String,
}

/// Registration submitted to the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySaveRequest {
    pub key_type: KeyType,
    pub key: String,
    pub bank_account: RegistryBankAccount,
    pub owner: RegistryOwner,
}

impl RegistrySaveRequest {
    /// Registration of `key` for the account the directory resolved.
    pub fn for_account(
        key_type: KeyType,
        key: String,
        participant_id: &str,
        account: &AccountDetails,
    ) -> Self {
        Self {
            key_type,
            key,
            bank_account: RegistryBankAccount {
                participant: participant_id.to_string(),
                branch: account.branch.clone(),
                account_number: account.account_number.clone(),
                account_type: account.account_type.registry_code(),
            },
            owner: RegistryOwner {
                person_type: PersonType::NaturalPerson,
                name: account.owner_name.clone(),
                tax_id: account.owner_tax_id.clone(),
            },
        }
    }
}

/// An entry as the registry holds it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub key_type: KeyType,
    pub key: String,
    pub bank_account: RegistryBankAccount,
    pub owner: RegistryOwner,
    pub created_at: DateTime<Utc>,
}

impl RegistryEntry {
    pub fn key_owner(&self) -> KeyOwner {
        KeyOwner {
            name: self.owner.name.clone(),
            tax_id: self.owner.tax_id.clone(),
        }
    }
}
