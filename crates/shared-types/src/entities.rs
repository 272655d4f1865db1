//! # Core Domain Entities
//!
//! The closed vocabularies every layer of the key manager speaks.
//!
//! ## Clusters
//!
//! - **Keys**: `KeyType`, `KeyId`, `OwnerId`
//! - **Accounts**: `AccountType`, `RegistryAccountType`, `PersonType`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseError;

// =============================================================================
// CLUSTER A: KEYS
// =============================================================================

/// Identifier assigned by the local key store. Zero is never assigned.
pub type KeyId = u64;

/// Identifier of the client that owns a key.
pub type OwnerId = String;

/// Longest key value accepted anywhere in the system.
pub const MAX_KEY_VALUE_LEN: usize = 77;

/// The kind of alias a Pix key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyType {
    /// Individual tax id (CPF).
    TaxId,
    /// Phone number in E.164 form.
    Phone,
    /// E-mail address.
    Email,
    /// Token generated on behalf of the owner.
    Random,
}

impl KeyType {
    /// All key types, in declaration order.
    pub const ALL: [KeyType; 4] = [
        KeyType::TaxId,
        KeyType::Phone,
        KeyType::Email,
        KeyType::Random,
    ];

    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::TaxId => "TAX_ID",
            KeyType::Phone => "PHONE",
            KeyType::Email => "EMAIL",
            KeyType::Random => "RANDOM",
        }
    }

    /// Whether the stored value is generated rather than caller-supplied.
    pub fn is_random(&self) -> bool {
        matches!(self, KeyType::Random)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseError::UnknownKeyType(s.to_string()))
    }
}

// =============================================================================
// CLUSTER B: ACCOUNTS
// =============================================================================

/// Account type as known to this institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Checking account.
    Checking,
    /// Savings account.
    Savings,
}

impl AccountType {
    /// Wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
        }
    }

    /// The code the central registry uses for this account type.
    pub fn registry_code(&self) -> RegistryAccountType {
        match self {
            AccountType::Checking => RegistryAccountType::Cacc,
            AccountType::Savings => RegistryAccountType::Svgs,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHECKING" => Ok(AccountType::Checking),
            "SAVINGS" => Ok(AccountType::Savings),
            other => Err(ParseError::UnknownAccountType(other.to_string())),
        }
    }
}

/// Account type codes used by the central registry (ISO 20022 cash account types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistryAccountType {
    /// Current (checking) account.
    Cacc,
    /// Savings account.
    Svgs,
}

impl RegistryAccountType {
    /// Translate to the local account type.
    pub fn account_type(&self) -> AccountType {
        match self {
            RegistryAccountType::Cacc => AccountType::Checking,
            RegistryAccountType::Svgs => AccountType::Savings,
        }
    }
}

impl FromStr for RegistryAccountType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CACC" => Ok(RegistryAccountType::Cacc),
            "SVGS" => Ok(RegistryAccountType::Svgs),
            other => Err(ParseError::UnknownRegistryAccountType(other.to_string())),
        }
    }
}

/// Legal nature of a key owner, as the registry records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    /// An individual.
    #[default]
    NaturalPerson,
    /// A company.
    LegalPerson,
}
