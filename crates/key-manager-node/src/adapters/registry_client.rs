//! # Central Registry HTTP Client
//!
//! Implements [`KeyRegistry`] against the registry's REST API:
//!
//! | Call | Request | Success |
//! |------|---------|---------|
//! | save | `POST /api/v1/pix/keys` | 200/201 + entry |
//! | lookup | `GET /api/v1/pix/keys/{key}` | 200 + entry, 404 = not found |
//! | delete | `DELETE /api/v1/pix/keys/{key}` with `{key, participant}` | 200/204 |
//!
//! `exists` is a lookup that maps 404 to `false`.

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use pk_01_key_lifecycle::{
    KeyRegistry, RegistryBankAccount, RegistryEntry, RegistryError, RegistryOwner,
    RegistrySaveRequest,
};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use shared_types::{KeyType, PersonType, RegistryAccountType};
use tracing::debug;

use crate::adapters::{segment_url, ClientError};
use crate::container::HttpClientConfig;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Key type spelling used by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireKeyType {
    Cpf,
    Phone,
    Email,
    Random,
}

impl From<KeyType> for WireKeyType {
    fn from(key_type: KeyType) -> Self {
        match key_type {
            KeyType::TaxId => WireKeyType::Cpf,
            KeyType::Phone => WireKeyType::Phone,
            KeyType::Email => WireKeyType::Email,
            KeyType::Random => WireKeyType::Random,
        }
    }
}

impl From<WireKeyType> for KeyType {
    fn from(key_type: WireKeyType) -> Self {
        match key_type {
            WireKeyType::Cpf => KeyType::TaxId,
            WireKeyType::Phone => KeyType::Phone,
            WireKeyType::Email => KeyType::Email,
            WireKeyType::Random => KeyType::Random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBankAccount {
    pub participant: String,
    pub branch: String,
    pub account_number: String,
    pub account_type: RegistryAccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOwner {
    #[serde(rename = "type")]
    pub person_type: PersonType,
    pub name: String,
    pub tax_id_number: String,
}

/// Body of `POST /api/v1/pix/keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveKeyBody {
    pub key_type: WireKeyType,
    pub key: String,
    pub bank_account: WireBankAccount,
    pub owner: WireOwner,
}

/// Entry returned by save and lookup. `createdAt` has no zone and is UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntryBody {
    pub key_type: WireKeyType,
    pub key: String,
    pub bank_account: WireBankAccount,
    pub owner: WireOwner,
    pub created_at: NaiveDateTime,
}

/// Body of `DELETE /api/v1/pix/keys/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteKeyBody {
    pub key: String,
    pub participant: String,
}

impl From<RegistrySaveRequest> for SaveKeyBody {
    fn from(request: RegistrySaveRequest) -> Self {
        Self {
            key_type: request.key_type.into(),
            key: request.key,
            bank_account: WireBankAccount {
                participant: request.bank_account.participant,
                branch: request.bank_account.branch,
                account_number: request.bank_account.account_number,
                account_type: request.bank_account.account_type,
            },
            owner: WireOwner {
                person_type: request.owner.person_type,
                name: request.owner.name,
                tax_id_number: request.owner.tax_id,
            },
        }
    }
}

impl From<KeyEntryBody> for RegistryEntry {
    fn from(body: KeyEntryBody) -> Self {
        Self {
            key_type: body.key_type.into(),
            key: body.key,
            bank_account: RegistryBankAccount {
                participant: body.bank_account.participant,
                branch: body.bank_account.branch,
                account_number: body.bank_account.account_number,
                account_type: body.bank_account.account_type,
            },
            owner: RegistryOwner {
                person_type: body.owner.person_type,
                name: body.owner.name,
                tax_id: body.owner.tax_id_number,
            },
            created_at: Utc.from_utc_datetime(&body.created_at),
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Registry client over HTTP/JSON.
pub struct HttpKeyRegistry {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpKeyRegistry {
    pub fn new(config: &HttpClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("key-manager-node/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn keys_url(&self, key: Option<&str>) -> Result<Url, RegistryError> {
        let mut segments = vec!["api", "v1", "pix", "keys"];
        segments.extend(key);
        segment_url(&self.base_url, &segments)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> RegistryError {
    if e.is_timeout() {
        RegistryError::Timeout
    } else {
        RegistryError::Unavailable(e.to_string())
    }
}

/// Error for a non-success status.
fn status_error(status: StatusCode) -> RegistryError {
    if status == StatusCode::NOT_FOUND {
        RegistryError::NotFound
    } else if status.is_server_error() {
        RegistryError::Unavailable(format!("HTTP {status}"))
    } else {
        RegistryError::Rejected(format!("HTTP {status}"))
    }
}

async fn entry_from(response: reqwest::Response) -> Result<RegistryEntry, RegistryError> {
    let body: KeyEntryBody = response
        .json()
        .await
        .map_err(|e| RegistryError::Unavailable(format!("malformed registry entry: {e}")))?;
    Ok(body.into())
}

#[async_trait]
impl KeyRegistry for HttpKeyRegistry {
    async fn save(&self, request: RegistrySaveRequest) -> Result<RegistryEntry, RegistryError> {
        let url = self.keys_url(None)?;
        let body = SaveKeyBody::from(request);
        debug!(%url, key_type = ?body.key_type, "Registry save");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        entry_from(response).await
    }

    async fn exists(&self, key: &str) -> Result<bool, RegistryError> {
        match self.lookup(key).await {
            Ok(_) => Ok(true),
            Err(RegistryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn lookup(&self, key: &str) -> Result<RegistryEntry, RegistryError> {
        let url = self.keys_url(Some(key))?;
        debug!(%url, "Registry lookup");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        entry_from(response).await
    }

    async fn delete(&self, key: &str, participant: &str) -> Result<(), RegistryError> {
        let url = self.keys_url(Some(key))?;
        debug!(%url, participant, "Registry delete");

        let response = self
            .client
            .delete(url)
            .json(&DeleteKeyBody {
                key: key.to_string(),
                participant: participant.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }
}
