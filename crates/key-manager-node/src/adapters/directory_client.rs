//! # Account Directory HTTP Client
//!
//! Implements [`AccountDirectory`] against the institution's ERP:
//!
//! - `GET /api/v1/clientes/{id}` answers whether a client exists
//! - `GET /api/v1/clientes/{id}/contas?tipo=CONTA_CORRENTE|CONTA_POUPANCA`
//!   returns the account of that type
//!
//! 404 and 204 both mean "no such client or account".

use async_trait::async_trait;
use pk_01_key_lifecycle::{AccountDetails, AccountDirectory, DirectoryError};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use shared_types::AccountType;
use tracing::debug;

use crate::adapters::{segment_url, ClientError};
use crate::container::HttpClientConfig;

/// Account type spelling used by the ERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireAccountType {
    ContaCorrente,
    ContaPoupanca,
}

impl WireAccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireAccountType::ContaCorrente => "CONTA_CORRENTE",
            WireAccountType::ContaPoupanca => "CONTA_POUPANCA",
        }
    }
}

impl From<AccountType> for WireAccountType {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Checking => WireAccountType::ContaCorrente,
            AccountType::Savings => WireAccountType::ContaPoupanca,
        }
    }
}

impl From<WireAccountType> for AccountType {
    fn from(account_type: WireAccountType) -> Self {
        match account_type {
            WireAccountType::ContaCorrente => AccountType::Checking,
            WireAccountType::ContaPoupanca => AccountType::Savings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionBody {
    pub nome: String,
    pub ispb: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderBody {
    pub id: String,
    pub nome: String,
    pub cpf: String,
}

/// Account as returned by the ERP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBody {
    pub tipo: WireAccountType,
    pub instituicao: InstitutionBody,
    pub agencia: String,
    pub numero: String,
    pub titular: HolderBody,
}

impl From<AccountBody> for AccountDetails {
    fn from(body: AccountBody) -> Self {
        Self {
            branch: body.agencia,
            account_number: body.numero,
            account_type: body.tipo.into(),
            owner_name: body.titular.nome,
            owner_tax_id: body.titular.cpf,
            institution_name: body.instituicao.nome,
        }
    }
}

/// Directory client over HTTP/JSON.
pub struct HttpAccountDirectory {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAccountDirectory {
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

    fn client_url(&self, owner_id: &str, accounts: bool) -> Result<Url, DirectoryError> {
        let mut segments = vec!["api", "v1", "clientes", owner_id];
        if accounts {
            segments.push("contas");
        }
        segment_url(&self.base_url, &segments)
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, DirectoryError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DirectoryError::Timeout
            } else {
                DirectoryError::Unavailable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Err(DirectoryError::NotFound),
            status if status.is_success() => Ok(response),
            status => Err(DirectoryError::Unavailable(format!("HTTP {status}"))),
        }
    }
}

#[async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn lookup(
        &self,
        owner_id: &str,
        account_type: AccountType,
    ) -> Result<AccountDetails, DirectoryError> {
        let mut url = self.client_url(owner_id, true)?;
        url.query_pairs_mut()
            .append_pair("tipo", WireAccountType::from(account_type).as_str());
        debug!(%url, "Directory account lookup");

        let body: AccountBody = self
            .get(url)
            .await?
            .json()
            .await
            .map_err(|e| DirectoryError::Unavailable(format!("malformed account: {e}")))?;
        Ok(body.into())
    }

    async fn client_exists(&self, owner_id: &str) -> Result<bool, DirectoryError> {
        let url = self.client_url(owner_id, false)?;
        debug!(%url, "Directory client lookup");

        match self.get(url).await {
            Ok(_) => Ok(true),
            Err(DirectoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
