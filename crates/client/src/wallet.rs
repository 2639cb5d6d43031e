//! Wallet bridge speaking the EIP-1193 request surface over JSON-RPC.
//!
//! The wallet owns the keys. This side only asks it for accounts, chain
//! changes and (through the provider built on the same endpoint) to sign and
//! broadcast transactions with `eth_sendTransaction`.

use alloy_primitives::{Address, U64};
use async_trait::async_trait;
use config::ChainConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// EIP-1193 code for a rejected request.
pub const USER_REJECTED: i64 = 4001;

/// Code returned by `wallet_switchEthereumChain` for a chain the wallet does not know.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The wallet endpoint could not be reached
    #[error("Wallet request failed: {0}")]
    Transport(String),

    /// The wallet answered with a JSON-RPC error
    #[error("{message} (code {code})")]
    Rpc { code: i64, message: String },

    /// The wallet answered with something unexpected
    #[error("Unexpected wallet response to {method}: {reason}")]
    Decode { method: String, reason: String },
}

impl WalletError {
    /// JSON-RPC error code, if the wallet returned one.
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub const fn is_unrecognized_chain(&self) -> bool {
        matches!(self.code(), Some(UNRECOGNIZED_CHAIN))
    }

    pub const fn is_user_rejection(&self) -> bool {
        matches!(self.code(), Some(USER_REJECTED))
    }
}

/// Raw `request({ method, params })` access to a wallet.
#[async_trait]
pub trait WalletTransport: Send + Sync + fmt::Debug {
    /// Send one request and return its `result`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;

    /// Endpoint contract calls are routed through while this wallet is connected.
    fn endpoint(&self) -> &Url;
}

/// A wallet reachable over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct HttpWallet {
    client: reqwest::Client,
    url: Url,
}

impl HttpWallet {
    /// Creates a wallet bridge for the given endpoint (e.g. "http://127.0.0.1:1248").
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Creates a wallet bridge with a custom HTTP client.
    pub const fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl WalletTransport for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(WalletError::Transport(format!(
                "wallet returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        match (rpc_response.result, rpc_response.error) {
            (_, Some(error)) => Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }

    fn endpoint(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Typed wallet operations on top of a [`WalletTransport`].
#[derive(Debug, Clone)]
pub struct Wallet {
    transport: Arc<dyn WalletTransport>,
}

impl Wallet {
    pub fn new(transport: impl WalletTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_arc(transport: Arc<dyn WalletTransport>) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &Url {
        self.transport.endpoint()
    }

    /// Accounts already authorised for this client, without prompting.
    pub async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_addresses("eth_accounts").await
    }

    /// Ask the user to authorise accounts.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_addresses("eth_requestAccounts").await
    }

    /// Chain the wallet is currently on.
    pub async fn chain_id(&self) -> Result<u64, WalletError> {
        let chain_id: U64 = self.request_decoded("eth_chainId").await?;
        Ok(chain_id.to::<u64>())
    }

    /// Ask the wallet to switch to `chain`.
    pub async fn switch_chain(&self, chain: &ChainConfig) -> Result<(), WalletError> {
        debug!(chain_id = chain.chain_id, "Requesting chain switch");
        self.transport
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": chain.chain_id_hex() }]),
            )
            .await?;
        Ok(())
    }

    /// Ask the wallet to register `chain`.
    pub async fn add_chain(&self, chain: &ChainConfig) -> Result<(), WalletError> {
        debug!(chain_id = chain.chain_id, name = %chain.chain_name, "Requesting chain registration");
        self.transport
            .request("wallet_addEthereumChain", add_chain_params(chain))
            .await?;
        Ok(())
    }

    async fn request_addresses(&self, method: &str) -> Result<Vec<Address>, WalletError> {
        self.request_decoded(method).await
    }

    async fn request_decoded<T>(&self, method: &str) -> Result<T, WalletError>
    where
        T: DeserializeOwned,
    {
        let value = self.transport.request(method, json!([])).await?;
        serde_json::from_value(value).map_err(|e| WalletError::Decode {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }
}

fn add_chain_params(chain: &ChainConfig) -> Value {
    json!([{
        "chainId": chain.chain_id_hex(),
        "chainName": chain.chain_name,
        "nativeCurrency": {
            "name": chain.native_currency.name,
            "symbol": chain.native_currency.symbol,
            "decimals": chain.native_currency.decimals,
        },
        "rpcUrls": [chain.rpc_url],
        "blockExplorerUrls": [chain.explorer_url],
    }])
}
