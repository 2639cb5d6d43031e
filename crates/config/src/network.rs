//! Target network configuration.
//!
//! Provides the chain parameters, fallback endpoint and token address for the
//! single network this client talks to, plus the descriptor a wallet needs to
//! register the chain when it does not know it yet.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Token address left at the zero address
    #[error("Token contract address is not configured")]
    MissingToken,

    /// Fallback endpoint is empty
    #[error("Fallback RPC url is not configured")]
    MissingRpcUrl,
}

/// Known network presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Sepolia,
}

/// Native currency descriptor used by `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn ether() -> Self {
        Self {
            name: "ETH".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Chain parameters for the target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Display name shown by the wallet when registering the chain
    pub chain_name: String,
    /// Public read-only RPC endpoint, used when no wallet is connected
    pub rpc_url: String,
    /// Block explorer base url
    pub explorer_url: String,
    /// Native currency descriptor
    pub native_currency: NativeCurrency,
}

impl ChainConfig {
    /// Ethereum mainnet configuration.
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            chain_name: "Ethereum Mainnet".to_string(),
            rpc_url: "https://eth.llamarpc.com".to_string(),
            explorer_url: "https://etherscan.io".to_string(),
            native_currency: NativeCurrency::ether(),
        }
    }

    /// Ethereum Sepolia testnet configuration.
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11155111,
            chain_name: "Sepolia Test Network".to_string(),
            rpc_url: "https://rpc.sepolia.org".to_string(),
            explorer_url: "https://sepolia.etherscan.io".to_string(),
            native_currency: NativeCurrency::ether(),
        }
    }

    /// Chain ID as the `0x`-prefixed hex quantity wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// Complete network configuration: chain plus the token deployed on it.
///
/// Presets carry no token address; one must be supplied through
/// [`NetworkConfigBuilder::token`] before [`NetworkConfig::validate`] passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network preset this configuration started from
    pub network_type: NetworkType,
    /// Chain parameters
    pub chain: ChainConfig,
    /// Token contract address
    pub token: Address,
}

impl NetworkConfig {
    /// Create mainnet configuration.
    pub fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain: ChainConfig::mainnet(),
            token: Address::ZERO,
        }
    }

    /// Create testnet (Sepolia) configuration.
    pub fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Sepolia,
            chain: ChainConfig::sepolia(),
            token: Address::ZERO,
        }
    }

    /// Create configuration from network type.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Sepolia => Self::sepolia(),
        }
    }

    /// Check that the configuration can reach a token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token == Address::ZERO {
            return Err(ConfigError::MissingToken);
        }
        if self.chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        Ok(())
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with mainnet defaults.
    pub fn mainnet() -> Self {
        Self {
            config: NetworkConfig::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub fn sepolia() -> Self {
        Self {
            config: NetworkConfig::sepolia(),
        }
    }

    /// Start from a preset.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the token contract address.
    pub const fn token(mut self, address: Address) -> Self {
        self.config.token = address;
        self
    }

    /// Override the fallback RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.chain.rpc_url = url.into();
        self
    }

    /// Override the block explorer.
    pub fn explorer_url(mut self, url: impl Into<String>) -> Self {
        self.config.chain.explorer_url = url.into();
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}
