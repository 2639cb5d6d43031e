use alloy_primitives::Address;
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

const fn default_network() -> NetworkType {
    NetworkType::Sepolia
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Top-level console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Network preset the token lives on
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// Token contract address
    pub token: Option<Address>,

    /// Public RPC used for reads while no wallet is connected
    pub rpc_url: Option<String>,

    /// Block explorer base url
    pub explorer_url: Option<String>,

    /// JSON-RPC endpoint of the wallet bridge
    pub wallet_url: Option<String>,

    /// How often the wallet is polled for account and network changes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Serve Prometheus metrics on this port
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            token: None,
            rpc_url: None,
            explorer_url: None,
            wallet_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Target network with this file's overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let mut builder = NetworkConfigBuilder::from_network_type(self.network);
        if let Some(token) = self.token {
            builder = builder.token(token);
        }
        if let Some(url) = &self.rpc_url {
            builder = builder.rpc_url(url.clone());
        }
        if let Some(url) = &self.explorer_url {
            builder = builder.explorer_url(url.clone());
        }
        builder.build()
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            network = "sepolia"
            token = "0x5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"
            rpc_url = "https://ethereum-sepolia-rpc.publicnode.com"
            wallet_url = "http://127.0.0.1:1248"
            poll_interval_ms = 2500
            metrics_port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_millis(2500));
        assert_eq!(config.metrics_port, Some(9090));

        let network = config.network_config();
        assert_eq!(network.chain.chain_id, 11155111);
        assert_eq!(
            network.token,
            address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1")
        );
        assert_eq!(
            network.chain.rpc_url,
            "https://ethereum-sepolia-rpc.publicnode.com"
        );
        assert_eq!(network.chain.explorer_url, "https://sepolia.etherscan.io");
        assert!(network.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.network, NetworkType::Sepolia);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));

        // A token address is required before anything can be read
        assert!(config.network_config().validate().is_err());
    }

    #[test]
    fn test_unknown_network() {
        assert!(toml::from_str::<Config>(r#"network = "goerli""#).is_err());
    }
}
