mod events;
mod wallet;

use alloy_provider::{DynProvider, Provider, ProviderBuilder};
pub use events::{subscribe, EventSubscription, WalletEvent};
use thiserror::Error;
use url::Url;
pub use wallet::{
    HttpWallet, Wallet, WalletError, WalletTransport, UNRECOGNIZED_CHAIN, USER_REJECTED,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<DynProvider, ClientError> {
    let url = parse_url(rpc_url)?;
    Ok(connect(&url))
}

/// Connect an HTTP provider to an already validated url.
///
/// The provider is type-erased so read and write handles share one type
/// regardless of which endpoint backs them.
pub fn connect(url: &Url) -> DynProvider {
    ProviderBuilder::new().connect_http(url.clone()).erased()
}

/// Parse and validate an RPC url.
pub fn parse_url(rpc_url: &str) -> Result<Url, ClientError> {
    rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url() {
        let result = create_provider("not a url");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_valid_url() {
        assert!(create_provider("http://localhost:8545").is_ok());
    }
}
