use crate::{ContractHandle, Gateway, GatewayError};
use alloy_primitives::Address;
use client::Wallet;
use config::NetworkConfig;
use tracing::debug;
use url::Url;

/// Resolves handles to the configured token contract.
///
/// Reads go through the wallet's endpoint when a wallet is configured and
/// through the network's public RPC otherwise. Writes always need the wallet.
#[derive(Debug, Clone)]
pub struct ContractGateway {
    token: Address,
    fallback_url: Url,
    wallet: Option<Wallet>,
}

impl ContractGateway {
    /// Create a gateway for `network`. Fails only on an unparsable fallback url.
    pub fn new(network: &NetworkConfig, wallet: Option<Wallet>) -> Result<Self, GatewayError> {
        let fallback_url = client::parse_url(&network.chain.rpc_url)
            .map_err(|e| GatewayError::Endpoint(e.to_string()))?;

        Ok(Self {
            token: network.token,
            fallback_url,
            wallet,
        })
    }

    pub const fn token(&self) -> Address {
        self.token
    }

    pub const fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    /// Endpoint read handles are currently bound to.
    pub fn read_endpoint(&self) -> &Url {
        self.wallet
            .as_ref()
            .map_or(&self.fallback_url, Wallet::endpoint)
    }
}

impl Gateway for ContractGateway {
    type Contract = ContractHandle;

    fn read_handle(&self) -> ContractHandle {
        ContractHandle::read_only(self.token, client::connect(self.read_endpoint()))
    }

    async fn write_handle(&self) -> Result<Option<ContractHandle>, GatewayError> {
        let Some(wallet) = &self.wallet else {
            debug!("No wallet configured, write handle unavailable");
            return Ok(None);
        };

        let accounts = wallet.accounts().await?;
        let Some(&account) = accounts.first() else {
            debug!("Wallet has no authorised account, write handle unavailable");
            return Ok(None);
        };

        Ok(Some(ContractHandle::signed(
            self.token,
            client::connect(wallet.endpoint()),
            account,
        )))
    }
}
