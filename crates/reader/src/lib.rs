//! Token state reads for display.
//!
//! This crate provides the [`TokenInfo`] snapshot and the [`TokenStateReader`]
//! that produces it. Integer amounts leave this crate only as decimal strings
//! decoded with the token's own `decimals`.

use alloy_primitives::Address;
use gateway::{Gateway, GatewayError, TokenContract};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A contract read failed; the remote message is kept verbatim
    #[error("Failed to read token state: {0}")]
    ReadFailure(#[from] GatewayError),
}

/// Immutable snapshot of the token as seen by one holder.
///
/// `total_supply` and `balance` are already scaled by `decimals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub balance: String,
}

/// Reads token metadata, balances, allowances and the owner.
#[derive(Debug, Clone)]
pub struct TokenStateReader<G> {
    gateway: G,
}

impl<G> TokenStateReader<G>
where
    G: Gateway,
{
    pub const fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Load metadata and `holder`'s balance as one snapshot.
    ///
    /// The five reads run concurrently. If any of them fails the whole
    /// snapshot is discarded.
    pub async fn load_metadata_and_balance(&self, holder: Address) -> Result<TokenInfo, ReadError> {
        debug!(%holder, "Loading token state");

        let contract = self.gateway.read_handle();
        let (name, symbol, decimals, total_supply, balance) = tokio::try_join!(
            contract.name(),
            contract.symbol(),
            contract.decimals(),
            contract.total_supply(),
            contract.balance_of(holder),
        )?;

        Ok(TokenInfo {
            name,
            symbol,
            decimals,
            total_supply: units::decode(total_supply, decimals),
            balance: units::decode(balance, decimals),
        })
    }

    /// Load the contract owner. Failures are logged and reported as unknown.
    pub async fn load_owner(&self) -> Option<Address> {
        match self.gateway.read_handle().owner().await {
            Ok(owner) => Some(owner),
            Err(e) => {
                warn!(error = %e, "Failed to load owner");
                None
            }
        }
    }

    /// Current allowance `owner` granted `spender`, decoded with `decimals`.
    pub async fn check_allowance(
        &self,
        owner: Address,
        spender: Address,
        decimals: u8,
    ) -> Result<String, ReadError> {
        let allowance = self
            .gateway
            .read_handle()
            .allowance(owner, spender)
            .await?;
        Ok(units::decode(allowance, decimals))
    }
}
