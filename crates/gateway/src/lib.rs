//! Access to the token contract.
//!
//! This crate provides:
//! - [`TokenContract`]: the contract's call surface, read and write
//! - [`PendingTransaction`]: the two-stage (submitted, confirmed) result of a write
//! - [`Gateway`]: resolves read-only and signing handles
//! - [`ContractGateway`]: the alloy-backed implementation

mod contract;
mod gateway;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use contract::{ContractHandle, PendingCall};
pub use gateway::ContractGateway;

use alloy_primitives::{Address, TxHash, U256};
use client::WalletError;
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Error reported by the node or contract, verbatim
    #[error("{0}")]
    Remote(String),

    /// The transaction was mined but reverted
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    /// A write was attempted through a read-only handle
    #[error("Contract handle has no signing account")]
    ReadOnly,

    /// Error from the wallet connection
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Invalid endpoint configuration
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl From<alloy_contract::Error> for GatewayError {
    fn from(e: alloy_contract::Error) -> Self {
        Self::Remote(e.to_string())
    }
}

/// Outcome of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
}

/// A submitted transaction awaiting confirmation.
pub trait PendingTransaction: Send {
    /// Identifier available as soon as the wallet accepted the transaction.
    fn tx_hash(&self) -> TxHash;

    /// Wait until the transaction is mined. A revert is an error.
    fn confirmed(self) -> impl Future<Output = Result<Confirmation, GatewayError>> + Send;
}

/// The token contract's declared call surface.
pub trait TokenContract: Send + Sync {
    type Pending: PendingTransaction;

    /// Address of the contract.
    fn address(&self) -> Address;

    fn owner(&self) -> impl Future<Output = Result<Address, GatewayError>> + Send;

    fn name(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;

    fn symbol(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;

    fn decimals(&self) -> impl Future<Output = Result<u8, GatewayError>> + Send;

    fn total_supply(&self) -> impl Future<Output = Result<U256, GatewayError>> + Send;

    fn balance_of(&self, holder: Address)
        -> impl Future<Output = Result<U256, GatewayError>> + Send;

    fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<U256, GatewayError>> + Send;

    fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<Self::Pending, GatewayError>> + Send;

    fn approve(
        &self,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<Self::Pending, GatewayError>> + Send;

    fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<Self::Pending, GatewayError>> + Send;

    fn burn(&self, amount: U256) -> impl Future<Output = Result<Self::Pending, GatewayError>> + Send;
}

/// Source of contract handles.
pub trait Gateway: Send + Sync {
    type Contract: TokenContract;

    /// Handle for reads. Never fails here; connection problems surface on the
    /// first call.
    fn read_handle(&self) -> Self::Contract;

    /// Handle that can submit transactions, or `None` when no wallet session
    /// exists. Acquired fresh on every call.
    fn write_handle(
        &self,
    ) -> impl Future<Output = Result<Option<Self::Contract>, GatewayError>> + Send;
}
