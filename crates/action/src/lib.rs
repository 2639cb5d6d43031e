//! Token operations submitted from user-facing forms.
//!
//! Each form ([`TransferForm`], [`ApproveForm`], [`TransferFromForm`],
//! [`BurnForm`]) holds raw user input and knows how to validate it into a
//! [`TokenCall`]. The [`OperationExecutor`] drives the shared submit protocol:
//! validate, guard against re-entry, acquire the signing handle, submit,
//! await confirmation, then trigger a refresh.

pub mod approve;
pub mod burn;
pub mod executor;
pub mod input;
pub mod transfer;
pub mod transfer_from;

pub use approve::ApproveForm;
pub use burn::BurnForm;
pub use executor::{FormExecutors, OperationExecutor};
pub use transfer::TransferForm;
pub use transfer_from::TransferFromForm;

use alloy_primitives::{Address, TxHash, U256};
use gateway::{GatewayError, TokenContract};
use reader::{ReadError, TokenInfo};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use thiserror::Error;
use units::AmountError;

/// Callback asking the owner of the token snapshot to reload it.
///
/// This abstraction keeps operations independent of how and where the
/// snapshot is held.
pub type RefreshFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// A required input was left empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// An address input is malformed or fails its checksum
    #[error("Invalid {field} address: {input}")]
    InvalidAddress { field: &'static str, input: String },

    /// The amount does not parse under the token's decimals
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The amount must be positive for this operation
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// The amount exceeds the last known balance
    #[error("Amount {amount} exceeds balance {balance}")]
    InsufficientBalance { amount: String, balance: String },

    /// Another operation from the same form is still in flight
    #[error("Another operation from this form is still pending")]
    Busy,

    /// No wallet session to sign with
    #[error("Wallet is not connected")]
    WalletNotConnected,

    /// A read needed by the operation failed
    #[error(transparent)]
    ReadFailure(#[from] ReadError),

    /// Submission or confirmation failed; the remote message is kept verbatim
    #[error("{0}")]
    TransactionFailed(String),
}

impl OperationError {
    /// Whether this is a local amount validation failure.
    pub const fn is_invalid_amount(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::ZeroAmount | Self::InsufficientBalance { .. }
        )
    }

    /// Whether the error was detected without contacting the node or wallet.
    pub const fn is_local(&self) -> bool {
        !matches!(self, Self::TransactionFailed(_) | Self::ReadFailure(_))
    }
}

impl From<GatewayError> for OperationError {
    fn from(e: GatewayError) -> Self {
        Self::TransactionFailed(e.to_string())
    }
}

/// The four operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transfer,
    Approve,
    TransferFrom,
    Burn,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Approve => "approve",
            Self::TransferFrom => "transfer_from",
            Self::Burn => "burn",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// The wallet accepted and broadcast the transaction
    Submitted { kind: OperationKind, tx_hash: TxHash },
    /// The transaction was mined successfully
    Confirmed { kind: OperationKind, tx_hash: TxHash },
    /// The operation failed at any stage
    Failed { kind: OperationKind, reason: String },
}

impl OperationStatus {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Submitted { kind, .. } | Self::Confirmed { kind, .. } | Self::Failed { kind, .. } => {
                *kind
            }
        }
    }
}

/// A validated contract call with its amount already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Transfer {
        to: Address,
        amount: U256,
    },
    Approve {
        spender: Address,
        amount: U256,
    },
    TransferFrom {
        from: Address,
        to: Address,
        amount: U256,
    },
    Burn {
        amount: U256,
    },
}

impl TokenCall {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Transfer { .. } => OperationKind::Transfer,
            Self::Approve { .. } => OperationKind::Approve,
            Self::TransferFrom { .. } => OperationKind::TransferFrom,
            Self::Burn { .. } => OperationKind::Burn,
        }
    }

    pub const fn amount(&self) -> U256 {
        match self {
            Self::Transfer { amount, .. }
            | Self::Approve { amount, .. }
            | Self::TransferFrom { amount, .. }
            | Self::Burn { amount } => *amount,
        }
    }

    /// Send the matching contract call.
    pub async fn submit<C>(&self, contract: &C) -> Result<C::Pending, GatewayError>
    where
        C: TokenContract,
    {
        match *self {
            Self::Transfer { to, amount } => contract.transfer(to, amount).await,
            Self::Approve { spender, amount } => contract.approve(spender, amount).await,
            Self::TransferFrom { from, to, amount } => {
                contract.transfer_from(from, to, amount).await
            }
            Self::Burn { amount } => contract.burn(amount).await,
        }
    }

    /// Human-readable description using the token's units.
    pub fn description(&self, token: &TokenInfo) -> String {
        let amount = units::decode(self.amount(), token.decimals);
        match self {
            Self::Transfer { to, .. } => format!("Transfer {amount} {} to {to}", token.symbol),
            Self::Approve { spender, .. } => {
                format!("Approve {spender} to spend {amount} {}", token.symbol)
            }
            Self::TransferFrom { from, to, .. } => {
                format!("Transfer {amount} {} from {from} to {to}", token.symbol)
            }
            Self::Burn { .. } => format!("Burn {amount} {}", token.symbol),
        }
    }
}

/// A form that can be submitted through the [`OperationExecutor`].
pub trait Operation: Send {
    fn kind(&self) -> OperationKind;

    /// Validate the raw input against the current token snapshot.
    ///
    /// Nothing remote is touched here.
    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError>;

    /// Reset the inputs after a confirmed submission.
    fn clear(&mut self);
}

/// Any one of the four forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Transfer(TransferForm),
    Approve(ApproveForm),
    TransferFrom(TransferFromForm),
    Burn(BurnForm),
}

impl Operation for OperationRequest {
    fn kind(&self) -> OperationKind {
        match self {
            Self::Transfer(form) => form.kind(),
            Self::Approve(form) => form.kind(),
            Self::TransferFrom(form) => form.kind(),
            Self::Burn(form) => form.kind(),
        }
    }

    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError> {
        match self {
            Self::Transfer(form) => form.validate(token),
            Self::Approve(form) => form.validate(token),
            Self::TransferFrom(form) => form.validate(token),
            Self::Burn(form) => form.validate(token),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Transfer(form) => form.clear(),
            Self::Approve(form) => form.clear(),
            Self::TransferFrom(form) => form.clear(),
            Self::Burn(form) => form.clear(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use reader::TokenInfo;

    /// Snapshot of an 18-decimal token holding 2.5 TST.
    pub fn token() -> TokenInfo {
        TokenInfo {
            name: "Test Token".to_string(),
            symbol: "TST".to_string(),
            decimals: 18,
            total_supply: "1000".to_string(),
            balance: "2.5".to_string(),
        }
    }

    pub const RECIPIENT: &str = "0x5CFFA347b0aE99cc01E5c01714cA5658e54a23D1";
}
