//! Wallet session and the token state shown for it.
//!
//! The [`SessionController`] owns one [`Snapshot`] and publishes every change
//! through a `tokio::sync::watch` channel. It is driven by explicit calls
//! ([`SessionController::connect`], [`SessionController::refresh`]) and by
//! [`SessionMessage`]s, which include the wallet's own change events.

mod controller;

pub use controller::{ReadObserver, SessionController, SessionHandle, SessionMessage};

use alloy_primitives::Address;
use client::WalletError;
use reader::{ReadError, TokenInfo};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No wallet is configured or it cannot be reached
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    /// The wallet could not be moved to the target network
    #[error("Please switch your wallet to {network}: {reason}")]
    NetworkMismatch { network: String, reason: String },

    /// The wallet authorised no account
    #[error("Wallet returned no accounts")]
    NoAccounts,

    /// Any other wallet error, verbatim
    #[error(transparent)]
    Wallet(WalletError),

    /// Loading token state failed
    #[error(transparent)]
    ReadFailure(#[from] ReadError),
}

impl From<WalletError> for SessionError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Transport(reason) => Self::WalletUnavailable(reason),
            e => Self::Wallet(e),
        }
    }
}

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected(Address),
}

impl SessionState {
    pub const fn account(&self) -> Option<Address> {
        match self {
            Self::Connected(account) => Some(*account),
            _ => None,
        }
    }

    pub const fn session(&self) -> Session {
        Session {
            account: self.account(),
            connected: matches!(self, Self::Connected(_)),
            connecting: matches!(self, Self::Connecting),
        }
    }
}

/// Flat view of [`SessionState`] for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub connected: bool,
    pub connecting: bool,
}

/// Everything the user surface renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub state: SessionState,
    /// Token state for the connected account
    pub token: Option<TokenInfo>,
    /// Contract owner, loaded regardless of the wallet
    pub owner: Option<Address>,
    /// Last session level error
    pub error: Option<SessionError>,
}

impl Snapshot {
    pub const fn session(&self) -> Session {
        self.state.session()
    }
}

/// `0x1234...abcd` form of an address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
