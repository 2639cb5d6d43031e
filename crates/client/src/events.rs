//! Wallet change notifications.
//!
//! An HTTP wallet cannot push `accountsChanged` / `chainChanged`, so a
//! background task polls `eth_accounts` and `eth_chainId` and forwards every
//! change as a [`WalletEvent`]. Dropping the [`EventSubscription`] stops it.

use crate::Wallet;
use alloy_primitives::Address;
use std::time::Duration;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info};

/// A change reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The authorised account list changed; empty means the wallet disconnected
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another chain
    ChainChanged(u64),
}

/// Handle to a running wallet poller. The poller stops when this is dropped.
#[derive(Debug)]
pub struct EventSubscription {
    handle: JoinHandle<()>,
}

impl EventSubscription {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start watching `wallet` for account and chain changes.
///
/// The first poll only records a baseline; events are emitted for changes
/// after that. Poll failures are logged and skipped.
pub fn subscribe(
    wallet: Wallet,
    poll_interval: Duration,
) -> (EventSubscription, UnboundedReceiver<WalletEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(poll(wallet, poll_interval, tx));

    (EventSubscription { handle }, rx)
}

async fn poll(wallet: Wallet, poll_interval: Duration, tx: UnboundedSender<WalletEvent>) {
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut accounts: Option<Vec<Address>> = None;
    let mut chain_id: Option<u64> = None;

    loop {
        interval.tick().await;

        match wallet.accounts().await {
            Ok(current) => {
                if accounts.as_ref().is_some_and(|known| *known != current) {
                    info!(count = current.len(), "Wallet accounts changed");
                    if tx.send(WalletEvent::AccountsChanged(current.clone())).is_err() {
                        break;
                    }
                }
                accounts = Some(current);
            }
            Err(e) => debug!(error = %e, "Polling eth_accounts failed"),
        }

        match wallet.chain_id().await {
            Ok(current) => {
                if chain_id.is_some_and(|known| known != current) {
                    info!(chain_id = current, "Wallet chain changed");
                    if tx.send(WalletEvent::ChainChanged(current)).is_err() {
                        break;
                    }
                }
                chain_id = Some(current);
            }
            Err(e) => debug!(error = %e, "Polling eth_chainId failed"),
        }

        if tx.is_closed() {
            break;
        }
    }

    debug!("Wallet event poller stopped");
}
