use crate::{SessionError, SessionState, Snapshot};
use alloy_primitives::Address;
use client::{Wallet, WalletEvent};
use config::ChainConfig;
use gateway::Gateway;
use reader::TokenStateReader;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};
use tracing::{debug, info, warn};

/// Requests the controller handles from its inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    Connect,
    Refresh,
}

/// Cloneable sender side of a controller's inbox.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    pub fn channel() -> (Self, UnboundedReceiver<SessionMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn connect(&self) {
        self.send(SessionMessage::Connect);
    }

    pub fn refresh(&self) {
        self.send(SessionMessage::Refresh);
    }

    /// A callback that requests a refresh, for operation executors.
    pub fn refresh_fn(&self) -> Arc<dyn Fn() + Send + Sync> {
        let handle = self.clone();
        Arc::new(move || handle.refresh())
    }

    fn send(&self, message: SessionMessage) {
        if self.tx.send(message).is_err() {
            debug!("Session controller stopped, message dropped");
        }
    }
}

/// Called with the outcome of every token state load.
pub type ReadObserver = Arc<dyn Fn(bool) + Send + Sync>;

/// Owns the wallet session and the token snapshot shown for it.
pub struct SessionController<G> {
    reader: TokenStateReader<G>,
    wallet: Option<Wallet>,
    chain: ChainConfig,
    snapshot: watch::Sender<Snapshot>,
    on_read: Option<ReadObserver>,
}

impl<G> std::fmt::Debug for SessionController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("wallet", &self.wallet)
            .field("chain_id", &self.chain.chain_id)
            .field("snapshot", &*self.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

impl<G> SessionController<G>
where
    G: Gateway,
{
    pub fn new(reader: TokenStateReader<G>, wallet: Option<Wallet>, chain: ChainConfig) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        Self {
            reader,
            wallet,
            chain,
            snapshot,
            on_read: None,
        }
    }

    pub fn with_read_observer(mut self, on_read: ReadObserver) -> Self {
        self.on_read = Some(on_read);
        self
    }

    pub const fn reader(&self) -> &TokenStateReader<G> {
        &self.reader
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Startup sequence: pick up an existing authorisation and load the owner.
    pub async fn start(&self) {
        self.restore().await;
        self.load_owner().await;
    }

    /// Enter `Connected` if the wallet already authorised an account.
    ///
    /// Never prompts the user.
    pub async fn restore(&self) {
        let Some(wallet) = &self.wallet else {
            self.record_error(SessionError::WalletUnavailable(
                "no wallet configured".to_string(),
            ));
            return;
        };

        match wallet.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&account) => {
                    info!(%account, "Restoring wallet session");
                    self.enter_connected(account).await;
                }
                None => debug!("Wallet has no authorised account"),
            },
            Err(e) => {
                warn!(error = %e, "Failed to check wallet accounts");
                self.record_error(e.into());
            }
        }
    }

    /// Move the wallet to the target network, ask for accounts and load the
    /// token state for the first one.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let Some(wallet) = &self.wallet else {
            let e = SessionError::WalletUnavailable("no wallet configured".to_string());
            self.record_error(e.clone());
            return Err(e);
        };

        self.snapshot.send_modify(|snapshot| {
            snapshot.state = SessionState::Connecting;
            snapshot.error = None;
        });

        match self.authorise(wallet).await {
            Ok(account) => {
                info!(%account, "Wallet connected");
                self.enter_connected(account).await;
                Ok(account)
            }
            Err(e) => {
                warn!(error = %e, "Wallet connection failed");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.state = SessionState::Disconnected;
                    snapshot.error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Reload token state for the connected account. No-op otherwise.
    pub async fn refresh(&self) {
        let account = self.snapshot.borrow().state.account();
        match account {
            Some(account) => self.load_token(account).await,
            None => debug!("Refresh requested without a wallet session"),
        }
    }

    /// Load the contract owner into the snapshot.
    pub async fn load_owner(&self) {
        let owner = self.reader.load_owner().await;
        self.snapshot.send_modify(|snapshot| snapshot.owner = owner);
    }

    /// Apply a wallet change notification.
    pub async fn handle_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                Some(&account) => {
                    info!(%account, "Active account changed");
                    self.enter_connected(account).await;
                }
                None => {
                    info!("Wallet disconnected");
                    self.snapshot.send_modify(|snapshot| {
                        snapshot.state = SessionState::Disconnected;
                        snapshot.token = None;
                    });
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                info!(chain_id, "Wallet network changed, resetting session");
                self.snapshot.send_replace(Snapshot::default());
                self.start().await;
            }
        }
    }

    pub async fn handle_message(&self, message: SessionMessage) {
        match message {
            SessionMessage::Connect => {
                // The outcome is recorded in the snapshot
                let _ = self.connect().await;
            }
            SessionMessage::Refresh => self.refresh().await,
        }
    }

    /// Serve `inbox` and wallet `events` until both are closed.
    ///
    /// Requests in the inbox are handled before wallet events.
    pub async fn run(
        &self,
        mut inbox: UnboundedReceiver<SessionMessage>,
        mut events: UnboundedReceiver<WalletEvent>,
    ) {
        loop {
            tokio::select! {
                biased;

                Some(message) = inbox.recv() => self.handle_message(message).await,
                Some(event) = events.recv() => self.handle_wallet_event(event).await,
                else => break,
            }
        }
        debug!("Session controller stopped");
    }

    async fn authorise(&self, wallet: &Wallet) -> Result<Address, SessionError> {
        self.ensure_network(wallet).await?;

        let accounts = wallet.request_accounts().await?;
        accounts.first().copied().ok_or(SessionError::NoAccounts)
    }

    async fn ensure_network(&self, wallet: &Wallet) -> Result<(), SessionError> {
        let current = wallet.chain_id().await?;
        if current == self.chain.chain_id {
            return Ok(());
        }

        info!(current, target = self.chain.chain_id, "Switching wallet network");
        let mismatch = |reason: String| SessionError::NetworkMismatch {
            network: self.chain.chain_name.clone(),
            reason,
        };

        match wallet.switch_chain(&self.chain).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                info!(chain = %self.chain.chain_name, "Wallet does not know the network, adding it");
                wallet
                    .add_chain(&self.chain)
                    .await
                    .map_err(|e| mismatch(e.to_string()))
            }
            Err(e) => Err(mismatch(e.to_string())),
        }
    }

    async fn enter_connected(&self, account: Address) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = SessionState::Connected(account);
            snapshot.error = None;
        });
        self.load_token(account).await;
    }

    async fn load_token(&self, account: Address) {
        let result = self.reader.load_metadata_and_balance(account).await;
        if let Some(on_read) = &self.on_read {
            on_read(result.is_ok());
        }

        self.snapshot.send_modify(|snapshot| {
            // The session may have moved on while the reads were in flight
            if snapshot.state != SessionState::Connected(account) {
                return;
            }
            match result {
                Ok(token) => snapshot.token = Some(token),
                Err(e) => {
                    warn!(%account, error = %e, "Failed to load token state");
                    snapshot.error = Some(e.into());
                }
            }
        });
    }

    fn record_error(&self, error: SessionError) {
        self.snapshot
            .send_modify(|snapshot| snapshot.error = Some(error));
    }
}
