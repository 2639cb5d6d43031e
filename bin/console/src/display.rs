//! Text rendering of session state, token state and operation banners.

use action::{OperationKind, OperationStatus};
use config::ChainConfig;
use reader::TokenInfo;
use session::{short_address, SessionState, Snapshot};
use std::{
    fmt,
    time::{Duration, Instant},
};

/// How long a banner stays up in watch mode.
pub const BANNER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// A transient status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub tone: Tone,
    pub message: String,
    pub shown_at: Instant,
}

impl Banner {
    pub fn new(tone: Tone, message: impl Into<String>) -> Self {
        Self {
            tone,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= BANNER_TTL
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.tone {
            Tone::Info => "..",
            Tone::Success => "ok",
            Tone::Error => "!!",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Holds at most one banner and clears it once it expires.
#[derive(Debug, Default)]
pub struct BannerBoard {
    current: Option<Banner>,
}

impl BannerBoard {
    /// Replace the current banner.
    pub fn show(&mut self, banner: Banner) {
        self.current = Some(banner);
    }

    pub const fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }

    /// Drop the banner if it expired. Returns whether one was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|banner| banner.is_expired(now)) {
            self.current = None;
            return true;
        }
        false
    }
}

/// Banner for an operation status event.
pub fn status_banner(status: &OperationStatus, chain: &ChainConfig) -> Banner {
    match status {
        OperationStatus::Submitted { kind, tx_hash } => Banner::new(
            Tone::Info,
            format!("{} submitted: {}", label(*kind), chain.tx_url(tx_hash)),
        ),
        OperationStatus::Confirmed { kind, .. } => Banner::new(Tone::Success, success(*kind)),
        OperationStatus::Failed { kind, reason } => {
            Banner::new(Tone::Error, format!("{} failed: {reason}", label(*kind)))
        }
    }
}

const fn label(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Transfer => "Transfer",
        OperationKind::Approve => "Approval",
        OperationKind::TransferFrom => "Transfer from",
        OperationKind::Burn => "Burn",
    }
}

const fn success(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Transfer => "Transfer successful!",
        OperationKind::Approve => "Approval successful!",
        OperationKind::TransferFrom => "Transfer from successful!",
        OperationKind::Burn => "Tokens burned successfully!",
    }
}

pub fn render_session(snapshot: &Snapshot) -> String {
    match snapshot.state {
        SessionState::Disconnected => "Wallet: not connected".to_string(),
        SessionState::Connecting => "Wallet: connecting...".to_string(),
        SessionState::Connected(account) => format!("Wallet: {}", short_address(&account)),
    }
}

pub fn render_token(token: &TokenInfo) -> String {
    format!(
        "Token:        {} ({})\nDecimals:     {}\nTotal supply: {} {}\nBalance:      {} {}",
        token.name,
        token.symbol,
        token.decimals,
        units::group_thousands(&token.total_supply),
        token.symbol,
        units::group_thousands(&token.balance),
        token.symbol,
    )
}

/// Balance hint shown next to amount prompts.
pub fn available(token: &TokenInfo) -> String {
    format!("Available: {} {}", token.balance, token.symbol)
}

/// Full render of a snapshot.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut lines = vec![render_session(snapshot)];
    if let Some(owner) = snapshot.owner {
        lines.push(format!("Owner:        {owner}"));
    }
    if let Some(token) = &snapshot.token {
        lines.push(render_token(token));
    }
    if let Some(error) = &snapshot.error {
        lines.push(Banner::new(Tone::Error, error.to_string()).to_string());
    }
    lines.join("\n")
}
