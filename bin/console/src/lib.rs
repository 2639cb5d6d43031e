pub mod config;
pub mod display;
pub mod metrics;

use crate::{config::Config, metrics::Metrics};
use action::{
    ApproveForm, BurnForm, FormExecutors, OperationExecutor, OperationRequest, OperationStatus,
    RefreshFn, TransferForm, TransferFromForm,
};
use clap::{Parser, Subcommand};
use client::{EventSubscription, HttpWallet, Wallet, WalletEvent};
use gateway::ContractGateway;
use reader::TokenStateReader;
use session::SessionController;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

/// Token operations, shared by the command line and the watch prompt.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum OperationArgs {
    /// Send tokens to a recipient
    Transfer { recipient: String, amount: String },

    /// Allow a spender to move up to `amount` of your tokens
    Approve { spender: String, amount: String },

    /// Move tokens from `sender` to `recipient` using your allowance
    TransferFrom {
        sender: String,
        recipient: String,
        amount: String,
    },

    /// Destroy tokens from your balance
    Burn { amount: String },
}

impl From<OperationArgs> for OperationRequest {
    fn from(args: OperationArgs) -> Self {
        match args {
            OperationArgs::Transfer { recipient, amount } => {
                Self::Transfer(TransferForm::new(recipient, amount))
            }
            OperationArgs::Approve { spender, amount } => {
                Self::Approve(ApproveForm::new(spender, amount))
            }
            OperationArgs::TransferFrom {
                sender,
                recipient,
                amount,
            } => Self::TransferFrom(TransferFromForm::new(sender, recipient, amount)),
            OperationArgs::Burn { amount } => Self::Burn(BurnForm::new(amount)),
        }
    }
}

/// One line typed at the watch prompt.
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct Prompt {
    #[command(subcommand)]
    command: PromptCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum PromptCommand {
    /// Connect the wallet
    Connect,

    /// Reload token state
    Refresh,

    /// Show the allowance you granted `spender`
    Allowance { spender: String },

    #[command(flatten)]
    Operation(OperationArgs),

    /// Leave watch mode
    Quit,
}

/// Parse a prompt line.
pub fn parse_prompt(line: &str) -> Result<PromptCommand, clap::Error> {
    Prompt::try_parse_from(line.split_whitespace()).map(|prompt| prompt.command)
}

/// Wiring of the configured network, wallet and contract.
#[derive(Debug, Clone)]
pub struct Console {
    config: Config,
    network: ::config::NetworkConfig,
    wallet: Option<Wallet>,
    gateway: ContractGateway,
    metrics: Metrics,
}

impl Console {
    pub fn new(config: Config) -> eyre::Result<Self> {
        let network = config.network_config();
        network.validate()?;

        let wallet = match &config.wallet_url {
            Some(url) => Some(Wallet::new(HttpWallet::new(client::parse_url(url)?))),
            None => None,
        };
        let gateway = ContractGateway::new(&network, wallet.clone())?;

        info!(
            chain = %network.chain.chain_name,
            token = %network.token,
            read_endpoint = %gateway.read_endpoint(),
            wallet = wallet.is_some(),
            "Console configured"
        );

        Ok(Self {
            config,
            network,
            wallet,
            gateway,
            metrics: Metrics::new(),
        })
    }

    pub const fn network(&self) -> &::config::NetworkConfig {
        &self.network
    }

    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn reader(&self) -> TokenStateReader<ContractGateway> {
        TokenStateReader::new(self.gateway.clone())
    }

    /// Session controller whose token loads are counted in the metrics.
    pub fn controller(&self) -> SessionController<ContractGateway> {
        let metrics = self.metrics.clone();
        SessionController::new(
            self.reader(),
            self.wallet.clone(),
            self.network.chain.clone(),
        )
        .with_read_observer(Arc::new(move |ok| metrics.record_read(ok)))
    }

    pub fn executor(
        &self,
        status: UnboundedSender<OperationStatus>,
    ) -> OperationExecutor<ContractGateway> {
        OperationExecutor::new(self.gateway.clone(), status)
    }

    /// Executors for every form, sharing one status channel.
    pub fn form_executors(
        &self,
        status: UnboundedSender<OperationStatus>,
        refresh: RefreshFn,
    ) -> FormExecutors<ContractGateway> {
        FormExecutors::new(self.gateway.clone(), status, Some(refresh))
    }

    /// Start polling the wallet for changes, if one is configured.
    pub fn wallet_events(&self) -> Option<(EventSubscription, UnboundedReceiver<WalletEvent>)> {
        self.wallet
            .clone()
            .map(|wallet| client::subscribe(wallet, self.config.poll_interval()))
    }
}

/// Print a banner for every status event until the sender side closes.
pub async fn report_statuses(
    mut statuses: UnboundedReceiver<OperationStatus>,
    metrics: Metrics,
    chain: ::config::ChainConfig,
) {
    while let Some(status) = statuses.recv().await {
        metrics.record_status(&status);
        println!("{}", display::status_banner(&status, &chain));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        assert_eq!(parse_prompt("connect").unwrap(), PromptCommand::Connect);
        assert_eq!(
            parse_prompt("  burn   1.5 ").unwrap(),
            PromptCommand::Operation(OperationArgs::Burn {
                amount: "1.5".to_string()
            })
        );
        assert_eq!(
            parse_prompt("transfer-from 0xaa 0xbb 3").unwrap(),
            PromptCommand::Operation(OperationArgs::TransferFrom {
                sender: "0xaa".to_string(),
                recipient: "0xbb".to_string(),
                amount: "3".to_string(),
            })
        );
        assert!(parse_prompt("transfer 0xaa").is_err());
        assert!(parse_prompt("mint 5").is_err());
    }

    #[test]
    fn test_operation_args_into_request() {
        let request = OperationRequest::from(OperationArgs::Approve {
            spender: "0xaa".to_string(),
            amount: "1".to_string(),
        });
        assert_eq!(request, OperationRequest::Approve(ApproveForm::new("0xaa", "1")));
    }

    #[test]
    fn test_console_requires_token() {
        let err = Console::new(Config::default()).unwrap_err();
        assert!(err.to_string().contains("Token contract address"));
    }

    #[test]
    fn test_console_rejects_bad_wallet_url() {
        let config = Config {
            token: Some(alloy_primitives::Address::repeat_byte(1)),
            wallet_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(Console::new(config).is_err());
    }
}
