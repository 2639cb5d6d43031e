//! Command line front-end for an owned, burnable ERC-20 token.
//!
//! One-shot subcommands read or submit once and exit; `watch` keeps a session
//! open, follows wallet changes and accepts operations at a prompt.

use action::{input::parse_address, OperationError, OperationRequest};
use clap::{Parser, Subcommand};
use eyre::bail;
use session::{SessionHandle, Snapshot};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use token_console::{
    config::Config,
    display::{self, BannerBoard},
    metrics::install_prometheus_exporter,
    parse_prompt, report_statuses, Console, OperationArgs, PromptCommand,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "token-console")]
#[command(about = "Inspect and operate an ERC-20 token through a wallet")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "TOKEN_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Token contract address, overrides the configuration file
    #[arg(long, env = "TOKEN_ADDRESS")]
    token: Option<alloy_primitives::Address>,

    /// Fallback RPC url, overrides the configuration file
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Wallet bridge url, overrides the configuration file
    #[arg(long, env = "WALLET_URL")]
    wallet_url: Option<String>,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show token metadata and a balance
    Info {
        /// Holder to show; defaults to the connected account
        account: Option<String>,
    },

    /// Show the contract owner
    Owner,

    /// Connect the wallet, switching it to the target network if needed
    Connect,

    /// Show the allowance `owner` granted `spender`
    Allowance {
        spender: String,

        /// Defaults to the connected account
        #[arg(long)]
        owner: Option<String>,
    },

    #[command(flatten)]
    Operation(OperationArgs),

    /// Follow the wallet session and accept operations at a prompt
    Watch,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    // CLI flags override the file
    if cli.token.is_some() {
        config.token = cli.token;
    }
    if cli.rpc_url.is_some() {
        config.rpc_url = cli.rpc_url;
    }
    if cli.wallet_url.is_some() {
        config.wallet_url = cli.wallet_url;
    }
    if cli.metrics_port.is_some() {
        config.metrics_port = cli.metrics_port;
    }

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }

    let console = Console::new(config)?;

    match cli.command {
        Command::Info { account } => info(&console, account).await,
        Command::Owner => owner(&console).await,
        Command::Connect => connect(&console).await,
        Command::Allowance { spender, owner } => allowance(&console, spender, owner).await,
        Command::Operation(args) => operation(&console, args).await,
        Command::Watch => watch(&console).await,
    }
}

async fn info(console: &Console, account: Option<String>) -> eyre::Result<()> {
    if let Some(account) = account {
        let holder = parse_address("account", &account)?;
        let result = console.reader().load_metadata_and_balance(holder).await;
        console.metrics().record_read(result.is_ok());
        let token = result?;
        println!("Account:      {holder}");
        println!("{}", display::render_token(&token));
        return Ok(());
    }

    let snapshot = start_session(console).await;
    println!("{}", display::render_snapshot(&snapshot));
    Ok(())
}

async fn owner(console: &Console) -> eyre::Result<()> {
    match console.reader().load_owner().await {
        Some(owner) => println!("Owner: {owner}"),
        None => println!("Owner: unknown"),
    }
    Ok(())
}

async fn connect(console: &Console) -> eyre::Result<()> {
    let controller = console.controller();
    controller.connect().await?;
    controller.load_owner().await;

    let snapshot = controller.snapshot();
    record_snapshot(console, &snapshot);
    println!("{}", display::render_snapshot(&snapshot));
    Ok(())
}

async fn allowance(console: &Console, spender: String, owner: Option<String>) -> eyre::Result<()> {
    let spender = parse_address("spender", &spender)?;
    let reader = console.reader();

    let (owner, decimals, symbol) = match owner {
        Some(owner) => {
            let owner = parse_address("owner", &owner)?;
            let result = reader.load_metadata_and_balance(owner).await;
            console.metrics().record_read(result.is_ok());
            let token = result?;
            (owner, token.decimals, token.symbol)
        }
        None => {
            let snapshot = start_session(console).await;
            let (Some(owner), Some(token)) = (snapshot.state.account(), snapshot.token) else {
                bail!(OperationError::WalletNotConnected);
            };
            (owner, token.decimals, token.symbol)
        }
    };

    let allowance = reader.check_allowance(owner, spender, decimals).await?;
    println!("Allowance of {spender} from {owner}: {allowance} {symbol}");
    Ok(())
}

async fn operation(console: &Console, args: OperationArgs) -> eyre::Result<()> {
    let controller = console.controller();
    controller.start().await;
    let snapshot = controller.snapshot();
    record_snapshot(console, &snapshot);

    let (Some(account), Some(token)) = (snapshot.state.account(), snapshot.token.clone()) else {
        if let Some(error) = snapshot.error {
            bail!(error);
        }
        bail!(OperationError::WalletNotConnected);
    };
    println!("{}", display::render_session(&snapshot));

    let mut request = OperationRequest::from(args);
    if matches!(
        request,
        OperationRequest::Transfer(_) | OperationRequest::Burn(_)
    ) {
        println!("{}", display::available(&token));
    }

    let (handle, mut inbox) = SessionHandle::channel();
    let (status_tx, statuses) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_statuses(
        statuses,
        console.metrics().clone(),
        console.network().chain.clone(),
    ));

    let executor = console
        .executor(status_tx)
        .with_refresh(handle.refresh_fn());
    let result = executor.execute(&mut request, &token).await;
    drop(executor);
    reporter.await?;
    result?;

    while let Ok(message) = inbox.try_recv() {
        controller.handle_message(message).await;
    }

    if let OperationRequest::Approve(form) = &request {
        let allowance = form
            .check_allowance(controller.reader(), account, &token)
            .await?;
        println!("Allowance for {}: {allowance} {}", form.spender, token.symbol);
    }

    let snapshot = controller.snapshot();
    record_snapshot(console, &snapshot);
    if let Some(token) = &snapshot.token {
        println!("{}", display::render_token(token));
    }
    Ok(())
}

async fn watch(console: &Console) -> eyre::Result<()> {
    let controller = Arc::new(console.controller());
    let (handle, inbox) = SessionHandle::channel();

    // Without a wallet the event channel is closed from the start
    let (_subscription, events) = match console.wallet_events() {
        Some((subscription, events)) => (Some(subscription), events),
        None => (None, mpsc::unbounded_channel().1),
    };

    controller.start().await;
    let mut snapshots = controller.subscribe();
    let snapshot = snapshots.borrow_and_update().clone();
    record_snapshot(console, &snapshot);
    println!("{}", display::render_snapshot(&snapshot));

    let runner = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.run(inbox, events).await })
    };

    let (status_tx, mut statuses) = mpsc::unbounded_channel();
    let executors = Arc::new(console.form_executors(status_tx, handle.refresh_fn()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut board = BannerBoard::default();
    let mut tick = time::interval(Duration::from_secs(1));

    println!("Commands: connect, refresh, allowance, transfer, approve, transfer-from, burn, quit");

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                record_snapshot(console, &snapshot);
                println!("{}", display::render_snapshot(&snapshot));
            }
            Some(status) = statuses.recv() => {
                console.metrics().record_status(&status);
                let banner = display::status_banner(&status, &console.network().chain);
                println!("{banner}");
                board.show(banner);
            }
            _ = tick.tick() => {
                if board.expire(Instant::now()) {
                    println!("[--]");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match parse_prompt(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };

                match command {
                    PromptCommand::Quit => break,
                    PromptCommand::Connect => handle.connect(),
                    PromptCommand::Refresh => handle.refresh(),
                    PromptCommand::Allowance { spender } => {
                        let snapshot = controller.snapshot();
                        let (Some(owner), Some(token)) = (snapshot.state.account(), snapshot.token) else {
                            println!("{}", OperationError::WalletNotConnected);
                            continue;
                        };
                        let form = action::ApproveForm::new(spender, "");
                        match form.check_allowance(controller.reader(), owner, &token).await {
                            Ok(allowance) => println!("Allowance: {allowance} {}", token.symbol),
                            Err(e) => println!("{e}"),
                        }
                    }
                    PromptCommand::Operation(args) => {
                        let Some(token) = controller.snapshot().token else {
                            println!("{}", OperationError::WalletNotConnected);
                            continue;
                        };
                        let mut request = OperationRequest::from(args);
                        if matches!(request, OperationRequest::Transfer(_) | OperationRequest::Burn(_)) {
                            println!("{}", display::available(&token));
                        }

                        let executors = executors.clone();
                        tokio::spawn(async move {
                            // Failures are reported through the status channel
                            let _ = executors.execute(&mut request, &token).await;
                        });
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    runner.abort();
    Ok(())
}

/// Restore any existing session and load the owner, for read-only commands.
async fn start_session(console: &Console) -> Snapshot {
    let controller = console.controller();
    controller.start().await;
    let snapshot = controller.snapshot();
    record_snapshot(console, &snapshot);
    if snapshot.error.is_some() {
        warn!("Session started with errors");
    }
    snapshot
}

fn record_snapshot(console: &Console, snapshot: &Snapshot) {
    let metrics = console.metrics();
    metrics.set_connected(snapshot.session().connected);
    if let Some(token) = &snapshot.token {
        metrics.set_balance(token);
    }
}
