use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use core_logic::{setup_logger, ProxyManager, WalletManager};
use dotenv::dotenv;
use somnia_bot::menu::{parse_amount, parse_count, parse_recipient, run_menu};
use somnia_bot::{
    build_records, BatchRequest, BatchStatus, ConsolePresenter, FaucetToken, Orchestrator,
    SomniaClientFactory, SomniaConfig,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Somnia testnet faucet / swap / send bot", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/somnia/config/config.toml")]
    config: String,
    /// Run one batch and exit instead of opening the menu
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Claim one faucet token for one wallet
    Claim {
        #[arg(long, value_enum)]
        token: TokenArg,
        /// 1-based wallet number
        #[arg(long)]
        wallet: Option<usize>,
    },
    /// Faucet pass over all wallets, then swap PING/PONG `count` times per wallet
    Swap {
        #[arg(long, default_value = "1")]
        count: String,
    },
    /// Send `amount` native coin `count` times per wallet to random recipients
    SendRandom {
        #[arg(long)]
        count: String,
        #[arg(long)]
        amount: String,
    },
    /// Send `amount` native coin from one wallet to one address
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        wallet: Option<usize>,
    },
    /// Show balances of one wallet
    Status {
        #[arg(long)]
        wallet: Option<usize>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TokenArg {
    Ping,
    Pong,
}

impl From<TokenArg> for FaucetToken {
    fn from(arg: TokenArg) -> Self {
        match arg {
            TokenArg::Ping => FaucetToken::Ping,
            TokenArg::Pong => FaucetToken::Pong,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match SomniaConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:#}", e);
            return Ok(());
        }
    };

    let wallets = WalletManager::load(&config.wallet_file);
    let proxies = ProxyManager::load_proxies(&config.proxy_file);
    let records = build_records(&wallets, &proxies);
    info!(
        "Loaded {} wallets and {} proxies for {} ({})",
        records.len(),
        proxies.iter().flatten().count(),
        config.network_name,
        config.rpc_url
    );

    let factory = Arc::new(SomniaClientFactory::new(config.rpc_url.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        config,
        records,
        factory,
        Arc::new(ConsolePresenter),
    ));

    // first Ctrl+C stops running batches, the second one leaves
    let signals = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signals.log("Ctrl+C received. Stopping running tasks...");
            signals.stop_all();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    match args.command {
        None => run_menu(orchestrator).await,
        Some(command) => run_command(&orchestrator, command).await,
    }
}

async fn select(orchestrator: &Orchestrator, wallet: Option<usize>) -> Result<()> {
    if let Some(number) = wallet {
        if number == 0 || !orchestrator.select_wallet(number - 1).await {
            bail!("Wallet {} does not exist", number);
        }
    }
    Ok(())
}

async fn run_command(orchestrator: &Orchestrator, command: Command) -> Result<()> {
    let request = match command {
        Command::Status { wallet } => {
            select(orchestrator, wallet).await?;
            if wallet.is_none() {
                orchestrator.refresh().await;
            }
            return Ok(());
        }
        Command::Claim { token, wallet } => {
            select(orchestrator, wallet).await?;
            BatchRequest::ClaimFaucet {
                token: token.into(),
            }
        }
        Command::Swap { count } => BatchRequest::Swap {
            repetitions: parse_count(&count)?,
        },
        Command::SendRandom { count, amount } => {
            let amount = parse_amount(&amount)?;
            orchestrator.config().check_random_send(amount)?;
            BatchRequest::SendRandom {
                repetitions: parse_count(&count)?,
                amount,
            }
        }
        Command::Send { to, amount, wallet } => {
            select(orchestrator, wallet).await?;
            BatchRequest::SendTo {
                recipient: parse_recipient(&to)?,
                amount: parse_amount(&amount)?,
            }
        }
    };

    let report = orchestrator.start_batch(request).await;
    if let BatchStatus::Aborted(reason) = report.status {
        bail!("{} aborted: {}", report.family, reason);
    }
    Ok(())
}
