//! Tasks Module - single-wallet executors
//!
//! Every executor implements [`core_logic::Task`] over [`TaskContext`] and
//! performs exactly one attempt of its operation for one wallet. Errors bubble
//! up as `anyhow` chains and are turned into [`TaskOutcome::Failed`] by
//! [`core_logic::execute_task`]; preconditions that are not met come back as
//! [`TaskOutcome::Skipped`].
//!
//! | Task | Operation |
//! |------|-----------|
//! | [`t01_claim_faucet`] | PING or PONG faucet `mint()` |
//! | [`t02_swap_ping_pong`] | approve + `exactInputSingle` in a random direction |
//! | [`t03_send_native`] | native transfer to a random or fixed recipient |

use crate::client::ChainClient;
use crate::config::SomniaConfig;
use crate::presenter::Presenter;
use crate::snapshot::SnapshotStore;
use crate::utils::format::format_amount;
use crate::wallet::WalletRecord;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use core_logic::config::short_proxy;
use core_logic::{Task, TaskOutcome};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod t01_claim_faucet;
pub mod t02_swap_ping_pong;
pub mod t03_send_native;

pub use t01_claim_faucet::ClaimFaucetTask;
pub use t02_swap_ping_pong::SwapPingPongTask;
pub use t03_send_native::{SendNativeTask, SendTarget};

pub type SomniaTask = dyn Task<TaskContext>;

/// The two faucet tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetToken {
    Ping,
    Pong,
}

impl FaucetToken {
    pub fn address(self, config: &SomniaConfig) -> Address {
        match self {
            FaucetToken::Ping => config.ping_token,
            FaucetToken::Pong => config.pong_token,
        }
    }

    pub fn other(self) -> Self {
        match self {
            FaucetToken::Ping => FaucetToken::Pong,
            FaucetToken::Pong => FaucetToken::Ping,
        }
    }
}

impl fmt::Display for FaucetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaucetToken::Ping => f.write_str("PING"),
            FaucetToken::Pong => f.write_str("PONG"),
        }
    }
}

/// Everything one task attempt needs. Cheap to clone.
#[derive(Clone)]
pub struct TaskContext {
    pub client: Arc<dyn ChainClient>,
    pub wallet: Arc<WalletRecord>,
    pub config: Arc<SomniaConfig>,
    pub presenter: Arc<dyn Presenter>,
    pub snapshots: Arc<SnapshotStore>,
    /// Cancellation of the batch this attempt belongs to. Only pauses observe it.
    pub cancel: CancellationToken,
}

impl TaskContext {
    pub fn address(&self) -> Address {
        self.client.address()
    }

    /// Log line prefixed with the wallet and its proxy.
    pub fn log(&self, message: impl AsRef<str>) {
        self.presenter.append_log(&wallet_line(&self.wallet, message.as_ref()));
    }

    pub async fn refresh(&self) {
        self.snapshots.refresh(self.client.as_ref(), &self.wallet).await;
    }

    /// `Some(Skipped)` when the native balance is under the configured gate.
    pub async fn balance_gate(&self) -> Result<Option<TaskOutcome>> {
        let balance = self
            .client
            .native_balance()
            .await
            .context("Failed to read native balance")?;
        if balance < self.config.min_balance_wei() {
            return Ok(Some(TaskOutcome::Skipped(format!(
                "Insufficient balance ({} {}, need {})",
                format_amount(balance),
                self.config.native_symbol,
                self.config.min_native_balance
            ))));
        }
        Ok(None)
    }
}

pub fn wallet_line(wallet: &WalletRecord, message: &str) -> String {
    format!(
        "Wallet {} (Proxy: {}): {}",
        wallet.label(),
        short_proxy(wallet.proxy.as_ref()),
        message
    )
}
