//! Batch Orchestrator
//!
//! Walks wallets in list order and, per wallet, repetitions in order, running
//! one executor attempt at a time. Cancellation is observed before every
//! executor call and by every pause; an executor that is already running is
//! always allowed to finish, so a submitted transaction is never abandoned.
//!
//! Each batch holds its family's [`BatchLease`] for its whole lifetime. The
//! lease is released on every exit path, including top-level errors, which
//! turn into [`BatchStatus::Aborted`].

use crate::client::ClientFactory;
use crate::config::{DelayRange, SomniaConfig};
use crate::presenter::Presenter;
use crate::run_state::{BatchLease, RunState, TaskFamily};
use crate::snapshot::{SnapshotStore, WalletSnapshot};
use crate::tasks::{
    wallet_line, ClaimFaucetTask, FaucetToken, SendNativeTask, SendTarget, SomniaTask,
    SwapPingPongTask, TaskContext,
};
use crate::utils::format::{format_amount, short_address};
use crate::utils::RecipientPool;
use crate::wallet::WalletRecord;
use alloy_primitives::{Address, U256};
use anyhow::Result;
use core_logic::{
    cancellable_sleep, execute_task, ConfigError, CoreError, OutcomeTally, Task, TaskOutcome,
    WalletError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A user request for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    /// One faucet claim for the selected wallet.
    ClaimFaucet { token: FaucetToken },
    /// Faucet pass over all wallets, then `repetitions` swaps per wallet.
    Swap { repetitions: usize },
    SendRandom { repetitions: usize, amount: U256 },
    /// One transfer from the selected wallet.
    SendTo { recipient: Address, amount: U256 },
}

impl BatchRequest {
    pub fn family(&self) -> TaskFamily {
        match self {
            BatchRequest::ClaimFaucet { .. } => TaskFamily::Faucet,
            BatchRequest::Swap { .. } => TaskFamily::Swap,
            BatchRequest::SendRandom { .. } | BatchRequest::SendTo { .. } => TaskFamily::Send,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    Cancelled,
    /// The family was already running; nothing happened.
    Rejected,
    Aborted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletOutcome {
    pub index: usize,
    pub task: String,
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub family: TaskFamily,
    pub status: BatchStatus,
    pub outcomes: Vec<WalletOutcome>,
    /// Faucet claims made ahead of a swap batch.
    pub prelude: Vec<WalletOutcome>,
}

impl BatchReport {
    fn new(family: TaskFamily, status: BatchStatus) -> Self {
        Self {
            family,
            status,
            outcomes: Vec::new(),
            prelude: Vec::new(),
        }
    }

    fn push(&mut self, index: usize, task: &str, outcome: TaskOutcome) {
        self.outcomes.push(WalletOutcome {
            index,
            task: task.to_string(),
            outcome,
        });
    }

    pub fn tally(&self) -> OutcomeTally {
        let mut tally = OutcomeTally::default();
        for entry in &self.outcomes {
            tally.record(&entry.outcome);
        }
        tally
    }

    /// Outcomes of one wallet, in execution order.
    pub fn for_wallet(&self, index: usize) -> Vec<&TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|entry| entry.index == index)
            .map(|entry| &entry.outcome)
            .collect()
    }
}

enum Flow {
    Finished,
    Cancelled,
}

pub struct Orchestrator {
    config: Arc<SomniaConfig>,
    wallets: Vec<Arc<WalletRecord>>,
    factory: Arc<dyn ClientFactory>,
    presenter: Arc<dyn Presenter>,
    run_state: Arc<RunState>,
    snapshots: Arc<SnapshotStore>,
    current: AtomicUsize,
}

impl Orchestrator {
    pub fn new(
        config: SomniaConfig,
        wallets: Vec<WalletRecord>,
        factory: Arc<dyn ClientFactory>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let config = Arc::new(config);
        let snapshots = Arc::new(SnapshotStore::new(
            config.clone(),
            wallets.len(),
            presenter.clone(),
        ));
        Self {
            config,
            wallets: wallets.into_iter().map(Arc::new).collect(),
            factory,
            presenter,
            run_state: Arc::new(RunState::new()),
            snapshots,
            current: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &SomniaConfig {
        &self.config
    }

    pub fn run_state(&self) -> &Arc<RunState> {
        &self.run_state
    }

    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    pub fn current_index(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Option<WalletSnapshot> {
        self.snapshots.current()
    }

    pub fn log(&self, message: impl AsRef<str>) {
        self.presenter.append_log(message.as_ref());
    }

    /// Runs one batch to completion, cancellation or abort.
    pub async fn start_batch(&self, request: BatchRequest) -> BatchReport {
        let family = request.family();

        let Some(lease) = self.run_state.try_lease(family) else {
            self.log(format!("{} is already running.", family));
            return BatchReport::new(family, BatchStatus::Rejected);
        };

        // the faucet pass in front of swapping runs as the faucet family
        let prelude = match family {
            TaskFamily::Swap => {
                match self
                    .run_state
                    .try_lease_under(TaskFamily::Faucet, lease.token())
                {
                    Some(prelude) => Some(prelude),
                    None => {
                        self.log("Faucet is already running. Auto Swap not started.");
                        return BatchReport::new(family, BatchStatus::Rejected);
                    }
                }
            }
            _ => None,
        };

        self.presenter.set_menu_state(family, true);
        let mut report = BatchReport::new(family, BatchStatus::Completed);

        let result = match request {
            BatchRequest::ClaimFaucet { token } => {
                self.run_single_claim(&lease, token, &mut report).await
            }
            BatchRequest::Swap { repetitions } => {
                self.run_swap_batch(&lease, prelude, repetitions, &mut report)
                    .await
            }
            BatchRequest::SendRandom {
                repetitions,
                amount,
            } => {
                self.run_send_random(&lease, repetitions, amount, &mut report)
                    .await
            }
            BatchRequest::SendTo { recipient, amount } => {
                self.run_send_to(&lease, recipient, amount, &mut report)
                    .await
            }
        };

        report.status = match result {
            Ok(Flow::Finished) => BatchStatus::Completed,
            Ok(Flow::Cancelled) => BatchStatus::Cancelled,
            Err(e) => {
                self.log(format!("{} Failed: {:#}", family, e));
                BatchStatus::Aborted(format!("{:#}", e))
            }
        };

        drop(lease);
        self.presenter.set_menu_state(family, false);

        let tally = report.tally();
        self.log(format!(
            "{} done ({:?}): {} success, {} skipped, {} failed",
            family, report.status, tally.success, tally.skipped, tally.failed
        ));
        report
    }

    /// Asks a running family to stop at its next safe point.
    pub fn request_stop(&self, family: TaskFamily) -> bool {
        let requested = self.run_state.request_cancel(family);
        if requested {
            self.log(format!("Stopping {}...", family));
        } else {
            self.log(format!("{} is not running.", family));
        }
        requested
    }

    pub fn stop_all(&self) {
        for family in TaskFamily::ALL {
            if self.run_state.is_running(family) {
                self.request_stop(family);
            }
        }
    }

    /// `index` is 0-based. Out of range is logged and ignored.
    pub async fn select_wallet(&self, index: usize) -> bool {
        if index >= self.wallets.len() {
            let err = WalletError::NotFound {
                index,
                total: self.wallets.len(),
            };
            self.log(format!("Invalid wallet number: {}", err));
            return false;
        }
        self.current.store(index, Ordering::Release);
        self.log(format!(
            "Switched to wallet {}/{}",
            index + 1,
            self.wallets.len()
        ));
        self.refresh().await;
        true
    }

    pub async fn next_wallet(&self) {
        if self.wallets.is_empty() {
            self.log("No wallets loaded.");
            return;
        }
        let next = (self.current_index() + 1) % self.wallets.len();
        self.select_wallet(next).await;
    }

    /// Re-reads balances of the selected wallet.
    pub async fn refresh(&self) {
        let Some(wallet) = self.wallets.get(self.current_index()) else {
            self.log("No wallets loaded.");
            return;
        };
        match self.factory.connect(wallet).await {
            Ok(client) => self.snapshots.refresh(client.as_ref(), wallet).await,
            Err(e) => self.log(wallet_line(
                wallet,
                &format!("Cannot fetch wallet data: {:#}", e),
            )),
        }
    }

    fn require_wallets(&self) -> Result<(), ConfigError> {
        if self.wallets.is_empty() {
            return Err(ConfigError::NoWallets {
                path: self.config.wallet_file.clone(),
            });
        }
        Ok(())
    }

    fn current_wallet(&self) -> Result<Arc<WalletRecord>, CoreError> {
        self.require_wallets()?;
        let index = self.current_index();
        self.wallets
            .get(index)
            .cloned()
            .ok_or_else(|| {
                WalletError::NotFound {
                    index,
                    total: self.wallets.len(),
                }
                .into()
            })
    }

    async fn open_session(
        &self,
        wallet: &Arc<WalletRecord>,
        cancel: &CancellationToken,
    ) -> Result<TaskContext> {
        let client = self.factory.connect(wallet).await?;
        Ok(TaskContext {
            client,
            wallet: wallet.clone(),
            config: self.config.clone(),
            presenter: self.presenter.clone(),
            snapshots: self.snapshots.clone(),
            cancel: cancel.clone(),
        })
    }

    /// Session for `wallet`, or the `Failed` outcome that ends its segment.
    async fn open_or_fail(
        &self,
        wallet: &Arc<WalletRecord>,
        cancel: &CancellationToken,
    ) -> Result<TaskContext, TaskOutcome> {
        self.open_session(wallet, cancel).await.map_err(|e| {
            let outcome = TaskOutcome::from_error(&e);
            self.log(wallet_line(wallet, &outcome.to_string()));
            outcome
        })
    }

    async fn run_task(&self, task: &SomniaTask, ctx: TaskContext) -> TaskOutcome {
        let wallet = ctx.wallet.clone();
        let outcome = execute_task(task, ctx).await;
        self.log(wallet_line(&wallet, &format!("[{}] {}", task.name(), outcome)));
        outcome
    }

    async fn run_single_claim(
        &self,
        lease: &BatchLease<'_>,
        token: FaucetToken,
        report: &mut BatchReport,
    ) -> Result<Flow> {
        let wallet = self.current_wallet()?;
        let task = ClaimFaucetTask::new(token);
        let outcome = match self.open_or_fail(&wallet, lease.token()).await {
            Ok(ctx) => self.run_task(&task, ctx).await,
            Err(outcome) => outcome,
        };
        report.push(wallet.index, task.name(), outcome);
        Ok(finished_unless(lease.token()))
    }

    /// One claim of each token for every wallet, in order.
    async fn faucet_pass(&self, cancel: &CancellationToken, out: &mut Vec<WalletOutcome>) {
        self.log("Starting automatic faucet claims for all wallets...");
        for wallet in &self.wallets {
            if cancel.is_cancelled() {
                self.log("Automatic faucet claim Cancelled.");
                return;
            }
            let ctx = match self.open_or_fail(wallet, cancel).await {
                Ok(ctx) => ctx,
                Err(outcome) => {
                    out.push(WalletOutcome {
                        index: wallet.index,
                        task: "connect".to_string(),
                        outcome,
                    });
                    continue;
                }
            };
            for token in [FaucetToken::Ping, FaucetToken::Pong] {
                if cancel.is_cancelled() {
                    self.log("Automatic faucet claim Cancelled.");
                    return;
                }
                let task = ClaimFaucetTask::new(token);
                let outcome = self.run_task(&task, ctx.clone()).await;
                out.push(WalletOutcome {
                    index: wallet.index,
                    task: task.name().to_string(),
                    outcome,
                });
                cancellable_sleep(self.config.faucet_step_delay(), cancel).await;
            }
        }
        self.log("Automatic faucet claim finished.");
    }

    async fn run_swap_batch(
        &self,
        lease: &BatchLease<'_>,
        prelude: Option<BatchLease<'_>>,
        repetitions: usize,
        report: &mut BatchReport,
    ) -> Result<Flow> {
        self.require_wallets()?;

        if let Some(prelude) = prelude {
            self.presenter.set_menu_state(TaskFamily::Faucet, true);
            self.faucet_pass(prelude.token(), &mut report.prelude).await;
            drop(prelude);
            self.presenter.set_menu_state(TaskFamily::Faucet, false);
        }
        // a faucet stop only cancels the prelude's child token
        if lease.is_cancelled() {
            self.log(format!("{} Cancelled.", TaskFamily::Swap));
            return Ok(Flow::Cancelled);
        }

        self.log(format!(
            "Starting Auto Swap: {} wallets, {} swaps each.",
            self.wallets.len(),
            repetitions
        ));
        self.repeat_per_wallet(
            lease.token(),
            repetitions,
            self.config.swap_delay_ms,
            report,
            |round| Box::new(SwapPingPongTask::new(round, repetitions)) as Box<SomniaTask>,
        )
        .await
    }

    async fn run_send_random(
        &self,
        lease: &BatchLease<'_>,
        repetitions: usize,
        amount: U256,
        report: &mut BatchReport,
    ) -> Result<Flow> {
        self.require_wallets()?;
        self.config.check_random_send(amount)?;
        let pool = Arc::new(RecipientPool::load(&self.config.recipient_file)?);

        self.log(format!(
            "Starting Send Token: {} wallets, {} sends of {} {} each to {} recipients.",
            self.wallets.len(),
            repetitions,
            format_amount(amount),
            self.config.native_symbol,
            pool.len()
        ));
        self.repeat_per_wallet(
            lease.token(),
            repetitions,
            self.config.send_delay_ms,
            report,
            |_| {
                Box::new(SendNativeTask::new(SendTarget::Random(pool.clone()), amount))
                    as Box<SomniaTask>
            },
        )
        .await
    }

    async fn run_send_to(
        &self,
        lease: &BatchLease<'_>,
        recipient: Address,
        amount: U256,
        report: &mut BatchReport,
    ) -> Result<Flow> {
        let wallet = self.current_wallet()?;
        self.log(format!(
            "Sending {} {} to {}",
            format_amount(amount),
            self.config.native_symbol,
            short_address(&recipient)
        ));
        let task = SendNativeTask::new(SendTarget::Fixed(recipient), amount);
        let outcome = match self.open_or_fail(&wallet, lease.token()).await {
            Ok(ctx) => self.run_task(&task, ctx).await,
            Err(outcome) => outcome,
        };
        report.push(wallet.index, task.name(), outcome);
        Ok(finished_unless(lease.token()))
    }

    /// Shared wallet x repetition loop of the swap and random-send batches.
    ///
    /// The native balance is checked once per wallet; a wallet under the gate
    /// yields one `Skipped` and its repetitions never start.
    async fn repeat_per_wallet<F>(
        &self,
        cancel: &CancellationToken,
        repetitions: usize,
        pause: DelayRange,
        report: &mut BatchReport,
        make_task: F,
    ) -> Result<Flow>
    where
        F: Fn(usize) -> Box<SomniaTask> + Send + Sync,
    {
        let family = report.family;

        for wallet in &self.wallets {
            if cancel.is_cancelled() {
                self.log(format!("{} Cancelled.", family));
                return Ok(Flow::Cancelled);
            }

            let ctx = match self.open_or_fail(wallet, cancel).await {
                Ok(ctx) => ctx,
                Err(outcome) => {
                    report.push(wallet.index, "connect", outcome);
                    continue;
                }
            };

            match ctx.balance_gate().await {
                Ok(None) => {}
                Ok(Some(skipped)) => {
                    ctx.log(skipped.to_string());
                    report.push(wallet.index, "balance_gate", skipped);
                    continue;
                }
                Err(e) => {
                    let outcome = TaskOutcome::from_error(&e);
                    ctx.log(outcome.to_string());
                    report.push(wallet.index, "balance_gate", outcome);
                    continue;
                }
            }

            ctx.log(format!("Starting {} x{}", family, repetitions));
            for round in 1..=repetitions {
                if cancel.is_cancelled() {
                    ctx.log(format!("{} Cancelled.", family));
                    return Ok(Flow::Cancelled);
                }

                let task = make_task(round);
                let outcome = self.run_task(task.as_ref(), ctx.clone()).await;
                report.push(wallet.index, task.name(), outcome);

                if round < repetitions {
                    let wait = pause.sample(&mut rand::thread_rng());
                    ctx.log(format!(
                        "Waiting {:.1}s before the next round...",
                        wait.as_secs_f64()
                    ));
                    cancellable_sleep(wait, cancel).await;
                }
            }
            ctx.log(format!("{} finished for this wallet.", family));
        }
        Ok(Flow::Finished)
    }
}

fn finished_unless(cancel: &CancellationToken) -> Flow {
    if cancel.is_cancelled() {
        Flow::Cancelled
    } else {
        Flow::Finished
    }
}
