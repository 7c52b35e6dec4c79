//! Swap PING <-> PONG Task
//!
//! Workflow:
//! 1. Native balance gate
//! 2. Random direction, random whole-token amount
//! 3. Unlimited `approve` of the input token to the router, wait for receipt
//! 4. `exactInputSingle` with no slippage bound, wait for receipt
//! 5. Refresh the wallet snapshot

use super::{FaucetToken, TaskContext};
use crate::client::{ChainTx, SwapParams};
use crate::utils::format::short_hash;
use alloy_primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{Task, TaskOutcome};
use rand::Rng;

const TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Clone)]
pub struct SwapPingPongTask {
    round: usize,
    total: usize,
}

impl SwapPingPongTask {
    /// `round` is 1-based and only used in log lines.
    pub fn new(round: usize, total: usize) -> Self {
        Self { round, total }
    }
}

/// Whole tokens scaled to 18 decimals.
pub fn token_units(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

#[async_trait]
impl Task<TaskContext> for SwapPingPongTask {
    fn name(&self) -> &str {
        "swap_ping_pong"
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskOutcome> {
        if let Some(skipped) = ctx.balance_gate().await? {
            return Ok(skipped);
        }

        let (token_in, whole) = {
            let mut rng = rand::thread_rng();
            let token_in = if rng.gen_bool(0.5) {
                FaucetToken::Ping
            } else {
                FaucetToken::Pong
            };
            let whole = rng.gen_range(ctx.config.swap_amount_min..=ctx.config.swap_amount_max);
            (token_in, whole)
        };
        let token_out = token_in.other();
        let amount_in = token_units(whole);
        let router = ctx.config.swap_router;

        ctx.log(format!(
            "Swap {}/{}: approving {} for router...",
            self.round, self.total, token_in
        ));
        let approve_hash = ctx
            .client
            .submit(ChainTx::Approve {
                token: token_in.address(&ctx.config),
                spender: router,
                amount: U256::MAX,
            })
            .await
            .context("Approval failed")?;
        ctx.client
            .wait_for_receipt(approve_hash)
            .await
            .context("Approval failed")?;
        ctx.log(format!("Approval confirmed: {}", short_hash(&approve_hash)));

        ctx.log(format!(
            "Swap {}/{}: {} {} -> {}",
            self.round, self.total, whole, token_in, token_out
        ));
        let swap_hash = ctx
            .client
            .submit(ChainTx::Swap {
                router,
                params: SwapParams {
                    token_in: token_in.address(&ctx.config),
                    token_out: token_out.address(&ctx.config),
                    fee: ctx.config.swap_fee_tier,
                    recipient: ctx.address(),
                    amount_in,
                    amount_out_minimum: U256::ZERO,
                },
            })
            .await
            .context("Swap failed")?;
        ctx.log(format!("Swap TX sent: {}", short_hash(&swap_hash)));

        ctx.client
            .wait_for_receipt(swap_hash)
            .await
            .context("Swap failed")?;

        ctx.refresh().await;

        Ok(TaskOutcome::Success(Some(format!("{:?}", swap_hash))))
    }
}
