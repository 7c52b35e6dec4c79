//! Claim Faucet Task
//!
//! Workflow:
//! 1. `isMinter(wallet)` on the token; already minted means Skipped
//! 2. Send `mint()` and wait for the receipt
//! 3. Let the node settle, then refresh the wallet snapshot

use super::{FaucetToken, TaskContext};
use crate::client::ChainTx;
use crate::utils::format::short_hash;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{cancellable_sleep, Task, TaskOutcome};

#[derive(Debug, Clone)]
pub struct ClaimFaucetTask {
    token: FaucetToken,
    name: String,
}

impl ClaimFaucetTask {
    pub fn new(token: FaucetToken) -> Self {
        Self {
            token,
            name: format!("claim_{}", token.to_string().to_lowercase()),
        }
    }
}

#[async_trait]
impl Task<TaskContext> for ClaimFaucetTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskOutcome> {
        let token_address = self.token.address(&ctx.config);

        let minted = ctx
            .client
            .has_minted(token_address)
            .await
            .with_context(|| format!("Failed to check {} minter status", self.token))?;
        if minted {
            return Ok(TaskOutcome::Skipped(format!(
                "{} faucet already claimed",
                self.token
            )));
        }

        ctx.log(format!("Claiming {} faucet...", self.token));
        let tx_hash = ctx
            .client
            .submit(ChainTx::Mint {
                token: token_address,
            })
            .await
            .with_context(|| format!("{} mint not sent", self.token))?;
        ctx.log(format!("Transaction sent. Tx Hash: {}", short_hash(&tx_hash)));

        ctx.client
            .wait_for_receipt(tx_hash)
            .await
            .with_context(|| format!("{} mint not confirmed", self.token))?;

        cancellable_sleep(ctx.config.claim_settle_delay(), &ctx.cancel).await;
        ctx.refresh().await;

        Ok(TaskOutcome::Success(Some(format!("{:?}", tx_hash))))
    }
}
