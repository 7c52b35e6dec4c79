//! Send Native Task
//!
//! Transfers a fixed amount of the native coin, either to an address drawn
//! from the recipient pool or to one chosen by the user.

use super::TaskContext;
use crate::client::ChainTx;
use crate::utils::format::{format_amount, short_address, short_hash};
use crate::utils::RecipientPool;
use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{Task, TaskOutcome};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum SendTarget {
    /// Fresh uniform pick per attempt.
    Random(Arc<RecipientPool>),
    Fixed(Address),
}

#[derive(Debug, Clone)]
pub struct SendNativeTask {
    target: SendTarget,
    amount: U256,
}

impl SendNativeTask {
    pub fn new(target: SendTarget, amount: U256) -> Self {
        Self { target, amount }
    }
}

#[async_trait]
impl Task<TaskContext> for SendNativeTask {
    fn name(&self) -> &str {
        match self.target {
            SendTarget::Random(_) => "send_random",
            SendTarget::Fixed(_) => "send_to_address",
        }
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskOutcome> {
        if let Some(skipped) = ctx.balance_gate().await? {
            return Ok(skipped);
        }

        let recipient = match &self.target {
            SendTarget::Random(pool) => pool.pick(&mut rand::thread_rng()),
            SendTarget::Fixed(addr) => *addr,
        };

        ctx.log(format!(
            "Sending {} {} to {}...",
            format_amount(self.amount),
            ctx.config.native_symbol,
            short_address(&recipient)
        ));
        let tx_hash = ctx
            .client
            .submit(ChainTx::Transfer {
                to: recipient,
                value: self.amount,
            })
            .await
            .context("Transfer not sent")?;
        ctx.log(format!("Transaction sent. Tx Hash: {}", short_hash(&tx_hash)));

        ctx.client
            .wait_for_receipt(tx_hash)
            .await
            .context("Transfer not confirmed")?;

        ctx.refresh().await;

        Ok(TaskOutcome::Success(Some(format!("{:?}", tx_hash))))
    }
}
