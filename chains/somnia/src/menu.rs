//! Interactive menu.
//!
//! Prompts run on the blocking pool so the runtime keeps driving batches while
//! the user is choosing. Every batch is spawned; the menu never waits for one.

use crate::orchestrator::{BatchReport, BatchRequest, Orchestrator};
use crate::run_state::{RunState, TaskFamily};
use crate::tasks::FaucetToken;
use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    AutoSwap,
    Claim(FaucetToken),
    SendRandom,
    SendTo,
    Stop(TaskFamily),
    Refresh,
    NextWallet,
    SelectWallet,
    Exit,
}

impl MenuItem {
    /// Family this item would start, if any.
    fn starts(self) -> Option<TaskFamily> {
        match self {
            MenuItem::AutoSwap => Some(TaskFamily::Swap),
            MenuItem::Claim(_) => Some(TaskFamily::Faucet),
            MenuItem::SendRandom | MenuItem::SendTo => Some(TaskFamily::Send),
            _ => None,
        }
    }

    fn label(self, state: &RunState) -> String {
        let base = match self {
            MenuItem::AutoSwap => "Auto Swap PING <-> PONG".to_string(),
            MenuItem::Claim(token) => format!("Claim {} Faucet", token),
            MenuItem::SendRandom => "Auto Send to Random Addresses".to_string(),
            MenuItem::SendTo => "Send to Address".to_string(),
            MenuItem::Stop(family) => format!("Stop {}", family),
            MenuItem::Refresh => "Refresh".to_string(),
            MenuItem::NextWallet => "Next Wallet".to_string(),
            MenuItem::SelectWallet => "Select Wallet".to_string(),
            MenuItem::Exit => "Exit".to_string(),
        };
        match self.starts() {
            // the swap batch also holds the faucet slot while claiming
            Some(TaskFamily::Swap)
                if state.is_running(TaskFamily::Swap) || state.is_running(TaskFamily::Faucet) =>
            {
                format!("{} (running)", base)
            }
            Some(family) if state.is_running(family) => format!("{} (running)", base),
            _ => base,
        }
    }
}

fn menu_items(state: &RunState) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::AutoSwap,
        MenuItem::Claim(FaucetToken::Ping),
        MenuItem::Claim(FaucetToken::Pong),
        MenuItem::SendRandom,
        MenuItem::SendTo,
    ];
    items.extend(
        TaskFamily::ALL
            .into_iter()
            .filter(|family| state.is_running(*family))
            .map(MenuItem::Stop),
    );
    items.extend([
        MenuItem::Refresh,
        MenuItem::NextWallet,
        MenuItem::SelectWallet,
        MenuItem::Exit,
    ]);
    items
}

async fn prompt_select(prompt: &str, labels: Vec<String>) -> Result<usize> {
    let prompt = prompt.to_string();
    let choice = tokio::task::spawn_blocking(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(0)
            .items(&labels)
            .interact()
    })
    .await??;
    Ok(choice)
}

async fn prompt_text(prompt: &str) -> Result<String> {
    let prompt = prompt.to_string();
    let text = tokio::task::spawn_blocking(move || {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact_text()
    })
    .await??;
    Ok(text.trim().to_string())
}

/// Positive whole number.
pub fn parse_count(raw: &str) -> Result<usize> {
    let count: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if count == 0 {
        bail!("count must be at least 1");
    }
    Ok(count)
}

/// Positive decimal amount of the native coin, in wei.
pub fn parse_amount(raw: &str) -> Result<U256> {
    let raw = raw.trim();
    if raw.starts_with('-') {
        bail!("amount must be greater than zero");
    }
    let amount = parse_ether(raw).with_context(|| format!("'{}' is not a valid amount", raw))?;
    if amount.is_zero() {
        bail!("amount must be greater than zero");
    }
    Ok(amount)
}

pub fn parse_recipient(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .with_context(|| format!("'{}' is not a valid address", raw))
}

fn spawn_batch(
    orchestrator: &Arc<Orchestrator>,
    request: BatchRequest,
    batches: &mut Vec<JoinHandle<BatchReport>>,
) {
    let orchestrator = orchestrator.clone();
    batches.push(tokio::spawn(async move {
        orchestrator.start_batch(request).await
    }));
}

/// Reads the parameters an item needs. `Ok(None)` when the user input was
/// rejected; the reason has already been shown.
async fn read_request(item: MenuItem, orchestrator: &Orchestrator) -> Result<Option<BatchRequest>> {
    let request = match item {
        MenuItem::AutoSwap => {
            let raw = prompt_text("Number of swaps per wallet").await?;
            parse_count(&raw).map(|repetitions| BatchRequest::Swap { repetitions })
        }
        MenuItem::Claim(token) => Ok(BatchRequest::ClaimFaucet { token }),
        MenuItem::SendRandom => {
            let raw_count = prompt_text("Number of sends per wallet").await?;
            let config = orchestrator.config();
            let raw_amount = prompt_text(&format!(
                "Amount of {} per send ({} - {})",
                config.native_symbol, config.send_random_min, config.send_random_max
            ))
            .await?;
            parse_count(&raw_count).and_then(|repetitions| {
                let amount = parse_amount(&raw_amount)?;
                orchestrator.config().check_random_send(amount)?;
                Ok(BatchRequest::SendRandom {
                    repetitions,
                    amount,
                })
            })
        }
        MenuItem::SendTo => {
            let raw_to = prompt_text("Recipient address").await?;
            let raw_amount = prompt_text(&format!(
                "Amount of {} to send",
                orchestrator.config().native_symbol
            ))
            .await?;
            parse_recipient(&raw_to).and_then(|recipient| {
                parse_amount(&raw_amount).map(|amount| BatchRequest::SendTo { recipient, amount })
            })
        }
        _ => return Ok(None),
    };

    match request {
        Ok(request) => Ok(Some(request)),
        Err(e) => {
            orchestrator.log(format!("Invalid input: {:#}", e));
            Ok(None)
        }
    }
}

pub async fn run_menu(orchestrator: Arc<Orchestrator>) -> Result<()> {
    let mut batches: Vec<JoinHandle<BatchReport>> = Vec::new();
    orchestrator.refresh().await;

    loop {
        batches.retain(|handle| !handle.is_finished());

        let state = orchestrator.run_state().clone();
        let items = menu_items(&state);
        let labels: Vec<String> = items.iter().map(|item| item.label(&state)).collect();
        let prompt = format!(
            "Wallet {}/{}",
            orchestrator.current_index() + 1,
            orchestrator.wallet_count()
        );
        let item = items[prompt_select(&prompt, labels).await?];

        if let Some(family) = item.starts() {
            if state.is_running(family) {
                orchestrator.log(format!("{} is already running. Stop it first.", family));
                continue;
            }
        }

        match item {
            MenuItem::Stop(family) => {
                orchestrator.request_stop(family);
            }
            MenuItem::Refresh => orchestrator.refresh().await,
            MenuItem::NextWallet => orchestrator.next_wallet().await,
            MenuItem::SelectWallet => {
                let raw = prompt_text(&format!(
                    "Wallet number (1-{})",
                    orchestrator.wallet_count()
                ))
                .await?;
                match raw.parse::<usize>() {
                    Ok(number) if number >= 1 => {
                        orchestrator.select_wallet(number - 1).await;
                    }
                    _ => orchestrator.log(format!("Invalid wallet number: {}", raw)),
                }
            }
            MenuItem::Exit => {
                orchestrator.stop_all();
                break;
            }
            _ => {
                if let Some(request) = read_request(item, &orchestrator).await? {
                    spawn_batch(&orchestrator, request, &mut batches);
                }
            }
        }
    }

    for handle in batches {
        let _ = handle.await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(" 3 ").unwrap(), 3);
        assert!(parse_count("0").is_err());
        assert!(parse_count("three").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(
            parse_amount("0.001").unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_stop_items_only_for_running_families() {
        let state = RunState::new();
        assert!(!menu_items(&state)
            .iter()
            .any(|item| matches!(item, MenuItem::Stop(_))));

        let _lease = state.try_lease(TaskFamily::Send).unwrap();
        let items = menu_items(&state);
        assert!(items.contains(&MenuItem::Stop(TaskFamily::Send)));
        assert!(!items.contains(&MenuItem::Stop(TaskFamily::Swap)));
        assert_eq!(
            MenuItem::SendRandom.label(&state),
            "Auto Send to Random Addresses (running)"
        );
        assert_eq!(MenuItem::AutoSwap.label(&state), "Auto Swap PING <-> PONG");
    }
}
