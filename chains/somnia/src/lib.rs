//! # Somnia Bot
//!
//! Multi-wallet faucet / swap / send automation for the Somnia testnet.
//!
//! ## Modules
//!
//! - [`orchestrator`] - batch sequencing, cancellation and outcome reporting
//! - [`tasks`] - single-wallet executors (faucet claim, swap, native send)
//! - [`run_state`] - per-family running/cancel flags
//! - [`client`] - chain access trait and its alloy implementation
//! - [`presenter`] - where progress lines and wallet snapshots go
//! - [`config`] - TOML + env configuration

pub mod client;
pub mod config;
pub mod contracts;
pub mod menu;
pub mod orchestrator;
pub mod presenter;
pub mod run_state;
pub mod snapshot;
pub mod tasks;
pub mod utils;
pub mod wallet;

pub use client::{ChainClient, ChainTx, ClientFactory, SomniaClient, SomniaClientFactory, SwapParams};
pub use config::{DelayRange, SomniaConfig};
pub use orchestrator::{BatchReport, BatchRequest, BatchStatus, Orchestrator, WalletOutcome};
pub use presenter::{ConsolePresenter, Presenter};
pub use run_state::{BatchLease, RunState, TaskFamily};
pub use snapshot::{SnapshotStore, TokenBalance, WalletSnapshot};
pub use tasks::{FaucetToken, TaskContext};
pub use wallet::{build_records, WalletRecord};
