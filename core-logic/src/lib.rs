//! # Core Logic - Shared Utilities for Testnet Bots
//!
//! This crate provides the chain-agnostic pieces shared by every chain bot:
//! typed errors, loader utilities for wallet/proxy files, the task trait and
//! its outcome type, the cancellable delay and logger setup.
//!
//! ## Modules
//!
//! - [`config`] - Shared configuration structures (proxies)
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Task trait and [`TaskOutcome`]
//! - [`utils`] - Loaders, cancellable delay and logging

pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

pub use config::ProxyConfig;
pub use error::{ConfigError, CoreError, NetworkError, WalletError};
pub use traits::{execute_task, OutcomeTally, Task, TaskOutcome};

pub use utils::{
    cancellable_sleep, read_lines, setup_logger, ProxyManager, WalletCredential, WalletManager,
    TASK_RESULT_TARGET,
};
