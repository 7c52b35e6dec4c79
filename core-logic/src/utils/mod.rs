//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod delay;
pub(crate) mod lines;
pub(crate) mod logger;
pub(crate) mod proxy_manager;
pub(crate) mod wallet_manager;

pub use delay::cancellable_sleep;
pub use lines::read_lines;
pub use logger::{setup_logger, TASK_RESULT_TARGET};
pub use proxy_manager::ProxyManager;
pub use wallet_manager::{WalletCredential, WalletManager};
