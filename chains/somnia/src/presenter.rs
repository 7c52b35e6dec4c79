//! Output side of the bot.
//!
//! The orchestrator and the tasks only ever talk to a [`Presenter`]; nothing in
//! the core knows whether lines end up in a terminal, a log file or a test.

use crate::run_state::TaskFamily;
use crate::snapshot::WalletSnapshot;
use chrono::Local;
use core_logic::TASK_RESULT_TARGET;
use tracing::info;

pub trait Presenter: Send + Sync {
    fn append_log(&self, message: &str);

    fn set_wallet_snapshot(&self, snapshot: &WalletSnapshot);

    fn set_menu_state(&self, family: TaskFamily, running: bool);
}

/// Writes through `tracing` on the `task_result` target, which the logger
/// routes to both stdout and the rolling log file.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn append_log(&self, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S");
        info!(target: TASK_RESULT_TARGET, "[{}] {}", timestamp, message);
    }

    fn set_wallet_snapshot(&self, snapshot: &WalletSnapshot) {
        for line in snapshot.render_lines() {
            info!(target: TASK_RESULT_TARGET, "{}", line);
        }
    }

    fn set_menu_state(&self, family: TaskFamily, running: bool) {
        let state = if running { "running" } else { "idle" };
        info!(target: TASK_RESULT_TARGET, "{} is {}", family, state);
    }
}
