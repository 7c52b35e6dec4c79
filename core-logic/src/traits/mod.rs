use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Result of one single-attempt task against one wallet.
///
/// Every outcome is surfaced to the log; nothing is dropped silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Task finished; carries the confirming transaction hash when one was sent.
    Success(Option<String>),
    /// Precondition not met (already claimed, low balance). Not a failure.
    Skipped(String),
    /// RPC, contract or confirmation error, rendered for humans.
    Failed(String),
}

impl TaskOutcome {
    /// Converts a task error into a `Failed` outcome using the full context chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        TaskOutcome::Failed(format!("{:#}", err).replace('\n', " | "))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Success(Some(hash)) => write!(f, "Success ({})", hash),
            TaskOutcome::Success(None) => write!(f, "Success"),
            TaskOutcome::Skipped(reason) => write!(f, "Skipped: {}", reason),
            TaskOutcome::Failed(err) => write!(f, "Failed: {}", err),
        }
    }
}

/// Running counts over a batch of outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTally {
    pub success: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Success(_) => self.success += 1,
            TaskOutcome::Skipped(_) => self.skipped += 1,
            TaskOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.skipped + self.failed
    }
}

#[async_trait]
pub trait Task<Ctx>: Send + Sync {
    /// Returns the name of the task
    fn name(&self) -> &str;

    /// Executes the task. Errors are turned into [`TaskOutcome::Failed`] by
    /// [`execute_task`].
    async fn run(&self, ctx: Ctx) -> Result<TaskOutcome>;
}

/// Runs a task and never lets an error escape.
pub async fn execute_task<Ctx, T>(task: &T, ctx: Ctx) -> TaskOutcome
where
    T: Task<Ctx> + ?Sized,
{
    match task.run(ctx).await {
        Ok(outcome) => outcome,
        Err(e) => TaskOutcome::from_error(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_from_error_keeps_context_chain() {
        let err: anyhow::Error = Err::<(), _>(anyhow::anyhow!("nonce too low"))
            .context("Failed to submit mint")
            .unwrap_err();
        assert_eq!(
            TaskOutcome::from_error(&err),
            TaskOutcome::Failed("Failed to submit mint: nonce too low".to_string())
        );
    }

    #[test]
    fn test_tally_counts_each_kind() {
        let mut tally = OutcomeTally::default();
        tally.record(&TaskOutcome::Success(Some("0xabc".to_string())));
        tally.record(&TaskOutcome::Skipped("low balance".to_string()));
        tally.record(&TaskOutcome::Failed("reverted".to_string()));
        tally.record(&TaskOutcome::Success(None));

        assert_eq!(tally.success, 2);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TaskOutcome::Skipped("already claimed".to_string()).to_string(),
            "Skipped: already claimed"
        );
    }

    struct RevertingTask;

    #[async_trait]
    impl Task<u32> for RevertingTask {
        fn name(&self) -> &str {
            "reverting"
        }

        async fn run(&self, attempt: u32) -> Result<TaskOutcome> {
            anyhow::bail!("execution reverted on attempt {}", attempt)
        }
    }

    #[tokio::test]
    async fn test_execute_task_isolates_errors() {
        let outcome = execute_task(&RevertingTask, 3).await;
        assert_eq!(
            outcome,
            TaskOutcome::Failed("execution reverted on attempt 3".to_string())
        );
    }
}
