//! Per-family running/cancel flags.
//!
//! Each [`TaskFamily`] owns one slot. A batch takes the slot through
//! [`RunState::try_lease`]; the returned [`BatchLease`] hands out the batch's
//! cancellation token and clears the running flag when dropped, whatever path
//! the batch leaves by.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskFamily {
    Faucet,
    Swap,
    Send,
}

impl TaskFamily {
    pub const ALL: [TaskFamily; 3] = [TaskFamily::Faucet, TaskFamily::Swap, TaskFamily::Send];

    fn slot(self) -> usize {
        match self {
            TaskFamily::Faucet => 0,
            TaskFamily::Swap => 1,
            TaskFamily::Send => 2,
        }
    }
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskFamily::Faucet => "Faucet",
            TaskFamily::Swap => "Auto Swap",
            TaskFamily::Send => "Send Token",
        };
        f.write_str(name)
    }
}

struct FamilySlot {
    running: AtomicBool,
    token: Mutex<CancellationToken>,
}

impl FamilySlot {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            token: Mutex::new(CancellationToken::new()),
        }
    }

    fn token(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct RunState {
    slots: [FamilySlot; 3],
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            slots: [FamilySlot::new(), FamilySlot::new(), FamilySlot::new()],
        }
    }

    fn slot(&self, family: TaskFamily) -> &FamilySlot {
        &self.slots[family.slot()]
    }

    /// Takes the family's slot with a fresh token. `None` if already running.
    pub fn try_lease(&self, family: TaskFamily) -> Option<BatchLease<'_>> {
        self.acquire(family, CancellationToken::new())
    }

    /// Like [`RunState::try_lease`], but the new token is a child of `parent`:
    /// cancelling the parent also stops this family, not the other way round.
    pub fn try_lease_under(
        &self,
        family: TaskFamily,
        parent: &CancellationToken,
    ) -> Option<BatchLease<'_>> {
        self.acquire(family, parent.child_token())
    }

    fn acquire(&self, family: TaskFamily, fresh: CancellationToken) -> Option<BatchLease<'_>> {
        let slot = self.slot(family);
        let mut token = slot.token();
        if slot
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        *token = fresh.clone();
        Some(BatchLease {
            state: self,
            family,
            token: fresh,
        })
    }

    fn release(&self, family: TaskFamily) {
        let slot = self.slot(family);
        let _guard = slot.token();
        slot.running.store(false, Ordering::Release);
    }

    /// Sets the family's cancel flag. No-op returning `false` when idle.
    pub fn request_cancel(&self, family: TaskFamily) -> bool {
        let slot = self.slot(family);
        let token = slot.token();
        if !slot.running.load(Ordering::Acquire) {
            return false;
        }
        token.cancel();
        true
    }

    pub fn is_running(&self, family: TaskFamily) -> bool {
        self.slot(family).running.load(Ordering::Acquire)
    }

    /// Only meaningful while running; always `false` for an idle family.
    pub fn is_cancelled(&self, family: TaskFamily) -> bool {
        let slot = self.slot(family);
        let token = slot.token();
        slot.running.load(Ordering::Acquire) && token.is_cancelled()
    }
}

/// Exclusive hold on one family for the lifetime of a batch.
pub struct BatchLease<'a> {
    state: &'a RunState,
    family: TaskFamily,
    token: CancellationToken,
}

impl BatchLease<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for BatchLease<'_> {
    fn drop(&mut self) {
        self.state.release(self.family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lease_is_refused() {
        let state = RunState::new();
        let lease = state.try_lease(TaskFamily::Swap);
        assert!(lease.is_some());
        assert!(state.try_lease(TaskFamily::Swap).is_none());
        assert!(state.try_lease(TaskFamily::Send).is_some());
    }

    #[test]
    fn test_drop_releases_slot() {
        let state = RunState::new();
        {
            let _lease = state.try_lease(TaskFamily::Faucet).unwrap();
            assert!(state.is_running(TaskFamily::Faucet));
        }
        assert!(!state.is_running(TaskFamily::Faucet));
        assert!(state.try_lease(TaskFamily::Faucet).is_some());
    }

    #[test]
    fn test_cancel_on_idle_family_is_noop() {
        let state = RunState::new();
        assert!(!state.request_cancel(TaskFamily::Send));
        assert!(!state.is_cancelled(TaskFamily::Send));

        // a stale request must not leak into the next batch
        let lease = state.try_lease(TaskFamily::Send).unwrap();
        assert!(!lease.is_cancelled());
    }

    #[test]
    fn test_cancel_reaches_lease_token() {
        let state = RunState::new();
        let lease = state.try_lease(TaskFamily::Swap).unwrap();
        assert!(state.request_cancel(TaskFamily::Swap));
        assert!(lease.is_cancelled());
        assert!(state.is_cancelled(TaskFamily::Swap));
        drop(lease);
        assert!(!state.is_cancelled(TaskFamily::Swap));
    }

    #[test]
    fn test_restart_gets_fresh_token() {
        let state = RunState::new();
        let first = state.try_lease(TaskFamily::Send).unwrap();
        state.request_cancel(TaskFamily::Send);
        drop(first);

        let second = state.try_lease(TaskFamily::Send).unwrap();
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_child_lease_follows_parent_only() {
        let state = RunState::new();
        let swap = state.try_lease(TaskFamily::Swap).unwrap();
        let faucet = state
            .try_lease_under(TaskFamily::Faucet, swap.token())
            .unwrap();

        state.request_cancel(TaskFamily::Faucet);
        assert!(faucet.is_cancelled());
        assert!(!swap.is_cancelled());

        let faucet2 = {
            drop(faucet);
            state
                .try_lease_under(TaskFamily::Faucet, swap.token())
                .unwrap()
        };
        state.request_cancel(TaskFamily::Swap);
        assert!(faucet2.is_cancelled());
    }
}
