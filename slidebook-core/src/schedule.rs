//! Deferred callbacks on the viewer's clock.
//!
//! The viewer is single-threaded: timers are plain data drained on each tick,
//! never threads or futures.

use serde::{Deserialize, Serialize};

/// Work that runs after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    /// Spring the edge-bounce channel back to rest.
    ReleaseBounce,
    /// Fade the page counter out.
    HideCounter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due_ms: u64,
    action: TimerAction,
}

/// Pending timers, at most one per [`TimerAction`].
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` at `due_ms`, replacing an earlier schedule of the same action.
    pub fn schedule(&mut self, due_ms: u64, action: TimerAction) {
        self.cancel(action);
        self.pending.push(Scheduled { due_ms, action });
    }

    /// Drop a pending action.
    pub fn cancel(&mut self, action: TimerAction) {
        self.pending.retain(|s| s.action != action);
    }

    /// Whether `action` is waiting to fire.
    #[must_use]
    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.pending.iter().any(|s| s.action == action)
    }

    /// Remove and return every action due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<TimerAction> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now_ms {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| s.due_ms);
        due.into_iter().map(|s| s.action).collect()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_due_in_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2_000, TimerAction::HideCounter);
        scheduler.schedule(50, TimerAction::ReleaseBounce);

        assert!(scheduler.drain_due(10).is_empty());
        assert_eq!(
            scheduler.drain_due(5_000),
            vec![TimerAction::ReleaseBounce, TimerAction::HideCounter]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, TimerAction::HideCounter);
        scheduler.schedule(300, TimerAction::HideCounter);

        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.drain_due(200).is_empty());
        assert_eq!(scheduler.drain_due(300), vec![TimerAction::HideCounter]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100, TimerAction::ReleaseBounce);
        assert!(scheduler.is_pending(TimerAction::ReleaseBounce));
        scheduler.cancel(TimerAction::ReleaseBounce);
        assert!(!scheduler.is_pending(TimerAction::ReleaseBounce));
    }
}
