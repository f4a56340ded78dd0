//! Optimistic read mutations.
//!
//! A read is applied to the local feed before the server confirms it.
//! [`ReadMutation`] records what changed so a rejected read can be undone,
//! and tracks the mutation through its lifecycle.

use chrono::{DateTime, Utc};

/// Lifecycle of an optimistic read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Applied locally, awaiting the server verdict.
    Pending,
    /// Confirmed by the server.
    Committed,
    /// Rejected by the server and undone locally.
    RolledBack,
}

/// Bookkeeping for one optimistic read, enough to undo it.
#[derive(Debug, Clone)]
pub struct ReadMutation {
    pub(crate) id: String,
    pub(crate) applied_at: DateTime<Utc>,
    pub(crate) previous_read_at: Option<DateTime<Utc>>,
    /// Whether applying the read decremented the unread count.
    pub(crate) decremented: bool,
    phase: MutationPhase,
}

impl ReadMutation {
    /// Records a freshly applied local read.
    pub(crate) fn pending(
        id: String,
        previous_read_at: Option<DateTime<Utc>>,
        decremented: bool,
    ) -> Self {
        Self {
            id,
            applied_at: Utc::now(),
            previous_read_at,
            decremented,
            phase: MutationPhase::Pending,
        }
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Confirms the mutation. Only a pending mutation can commit.
    pub fn commit(&mut self) -> bool {
        if self.phase == MutationPhase::Pending {
            self.phase = MutationPhase::Committed;
            true
        } else {
            false
        }
    }

    /// Rejects the mutation. Only a pending mutation can roll back.
    pub fn roll_back(&mut self) -> bool {
        if self.phase == MutationPhase::Pending {
            self.phase = MutationPhase::RolledBack;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> ReadMutation {
        ReadMutation::pending("n-1".to_string(), None, true)
    }

    #[test]
    fn test_pending_commits_once() {
        let mut mutation = pending();
        assert_eq!(mutation.phase(), MutationPhase::Pending);
        assert!(mutation.commit());
        assert_eq!(mutation.phase(), MutationPhase::Committed);
        assert!(!mutation.commit());
    }

    #[test]
    fn test_pending_rolls_back_once() {
        let mut mutation = pending();
        assert!(mutation.roll_back());
        assert_eq!(mutation.phase(), MutationPhase::RolledBack);
        assert!(!mutation.roll_back());
    }

    #[test]
    fn test_committed_cannot_roll_back() {
        let mut mutation = pending();
        assert!(mutation.commit());
        assert!(!mutation.roll_back());
        assert_eq!(mutation.phase(), MutationPhase::Committed);
    }

    #[test]
    fn test_rolled_back_cannot_commit() {
        let mut mutation = pending();
        assert!(mutation.roll_back());
        assert!(!mutation.commit());
        assert_eq!(mutation.phase(), MutationPhase::RolledBack);
    }
}
