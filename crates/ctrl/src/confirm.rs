#![forbid(unsafe_code)]

//! Confirmation gate for bulk destructive operations.
//!
//! A request parks one action as pending; confirm or cancel returns the
//! gate to idle. At most one action is pending at a time, so a single
//! click on a bulk-destructive control never mutates remote state.

use tracing::error;

/// The two mutually-exclusive bulk operations behind the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Delete,
    Purge,
}

impl PendingAction {
    /// Confirmation prompt wording for this action.
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::Delete => "Are you sure you want to remove selected topics?",
            PendingAction::Purge => "Are you sure you want to purge messages of selected topics?",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfirmError {
    /// A second action was requested while one is already pending; the
    /// triggering controls must be hidden or disabled in that state.
    #[error("another bulk action is already awaiting confirmation")]
    AlreadyPending,
    /// `confirm` was called with nothing pending. A caller contract
    /// violation, not a runtime condition to recover from.
    #[error("no bulk action is awaiting confirmation")]
    NothingPending,
    /// Destructive operations are not offered on read-only clusters.
    #[error("cluster is read-only")]
    ReadOnly,
}

/// Three-state machine: idle, delete pending, purge pending.
#[derive(Debug, Default)]
pub struct ConfirmGate {
    pending: Option<PendingAction>,
}

impl ConfirmGate {
    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn request(&mut self, action: PendingAction) -> Result<(), ConfirmError> {
        if let Some(current) = self.pending {
            error!(?current, requested = ?action, "confirm gate: request while another action is pending");
            return Err(ConfirmError::AlreadyPending);
        }
        self.pending = Some(action);
        Ok(())
    }

    /// Abandon the pending action, if any. Touches nothing else.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the pending action for execution, returning the gate to idle.
    pub fn confirm(&mut self) -> Result<PendingAction, ConfirmError> {
        match self.pending.take() {
            Some(action) => Ok(action),
            None => {
                error!("confirm gate: confirm with nothing pending");
                Err(ConfirmError::NothingPending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_confirm_cycle_returns_to_idle() {
        let mut gate = ConfirmGate::default();
        assert_eq!(gate.pending(), None);

        gate.request(PendingAction::Delete).unwrap();
        assert_eq!(gate.pending(), Some(PendingAction::Delete));

        assert_eq!(gate.confirm(), Ok(PendingAction::Delete));
        assert_eq!(gate.pending(), None);

        // The idle state is re-enterable.
        gate.request(PendingAction::Purge).unwrap();
        assert_eq!(gate.confirm(), Ok(PendingAction::Purge));
    }

    #[test]
    fn only_one_action_pending_at_a_time() {
        let mut gate = ConfirmGate::default();
        gate.request(PendingAction::Delete).unwrap();
        assert_eq!(gate.request(PendingAction::Purge), Err(ConfirmError::AlreadyPending));
        assert_eq!(gate.pending(), Some(PendingAction::Delete));
    }

    #[test]
    fn cancel_returns_to_idle_and_is_idempotent() {
        let mut gate = ConfirmGate::default();
        gate.cancel();
        assert_eq!(gate.pending(), None);

        gate.request(PendingAction::Purge).unwrap();
        gate.cancel();
        assert_eq!(gate.pending(), None);
        gate.cancel();
        assert_eq!(gate.pending(), None);
    }

    #[test]
    fn confirm_with_nothing_pending_is_loud() {
        let mut gate = ConfirmGate::default();
        assert_eq!(gate.confirm(), Err(ConfirmError::NothingPending));
    }

    #[test]
    fn prompts_differ_by_action_kind() {
        assert_ne!(PendingAction::Delete.prompt(), PendingAction::Purge.prompt());
    }
}
