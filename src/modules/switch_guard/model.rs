use roledesk_models::RoleId;
use std::fmt;

/// Whether a role switch is waiting on the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SwitchState {
    #[default]
    Idle,
    /// A switch to `target` was requested while the selection was dirty.
    PendingConfirm { target: RoleId },
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchState::Idle => f.write_str("idle"),
            SwitchState::PendingConfirm { target } => write!(f, "pending switch to {target}"),
        }
    }
}

/// Outcome of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchDecision {
    /// The target is already the active role.
    Stay,
    /// No unsaved edits; load the target now.
    SwitchNow(RoleId),
    /// Unsaved edits; the operator must save, discard or cancel.
    ConfirmRequired(RoleId),
}
