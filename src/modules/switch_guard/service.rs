use roledesk_core::EditorError;
use roledesk_models::RoleId;
use std::future::Future;
use tracing::{debug, info, warn};

use super::model::{SwitchDecision, SwitchState};

/// Gates changes of the active role while the selection has unsaved edits.
///
/// The guard only decides; loading roles and persisting selections is done
/// by the caller.
#[derive(Debug, Default)]
pub struct RoleSwitchGuard {
    state: SwitchState,
}

impl RoleSwitchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SwitchState::PendingConfirm { .. })
    }

    pub fn pending_target(&self) -> Option<RoleId> {
        match self.state {
            SwitchState::PendingConfirm { target } => Some(target),
            SwitchState::Idle => None,
        }
    }

    /// Decides what a request to make `target` active means right now.
    ///
    /// A second request while one is awaiting confirmation is rejected with
    /// [`EditorError::SwitchPending`]; the first must be resolved first.
    pub fn request_switch(
        &mut self,
        current: Option<RoleId>,
        target: RoleId,
        dirty: bool,
    ) -> Result<SwitchDecision, EditorError> {
        if let Some(pending) = self.pending_target() {
            warn!(%pending, %target, "Switch requested while another is pending");
            return Err(EditorError::SwitchPending(pending));
        }

        if current == Some(target) {
            return Ok(SwitchDecision::Stay);
        }

        if !dirty {
            return Ok(SwitchDecision::SwitchNow(target));
        }

        self.state = SwitchState::PendingConfirm { target };
        info!(target_role_id = %target, "Switch awaiting confirmation");
        Ok(SwitchDecision::ConfirmRequired(target))
    }

    /// Abandons the unsaved edits; returns the role to load.
    pub fn discard(&mut self) -> Result<RoleId, EditorError> {
        let target = self.take_pending()?;
        info!(target_role_id = %target, "Unsaved changes discarded");
        Ok(target)
    }

    /// Runs `persist` and, if it succeeds, releases the pending target.
    ///
    /// On failure the guard stays in `PendingConfirm` so the operator can
    /// retry, discard or cancel.
    pub async fn save_then_switch<T, F, Fut>(
        &mut self,
        persist: F,
    ) -> Result<(RoleId, T), EditorError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EditorError>>,
    {
        let target = self.pending_target().ok_or(EditorError::NoPendingSwitch)?;

        match persist().await {
            Ok(saved) => {
                self.state = SwitchState::Idle;
                info!(target_role_id = %target, "Saved before switching");
                Ok((target, saved))
            }
            Err(err) => {
                warn!(target_role_id = %target, error = %err, "Save before switch failed");
                Err(err)
            }
        }
    }

    /// Stays on the current role with its edits intact.
    pub fn cancel(&mut self) -> Result<RoleId, EditorError> {
        let target = self.take_pending()?;
        debug!(target_role_id = %target, "Switch cancelled");
        Ok(target)
    }

    fn take_pending(&mut self) -> Result<RoleId, EditorError> {
        let target = self.pending_target().ok_or(EditorError::NoPendingSwitch)?;
        self.state = SwitchState::Idle;
        Ok(target)
    }
}
