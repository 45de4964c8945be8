//! The editable permission selection of the role being edited.

use roledesk_core::EditorError;
use roledesk_models::{PermissionId, Role, RoleId};
use std::collections::BTreeSet;

/// Baseline and working permission sets for one role.
///
/// Invariants, checked on every mutation:
/// - `dirty == (working != baseline)`
/// - every id added to `working` belongs to the universe
///
/// A mutation that would break them is rejected and leaves the state as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    role_id: Option<RoleId>,
    baseline: BTreeSet<PermissionId>,
    working: BTreeSet<PermissionId>,
    dirty: bool,
    universe: BTreeSet<PermissionId>,
}

impl SelectionState {
    /// A selection with no role loaded.
    pub fn empty(universe: &BTreeSet<PermissionId>) -> Self {
        Self {
            universe: universe.clone(),
            ..Self::default()
        }
    }

    /// Loads `role` with `baseline = working = role.permission_ids`.
    ///
    /// Granted ids the catalog no longer lists are kept and show up in
    /// [`stale`](Self::stale).
    pub fn load_for_role(role: &Role, universe: &BTreeSet<PermissionId>) -> Self {
        Self {
            role_id: Some(role.id),
            baseline: role.permission_ids.clone(),
            working: role.permission_ids.clone(),
            dirty: false,
            universe: universe.clone(),
        }
    }

    pub fn role_id(&self) -> Option<RoleId> {
        self.role_id
    }

    pub fn baseline(&self) -> &BTreeSet<PermissionId> {
        &self.baseline
    }

    pub fn working(&self) -> &BTreeSet<PermissionId> {
        &self.working
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn universe(&self) -> &BTreeSet<PermissionId> {
        &self.universe
    }

    pub fn is_selected(&self, id: PermissionId) -> bool {
        self.working.contains(&id)
    }

    /// Ids in the working set but not the baseline.
    pub fn added(&self) -> BTreeSet<PermissionId> {
        self.working.difference(&self.baseline).copied().collect()
    }

    /// Ids in the baseline but not the working set.
    pub fn removed(&self) -> BTreeSet<PermissionId> {
        self.baseline.difference(&self.working).copied().collect()
    }

    /// Working ids that a catalog refresh removed from the universe.
    pub fn stale(&self) -> BTreeSet<PermissionId> {
        self.working.difference(&self.universe).copied().collect()
    }

    /// Flips membership of `id`; returns whether it is now selected.
    pub fn toggle_permission(&mut self, id: PermissionId) -> Result<bool, EditorError> {
        self.ensure_known([&id])?;

        let selected = if self.working.remove(&id) {
            false
        } else {
            self.working.insert(id);
            true
        };
        self.recompute();
        Ok(selected)
    }

    pub fn select_all_in_category(
        &mut self,
        category_ids: &[PermissionId],
    ) -> Result<(), EditorError> {
        self.ensure_known(category_ids)?;
        self.working.extend(category_ids.iter().copied());
        self.recompute();
        Ok(())
    }

    pub fn deselect_all_in_category(
        &mut self,
        category_ids: &[PermissionId],
    ) -> Result<(), EditorError> {
        self.ensure_known(category_ids)?;
        for id in category_ids {
            self.working.remove(id);
        }
        self.recompute();
        Ok(())
    }

    pub fn select_all(&mut self, all_ids: &BTreeSet<PermissionId>) -> Result<(), EditorError> {
        self.ensure_known(all_ids)?;
        self.working = all_ids.clone();
        self.recompute();
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.working.clear();
        self.recompute();
    }

    /// Drops unsaved edits.
    pub fn reset(&mut self) {
        self.working = self.baseline.clone();
        self.dirty = false;
    }

    /// Publishes a persisted set as the new baseline. Call only after a
    /// successful save.
    pub fn commit(&mut self, new_baseline: BTreeSet<PermissionId>) -> Result<(), EditorError> {
        self.ensure_known(&new_baseline)?;
        self.working = new_baseline.clone();
        self.baseline = new_baseline;
        self.dirty = false;
        Ok(())
    }

    /// Commits a save that ran while the working set stayed editable.
    ///
    /// `sent` is the set that was persisted. Edits made after it was sent
    /// are kept and leave the selection dirty.
    pub fn commit_sent(
        &mut self,
        sent: &BTreeSet<PermissionId>,
        saved: BTreeSet<PermissionId>,
    ) -> Result<(), EditorError> {
        if &self.working == sent {
            return self.commit(saved);
        }
        self.ensure_known(&saved)?;
        self.baseline = saved;
        self.recompute();
        Ok(())
    }

    /// Replaces the universe after a catalog refresh. `working` is untouched.
    pub fn set_universe(&mut self, universe: &BTreeSet<PermissionId>) {
        self.universe = universe.clone();
    }

    /// Removes stale ids from the working set; returns what was removed.
    pub fn prune_stale(&mut self) -> BTreeSet<PermissionId> {
        let stale = self.stale();
        self.working.retain(|id| !stale.contains(id));
        self.recompute();
        stale
    }

    fn ensure_known<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a PermissionId>,
    ) -> Result<(), EditorError> {
        match ids.into_iter().find(|id| !self.universe.contains(id)) {
            Some(unknown) => Err(EditorError::UnknownPermission(*unknown)),
            None => Ok(()),
        }
    }

    fn recompute(&mut self) {
        self.dirty = self.working != self.baseline;
    }
}
