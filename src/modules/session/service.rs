use roledesk_core::EditorError;
use roledesk_db::RoleStore;
use roledesk_models::{CategorySummary, PermissionCategory, PermissionId, Role, RoleId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::modules::catalog::{PermissionCatalog, dropped_categories};
use crate::modules::roles::{RoleDraft, RoleRegistry};
use crate::modules::selection::SelectionState;
use crate::modules::switch_guard::{RoleSwitchGuard, SwitchDecision, SwitchState};

/// A save of the active role's working set, detached from the session.
///
/// Built by [`EditorSession::begin_save`]. The session stays editable while
/// [`run`](Self::run) is in flight; hand the result to
/// [`EditorSession::finish_save`].
#[derive(Debug)]
pub struct PendingSave<S> {
    registry: Arc<RoleRegistry<S>>,
    catalog: PermissionCatalog,
    role_id: RoleId,
    sent: BTreeSet<PermissionId>,
}

impl<S: RoleStore> PendingSave<S> {
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn permission_ids(&self) -> &BTreeSet<PermissionId> {
        &self.sent
    }

    pub async fn run(self) -> Result<CompletedSave, EditorError> {
        let role = self
            .registry
            .update_permissions(self.role_id, &self.sent, &self.catalog)
            .await?;
        Ok(CompletedSave {
            role,
            sent: self.sent,
        })
    }
}

/// A persisted save waiting to be folded back into its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSave {
    role: Role,
    sent: BTreeSet<PermissionId>,
}

impl CompletedSave {
    pub fn role(&self) -> &Role {
        &self.role
    }
}

/// One operator's editing session.
///
/// Every operation runs to completion before the next starts (`&mut self`).
/// The registry may be shared with other sessions; everything else is owned.
#[derive(Debug)]
pub struct EditorSession<S> {
    id: Uuid,
    catalog: PermissionCatalog,
    registry: Arc<RoleRegistry<S>>,
    selection: SelectionState,
    guard: RoleSwitchGuard,
}

impl<S: RoleStore> EditorSession<S> {
    /// Loads the catalog and the role list. No role is active afterwards.
    ///
    /// A missing catalog is returned as [`EditorError::CatalogUnavailable`]
    /// so the caller can offer a retry.
    pub async fn open(store: S) -> Result<Self, EditorError> {
        Self::open_with_registry(Arc::new(RoleRegistry::new(store))).await
    }

    #[instrument(skip(registry), fields(session_id = tracing::field::Empty))]
    pub async fn open_with_registry(registry: Arc<RoleRegistry<S>>) -> Result<Self, EditorError> {
        let id = Uuid::new_v4();
        tracing::Span::current().record("session_id", tracing::field::display(id));

        let catalog = PermissionCatalog::load(registry.store()).await?;
        registry.refresh().await?;

        info!(roles = registry.roles().len(), "Editor session opened");
        Ok(Self {
            id,
            selection: SelectionState::empty(catalog.ids()),
            catalog,
            registry,
            guard: RoleSwitchGuard::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<RoleRegistry<S>> {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn switch_state(&self) -> SwitchState {
        self.guard.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.selection.is_dirty()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.registry.roles()
    }

    pub fn active_role(&self) -> Option<Role> {
        self.selection.role_id().and_then(|id| self.registry.get(id))
    }

    pub fn is_saving(&self) -> bool {
        self.selection
            .role_id()
            .is_some_and(|id| self.registry.is_saving(id))
    }

    pub fn filter(&self, search_term: &str, category_filter: &str) -> Vec<PermissionCategory> {
        self.catalog.filter(search_term, category_filter)
    }

    pub fn category_summary(&self) -> Vec<CategorySummary> {
        self.catalog.category_summary(self.selection.working())
    }

    /// Asks to make `target` the active role.
    ///
    /// With a clean selection the target is loaded at once. With unsaved
    /// edits the request is parked until [`discard`](Self::discard),
    /// [`save_then_switch`](Self::save_then_switch) or
    /// [`cancel`](Self::cancel).
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn request_switch(&mut self, target: RoleId) -> Result<SwitchDecision, EditorError> {
        let current = self.selection.role_id();
        if current != Some(target) && !self.guard.is_pending() {
            self.require_role(target)?;
        }

        let dirty = self.selection.is_dirty();
        let decision = self.guard.request_switch(current, target, dirty)?;
        if let SwitchDecision::SwitchNow(_) = decision {
            self.selection = self.prepare_selection(target)?;
            info!(role_id = %target, "Role loaded");
        }
        Ok(decision)
    }

    /// Role-list pick: returns the active role, or `None` while a
    /// confirmation is outstanding.
    pub fn select_role(&mut self, role_id: RoleId) -> Result<Option<Role>, EditorError> {
        match self.request_switch(role_id)? {
            SwitchDecision::ConfirmRequired(_) => Ok(None),
            SwitchDecision::Stay | SwitchDecision::SwitchNow(_) => Ok(self.active_role()),
        }
    }

    /// Drops the unsaved edits and loads the pending target.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn discard(&mut self) -> Result<Role, EditorError> {
        let target = self
            .guard
            .pending_target()
            .ok_or(EditorError::NoPendingSwitch)?;
        let next = self.prepare_selection(target)?;

        self.guard.discard()?;
        self.selection = next;
        info!(role_id = %target, "Role loaded");
        self.require_active()
    }

    /// Saves the current role, then loads the pending target.
    ///
    /// The target is read from the registry only after the save has
    /// finished. If the save fails nothing changes: the request stays
    /// pending and the edits stay in place.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn save_then_switch(&mut self) -> Result<Role, EditorError> {
        let target = self
            .guard
            .pending_target()
            .ok_or(EditorError::NoPendingSwitch)?;
        let role_id = self.require_role_id()?;
        self.require_role(target)?;

        let registry = Arc::clone(&self.registry);
        let catalog = &self.catalog;
        let working = self.selection.working().clone();
        let (_, saved) = self
            .guard
            .save_then_switch(|| async move {
                registry.update_permissions(role_id, &working, catalog).await
            })
            .await?;

        match self.prepare_selection(target) {
            Ok(next) => {
                self.selection = next;
                info!(role_id = %target, "Role loaded");
                self.require_active()
            }
            Err(err) => {
                self.selection.commit(saved.permission_ids)?;
                Err(err)
            }
        }
    }

    /// Keeps the current role and its edits.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.guard.cancel().map(|_| ())
    }

    /// Persists the working set of the active role.
    ///
    /// Allowed while a switch is pending; the request stays pending.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn save(&mut self) -> Result<Role, EditorError> {
        let completed = self.begin_save()?.run().await?;
        self.finish_save(completed)
    }

    /// Snapshots the working set for a save that runs without borrowing
    /// the session.
    pub fn begin_save(&self) -> Result<PendingSave<S>, EditorError> {
        let role_id = self.require_role_id()?;
        if self.registry.is_saving(role_id) {
            return Err(EditorError::AlreadySaving(role_id));
        }
        Ok(PendingSave {
            registry: Arc::clone(&self.registry),
            catalog: self.catalog.clone(),
            role_id,
            sent: self.selection.working().clone(),
        })
    }

    /// Makes a finished save the new baseline.
    ///
    /// Edits made while it was in flight stay in the working set. A save
    /// for a role that is no longer active only updates the registry.
    #[instrument(
        skip(self, completed),
        fields(session_id = %self.id, role_id = %completed.role.id)
    )]
    pub fn finish_save(&mut self, completed: CompletedSave) -> Result<Role, EditorError> {
        let CompletedSave { role, sent } = completed;
        if self.selection.role_id() == Some(role.id) {
            self.selection.commit_sent(&sent, role.permission_ids.clone())?;
        }
        Ok(role)
    }

    pub fn toggle(&mut self, id: PermissionId) -> Result<bool, EditorError> {
        self.require_role_id()?;
        self.selection.toggle_permission(id)
    }

    pub fn select_category(&mut self, category: &str) -> Result<(), EditorError> {
        let ids = self.known_category_ids(category)?;
        self.selection.select_all_in_category(&ids)
    }

    pub fn deselect_category(&mut self, category: &str) -> Result<(), EditorError> {
        let ids = self.known_category_ids(category)?;
        self.selection.deselect_all_in_category(&ids)
    }

    pub fn select_all(&mut self) -> Result<(), EditorError> {
        self.require_role_id()?;
        self.selection.select_all(self.catalog.ids())
    }

    pub fn deselect_all(&mut self) -> Result<(), EditorError> {
        self.require_role_id()?;
        self.selection.deselect_all();
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), EditorError> {
        self.require_role_id()?;
        self.selection.reset();
        Ok(())
    }

    /// Drops working ids the last catalog refresh removed.
    pub fn prune_stale(&mut self) -> BTreeSet<PermissionId> {
        self.selection.prune_stale()
    }

    /// Reloads the catalog. The working set is never modified.
    ///
    /// On failure the current catalog stays in use.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn refresh_catalog(&mut self) -> Result<(), EditorError> {
        let fresh = PermissionCatalog::load(self.registry.store()).await?;

        let dropped = dropped_categories(self.catalog.all(), fresh.all());
        if !dropped.is_empty() {
            warn!(?dropped, "Categories removed by catalog refresh");
        }

        self.catalog = fresh;
        self.selection.set_universe(self.catalog.ids());

        let stale = self.selection.stale();
        if !stale.is_empty() {
            warn!(stale = stale.len(), "Working set holds permissions no longer in the catalog");
        }
        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn refresh_roles(&mut self) -> Result<(), EditorError> {
        self.registry.refresh().await
    }

    /// Creates a role from `draft` and offers it as the next active role.
    ///
    /// The switch goes through the guard, so unsaved edits on the current
    /// role park the switch instead of being lost.
    #[instrument(skip(self, draft), fields(session_id = %self.id, template = ?draft.template()))]
    pub async fn create_role(
        &mut self,
        draft: &RoleDraft,
    ) -> Result<(Role, SwitchDecision), EditorError> {
        let role = self
            .registry
            .create_role(draft.to_dto(), &self.catalog)
            .await?;
        let decision = self.request_switch(role.id)?;
        Ok((role, decision))
    }

    fn prepare_selection(&self, role_id: RoleId) -> Result<SelectionState, EditorError> {
        let role = self.require_role(role_id)?;
        let selection = SelectionState::load_for_role(&role, self.catalog.ids());
        let stale = selection.stale();
        if !stale.is_empty() {
            warn!(
                %role_id,
                stale = stale.len(),
                "Role grants permissions no longer in the catalog"
            );
        }
        Ok(selection)
    }

    fn require_role(&self, role_id: RoleId) -> Result<Role, EditorError> {
        self.registry
            .get(role_id)
            .ok_or(EditorError::RoleNotFound(role_id))
    }

    fn known_category_ids(&self, category: &str) -> Result<Vec<PermissionId>, EditorError> {
        self.require_role_id()?;
        let ids = self.catalog.category_ids(category);
        if ids.is_empty() {
            return Err(EditorError::validation(
                "category",
                format!("Unknown category \"{category}\""),
            ));
        }
        Ok(ids)
    }

    fn require_role_id(&self) -> Result<RoleId, EditorError> {
        self.selection.role_id().ok_or(EditorError::NoActiveRole)
    }

    fn require_active(&self) -> Result<Role, EditorError> {
        let role_id = self.require_role_id()?;
        self.require_role(role_id)
    }
}
