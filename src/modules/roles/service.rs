use parking_lot::{Mutex, RwLock};
use roledesk_core::{EditorError, StoreError};
use roledesk_db::RoleStore;
use roledesk_models::{CreateRoleDto, PermissionId, Role, RoleId, UpdateRoleDto};
use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::modules::catalog::PermissionCatalog;

/// Cached view of the persisted roles plus the write operations on them.
///
/// Shareable across tasks. At most one permission save per role is in flight
/// at any time; a second concurrent save is rejected, not queued.
#[derive(Debug)]
pub struct RoleRegistry<S> {
    store: S,
    roles: RwLock<Vec<Role>>,
    saving: Mutex<HashSet<RoleId>>,
}

/// Marks a role as saving until dropped.
struct SaveGuard<'a> {
    saving: &'a Mutex<HashSet<RoleId>>,
    role_id: RoleId,
}

impl<'a> SaveGuard<'a> {
    fn acquire(saving: &'a Mutex<HashSet<RoleId>>, role_id: RoleId) -> Result<Self, EditorError> {
        if !saving.lock().insert(role_id) {
            return Err(EditorError::AlreadySaving(role_id));
        }
        Ok(Self { saving, role_id })
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.saving.lock().remove(&self.role_id);
    }
}

impl<S: RoleStore> RoleRegistry<S> {
    /// A registry with an empty cache. Call [`refresh`](Self::refresh) to fill it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            roles: RwLock::new(Vec::new()),
            saving: Mutex::new(HashSet::new()),
        }
    }

    pub async fn load(store: S) -> Result<Self, EditorError> {
        let registry = Self::new(store);
        registry.refresh().await?;
        Ok(registry)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), EditorError> {
        let roles = self.store.list_roles().await?;
        info!(roles = roles.len(), "Roles loaded");
        *self.roles.write() = roles;
        Ok(())
    }

    pub fn roles(&self) -> Vec<Role> {
        self.roles.read().clone()
    }

    pub fn get(&self, role_id: RoleId) -> Option<Role> {
        self.roles.read().iter().find(|r| r.id == role_id).cloned()
    }

    pub fn is_saving(&self, role_id: RoleId) -> bool {
        self.saving.lock().contains(&role_id)
    }

    /// Checks a proposed role name; returns it trimmed.
    ///
    /// `except` is the role being renamed, whose own name does not count as a
    /// duplicate.
    pub fn validate_name(
        &self,
        name: &str,
        except: Option<RoleId>,
    ) -> Result<String, EditorError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EditorError::validation("name", "Name is required"));
        }

        let duplicate = self
            .roles
            .read()
            .iter()
            .any(|r| Some(r.id) != except && r.name_matches(trimmed));
        if duplicate {
            return Err(duplicate_name(trimmed));
        }

        Ok(trimmed.to_string())
    }

    #[instrument(skip(self, dto, catalog), fields(name = %dto.name))]
    pub async fn create_role(
        &self,
        dto: CreateRoleDto,
        catalog: &PermissionCatalog,
    ) -> Result<Role, EditorError> {
        let dto = CreateRoleDto {
            name: self.validate_name(&dto.name, None)?,
            description: dto.description.trim().to_string(),
            permission_ids: dto.permission_ids,
        };
        dto.validate()
            .map_err(|e| EditorError::from_validation_errors(&e))?;
        ensure_in_catalog(&dto.permission_ids, catalog)?;

        let role = self
            .store
            .create_role(&dto.name, &dto.description, &dto.permission_ids)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => duplicate_name(&dto.name),
                other => other.into(),
            })?;

        info!(role_id = %role.id, permissions = role.permission_ids.len(), "Role created");
        self.roles.write().push(role.clone());
        Ok(role)
    }

    /// Replaces the role's persisted permission set with `permission_ids`.
    #[instrument(skip(self, permission_ids, catalog), fields(permissions = permission_ids.len()))]
    pub async fn update_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
        catalog: &PermissionCatalog,
    ) -> Result<Role, EditorError> {
        ensure_in_catalog(permission_ids, catalog)?;
        if self.get(role_id).is_none() {
            return Err(EditorError::RoleNotFound(role_id));
        }

        let _guard = SaveGuard::acquire(&self.saving, role_id).inspect_err(|_| {
            warn!("Save already in progress");
        })?;

        let role = self
            .store
            .replace_role_permissions(role_id, permission_ids)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => EditorError::RoleNotFound(role_id),
                other => other.into(),
            })?;

        info!("Role permissions saved");
        self.replace_cached(role.clone());
        Ok(role)
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn rename_role(
        &self,
        role_id: RoleId,
        dto: UpdateRoleDto,
    ) -> Result<Role, EditorError> {
        if self.get(role_id).is_none() {
            return Err(EditorError::RoleNotFound(role_id));
        }

        let dto = UpdateRoleDto {
            name: self.validate_name(&dto.name, Some(role_id))?,
            description: dto.description.trim().to_string(),
        };
        dto.validate()
            .map_err(|e| EditorError::from_validation_errors(&e))?;

        let role = self
            .store
            .update_role_details(role_id, &dto.name, &dto.description)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => duplicate_name(&dto.name),
                StoreError::NotFound(_) => EditorError::RoleNotFound(role_id),
                other => other.into(),
            })?;

        info!("Role renamed");
        self.replace_cached(role.clone());
        Ok(role)
    }

    fn replace_cached(&self, role: Role) {
        let mut roles = self.roles.write();
        match roles.iter_mut().find(|r| r.id == role.id) {
            Some(slot) => *slot = role,
            None => roles.push(role),
        }
    }
}

fn duplicate_name(name: &str) -> EditorError {
    EditorError::validation("name", format!("A role named \"{name}\" already exists"))
}

fn ensure_in_catalog(
    permission_ids: &BTreeSet<PermissionId>,
    catalog: &PermissionCatalog,
) -> Result<(), EditorError> {
    match permission_ids.iter().find(|id| !catalog.contains(**id)) {
        Some(unknown) => Err(EditorError::UnknownPermission(*unknown)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_db::MemoryRoleStore;
    use roledesk_models::Permission;

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::from_permissions(vec![
            Permission::new(1, "patients:view", "patients", ""),
            Permission::new(2, "labs:view", "labs", ""),
        ])
    }

    async fn registry() -> RoleRegistry<MemoryRoleStore> {
        let store = MemoryRoleStore::new().with_permissions(catalog().all().to_vec());
        store.insert_role("Doctor", "", []);
        RoleRegistry::load(store).await.unwrap()
    }

    #[test]
    fn test_save_guard_releases_on_drop() {
        let saving = Mutex::new(HashSet::new());
        let role_id = RoleId::new(1);
        {
            let _guard = SaveGuard::acquire(&saving, role_id).unwrap();
            assert!(matches!(
                SaveGuard::acquire(&saving, role_id),
                Err(EditorError::AlreadySaving(_))
            ));
        }
        assert!(SaveGuard::acquire(&saving, role_id).is_ok());
    }

    #[tokio::test]
    async fn test_validate_name_trims_and_detects_duplicates() {
        let registry = registry().await;
        assert_eq!(registry.validate_name("  Nurse ", None).unwrap(), "Nurse");
        assert!(registry.validate_name(" DOCTOR ", None).is_err());

        let doctor = registry.roles()[0].id;
        assert!(registry.validate_name("doctor", Some(doctor)).is_ok());
    }

    #[tokio::test]
    async fn test_update_unknown_role() {
        let registry = registry().await;
        let err = registry
            .update_permissions(RoleId::new(99), &BTreeSet::new(), &catalog())
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::RoleNotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_updates_cache() {
        let registry = registry().await;
        let doctor = registry.roles()[0].id;
        let renamed = registry
            .rename_role(
                doctor,
                UpdateRoleDto {
                    name: " Attending ".into(),
                    description: "Senior physician".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Attending");
        assert_eq!(registry.get(doctor).unwrap().description, "Senior physician");
    }
}
