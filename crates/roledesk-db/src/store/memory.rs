//! In-process [`RoleStore`] backend.
//!
//! Behaves like the server-side store: role names are unique ignoring case,
//! unknown permission ids are rejected, and an empty permission table can be
//! seeded from the default catalog on first read. It also supports injected
//! latency and failures so callers can exercise in-flight and error paths.

use parking_lot::Mutex;
use roledesk_core::StoreError;
use roledesk_core::permissions::DEFAULT_CATALOG;
use roledesk_models::{Permission, PermissionId, Role, RoleId};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Inner {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    next_role_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    inner: Mutex<Inner>,
    seed_on_empty: bool,
    latency: Option<Duration>,
    unavailable: AtomicBool,
    failing_writes: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryRoleStore {
    /// An empty store that never seeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that seeds [`DEFAULT_CATALOG`] on the first permission read.
    pub fn seeded() -> Self {
        Self::new().with_seed_on_empty(true)
    }

    pub fn with_seed_on_empty(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    /// Delays every write by `latency` before it is applied.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_permissions(self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.inner.lock().permissions = permissions.into_iter().collect();
        self
    }

    /// Swaps the permission table, as a catalog migration would.
    pub fn replace_permissions(&self, permissions: impl IntoIterator<Item = Permission>) {
        self.inner.lock().permissions = permissions.into_iter().collect();
    }

    /// Inserts a role directly, bypassing validation. Test and demo setup only.
    pub fn insert_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> Role {
        let mut inner = self.inner.lock();
        inner.next_role_id += 1;
        let role = Role {
            id: RoleId::new(inner.next_role_id),
            name: name.to_string(),
            description: description.to_string(),
            permission_ids: permission_ids.into_iter().collect(),
        };
        inner.roles.push(role.clone());
        role
    }

    /// Makes every operation fail with [`StoreError::Unavailable`] while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fails the next `count` writes with [`StoreError::Unavailable`].
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of writes that reached the store and were applied.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn role(&self, role_id: RoleId) -> Option<Role> {
        self.inner
            .lock()
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    async fn begin_write(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.check_available()?;

        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            warn!("Injected write failure");
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }

    fn check_known(
        inner: &Inner,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> Result<(), StoreError> {
        let unknown: Vec<String> = permission_ids
            .iter()
            .filter(|id| !inner.permissions.iter().any(|p| p.id == **id))
            .map(|id| id.to_string())
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("permissions [{}]", unknown.join(", "))))
        }
    }

    fn check_name_free(
        inner: &Inner,
        name: &str,
        except: Option<RoleId>,
    ) -> Result<(), StoreError> {
        let taken = inner
            .roles
            .iter()
            .any(|r| Some(r.id) != except && r.name_matches(name));
        if taken {
            return Err(StoreError::Conflict(format!(
                "a role named '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}

impl super::RoleStore for MemoryRoleStore {
    #[instrument(skip(self))]
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        self.check_available()?;
        Ok(self.inner.lock().roles.clone())
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock();

        if inner.permissions.is_empty() && self.seed_on_empty {
            inner.permissions = DEFAULT_CATALOG
                .iter()
                .zip(1_i64..)
                .map(|(seed, id)| Permission::new(id, seed.name, seed.category, seed.description))
                .collect();
            info!(count = inner.permissions.len(), "Seeded empty permission catalog");
        }

        Ok(inner.permissions.clone())
    }

    #[instrument(skip(self, permission_ids), fields(permission_count = permission_ids.len()))]
    async fn create_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> Result<Role, StoreError> {
        self.begin_write().await?;

        let mut inner = self.inner.lock();
        Self::check_name_free(&inner, name, None)?;
        Self::check_known(&inner, permission_ids)?;

        inner.next_role_id += 1;
        let role = Role {
            id: RoleId::new(inner.next_role_id),
            name: name.to_string(),
            description: description.to_string(),
            permission_ids: permission_ids.clone(),
        };
        inner.roles.push(role.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!(role_id = %role.id, "Role created");
        Ok(role)
    }

    #[instrument(skip(self, permission_ids), fields(permission_count = permission_ids.len()))]
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> Result<Role, StoreError> {
        self.begin_write().await?;

        let mut inner = self.inner.lock();
        Self::check_known(&inner, permission_ids)?;

        let role = inner
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| StoreError::NotFound(format!("role {}", role_id)))?;
        role.permission_ids = permission_ids.clone();
        let role = role.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!("Role permissions replaced");
        Ok(role)
    }

    #[instrument(skip(self))]
    async fn update_role_details(
        &self,
        role_id: RoleId,
        name: &str,
        description: &str,
    ) -> Result<Role, StoreError> {
        self.begin_write().await?;

        let mut inner = self.inner.lock();
        Self::check_name_free(&inner, name, Some(role_id))?;

        let role = inner
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| StoreError::NotFound(format!("role {}", role_id)))?;
        role.name = name.to_string();
        role.description = description.to_string();
        let role = role.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RoleStore;

    fn ids(raw: &[i64]) -> BTreeSet<PermissionId> {
        raw.iter().copied().map(PermissionId::new).collect()
    }

    fn catalog() -> Vec<Permission> {
        vec![
            Permission::new(1, "patients:view", "patients", ""),
            Permission::new(2, "patients:edit", "patients", ""),
            Permission::new(3, "labs:view", "labs", ""),
        ]
    }

    #[tokio::test]
    async fn test_unseeded_store_lists_nothing() {
        let store = MemoryRoleStore::new();
        assert!(store.list_permissions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeding_happens_once() {
        let store = MemoryRoleStore::seeded();
        let first = store.list_permissions().await.unwrap();
        let second = store.list_permissions().await.unwrap();
        assert_eq!(first.len(), DEFAULT_CATALOG.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_role_rejects_duplicate_name() {
        let store = MemoryRoleStore::new().with_permissions(catalog());
        store.insert_role("Doctor", "", []);

        let err = store.create_role("doctor", "", &ids(&[1])).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_create_role_rejects_unknown_permission() {
        let store = MemoryRoleStore::new().with_permissions(catalog());
        let err = store.create_role("Nurse", "", &ids(&[1, 99])).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_role_permissions_replaces_whole_set() {
        let store = MemoryRoleStore::new().with_permissions(catalog());
        let role = store.insert_role("Nurse", "", ids(&[1, 2]));

        let updated = store
            .replace_role_permissions(role.id, &ids(&[3]))
            .await
            .unwrap();
        assert_eq!(updated.permission_ids, ids(&[3]));
        assert_eq!(store.role(role.id).unwrap().permission_ids, ids(&[3]));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = MemoryRoleStore::new().with_permissions(catalog());
        let role = store.insert_role("Nurse", "", []);
        store.fail_next_writes(1);

        assert!(store.replace_role_permissions(role.id, &ids(&[1])).await.is_err());
        assert!(store.replace_role_permissions(role.id, &ids(&[1])).await.is_ok());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_reads() {
        let store = MemoryRoleStore::seeded();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_permissions().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.list_permissions().await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_allows_own_name_in_other_case() {
        let store = MemoryRoleStore::new();
        let role = store.insert_role("Nurse", "", []);
        let renamed = store.update_role_details(role.id, "NURSE", "Ward").await.unwrap();
        assert_eq!(renamed.name, "NURSE");
        assert_eq!(renamed.description, "Ward");
    }
}
