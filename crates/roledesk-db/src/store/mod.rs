//! The [`RoleStore`] trait and its backends.

use roledesk_core::StoreError;
use roledesk_models::{Permission, PermissionId, Role, RoleId};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

/// Logical operations the editor needs from whatever persists roles.
///
/// Implementations own the records; callers only ever hold copies.
pub trait RoleStore: Send + Sync {
    fn list_roles(&self) -> impl Future<Output = Result<Vec<Role>, StoreError>> + Send;

    /// Lists the permission catalog in display order.
    ///
    /// A backend may seed an empty catalog as a side effect. An empty result
    /// is not an error at this layer.
    fn list_permissions(&self) -> impl Future<Output = Result<Vec<Permission>, StoreError>> + Send;

    fn create_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send;

    /// Replaces the role's entire permission set.
    fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send;

    fn update_role_details(
        &self,
        role_id: RoleId,
        name: &str,
        description: &str,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send;
}

impl<S: RoleStore> RoleStore for Arc<S> {
    fn list_roles(&self) -> impl Future<Output = Result<Vec<Role>, StoreError>> + Send {
        (**self).list_roles()
    }

    fn list_permissions(&self) -> impl Future<Output = Result<Vec<Permission>, StoreError>> + Send {
        (**self).list_permissions()
    }

    fn create_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send {
        (**self).create_role(name, description, permission_ids)
    }

    fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send {
        (**self).replace_role_permissions(role_id, permission_ids)
    }

    fn update_role_details(
        &self,
        role_id: RoleId,
        name: &str,
        description: &str,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send {
        (**self).update_role_details(role_id, name, description)
    }
}
