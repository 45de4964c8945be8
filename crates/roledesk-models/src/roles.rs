//! Role and permission domain models and DTOs.
//!
//! This module contains the records exchanged with the persistence layer
//! (roles and permissions), the ordered permission groupings used by the
//! editor, and the validated DTOs for creating and renaming roles.

use crate::ids::{PermissionId, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

/// Maximum role name length, in characters.
pub const MAX_NAME_CHARS: u64 = 100;
/// Maximum role description length, in characters.
pub const MAX_DESCRIPTION_CHARS: u64 = 255;

/// An atomic access right. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl Permission {
    pub fn new(
        id: impl Into<PermissionId>,
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    /// Case-insensitive substring match against name and description.
    ///
    /// An empty (or whitespace-only) term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

/// A persisted role and the full set of permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_ids: BTreeSet<PermissionId>,
}

impl Role {
    pub fn has_permission(&self, id: PermissionId) -> bool {
        self.permission_ids.contains(&id)
    }

    /// Case-insensitive name comparison, the uniqueness rule for roles.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// Permissions of one category, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCategory {
    pub category: String,
    pub permissions: Vec<Permission>,
}

impl PermissionCategory {
    pub fn ids(&self) -> Vec<PermissionId> {
        self.permissions.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

/// Selected/total counter for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub selected: usize,
    pub total: usize,
}

impl CategorySummary {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.selected == self.total
    }

    pub fn is_partial(&self) -> bool {
        self.selected > 0 && self.selected < self.total
    }
}

// DTOs

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    #[serde(default)]
    pub description: String,
    /// Permission IDs to assign to this role
    #[serde(default)]
    pub permission_ids: BTreeSet<PermissionId>,
}

impl CreateRoleDto {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permission_ids: permission_ids.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    #[serde(default)]
    pub description: String,
}
