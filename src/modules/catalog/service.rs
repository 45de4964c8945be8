use roledesk_core::EditorError;
use roledesk_db::RoleStore;
use roledesk_models::{CategorySummary, Permission, PermissionCategory, PermissionId};
use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};

/// Category filter value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

/// The full permission set of a session, grouped by category.
///
/// Read-only once built; a refresh builds a new catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCatalog {
    all: Vec<Permission>,
    grouped: Vec<PermissionCategory>,
    ids: BTreeSet<PermissionId>,
}

impl PermissionCatalog {
    /// Loads the catalog from the store.
    ///
    /// An empty catalog is reported as [`EditorError::CatalogUnavailable`];
    /// the caller is expected to offer a retry.
    #[instrument(skip(store))]
    pub async fn load<S: RoleStore>(store: &S) -> Result<Self, EditorError> {
        let permissions = store.list_permissions().await?;
        if permissions.is_empty() {
            warn!("Permission catalog is empty");
            return Err(EditorError::CatalogUnavailable);
        }

        let catalog = Self::from_permissions(permissions);
        info!(
            permissions = catalog.len(),
            categories = catalog.grouped.len(),
            "Permission catalog loaded"
        );
        Ok(catalog)
    }

    /// Builds a catalog from permissions in source order.
    ///
    /// Repeated ids keep their first occurrence.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut ids = BTreeSet::new();
        let mut all = Vec::new();
        for permission in permissions {
            if ids.insert(permission.id) {
                all.push(permission);
            } else {
                warn!(permission_id = %permission.id, "Duplicate permission id ignored");
            }
        }

        let grouped = group_by_category(&all);
        Self { all, grouped, ids }
    }

    pub fn all(&self) -> &[Permission] {
        &self.all
    }

    pub fn grouped(&self) -> &[PermissionCategory] {
        &self.grouped
    }

    /// Every permission id: the universe a selection must stay within.
    pub fn ids(&self) -> &BTreeSet<PermissionId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn contains(&self, id: PermissionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn get(&self, id: PermissionId) -> Option<&Permission> {
        self.all.iter().find(|p| p.id == id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.grouped.iter().map(|g| g.category.as_str())
    }

    /// Ids of one category in source order; empty for an unknown category.
    pub fn category_ids(&self, category: &str) -> Vec<PermissionId> {
        self.grouped
            .iter()
            .find(|g| g.category == category)
            .map(PermissionCategory::ids)
            .unwrap_or_default()
    }

    pub fn filter(&self, search_term: &str, category_filter: &str) -> Vec<PermissionCategory> {
        filter_permissions(&self.all, search_term, category_filter)
    }

    /// Selected/total counts per category, in category order.
    pub fn category_summary(&self, selected: &BTreeSet<PermissionId>) -> Vec<CategorySummary> {
        self.grouped
            .iter()
            .map(|group| CategorySummary {
                category: group.category.clone(),
                selected: group
                    .permissions
                    .iter()
                    .filter(|p| selected.contains(&p.id))
                    .count(),
                total: group.len(),
            })
            .collect()
    }
}

/// Groups permissions by category. Categories appear in first-seen order and
/// permissions keep their source order within a category.
pub fn group_by_category(all: &[Permission]) -> Vec<PermissionCategory> {
    let mut grouped: Vec<PermissionCategory> = Vec::new();
    for permission in all {
        match grouped.iter_mut().find(|g| g.category == permission.category) {
            Some(group) => group.permissions.push(permission.clone()),
            None => grouped.push(PermissionCategory {
                category: permission.category.clone(),
                permissions: vec![permission.clone()],
            }),
        }
    }
    grouped
}

/// Filtered, grouped view of `all`.
///
/// A permission is kept when `search_term` is empty or a case-insensitive
/// substring of its name or description, and `category_filter` is
/// [`ALL_CATEGORIES`] or equal to its category. Categories left with no
/// permissions are omitted.
pub fn filter_permissions(
    all: &[Permission],
    search_term: &str,
    category_filter: &str,
) -> Vec<PermissionCategory> {
    let matching: Vec<Permission> = all
        .iter()
        .filter(|p| category_filter == ALL_CATEGORIES || p.category == category_filter)
        .filter(|p| p.matches_search(search_term))
        .cloned()
        .collect();

    group_by_category(&matching)
}

/// Categories of `all` that no longer exist in `other`, in first-seen order.
pub fn dropped_categories(all: &[Permission], other: &[Permission]) -> Vec<String> {
    let remaining: HashSet<&str> = other.iter().map(|p| p.category.as_str()).collect();
    let mut seen = HashSet::new();
    all.iter()
        .map(|p| p.category.as_str())
        .filter(|c| !remaining.contains(c) && seen.insert(*c))
        .map(str::to_string)
        .collect()
}
