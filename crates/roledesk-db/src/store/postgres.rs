//! PostgreSQL [`RoleStore`] backend.
//!
//! Queries are built at runtime (no `query!` macros) so the crate compiles
//! without a live database. Schema lives in `migrations/`.

use roledesk_core::StoreError;
use roledesk_core::permissions::DEFAULT_CATALOG;
use roledesk_models::{Permission, PermissionId, Role, RoleId};
use sqlx::postgres::PgPoolOptions;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

pub use sqlx::PgPool;

/// Initializes a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the connection fails.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

#[derive(Clone, Debug)]
pub struct PgRoleStore {
    pool: PgPool,
    seed_on_empty: bool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool, seed_on_empty: bool) -> Self {
        Self {
            pool,
            seed_on_empty,
        }
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))
    }

    async fn fetch_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, name, category, description FROM permissions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    /// Inserts the default catalog. Safe to run concurrently: existing names are skipped.
    async fn seed_permissions(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for seed in DEFAULT_CATALOG {
            sqlx::query(
                "INSERT INTO permissions (name, category, description) VALUES ($1, $2, $3)
                ON CONFLICT (name) DO NOTHING",
            )
            .bind(seed.name)
            .bind(seed.category)
            .bind(seed.description)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(count = DEFAULT_CATALOG.len(), "Seeded empty permission catalog");
        Ok(())
    }

    async fn fetch_role(&self, role_id: RoleId) -> Result<Role, StoreError> {
        let row = sqlx::query_as::<_, (RoleId, String, String)>(
            "SELECT id, name, description FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("role {}", role_id)))?;

        let links = sqlx::query_as::<_, (RoleId, PermissionId)>(
            "SELECT role_id, permission_id FROM role_permissions WHERE role_id = $1",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        assemble_roles(vec![row], links)
            .pop()
            .ok_or_else(|| StoreError::NotFound(format!("role {}", role_id)))
    }
}

/// Joins role rows with their `(role_id, permission_id)` links, keeping row order.
fn assemble_roles(
    rows: Vec<(RoleId, String, String)>,
    links: Vec<(RoleId, PermissionId)>,
) -> Vec<Role> {
    let mut grants: BTreeMap<RoleId, BTreeSet<PermissionId>> = BTreeMap::new();
    for (role_id, permission_id) in links {
        grants.entry(role_id).or_default().insert(permission_id);
    }

    rows.into_iter()
        .map(|(id, name, description)| Role {
            id,
            name,
            description,
            permission_ids: grants.remove(&id).unwrap_or_default(),
        })
        .collect()
}

fn raw_ids(permission_ids: &BTreeSet<PermissionId>) -> Vec<i64> {
    permission_ids.iter().map(|id| id.into_inner()).collect()
}

fn map_unique_violation(e: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("a role named '{}' already exists", name));
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound("one or more permission IDs are invalid".to_string());
        }
    }
    StoreError::from(e)
}

impl super::RoleStore for PgRoleStore {
    #[instrument(skip(self))]
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query_as::<_, (RoleId, String, String)>(
            "SELECT id, name, description FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let links = sqlx::query_as::<_, (RoleId, PermissionId)>(
            "SELECT role_id, permission_id FROM role_permissions",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_roles(rows, links))
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let permissions = self.fetch_permissions().await?;
        if permissions.is_empty() && self.seed_on_empty {
            self.seed_permissions().await?;
            return self.fetch_permissions().await;
        }
        Ok(permissions)
    }

    #[instrument(skip(self, permission_ids), fields(permission_count = permission_ids.len()))]
    async fn create_role(
        &self,
        name: &str,
        description: &str,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> Result<Role, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (role_id,) = sqlx::query_as::<_, (RoleId,)>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, name))?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(role_id)
        .bind(raw_ids(permission_ids))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, name))?;

        tx.commit().await?;

        Ok(Role {
            id: role_id,
            name: name.to_string(),
            description: description.to_string(),
            permission_ids: permission_ids.clone(),
        })
    }

    #[instrument(skip(self, permission_ids), fields(permission_count = permission_ids.len()))]
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &BTreeSet<PermissionId>,
    ) -> Result<Role, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (name, description) = sqlx::query_as::<_, (String, String)>(
            "SELECT name, description FROM roles WHERE id = $1 FOR UPDATE",
        )
        .bind(role_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("role {}", role_id)))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(role_id)
        .bind(raw_ids(permission_ids))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &name))?;

        sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Role {
            id: role_id,
            name,
            description,
            permission_ids: permission_ids.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn update_role_details(
        &self,
        role_id: RoleId,
        name: &str,
        description: &str,
    ) -> Result<Role, StoreError> {
        let updated = sqlx::query(
            "UPDATE roles SET name = $1, description = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(name)
        .bind(description)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, name))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("role {}", role_id)));
        }

        self.fetch_role(role_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_roles_groups_links_by_role() {
        let rows = vec![
            (RoleId::new(2), "Nurse".to_string(), String::new()),
            (RoleId::new(1), "Admin".to_string(), "All access".to_string()),
        ];
        let links = vec![
            (RoleId::new(1), PermissionId::new(10)),
            (RoleId::new(2), PermissionId::new(11)),
            (RoleId::new(1), PermissionId::new(12)),
        ];

        let roles = assemble_roles(rows, links);
        assert_eq!(roles[0].name, "Nurse");
        assert_eq!(
            roles[0].permission_ids,
            BTreeSet::from([PermissionId::new(11)])
        );
        assert_eq!(
            roles[1].permission_ids,
            BTreeSet::from([PermissionId::new(10), PermissionId::new(12)])
        );
    }

    #[test]
    fn test_assemble_roles_without_links() {
        let rows = vec![(RoleId::new(3), "Clerk".to_string(), String::new())];
        let roles = assemble_roles(rows, Vec::new());
        assert!(roles[0].permission_ids.is_empty());
    }
}
