//! Demo role seeding.
//!
//! Generates plausible job-title role names and gives each role the
//! permissions of a randomly chosen template.

use fake::Fake;
use fake::faker::job::en::Title;
use rand::seq::SliceRandom;
use roledesk::{PermissionCatalog, RoleRegistry, RoleTemplateEngine};
use roledesk_core::EditorError;
use roledesk_db::RoleStore;
use roledesk_models::{CreateRoleDto, Role, RoleTemplate};
use std::collections::HashSet;
use std::time::Instant;
use tracing::warn;

/// Up to `count` distinct role names, compared ignoring case.
pub fn generate_role_names(count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(count);

    for _ in 0..count.saturating_mul(10) {
        if names.len() == count {
            break;
        }
        let title: String = Title().fake();
        if seen.insert(title.to_lowercase()) {
            names.push(title);
        }
    }
    names
}

fn plan_roles<'a>(engine: &'a RoleTemplateEngine, count: usize) -> Vec<(String, &'a RoleTemplate)> {
    let mut rng = rand::thread_rng();
    generate_role_names(count)
        .into_iter()
        .filter_map(|name| {
            engine
                .templates()
                .choose(&mut rng)
                .map(|template| (name, template))
        })
        .collect()
}

/// Creates up to `count` roles through the registry.
///
/// Names that collide with an existing role are skipped.
pub async fn seed_demo_roles<S: RoleStore>(
    registry: &RoleRegistry<S>,
    catalog: &PermissionCatalog,
    engine: &RoleTemplateEngine,
    count: usize,
) -> Result<Vec<Role>, EditorError> {
    let start_time = Instant::now();
    println!("🌱 Seeding {} demo roles...", count);

    let mut created = Vec::new();
    for (name, template) in plan_roles(engine, count) {
        let permission_ids = RoleTemplateEngine::resolve(template, catalog.all())?;
        let dto = CreateRoleDto::new(name, template.description.clone(), permission_ids);

        match registry.create_role(dto, catalog).await {
            Ok(role) => created.push(role),
            Err(EditorError::Validation { message, .. }) => {
                warn!(%message, "Skipping demo role");
            }
            Err(e) => return Err(e),
        }
    }

    println!(
        "   ✓ Created {} roles in {:?}",
        created.len(),
        start_time.elapsed()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledesk_db::MemoryRoleStore;

    #[test]
    fn test_generated_names_are_distinct() {
        let names = generate_role_names(20);
        let lowered: HashSet<_> = names.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(lowered.len(), names.len());
        assert!(names.len() <= 20);
    }

    #[tokio::test]
    async fn test_seed_demo_roles_uses_template_permissions() {
        let store = MemoryRoleStore::seeded();
        let catalog = PermissionCatalog::load(&store).await.unwrap();
        let registry = RoleRegistry::load(store).await.unwrap();

        let created = seed_demo_roles(&registry, &catalog, &RoleTemplateEngine::builtin(), 5)
            .await
            .unwrap();

        assert!(!created.is_empty());
        assert_eq!(registry.roles().len(), created.len());
        for role in &created {
            assert!(!role.permission_ids.is_empty());
            assert!(role.permission_ids.iter().all(|id| catalog.contains(*id)));
        }
    }
}
