mod common;

use common::{catalog, fixture, ids, slow_fixture};
use roledesk::RoleRegistry;
use roledesk_core::{EditorError, StoreError};
use roledesk_db::MemoryRoleStore;
use roledesk_models::{CreateRoleDto, PermissionId, RoleId, UpdateRoleDto};
use std::sync::Arc;
use std::time::Duration;

async fn registry() -> (RoleRegistry<Arc<MemoryRoleStore>>, common::Fixture) {
    let fixture = fixture();
    let registry = RoleRegistry::load(Arc::clone(&fixture.store)).await.unwrap();
    (registry, fixture)
}

fn field_of(err: &EditorError) -> &str {
    match err {
        EditorError::Validation { field, .. } => field,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_role_succeeds_and_joins_cache() {
    let (registry, fixture) = registry().await;

    let role = registry
        .create_role(CreateRoleDto::new("  Doctor  ", "Physicians", ids(&[1, 3])), &catalog())
        .await
        .unwrap();

    assert_eq!(role.name, "Doctor");
    assert_eq!(role.permission_ids, ids(&[1, 3]));
    assert_eq!(registry.get(role.id), Some(role.clone()));
    assert_eq!(fixture.store.role(role.id), Some(role));
}

#[tokio::test]
async fn test_duplicate_name_is_rejected_ignoring_case() {
    let (registry, fixture) = registry().await;

    registry
        .create_role(CreateRoleDto::new("Doctor", "", []), &catalog())
        .await
        .unwrap();
    let writes = fixture.store.write_count();

    let err = registry
        .create_role(CreateRoleDto::new("doctor", "", []), &catalog())
        .await
        .unwrap_err();

    assert_eq!(field_of(&err), "name");
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fixture.store.write_count(), writes);
}

#[tokio::test]
async fn test_blank_name_is_required() {
    let (registry, _fixture) = registry().await;
    let err = registry
        .create_role(CreateRoleDto::new("   ", "", []), &catalog())
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), "name");
    assert!(err.to_string().contains("required"));
}

#[tokio::test]
async fn test_length_rules_apply_after_presence_and_uniqueness() {
    let (registry, _fixture) = registry().await;

    let long_name = "x".repeat(101);
    let err = registry
        .create_role(CreateRoleDto::new(long_name, "", []), &catalog())
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), "name");
    assert!(err.to_string().contains("between 1 and 100"));

    let err = registry
        .create_role(CreateRoleDto::new("Clerk", "d".repeat(256), []), &catalog())
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), "description");

    // A duplicate that is also too long reports the duplicate.
    let err = registry
        .create_role(CreateRoleDto::new("r1", "d".repeat(256), []), &catalog())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_boundary_lengths_are_accepted() {
    let (registry, _fixture) = registry().await;
    let role = registry
        .create_role(
            CreateRoleDto::new("n".repeat(100), "d".repeat(255), []),
            &catalog(),
        )
        .await
        .unwrap();
    assert_eq!(role.name.chars().count(), 100);
}

#[tokio::test]
async fn test_create_with_unknown_permission_is_rejected() {
    let (registry, fixture) = registry().await;
    let err = registry
        .create_role(CreateRoleDto::new("Clerk", "", ids(&[1, 42])), &catalog())
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::UnknownPermission(id) if id == PermissionId::new(42)));
    assert_eq!(fixture.store.write_count(), 0);
}

#[tokio::test]
async fn test_update_permissions_replaces_whole_set() {
    let (registry, fixture) = registry().await;

    let role = registry
        .update_permissions(fixture.r1.id, &ids(&[2, 3]), &catalog())
        .await
        .unwrap();

    assert_eq!(role.permission_ids, ids(&[2, 3]));
    assert_eq!(registry.get(fixture.r1.id).unwrap().permission_ids, ids(&[2, 3]));
}

#[tokio::test]
async fn test_concurrent_save_for_same_role_is_rejected() {
    let fixture = slow_fixture(Duration::from_millis(50));
    let registry = RoleRegistry::load(Arc::clone(&fixture.store)).await.unwrap();
    let catalog = catalog();
    let first_ids = ids(&[1, 2]);
    let second_ids = ids(&[3]);

    let (first, second) = tokio::join!(
        registry.update_permissions(fixture.r1.id, &first_ids, &catalog),
        async {
            tokio::task::yield_now().await;
            assert!(registry.is_saving(fixture.r1.id));
            registry
                .update_permissions(fixture.r1.id, &second_ids, &catalog)
                .await
        }
    );

    assert_eq!(first.unwrap().permission_ids, first_ids);
    let err = second.unwrap_err();
    assert!(matches!(err, EditorError::AlreadySaving(id) if id == fixture.r1.id));
    assert!(err.is_recoverable());
    assert!(!registry.is_saving(fixture.r1.id));
    assert_eq!(fixture.store.write_count(), 1);
}

#[tokio::test]
async fn test_concurrent_saves_for_different_roles_proceed() {
    let fixture = slow_fixture(Duration::from_millis(20));
    let registry = RoleRegistry::load(Arc::clone(&fixture.store)).await.unwrap();
    let catalog = catalog();
    let set = ids(&[3]);

    let (a, b) = tokio::join!(
        registry.update_permissions(fixture.r1.id, &set, &catalog),
        registry.update_permissions(fixture.r2.id, &set, &catalog),
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
}

#[tokio::test]
async fn test_failed_save_releases_in_flight_marker() {
    let (registry, fixture) = registry().await;
    fixture.store.fail_next_writes(1);

    let err = registry
        .update_permissions(fixture.r1.id, &ids(&[2]), &catalog())
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Store(StoreError::Unavailable(_))));
    assert!(!registry.is_saving(fixture.r1.id));

    registry
        .update_permissions(fixture.r1.id, &ids(&[2]), &catalog())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rename_allows_own_name_but_not_anothers() {
    let (registry, fixture) = registry().await;

    let renamed = registry
        .rename_role(
            fixture.r1.id,
            UpdateRoleDto {
                name: "r1".into(),
                description: "Lowercased".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "r1");

    let err = registry
        .rename_role(
            fixture.r1.id,
            UpdateRoleDto {
                name: "R2".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), "name");
}

#[tokio::test]
async fn test_rename_unknown_role() {
    let (registry, _fixture) = registry().await;
    let err = registry
        .rename_role(
            RoleId::new(404),
            UpdateRoleDto {
                name: "Ghost".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::RoleNotFound(_)));
}

#[tokio::test]
async fn test_refresh_picks_up_roles_created_elsewhere() {
    let (registry, fixture) = registry().await;
    fixture.store.insert_role("Outside", "", []);
    assert_eq!(registry.roles().len(), 2);

    registry.refresh().await.unwrap();
    assert_eq!(registry.roles().len(), 3);
}
