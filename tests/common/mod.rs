use roledesk::EditorSession;
use roledesk::PermissionCatalog;
use roledesk_db::MemoryRoleStore;
use roledesk_models::{Permission, PermissionId, Role};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Category names used by the small catalog.
pub mod categories {
    pub const A: &str = "A";
    pub const B: &str = "B";
}

/// The three-permission catalog used throughout the editor tests:
/// two permissions in category A, one in category B.
pub fn small_catalog() -> Vec<Permission> {
    vec![
        Permission::new(1, "view-patients", categories::A, "See the patient list"),
        Permission::new(2, "edit-patients", categories::A, "Change patient details"),
        Permission::new(3, "view-labs", categories::B, "See lab results"),
    ]
}

pub fn ids(raw: &[i64]) -> BTreeSet<PermissionId> {
    raw.iter().copied().map(PermissionId::new).collect()
}

#[allow(dead_code)]
pub fn catalog() -> PermissionCatalog {
    PermissionCatalog::from_permissions(small_catalog())
}

#[allow(dead_code)]
pub struct Fixture {
    pub store: Arc<MemoryRoleStore>,
    pub r1: Role,
    pub r2: Role,
}

/// A store with the small catalog, `R1 = {1}` and `R2 = {}`.
#[allow(dead_code)]
pub fn fixture() -> Fixture {
    fixture_with(MemoryRoleStore::new())
}

/// Same as [`fixture`], but every write sleeps for `latency` first.
#[allow(dead_code)]
pub fn slow_fixture(latency: Duration) -> Fixture {
    fixture_with(MemoryRoleStore::new().with_latency(latency))
}

fn fixture_with(store: MemoryRoleStore) -> Fixture {
    let store = store.with_permissions(small_catalog());
    let r1 = store.insert_role("R1", "First role", [PermissionId::new(1)]);
    let r2 = store.insert_role("R2", "Second role", []);
    Fixture {
        store: Arc::new(store),
        r1,
        r2,
    }
}

/// Opens a session over the fixture with `R1` active.
#[allow(dead_code)]
pub async fn session_on_r1(fixture: &Fixture) -> EditorSession<Arc<MemoryRoleStore>> {
    let mut session = EditorSession::open(Arc::clone(&fixture.store)).await.unwrap();
    session.request_switch(fixture.r1.id).unwrap();
    session
}
