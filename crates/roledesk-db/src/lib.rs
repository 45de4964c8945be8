//! # roledesk DB
//!
//! The persistence boundary consumed by the role editor.
//!
//! The editor never talks to a database directly; it goes through the
//! [`RoleStore`] trait. Two backends are provided:
//!
//! - [`MemoryRoleStore`]: in-process store, used by tests and the CLI's
//!   `memory` backend
//! - `PgRoleStore`: PostgreSQL via SQLx (enable the `postgres` feature)
//!
//! # Example
//!
//! ```ignore
//! use roledesk_db::{MemoryRoleStore, RoleStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryRoleStore::seeded();
//!     let permissions = store.list_permissions().await.unwrap();
//!     println!("{} permissions", permissions.len());
//! }
//! ```

pub mod store;

pub use store::RoleStore;
pub use store::memory::MemoryRoleStore;
#[cfg(feature = "postgres")]
pub use store::postgres::{PgPool, PgRoleStore, init_db_pool};
