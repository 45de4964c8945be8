//! # roledesk Core
//!
//! Foundational types shared by every roledesk crate:
//!
//! - [`errors`]: The editor error taxonomy and the persistence error type
//! - [`ids`]: Strongly-typed integer ids for roles and permissions
//! - [`permissions`]: The default permission catalog used for seeding
//!
//! # Example
//!
//! ```ignore
//! use roledesk_core::errors::EditorError;
//! use roledesk_core::ids::PermissionId;
//!
//! let error = EditorError::UnknownPermission(PermissionId::new(42));
//! assert!(!error.is_recoverable());
//! ```

pub mod errors;
pub mod ids;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::{EditorError, StoreError};
pub use ids::{PermissionId, RoleId};
