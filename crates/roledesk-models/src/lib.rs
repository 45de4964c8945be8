//! # roledesk Models
//!
//! Domain models and DTOs shared by the editor core, the persistence
//! backends and the CLI.
//!
//! # Modules
//!
//! - [`roles`]: Roles, permissions, permission groupings and role DTOs
//! - [`templates`]: Static role templates used to bootstrap new roles
//!
//! # Example
//!
//! ```ignore
//! use roledesk_models::{CreateRoleDto, Role, RoleTemplate};
//!
//! let dto = CreateRoleDto::new("Nurse", "Ward nursing staff", []);
//! ```

pub mod roles;
pub mod templates;

pub use roledesk_core::ids;

// Re-export commonly used types at crate root for convenience
pub use ids::{PermissionId, RoleId};

pub use roles::{
    CategorySummary, CreateRoleDto, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS, Permission,
    PermissionCategory, Role, UpdateRoleDto,
};

pub use templates::{PermissionMatcher, RoleTemplate, TemplateIcon, TemplateId};
