//! # roledesk
//!
//! The editing core of a role-based permission editor: select a role, toggle
//! permissions from a categorized catalog, bootstrap new roles from templates,
//! and switch between roles without ever dropping unsaved edits silently.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── logging.rs         # Subscriber setup (console + rolling file)
//! └── modules/
//!     ├── catalog/       # PermissionCatalog: grouping and filtering
//!     ├── selection/     # SelectionState: baseline vs working set
//!     ├── templates/     # RoleTemplateEngine and built-in templates
//!     ├── switch_guard/  # RoleSwitchGuard: Idle / PendingConfirm
//!     ├── roles/         # RoleRegistry and the create-role draft
//!     └── session/       # EditorSession composing all of the above
//! ```
//!
//! Persistence is reached only through [`roledesk_db::RoleStore`].
//!
//! ## Control flow
//!
//! The catalog is loaded once per session and only replaced by an explicit
//! refresh. Selecting a role loads its persisted permission ids as both the
//! baseline and the working set. Edits mutate the working set only. A switch
//! to another role while the working set differs from the baseline parks the
//! request in `PendingConfirm` until the operator saves, discards or cancels.
//!
//! ```ignore
//! use roledesk::modules::session::EditorSession;
//! use roledesk_db::MemoryRoleStore;
//!
//! let mut session = EditorSession::open(MemoryRoleStore::seeded()).await?;
//! session.request_switch(role_id)?;
//! session.toggle(permission_id)?;
//! session.save().await?;
//! ```

pub mod logging;
pub mod modules;

// Re-export workspace crates for convenience
pub use roledesk_config;
pub use roledesk_core;
pub use roledesk_db;
pub use roledesk_models;

pub use modules::catalog::PermissionCatalog;
pub use modules::roles::{RoleDraft, RoleRegistry};
pub use modules::selection::SelectionState;
pub use modules::session::{CompletedSave, EditorSession, PendingSave};
pub use modules::switch_guard::{RoleSwitchGuard, SwitchDecision, SwitchState};
pub use modules::templates::RoleTemplateEngine;
