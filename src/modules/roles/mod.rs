pub mod model;
pub mod service;

pub use model::RoleDraft;
pub use service::RoleRegistry;
