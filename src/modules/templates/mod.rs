pub mod builtin;
pub mod service;

pub use builtin::builtin_templates;
pub use service::RoleTemplateEngine;
