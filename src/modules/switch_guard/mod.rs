pub mod model;
pub mod service;

pub use model::{SwitchDecision, SwitchState};
pub use service::RoleSwitchGuard;
