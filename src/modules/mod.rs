//! Editing core modules.
//!
//! Leaves first: `catalog` and `selection` hold data, `templates` derives
//! permission sets, `switch_guard` arbitrates role switches, `roles` talks to
//! the store, and `session` composes them into one editing session.

pub mod catalog;
pub mod roles;
pub mod selection;
pub mod session;
pub mod switch_guard;
pub mod templates;
