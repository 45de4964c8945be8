pub mod service;

pub use service::{
    ALL_CATEGORIES, PermissionCatalog, dropped_categories, filter_permissions, group_by_category,
};
