//! # roledesk Config
//!
//! Configuration types for roledesk, loaded from environment variables:
//!
//! - [`editor`]: Persistence backend selection and seeding behaviour
//! - [`logging`]: Log level and optional log file directory
//!
//! # Example
//!
//! ```ignore
//! use roledesk_config::{EditorConfig, LoggingConfig};
//!
//! // Load all configs from environment
//! let editor_config = EditorConfig::from_env();
//! let logging_config = LoggingConfig::from_env();
//! ```

pub mod editor;
pub mod logging;

// Re-export commonly used types at crate root
pub use editor::{EditorConfig, StoreBackend};
pub use logging::LoggingConfig;

/// Parses the usual truthy/falsy spellings of an environment flag.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
