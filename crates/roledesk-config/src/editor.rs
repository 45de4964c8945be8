//! Editor configuration.
//!
//! # Configuration
//!
//! - `ROLEDESK_STORE`: Persistence backend, `memory` or `postgres` (default: `memory`)
//! - `DATABASE_URL`: Postgres connection URL, required for the `postgres` backend
//! - `DATABASE_MAX_CONNECTIONS`: Pool size for the `postgres` backend (default: 5)
//! - `ROLEDESK_SEED_ON_EMPTY`: Seed the default catalog when the permission
//!   table is empty (default: true)
//!
//! # Example
//!
//! ```ignore
//! use roledesk_config::editor::{EditorConfig, StoreBackend};
//!
//! let config = EditorConfig::from_env();
//! if config.store == StoreBackend::Postgres {
//!     // connect using config.database_url
//! }
//! ```

use std::fmt;
use std::str::FromStr;

/// Which persistence backend the editor talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "postgres" | "pg" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => f.write_str("memory"),
            StoreBackend::Postgres => f.write_str("postgres"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Backend used for roles and permissions.
    pub store: StoreBackend,

    /// Postgres connection URL.
    pub database_url: Option<String>,

    /// Maximum pool connections for the Postgres backend.
    pub max_connections: u32,

    /// Whether an empty permission table is seeded from the default catalog.
    pub seed_on_empty: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            max_connections: 5,
            seed_on_empty: true,
        }
    }
}

impl EditorConfig {
    /// Creates a new `EditorConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            store: lookup("ROLEDESK_STORE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            seed_on_empty: lookup("ROLEDESK_SEED_ON_EMPTY")
                .and_then(|v| crate::parse_flag(&v))
                .unwrap_or(defaults.seed_on_empty),
        }
    }
}
