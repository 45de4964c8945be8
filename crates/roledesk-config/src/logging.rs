//! Logging configuration.
//!
//! - `LOG_LEVEL`: Level for roledesk crates (default: `info`)
//! - `LOG_DIR`: Directory for daily-rotated log files; unset disables file logging
//! - `LOG_JSON`: Write the log file as JSON lines (default: false)

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json: false,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: lookup("LOG_LEVEL")
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "info".to_string()),
            log_dir: lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            json: lookup("LOG_JSON")
                .and_then(|v| crate::parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_lookup(|_| None);
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_reads_values() {
        let config = LoggingConfig::from_lookup(|key| match key {
            "LOG_LEVEL" => Some("DEBUG".to_string()),
            "LOG_DIR" => Some("storage/logs".to_string()),
            "LOG_JSON" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(config.level, "debug");
        assert_eq!(config.log_dir, Some(PathBuf::from("storage/logs")));
        assert!(config.json);
    }
}
