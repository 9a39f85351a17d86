//! Configuration file for buildsift
//!
//! Read from `--config <path>` when given, otherwise from
//! `~/.buildsift/config.toml` if it exists. Missing keys take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default tail kept for failed temporary builds, in bytes
const DEFAULT_TRIMMED_LOG_MAX_SIZE: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on the trimmed log tail, in bytes
    pub trimmed_log_max_size: usize,

    /// Tracing directives used when `RUST_LOG` is unset or empty
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trimmed_log_max_size: DEFAULT_TRIMMED_LOG_MAX_SIZE,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Get the default config file path
    fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".buildsift").join("config.toml"))
    }

    /// Load the configuration
    ///
    /// An explicit path must exist. The default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.trimmed_log_max_size, 1_000_000);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = Config::parse("trimmed_log_max_size = 2048\n").unwrap();
        assert_eq!(config.trimmed_log_max_size, 2048);
        assert_eq!(config.log_level, "warn");

        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(Config::parse("trimmed_log_max_size = \"big\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.trimmed_log_max_size, 1_000_000);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
