//! Configuration for the lobbyist registry front ends.
//!
//! Settings come from an optional TOML file. A missing file means defaults;
//! a file that does not parse is an error.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Database file used when nothing else names one
pub const DEFAULT_DATABASE: &str = "Chicago_Lobbyists.db";

/// Searches returning more hits than this ask the user to narrow down
pub const DEFAULT_DISPLAY_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the registry
    pub database: PathBuf,

    /// Maximum number of search hits listed
    pub display_cap: usize,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,

    /// Where the terminal UI saves its transcript
    pub output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            display_cap: DEFAULT_DISPLAY_CAP,
            log_level: "info".to_string(),
            output_file: PathBuf::from("lobbyists_output.txt"),
        }
    }
}

impl Config {
    /// Load from `path`, or fall back to defaults if the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|e| {
            RegistryError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)
            .map_err(|e| RegistryError::config(format!("invalid config file: {}", e)))?;

        if config.display_cap == 0 {
            return Err(RegistryError::config("display_cap must be at least 1"));
        }

        Ok(config)
    }

    /// `~/.config/lobbyist-registry/config.toml` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("lobbyist-registry").join("config.toml"),
            None => PathBuf::from("lobbyist-registry.toml"),
        }
    }

    /// The database to open: an explicit path (flag or env) wins over the file.
    pub fn resolve_database(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.database.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database, PathBuf::from("Chicago_Lobbyists.db"));
        assert_eq!(config.display_cap, 100);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("display_cap = 25\n").unwrap();
        assert_eq!(config.display_cap, 25);
        assert_eq!(config.database, PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn test_zero_cap_rejected() {
        let err = Config::parse("display_cap = 0").unwrap_err();
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_malformed_file_rejected() {
        assert!(Config::parse("database = [").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "database = \"/data/lobby.db\"").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.database, PathBuf::from("/data/lobby.db"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_explicit_database_wins() {
        let config = Config::default();
        let explicit = PathBuf::from("other.db");

        assert_eq!(config.resolve_database(Some(&explicit)), explicit);
        assert_eq!(config.resolve_database(None), PathBuf::from(DEFAULT_DATABASE));
    }
}
