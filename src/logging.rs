//! Tracing setup.
//!
//! The terminal UI logs to a file so log lines never land on top of the
//! display; the CLI and the server log to stderr.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Log to `get_log_path()`, truncated on each run. Logging is skipped (with a
/// warning on stderr) if the file cannot be created.
pub fn init_file_logging(default_level: &str) {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: could not create log directory: {e}");
            return;
        }
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

pub fn init_stderr_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .init();
}

/// `~/.local/state/lobbyist-registry/lobbyists.log` on Linux, the config
/// directory elsewhere, the temp directory as a last resort.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("lobbyist-registry").join("lobbyists.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("lobbyist-registry").join("lobbyists.log");
    }

    std::env::temp_dir().join("lobbyists.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_absolute() {
        assert!(get_log_path().is_absolute());
    }

    #[test]
    fn test_log_path_file_name() {
        assert!(get_log_path().ends_with("lobbyists.log"));
    }
}
