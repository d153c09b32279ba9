//! Error types for the lobbyist registry.
//!
//! The query layer never returns these: it logs and folds failures into
//! sentinel values. They cover everything around it (opening the database,
//! loading configuration, terminal and file I/O, parsing user input).

use thiserror::Error;

/// Main error type for registry operations outside the query layer.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Database open or connection errors
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// File and terminal I/O
    #[error("I/O error: {0}")]
    Io(String),

    /// Text typed by the user that could not be interpreted
    #[error("Input error: {0}")]
    Input(String),
}

impl RegistryError {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Database(_) => "Database Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Input(_) => "Input Error",
        }
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias using RegistryError.
pub type Result<T> = std::result::Result<T, RegistryError>;
