// Lobbyist Registry - Core Library
// Query executor, report/mutation service and report rendering shared by the
// CLI, the terminal UI and the API server

pub mod config;
pub mod console;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use console::{Command, CommandKind, Sink, StdoutSink};
pub use db::{execute, fetch_all, fetch_one, open_database, Lookup, Row};
pub use entities::{EntityKind, LobbyistCompensationReport, LobbyistDetail, LobbyistSummary};
pub use error::{RegistryError, Result};
pub use service::{
    count, get_lobbyist_detail, num_clients, num_employers, num_lobbyists, register_year,
    search_lobbyists, set_salutation, top_n_compensated,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
