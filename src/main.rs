// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lobbyist_registry::{logging, open_database, Command, Config, StdoutSink};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

/// Reports and updates over the Chicago lobbyist registry.
#[derive(Parser, Debug)]
#[command(name = "lobbyists")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, env = "LOBBYIST_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Action {
    /// Number of lobbyists, employers and clients
    Stats,
    /// Find lobbyists by first or last name (wildcards _ and %)
    Search { pattern: String },
    /// Everything known about one lobbyist
    Details { id: i64 },
    /// Top N lobbyists by compensation in a year
    Top { n: i64, year: i32 },
    /// Register a lobbyist for a year
    Register { id: i64, year: i32 },
    /// Set (or clear, with "") a lobbyist's salutation
    Salutation { id: i64, salutation: String },
    /// Interactive terminal UI (default)
    Ui,
}

impl Action {
    /// The report to run, or `None` for the interactive UI.
    fn into_command(self) -> Option<Command> {
        let command = match self {
            Action::Stats => Command::GeneralStats,
            Action::Search { pattern } => Command::FindLobbyists { pattern },
            Action::Details { id } => Command::LobbyistDetails { id },
            Action::Top { n, year } => Command::TopLobbyists { n, year },
            Action::Register { id, year } => Command::RegisterYear { id, year },
            Action::Salutation { id, salutation } => Command::SetSalutation { id, salutation },
            Action::Ui => return None,
        };
        Some(command)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = config.resolve_database(cli.db.as_deref());
    let command = cli.action.unwrap_or(Action::Ui).into_command();

    match command {
        Some(command) => {
            logging::init_stderr_logging(&config.log_level);
            info!(config = %config_path.display(), "configuration loaded");
            let conn = open(&db_path)?;
            command.run(&conn, config.display_cap, &mut StdoutSink);
        }
        None => {
            logging::init_file_logging(&config.log_level);
            let conn = open(&db_path)?;
            run_ui_mode(conn, &config)?;
        }
    }

    Ok(())
}

fn open(db_path: &std::path::Path) -> Result<Connection> {
    open_database(db_path)
        .with_context(|| format!("Unable to open database {}", db_path.display()))
}

#[cfg(feature = "tui")]
fn run_ui_mode(conn: Connection, config: &Config) -> Result<()> {
    let mut app = ui::App::new(conn, config);
    ui::run_ui(&mut app)?;

    info!("terminal UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_conn: Connection, _config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run a single report, e.g.: lobbyists stats");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_mapping() {
        let cli = Cli::try_parse_from(["lobbyists", "--db", "x.db", "register", "5", "2022"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert_eq!(
            cli.action.unwrap().into_command(),
            Some(Command::RegisterYear { id: 5, year: 2022 })
        );
    }

    #[test]
    fn test_empty_salutation_argument() {
        let cli = Cli::try_parse_from(["lobbyists", "salutation", "3", ""]).unwrap();
        assert_eq!(
            cli.action.unwrap().into_command(),
            Some(Command::SetSalutation { id: 3, salutation: String::new() })
        );
    }

    #[test]
    fn test_no_subcommand_means_ui() {
        let cli = Cli::try_parse_from(["lobbyists"]).unwrap();
        assert_eq!(cli.action.unwrap_or(Action::Ui).into_command(), None);
    }
}
