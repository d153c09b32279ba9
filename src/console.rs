//! Report rendering.
//!
//! Every front end (CLI, terminal UI) runs the same `Command`s and hands in
//! the `Sink` the text should go to. Nothing in here writes to the process's
//! stdout unless it is given a `StdoutSink`.

use crate::error::{RegistryError, Result};
use crate::service;
use rusqlite::Connection;
use std::str::FromStr;

const NOT_FOUND: &str = "No lobbyist with that ID was found.";

// ============================================================================
// SINKS
// ============================================================================

/// Line-oriented destination for rendered output
pub trait Sink {
    fn line(&mut self, text: &str);

    fn blank(&mut self) {
        self.line("");
    }
}

impl Sink for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Prints each line to standard output
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn line(&mut self, text: &str) {
        println!("{}", text);
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

/// The menu of operations, before any input has been collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    GeneralStats,
    FindLobbyists,
    LobbyistDetails,
    TopLobbyists,
    RegisterYear,
    SetSalutation,
}

impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::GeneralStats,
        CommandKind::FindLobbyists,
        CommandKind::LobbyistDetails,
        CommandKind::TopLobbyists,
        CommandKind::RegisterYear,
        CommandKind::SetSalutation,
    ];

    /// Menu key: 0 for general stats, 1-5 for the numbered commands
    pub fn from_key(key: char) -> Option<CommandKind> {
        let idx = key.to_digit(10)? as usize;
        Self::ALL.get(idx).copied()
    }

    pub fn key(&self) -> char {
        match self {
            CommandKind::GeneralStats => '0',
            CommandKind::FindLobbyists => '1',
            CommandKind::LobbyistDetails => '2',
            CommandKind::TopLobbyists => '3',
            CommandKind::RegisterYear => '4',
            CommandKind::SetSalutation => '5',
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CommandKind::GeneralStats => "General Stats",
            CommandKind::FindLobbyists => "Find Lobbyists",
            CommandKind::LobbyistDetails => "Lobbyist Details",
            CommandKind::TopLobbyists => "Top N Lobbyists",
            CommandKind::RegisterYear => "Register Year",
            CommandKind::SetSalutation => "Set Salutation",
        }
    }

    /// Questions asked, in order, before the command can run
    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            CommandKind::GeneralStats => &[],
            CommandKind::FindLobbyists => {
                &["Enter lobbyist name (first or last, wildcards _ and % supported):"]
            }
            CommandKind::LobbyistDetails => &["Enter Lobbyist ID:"],
            CommandKind::TopLobbyists => &["Enter the value of N:", "Enter the year:"],
            CommandKind::RegisterYear => &["Enter year:", "Enter the lobbyist ID:"],
            CommandKind::SetSalutation => &["Enter the lobbyist ID:", "Enter the salutation:"],
        }
    }

    /// Build the command from answers given in `prompts()` order.
    pub fn build(&self, answers: &[String]) -> Result<Command> {
        let answer = |idx: usize| nth_answer(answers, idx, *self);

        let command = match self {
            CommandKind::GeneralStats => Command::GeneralStats,
            CommandKind::FindLobbyists => Command::FindLobbyists {
                pattern: answer(0)?.to_string(),
            },
            CommandKind::LobbyistDetails => Command::LobbyistDetails {
                id: parse_number(answer(0)?, "lobbyist ID")?,
            },
            CommandKind::TopLobbyists => Command::TopLobbyists {
                n: parse_number(answer(0)?, "integer for N")?,
                year: parse_number(answer(1)?, "year")?,
            },
            CommandKind::RegisterYear => Command::RegisterYear {
                year: parse_number(answer(0)?, "year")?,
                id: parse_number(answer(1)?, "lobbyist ID")?,
            },
            CommandKind::SetSalutation => Command::SetSalutation {
                id: parse_number(answer(0)?, "lobbyist ID")?,
                salutation: answer(1)?.to_string(),
            },
        };

        Ok(command)
    }
}

fn nth_answer(answers: &[String], idx: usize, kind: CommandKind) -> Result<&str> {
    answers.get(idx).map(String::as_str).ok_or_else(|| {
        let prompt = kind.prompts().get(idx).copied().unwrap_or("input");
        RegistryError::input(format!("missing answer to '{}'", prompt))
    })
}

/// An operation with all of its inputs
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GeneralStats,
    FindLobbyists { pattern: String },
    LobbyistDetails { id: i64 },
    TopLobbyists { n: i64, year: i32 },
    RegisterYear { id: i64, year: i32 },
    SetSalutation { id: i64, salutation: String },
}

impl Command {
    /// Run against `conn`, writing the report to `sink`. `display_cap` bounds
    /// how many search hits are listed.
    pub fn run(&self, conn: &Connection, display_cap: usize, sink: &mut dyn Sink) {
        match self {
            Command::GeneralStats => general_stats(conn, sink),
            Command::FindLobbyists { pattern } => find_lobbyists(conn, pattern, display_cap, sink),
            Command::LobbyistDetails { id } => lobbyist_details(conn, *id, sink),
            Command::TopLobbyists { n, year } => top_lobbyists(conn, *n, *year, sink),
            Command::RegisterYear { id, year } => register_year(conn, *id, *year, sink),
            Command::SetSalutation { id, salutation } => set_salutation(conn, *id, salutation, sink),
        }
    }
}

/// Parse a trimmed integer typed by the user.
pub fn parse_number<T: FromStr>(text: &str, what: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| RegistryError::input(format!("Please enter a valid {}... ('{}')", what, text.trim())))
}

// ============================================================================
// RENDERERS
// ============================================================================

pub fn general_stats(conn: &Connection, sink: &mut dyn Sink) {
    sink.line("General Statistics:");
    sink.line(&format!("  Number of Lobbyists: {}", format_count(service::num_lobbyists(conn))));
    sink.line(&format!("  Number of Employers: {}", format_count(service::num_employers(conn))));
    sink.line(&format!("  Number of Clients: {}", format_count(service::num_clients(conn))));
    sink.blank();
}

pub fn find_lobbyists(conn: &Connection, pattern: &str, display_cap: usize, sink: &mut dyn Sink) {
    let lobbyists = service::search_lobbyists(conn, pattern);

    sink.blank();
    sink.line(&format!("Number of Lobbyists found: {}", lobbyists.len()));

    if lobbyists.len() > display_cap {
        sink.blank();
        sink.line("There are too many lobbyists to display, please narrow your search and try again...");
        return;
    }

    if !lobbyists.is_empty() {
        sink.blank();
    }
    for l in &lobbyists {
        sink.line(&format!("{} : {} {} Phone: {}", l.id, l.first_name, l.last_name, l.phone));
    }
}

pub fn lobbyist_details(conn: &Connection, id: i64, sink: &mut dyn Sink) {
    sink.blank();

    let detail = match service::get_lobbyist_detail(conn, id) {
        Some(d) => d,
        None => {
            sink.line(NOT_FOUND);
            return;
        }
    };

    let years: Vec<String> = detail.years_registered.iter().map(|y| y.to_string()).collect();

    sink.line(&format!("{} :", detail.id));
    sink.line(&format!(" Full Name: {}", detail.full_name()));
    sink.line(&format!(" Address: {}", detail.address()));
    sink.line(&format!(" Email: {}", detail.email));
    sink.line(&format!(" Phone: {}", detail.phone));
    sink.line(&format!(" Fax: {}", detail.fax));
    sink.line(&format!(" Years Registered: {}", years.join(", ")));
    sink.line(&format!(" Employers: {}", detail.employers.join(", ")));
    sink.line(&format!(" Total Compensation: {}", format_money(detail.total_compensation)));
}

pub fn top_lobbyists(conn: &Connection, n: i64, year: i32, sink: &mut dyn Sink) {
    if n <= 0 {
        sink.line("Please enter a positive value for N...");
        return;
    }

    let n = u32::try_from(n).unwrap_or(u32::MAX);
    let lobbyists = service::top_n_compensated(conn, n, year);

    sink.blank();
    if lobbyists.is_empty() {
        sink.line(&format!("No lobbyists were compensated in {}.", year));
        return;
    }

    for (idx, l) in lobbyists.iter().enumerate() {
        if idx > 0 {
            sink.blank();
        }
        sink.line(&format!("{} . {} {}", idx + 1, l.first_name, l.last_name));
        sink.line(&format!(" Phone: {}", l.phone));
        sink.line(&format!(" Total Compensation: {}", format_money(l.total_compensation)));
        sink.line(&format!(" Clients: {}", l.clients.join(", ")));
    }
}

pub fn register_year(conn: &Connection, id: i64, year: i32, sink: &mut dyn Sink) {
    sink.blank();
    if service::register_year(conn, id, year) {
        sink.line("Lobbyist successfully registered.");
    } else {
        sink.line(NOT_FOUND);
    }
}

pub fn set_salutation(conn: &Connection, id: i64, salutation: &str, sink: &mut dyn Sink) {
    sink.blank();
    if service::set_salutation(conn, id, salutation) {
        sink.line("Salutation successfully set.");
    } else {
        sink.line(NOT_FOUND);
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Integer with comma thousands separators: 12345 -> "12,345"
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = group_thousands(&digits);

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Dollar amount with separators and cents: 1234.5 -> "$1,234.50"
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 { "-" } else { "" };

    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
