// Lobbyist records
//
// Three shapes of the same person, one per report:
// - summary: search results
// - detail: single lobbyist lookup (years and employers assembled separately)
// - compensation report: top-N ranking for a year

use serde::Serialize;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Tables that can be counted for the general statistics report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Lobbyists,
    Employers,
    Clients,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Lobbyists, EntityKind::Employers, EntityKind::Clients];

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Lobbyists => "LobbyistInfo",
            EntityKind::Employers => "EmployerInfo",
            EntityKind::Clients => "ClientInfo",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lobbyists => "Lobbyists",
            EntityKind::Employers => "Employers",
            EntityKind::Clients => "Clients",
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LobbyistSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Everything known about a single lobbyist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LobbyistDetail {
    pub id: i64,
    pub salutation: String,
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub suffix: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub fax: String,

    /// Ascending
    pub years_registered: Vec<i64>,

    /// Alphabetical, no duplicates
    pub employers: Vec<String>,

    /// Zero when there are no compensation rows
    pub total_compensation: f64,
}

impl LobbyistDetail {
    /// Name parts joined with single spaces, skipping blanks
    pub fn full_name(&self) -> String {
        join_present(&[
            &self.salutation,
            &self.first_name,
            &self.middle_initial,
            &self.last_name,
            &self.suffix,
        ])
    }

    /// "street line(s), city, state zip country"
    pub fn address(&self) -> String {
        let street = join_present(&[&self.address_1, &self.address_2]);
        let region = join_present(&[&self.state, &self.zip, &self.country]);

        [street, self.city.trim().to_string(), region]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A lobbyist's standing in the top-N ranking for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LobbyistCompensationReport {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub total_compensation: f64,

    /// Alphabetical
    pub clients: Vec<String>,
}

fn join_present(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
