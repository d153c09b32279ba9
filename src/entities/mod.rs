// Entity Models
// Read-only records built fresh from each query. Updates go straight to the
// database and are re-read, never applied to a record in place.

pub mod lobbyist;

pub use lobbyist::{EntityKind, LobbyistCompensationReport, LobbyistDetail, LobbyistSummary};
