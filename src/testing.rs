//! Shared fixtures for unit tests.

use rusqlite::Connection;

/// Schema plus a handful of lobbyists, employers, clients and payments.
pub const FIXTURE_SQL: &str = include_str!("../tests/fixtures/lobbyists.sql");

/// In-memory registry seeded from `FIXTURE_SQL`.
pub fn fixture_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(FIXTURE_SQL).unwrap();
    conn
}

/// Row count of any table, read directly without going through the executor.
pub fn table_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}
