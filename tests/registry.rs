//! End-to-end checks against a database file on disk, through the public API
//! only.

use lobbyist_registry::{
    get_lobbyist_detail, num_lobbyists, open_database, register_year, search_lobbyists,
    set_salutation, top_n_compensated, Command,
};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

const FIXTURE_SQL: &str = include_str!("fixtures/lobbyists.sql");

fn seeded_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Chicago_Lobbyists.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(FIXTURE_SQL).unwrap();
    conn.close().unwrap();

    (dir, path)
}

#[test]
fn mutations_persist_across_connections() {
    let (_dir, path) = seeded_file();

    {
        let conn = open_database(&path).unwrap();
        assert!(register_year(&conn, 7, 2024));
        assert!(set_salutation(&conn, 7, "Mrs."));
        assert!(!register_year(&conn, 70, 2024));
    }

    let conn = open_database(&path).unwrap();
    let detail = get_lobbyist_detail(&conn, 7).unwrap();
    assert_eq!(detail.years_registered, vec![2024]);
    assert_eq!(detail.salutation, "Mrs.");
}

#[test]
fn reports_over_file_database() {
    let (_dir, path) = seeded_file();
    let conn = open_database(&path).unwrap();

    assert_eq!(num_lobbyists(&conn), 7);
    assert_eq!(search_lobbyists(&conn, "%a%").first().map(|l| l.id), Some(1));

    let top = top_n_compensated(&conn, 3, 2020);
    assert!(top.len() <= 3);
    for pair in top.windows(2) {
        assert!(pair[0].total_compensation >= pair[1].total_compensation);
        if pair[0].total_compensation == pair[1].total_compensation {
            assert!(pair[0].last_name <= pair[1].last_name);
        }
    }
}

#[test]
fn rendered_report_goes_to_injected_sink() {
    let (_dir, path) = seeded_file();
    let conn = open_database(&path).unwrap();

    let mut out: Vec<String> = Vec::new();
    Command::LobbyistDetails { id: 5 }.run(&conn, 100, &mut out);

    assert!(out.contains(&" Total Compensation: $0.00".to_string()));
    assert!(out.contains(&" Years Registered: 2021".to_string()));
}

#[test]
fn missing_database_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(open_database(&dir.path().join("missing.db")).is_err());
}
