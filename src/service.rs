//! Report and mutation service.
//!
//! Each function composes the SQL for one operation, runs it through the
//! query executor and maps rows into records. Nothing here returns `Err`:
//! failures were already logged by the executor and come back as the
//! documented sentinel (-1, an empty list, `None` or `false`).

use crate::db::{execute, fetch_all, fetch_one, Lookup, Row};
use crate::entities::{EntityKind, LobbyistCompensationReport, LobbyistDetail, LobbyistSummary};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

const SEARCH_SQL: &str = "
    SELECT Lobbyist_ID, First_Name, Last_Name, Phone
    FROM LobbyistInfo
    WHERE First_Name LIKE ?1 OR Last_Name LIKE ?1
    ORDER BY Lobbyist_ID ASC";

const EMPLOYERS_SQL: &str = "
    SELECT DISTINCT EmployerInfo.Employer_Name
    FROM EmployerInfo
    JOIN LobbyistAndEmployer ON EmployerInfo.Employer_ID = LobbyistAndEmployer.Employer_ID
    JOIN LobbyistInfo ON LobbyistInfo.Lobbyist_ID = LobbyistAndEmployer.Lobbyist_ID
    WHERE LobbyistInfo.Lobbyist_ID = ?1
    ORDER BY EmployerInfo.Employer_Name ASC";

// One row per registration year. Every group sums the full set of
// compensation rows, so the total is read from the first group only.
const DETAIL_SQL: &str = "
    SELECT LobbyistInfo.Lobbyist_ID,
           LobbyistInfo.Salutation,
           LobbyistInfo.First_Name,
           LobbyistInfo.Middle_Initial,
           LobbyistInfo.Last_Name,
           LobbyistInfo.Suffix,
           LobbyistInfo.Address_1,
           LobbyistInfo.Address_2,
           LobbyistInfo.City,
           LobbyistInfo.State_Initial,
           LobbyistInfo.ZipCode,
           LobbyistInfo.Country,
           LobbyistInfo.Email,
           LobbyistInfo.Phone,
           LobbyistInfo.Fax,
           LobbyistYears.Year,
           COALESCE(SUM(Compensation.Compensation_Amount), 0) AS total_compensation
    FROM LobbyistInfo
    LEFT JOIN LobbyistYears ON LobbyistYears.Lobbyist_ID = LobbyistInfo.Lobbyist_ID
    LEFT JOIN Compensation ON Compensation.Lobbyist_ID = LobbyistInfo.Lobbyist_ID
    WHERE LobbyistInfo.Lobbyist_ID = ?1
    GROUP BY LobbyistYears.Year
    ORDER BY LobbyistYears.Year ASC";

// strftime() yields text, so the year is bound as text for the period
// filters and as an integer for the registration year.
const TOP_N_SQL: &str = "
    SELECT LobbyistInfo.Lobbyist_ID,
           LobbyistInfo.First_Name,
           LobbyistInfo.Last_Name,
           LobbyistInfo.Phone,
           COALESCE(SUM(Compensation.Compensation_Amount), 0) AS total_compensation
    FROM LobbyistInfo
    JOIN LobbyistYears ON LobbyistInfo.Lobbyist_ID = LobbyistYears.Lobbyist_ID
    JOIN Compensation ON LobbyistInfo.Lobbyist_ID = Compensation.Lobbyist_ID
    WHERE LobbyistYears.Year = ?1
      AND strftime('%Y', Compensation.Period_Start) = ?2
      AND strftime('%Y', Compensation.Period_End) = ?2
    GROUP BY LobbyistInfo.Lobbyist_ID,
             LobbyistInfo.First_Name,
             LobbyistInfo.Last_Name,
             LobbyistInfo.Phone
    ORDER BY total_compensation DESC, LobbyistInfo.Last_Name ASC
    LIMIT ?3";

const CLIENTS_SQL: &str = "
    SELECT DISTINCT ClientInfo.Client_Name
    FROM Compensation
    JOIN ClientInfo ON Compensation.Client_ID = ClientInfo.Client_ID
    JOIN LobbyistYears ON Compensation.Lobbyist_ID = LobbyistYears.Lobbyist_ID
    WHERE Compensation.Lobbyist_ID = ?1
      AND LobbyistYears.Year = ?2
      AND strftime('%Y', Compensation.Period_Start) = ?3
      AND strftime('%Y', Compensation.Period_End) = ?3
    ORDER BY ClientInfo.Client_Name ASC";

const EXISTS_SQL: &str = "SELECT Lobbyist_ID FROM LobbyistInfo WHERE Lobbyist_ID = ?1";

const INSERT_YEAR_SQL: &str = "INSERT INTO LobbyistYears (Lobbyist_ID, Year) VALUES (?1, ?2)";

const SET_SALUTATION_SQL: &str = "UPDATE LobbyistInfo SET Salutation = ?1 WHERE Lobbyist_ID = ?2";

// ============================================================================
// COUNTS
// ============================================================================

/// Number of rows in the table behind `kind`, or -1 if it cannot be read.
pub fn count(conn: &Connection, kind: EntityKind) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table());

    match fetch_one(conn, &sql, params![]) {
        Lookup::Found(row) => row.int(0).unwrap_or_else(|| {
            warn!(table = kind.table(), "count returned a non-numeric value");
            -1
        }),
        Lookup::Empty | Lookup::Failed => -1,
    }
}

pub fn num_lobbyists(conn: &Connection) -> i64 {
    count(conn, EntityKind::Lobbyists)
}

pub fn num_employers(conn: &Connection) -> i64 {
    count(conn, EntityKind::Employers)
}

pub fn num_clients(conn: &Connection) -> i64 {
    count(conn, EntityKind::Clients)
}

// ============================================================================
// REPORTS
// ============================================================================

/// Lobbyists whose first or last name is LIKE `pattern` (`_` and `%` are
/// wildcards), ascending by id. Empty on no match and on error.
pub fn search_lobbyists(conn: &Connection, pattern: &str) -> Vec<LobbyistSummary> {
    fetch_all(conn, SEARCH_SQL, params![pattern])
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            Some(LobbyistSummary {
                id: row.int(0)?,
                first_name: row.text(1),
                last_name: row.text(2),
                phone: row.text(3),
            })
        })
        .collect()
}

/// Full record for one lobbyist, or `None` if the id does not exist (or the
/// lookup failed).
pub fn get_lobbyist_detail(conn: &Connection, lobbyist_id: i64) -> Option<LobbyistDetail> {
    let employers: Vec<String> = fetch_all(conn, EMPLOYERS_SQL, params![lobbyist_id])
        .unwrap_or_default()
        .iter()
        .map(|row| row.text(0))
        .collect();

    let groups = fetch_all(conn, DETAIL_SQL, params![lobbyist_id]).unwrap_or_default();
    let first = match groups.first() {
        Some(row) => row,
        None => {
            debug!(lobbyist_id, "no lobbyist with that id");
            return None;
        }
    };

    // A lobbyist with no registration years still yields one group, keyed NULL
    let years_registered = groups.iter().filter_map(|row| row.int(15)).collect();

    Some(detail_from_row(first, years_registered, employers))
}

fn detail_from_row(row: &Row, years_registered: Vec<i64>, employers: Vec<String>) -> LobbyistDetail {
    LobbyistDetail {
        id: row.int(0).unwrap_or_default(),
        salutation: row.text(1),
        first_name: row.text(2),
        middle_initial: row.text(3),
        last_name: row.text(4),
        suffix: row.text(5),
        address_1: row.text(6),
        address_2: row.text(7),
        city: row.text(8),
        state: row.text(9),
        zip: row.text(10),
        country: row.text(11),
        email: row.text(12),
        phone: row.text(13),
        fax: row.text(14),
        years_registered,
        employers,
        total_compensation: row.real(16).unwrap_or(0.0),
    }
}

/// The `n` best-paid lobbyists registered in `year`, counting only
/// compensation whose period starts and ends inside that year. Ordered by
/// total descending, then last name. Empty for `n == 0`, an out-of-range
/// year, no qualifying rows, or an error.
pub fn top_n_compensated(conn: &Connection, n: u32, year: i32) -> Vec<LobbyistCompensationReport> {
    if n == 0 {
        warn!("top_n_compensated called with n = 0");
        return Vec::new();
    }
    if !(1..=9999).contains(&year) {
        warn!(year, "top_n_compensated called with an out-of-range year");
        return Vec::new();
    }

    let year_text = format!("{:04}", year);
    let ranked = fetch_all(conn, TOP_N_SQL, params![year, year_text, n]).unwrap_or_default();

    ranked
        .iter()
        .filter_map(|row| {
            let id = row.int(0)?;
            Some(LobbyistCompensationReport {
                id,
                first_name: row.text(1),
                last_name: row.text(2),
                phone: row.text(3),
                total_compensation: row.real(4).unwrap_or(0.0),
                clients: clients_for(conn, id, year, &year_text),
            })
        })
        .collect()
}

fn clients_for(conn: &Connection, lobbyist_id: i64, year: i32, year_text: &str) -> Vec<String> {
    fetch_all(conn, CLIENTS_SQL, params![lobbyist_id, year, year_text])
        .unwrap_or_default()
        .iter()
        .map(|row| row.text(0))
        .collect()
}

// ============================================================================
// MUTATIONS
// ============================================================================

fn lobbyist_exists(conn: &Connection, lobbyist_id: i64) -> bool {
    fetch_one(conn, EXISTS_SQL, params![lobbyist_id]).is_found()
}

/// Record that the lobbyist is registered in `year`. False when the lobbyist
/// does not exist (nothing is inserted) or the insert changed no rows.
pub fn register_year(conn: &Connection, lobbyist_id: i64, year: i32) -> bool {
    if !lobbyist_exists(conn, lobbyist_id) {
        debug!(lobbyist_id, "register_year: no such lobbyist");
        return false;
    }

    execute(conn, INSERT_YEAR_SQL, params![lobbyist_id, year]) > 0
}

/// Replace the lobbyist's salutation; "" clears it. Same existence rule as
/// `register_year`.
pub fn set_salutation(conn: &Connection, lobbyist_id: i64, salutation: &str) -> bool {
    if !lobbyist_exists(conn, lobbyist_id) {
        debug!(lobbyist_id, "set_salutation: no such lobbyist");
        return false;
    }

    execute(conn, SET_SALUTATION_SQL, params![salutation, lobbyist_id]) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_db, table_rows};
    use pretty_assertions::assert_eq;

    fn ids(found: &[LobbyistSummary]) -> Vec<i64> {
        found.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_counts() {
        let conn = fixture_db();

        assert_eq!(num_lobbyists(&conn), 7);
        assert_eq!(num_employers(&conn), 3);
        assert_eq!(num_clients(&conn), 3);
    }

    #[test]
    fn test_count_on_missing_table_is_minus_one() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(count(&conn, EntityKind::Lobbyists), -1);
    }

    #[test]
    fn test_search_matches_first_or_last_name() {
        let conn = fixture_db();

        // Jane and John by first name, Jones by last name
        assert_eq!(ids(&search_lobbyists(&conn, "J%")), vec![1, 2, 4]);
        assert_eq!(ids(&search_lobbyists(&conn, "_ed")), vec![5]);
    }

    #[test]
    fn test_search_results_strictly_ascending() {
        let conn = fixture_db();

        let found = ids(&search_lobbyists(&conn, "%o%"));
        assert_eq!(found, vec![1, 2, 4, 5, 7]);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_search_no_match_is_empty() {
        let conn = fixture_db();

        assert!(search_lobbyists(&conn, "xyz%").is_empty());
    }

    #[test]
    fn test_search_maps_fields() {
        let conn = fixture_db();

        let found = search_lobbyists(&conn, "Smith");
        assert_eq!(
            found,
            vec![LobbyistSummary {
                id: 2,
                first_name: "John".to_string(),
                last_name: "Smith".to_string(),
                phone: "(312) 555-0200".to_string(),
            }]
        );
    }

    #[test]
    fn test_detail_full_record() {
        let conn = fixture_db();

        let detail = get_lobbyist_detail(&conn, 1).unwrap();
        assert_eq!(
            detail,
            LobbyistDetail {
                id: 1,
                salutation: "Ms.".to_string(),
                first_name: "Jane".to_string(),
                middle_initial: "Q".to_string(),
                last_name: "Doe".to_string(),
                suffix: "".to_string(),
                address_1: "100 N LaSalle St".to_string(),
                address_2: "Suite 400".to_string(),
                city: "Chicago".to_string(),
                state: "IL".to_string(),
                zip: "60602".to_string(),
                country: "US".to_string(),
                email: "jane@example.com".to_string(),
                phone: "(312) 555-0100".to_string(),
                fax: "(312) 555-0101".to_string(),
                years_registered: vec![2019, 2020],
                employers: vec!["Acme Corp".to_string(), "Beta LLC".to_string()],
                total_compensation: 9500.0,
            }
        );
    }

    #[test]
    fn test_detail_missing_id_is_none() {
        let conn = fixture_db();

        assert_eq!(get_lobbyist_detail(&conn, 999), None);
    }

    #[test]
    fn test_detail_without_compensation_totals_zero() {
        let conn = fixture_db();

        let detail = get_lobbyist_detail(&conn, 5).unwrap();
        assert_eq!(detail.total_compensation, 0.0);
        assert_eq!(detail.years_registered, vec![2021]);
        assert!(detail.employers.is_empty());
    }

    #[test]
    fn test_detail_without_years() {
        let conn = fixture_db();

        let detail = get_lobbyist_detail(&conn, 7).unwrap();
        assert!(detail.years_registered.is_empty());
        assert_eq!(detail.total_compensation, 0.0);
    }

    #[test]
    fn test_top_n_ordering_and_tie_break() {
        let conn = fixture_db();

        let top = top_n_compensated(&conn, 10, 2020);
        let names: Vec<&str> = top.iter().map(|l| l.last_name.as_str()).collect();

        // Straddle's payment starts in 2019 and does not qualify
        assert_eq!(names, vec!["Doe", "Adams", "Smith"]);
        assert_eq!(top[0].total_compensation, 8500.0);
        assert_eq!(top[1].total_compensation, 7500.0);
        assert_eq!(top[2].total_compensation, 7500.0);
        assert!(top
            .windows(2)
            .all(|w| w[0].total_compensation >= w[1].total_compensation));
    }

    #[test]
    fn test_top_n_clients_alphabetical() {
        let conn = fixture_db();

        let top = top_n_compensated(&conn, 1, 2020);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].clients, vec!["Alpha Client", "Zeta Client"]);
    }

    #[test]
    fn test_top_n_caps_at_n() {
        let conn = fixture_db();

        assert_eq!(top_n_compensated(&conn, 2, 2020).len(), 2);
    }

    #[test]
    fn test_top_n_fewer_than_n_qualify() {
        let conn = fixture_db();

        let top = top_n_compensated(&conn, 3, 2019);
        let ids: Vec<i64> = top.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![4, 1]);
        assert_eq!(top[1].total_compensation, 1000.0);
    }

    #[test]
    fn test_top_n_empty_cases() {
        let conn = fixture_db();

        assert!(top_n_compensated(&conn, 0, 2020).is_empty());
        assert!(top_n_compensated(&conn, 5, 1999).is_empty());
        assert!(top_n_compensated(&conn, 5, -4).is_empty());
        // Registered in 2021 but never paid
        assert!(top_n_compensated(&conn, 5, 2021).is_empty());
    }

    #[test]
    fn test_register_year_unknown_lobbyist_inserts_nothing() {
        let conn = fixture_db();
        let before = table_rows(&conn, "LobbyistYears");

        assert!(!register_year(&conn, 999, 2022));
        assert_eq!(table_rows(&conn, "LobbyistYears"), before);
    }

    #[test]
    fn test_register_year_adds_year() {
        let conn = fixture_db();

        assert!(register_year(&conn, 5, 2022));
        let detail = get_lobbyist_detail(&conn, 5).unwrap();
        assert_eq!(detail.years_registered, vec![2021, 2022]);
    }

    #[test]
    fn test_register_year_rejected_insert_is_failure() {
        let conn = fixture_db();
        conn.execute_batch("CREATE UNIQUE INDEX one_year ON LobbyistYears (Lobbyist_ID, Year)")
            .unwrap();

        assert!(!register_year(&conn, 5, 2021));
    }

    #[test]
    fn test_set_salutation_clear() {
        let conn = fixture_db();

        assert!(set_salutation(&conn, 3, ""));
        assert_eq!(get_lobbyist_detail(&conn, 3).unwrap().salutation, "");
    }

    #[test]
    fn test_set_salutation_replace() {
        let conn = fixture_db();

        assert!(set_salutation(&conn, 2, "Mr."));
        assert_eq!(get_lobbyist_detail(&conn, 2).unwrap().salutation, "Mr.");
    }

    #[test]
    fn test_set_salutation_unknown_lobbyist() {
        let conn = fixture_db();

        assert!(!set_salutation(&conn, 999, "Dr."));
    }

    #[test]
    fn test_everything_folds_on_empty_database() {
        let conn = Connection::open_in_memory().unwrap();

        assert!(search_lobbyists(&conn, "%").is_empty());
        assert_eq!(get_lobbyist_detail(&conn, 1), None);
        assert!(top_n_compensated(&conn, 3, 2020).is_empty());
        assert!(!register_year(&conn, 1, 2020));
        assert!(!set_salutation(&conn, 1, "Dr."));
    }
}
