//! Query executor.
//!
//! Three primitives run a single parameterized statement against an open
//! connection and fold the outcome into a uniform shape. Failures are logged
//! here and never returned as `Err`. Each call prepares its own statement and
//! drops it before returning, so nothing is cached or shared between calls.

use crate::error::{RegistryError, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, ToSql};
use std::path::Path;
use tracing::{debug, error};

/// One result row, copied out of the statement so it outlives it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    fn read(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Row> {
        (0..width)
            .map(|idx| row.get::<_, Value>(idx))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map(Row)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.0.get(idx)
    }

    /// Integer column. Text holding a number is accepted, since SQLite
    /// stores whatever the loader handed it.
    pub fn int(&self, idx: usize) -> Option<i64> {
        match self.0.get(idx)? {
            Value::Integer(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric column as a float (integers widen).
    pub fn real(&self, idx: usize) -> Option<f64> {
        match self.0.get(idx)? {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text column; NULL and missing columns read as "".
    pub fn text(&self, idx: usize) -> String {
        match self.0.get(idx) {
            Some(Value::Text(s)) => s.clone(),
            Some(Value::Integer(i)) => i.to_string(),
            Some(Value::Real(f)) => f.to_string(),
            Some(Value::Blob(b)) => String::from_utf8_lossy(b).into_owned(),
            Some(Value::Null) | None => String::new(),
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row(values)
    }
}

/// Outcome of a single-row fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Row),
    /// The statement ran and produced no rows
    Empty,
    /// The statement failed; the error has already been logged
    Failed,
}

impl Lookup {
    /// Collapses `Empty` and `Failed` into `None`.
    pub fn into_row(self) -> Option<Row> {
        match self {
            Lookup::Found(row) => Some(row),
            Lookup::Empty | Lookup::Failed => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed)
    }
}

/// Open an existing database read-write. A missing file is an error rather
/// than a fresh empty database.
pub fn open_database(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(RegistryError::database(format!(
            "database not found at {}",
            path.display()
        )));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    debug!(path = %path.display(), "database opened");

    Ok(conn)
}

/// Run a query and return its first row.
pub fn fetch_one(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Lookup {
    match query_first(conn, sql, params) {
        Ok(Some(row)) => Lookup::Found(row),
        Ok(None) => Lookup::Empty,
        Err(err) => {
            error!(%err, sql, "fetch_one failed");
            Lookup::Failed
        }
    }
}

/// Run a query and return every row. `None` means the query failed, which
/// is not the same as `Some(vec![])`.
pub fn fetch_all(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Option<Vec<Row>> {
    match query_all(conn, sql, params) {
        Ok(rows) => Some(rows),
        Err(err) => {
            error!(%err, sql, "fetch_all failed");
            None
        }
    }
}

/// Run an insert/update/delete and return the number of rows changed, or -1
/// if the statement failed. Zero is a valid result.
pub fn execute(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> i64 {
    match run_action(conn, sql, params) {
        Ok(changed) => changed as i64,
        Err(err) => {
            error!(%err, sql, "execute failed");
            -1
        }
    }
}

fn query_first(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<Option<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let mut rows = stmt.query(params)?;

    let first = match rows.next()? {
        Some(row) => Some(Row::read(row, width)?),
        None => None,
    };

    Ok(first)
}

fn query_all(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();

    let rows = stmt
        .query_map(params, |row| Row::read(row, width))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn run_action(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(sql)?;
    stmt.execute(params)
}
