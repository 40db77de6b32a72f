//! Execution seam over the embedded SQLite engine.
//!
//! # Responsibility
//! - Run one SQL statement with positional bound values.
//! - Decode result rows into column-ordered [`Record`]s.
//!
//! # Invariants
//! - SQL text is executed exactly as given; nothing is rewritten here.
//! - One prepared statement per call.

use crate::db::{DbError, DbResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Statement};
use std::sync::Mutex;

/// One result row with its column names in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(column, _)| column.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }
}

/// Raw outcome of [`SqlEngine::execute`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Execution {
    /// Rows changed by a data-modifying statement.
    pub rows_changed: usize,
    /// Rows produced by a statement that returns columns.
    pub rows: Vec<Record>,
}

/// Statement execution capability consumed by the facade.
pub trait SqlEngine {
    fn select(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>>;
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Execution>;
}

/// Supplies the engine the facade runs statements against.
pub trait ConnectionSource {
    type Engine: SqlEngine;

    /// Returns the engine, or `None` when no connection can be provided.
    fn ensure_connection(&self) -> Option<&Self::Engine>;
}

impl SqlEngine for Connection {
    fn select(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        let mut stmt = self.prepare(sql)?;
        collect_records(&mut stmt, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Execution> {
        let mut stmt = self.prepare(sql)?;
        if stmt.column_count() == 0 {
            let rows_changed = stmt.execute(params_from_iter(params.iter()))?;
            return Ok(Execution {
                rows_changed,
                rows: Vec::new(),
            });
        }

        Ok(Execution {
            rows_changed: 0,
            rows: collect_records(&mut stmt, params)?,
        })
    }
}

impl SqlEngine for Mutex<Connection> {
    fn select(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Record>> {
        let conn = self.lock().map_err(|_| DbError::LockPoisoned)?;
        conn.select(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Execution> {
        let conn = self.lock().map_err(|_| DbError::LockPoisoned)?;
        SqlEngine::execute(&*conn, sql, params)
    }
}

/// An already-open connection is always available.
impl ConnectionSource for Mutex<Connection> {
    type Engine = Self;

    fn ensure_connection(&self) -> Option<&Self::Engine> {
        Some(self)
    }
}

fn collect_records(stmt: &mut Statement<'_>, params: &[Value]) -> DbResult<Vec<Record>> {
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut columns = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            columns.push((name.clone(), row.get::<_, Value>(index)?));
        }
        records.push(Record::new(columns));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{Record, SqlEngine};
    use rusqlite::types::Value;
    use rusqlite::Connection;

    #[test]
    fn execute_reports_changes_or_rows_depending_on_statement() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();

        let inserted =
            SqlEngine::execute(&conn, "INSERT INTO t (name) VALUES (?)", &[Value::from("a".to_string())])
                .unwrap();
        assert_eq!(inserted.rows_changed, 1);
        assert!(inserted.rows.is_empty());

        let listed = SqlEngine::execute(&conn, "SELECT id, name FROM t", &[]).unwrap();
        assert_eq!(listed.rows_changed, 0);
        assert_eq!(listed.rows.len(), 1);
        assert_eq!(listed.rows[0].get("name"), Some(&Value::Text("a".to_string())));
    }

    #[test]
    fn record_keeps_select_order() {
        let conn = Connection::open_in_memory().unwrap();
        let rows = conn.select("SELECT 2 AS b, 1 AS a, NULL AS c", &[]).unwrap();
        let record: &Record = &rows[0];
        assert_eq!(record.column_names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(record.get("c"), Some(&Value::Null));
        assert_eq!(record.get("missing"), None);
    }
}
