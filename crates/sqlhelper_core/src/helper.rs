//! CRUD-style facade over a single SQLite connection.
//!
//! # Responsibility
//! - Turn small structured requests into statements via [`crate::statement`].
//! - Run them on the connection supplied by a [`ConnectionSource`].
//!
//! # Invariants
//! - The never-fail operations (`select`, `insert`, ...) never return an
//!   error and never panic; failures become `None`, `()` or an empty value.
//! - Statement failures are logged only when `debug` is enabled.
//! - Empty-input notices are always logged and never reach the engine.
//! - Each `try_*` operation reports the precise failure instead.

use crate::config::HelperConfig;
use crate::db::{ConnectionManager, DbError, FileProvider};
use crate::engine::{ConnectionSource, Execution, Record, SqlEngine};
use crate::statement::{self, DataField, Statement, Target};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type HelperResult<T> = Result<T, HelperError>;

#[derive(Debug)]
pub enum HelperError {
    /// No connection could be obtained.
    Unavailable,
    /// The request carried nothing to execute.
    EmptyInput { operation: &'static str },
    Db(DbError),
}

impl Display for HelperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "database not initialized"),
            Self::EmptyInput { operation: "select_raw" } => write!(f, "no query"),
            Self::EmptyInput { operation } => write!(f, "no data to {operation}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HelperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable | Self::EmptyInput { .. } => None,
        }
    }
}

impl From<DbError> for HelperError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for HelperError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query helper bound to one connection source.
pub struct SqlHelper<S: ConnectionSource> {
    source: S,
    debug: bool,
}

impl SqlHelper<ConnectionManager> {
    /// Builds a helper whose connection is provisioned lazily from `config`.
    pub fn from_config(config: HelperConfig) -> Self {
        Self::from_manager(ConnectionManager::new(config))
    }
}

impl<F: FileProvider> SqlHelper<ConnectionManager<F>> {
    /// Wraps `manager`, taking `debug` from its configuration.
    pub fn from_manager(manager: ConnectionManager<F>) -> Self {
        let debug = manager.config().debug;
        Self::new(manager, debug)
    }
}

impl<S: ConnectionSource> SqlHelper<S> {
    /// `debug` gates failure logs for this helper only. Prefer
    /// [`SqlHelper::from_manager`] or [`SqlHelper::from_config`] when the
    /// source is a `ConnectionManager`, so both sides share one flag.
    pub fn new(source: S, debug: bool) -> Self {
        Self { source, debug }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Rows of `SELECT <fields> FROM <table> [<condition>]`.
    pub fn select(
        &self,
        table: &str,
        fields: Option<&str>,
        condition: Option<&str>,
    ) -> Option<Vec<Record>> {
        self.quiet("select", self.try_select(table, fields, condition))
    }

    /// Rows of a caller-written query. Blank SQL is skipped.
    pub fn select_raw(&self, sql: &str) -> Option<Vec<Record>> {
        self.quiet("select_raw", self.try_select_raw(sql))
    }

    /// Inserts one row; an empty `data` executes nothing.
    pub fn insert(&self, table: &str, data: &[DataField]) {
        self.quiet("insert", self.try_insert(table, data));
    }

    /// Updates rows by `id`, or by `condition` when no non-zero id is given.
    ///
    /// With neither, every row of `table` is updated.
    pub fn update(&self, table: &str, data: &[DataField], id: Option<i64>, condition: Option<&str>) {
        self.quiet("update", self.try_update(table, data, id, condition));
    }

    /// Deletes rows by `id`, or by `condition` when no non-zero id is given.
    ///
    /// With neither, every row of `table` is deleted.
    pub fn delete(&self, table: &str, id: Option<i64>, condition: Option<&str>) {
        self.quiet("delete", self.try_delete(table, id, condition));
    }

    /// Empties `table` and vacuums the database file.
    pub fn truncate(&self, table: &str) {
        self.quiet("truncate", self.try_truncate(table));
    }

    pub fn drop_table(&self, table: &str, if_exists: bool) {
        self.quiet("drop_table", self.try_drop_table(table, if_exists));
    }

    /// Executes caller-written SQL; failures yield an empty `Execution`.
    pub fn query(&self, sql: &str) -> Execution {
        self.quiet("query", self.try_query(sql))
            .unwrap_or_default()
    }

    pub fn try_select(
        &self,
        table: &str,
        fields: Option<&str>,
        condition: Option<&str>,
    ) -> HelperResult<Vec<Record>> {
        let engine = self.engine()?;
        let stmt = statement::select(table, fields, condition);
        Ok(engine.select(&stmt.sql, &stmt.params)?)
    }

    pub fn try_select_raw(&self, sql: &str) -> HelperResult<Vec<Record>> {
        let engine = self.engine()?;
        if sql.trim().is_empty() {
            return Err(HelperError::EmptyInput {
                operation: "select_raw",
            });
        }
        Ok(engine.select(sql, &[])?)
    }

    /// Returns the number of inserted rows.
    pub fn try_insert(&self, table: &str, data: &[DataField]) -> HelperResult<usize> {
        let engine = self.engine()?;
        let stmt = statement::insert(table, data).ok_or(HelperError::EmptyInput {
            operation: "insert",
        })?;
        run(engine, &stmt)
    }

    /// Returns the number of updated rows.
    pub fn try_update(
        &self,
        table: &str,
        data: &[DataField],
        id: Option<i64>,
        condition: Option<&str>,
    ) -> HelperResult<usize> {
        let engine = self.engine()?;
        let target = Target::from_parts(id, condition);
        let stmt = statement::update(table, data, target).ok_or(HelperError::EmptyInput {
            operation: "update",
        })?;
        run(engine, &stmt)
    }

    /// Returns the number of deleted rows.
    pub fn try_delete(
        &self,
        table: &str,
        id: Option<i64>,
        condition: Option<&str>,
    ) -> HelperResult<usize> {
        let engine = self.engine()?;
        run(engine, &statement::delete(table, Target::from_parts(id, condition)))
    }

    /// Runs `DELETE` then `VACUUM`; `VACUUM` is skipped if `DELETE` fails.
    pub fn try_truncate(&self, table: &str) -> HelperResult<()> {
        let engine = self.engine()?;
        for stmt in statement::truncate(table) {
            run(engine, &stmt)?;
        }
        Ok(())
    }

    pub fn try_drop_table(&self, table: &str, if_exists: bool) -> HelperResult<()> {
        let engine = self.engine()?;
        run(engine, &statement::drop_table(table, if_exists))?;
        Ok(())
    }

    pub fn try_query(&self, sql: &str) -> HelperResult<Execution> {
        let engine = self.engine()?;
        Ok(engine.execute(sql, &[])?)
    }

    fn engine(&self) -> HelperResult<&S::Engine> {
        self.source
            .ensure_connection()
            .ok_or(HelperError::Unavailable)
    }

    fn quiet<T>(&self, operation: &'static str, result: HelperResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err @ HelperError::EmptyInput { .. }) => {
                info!("event=sql_skip module=helper op={operation} reason=\"{err}\"");
                None
            }
            Err(err) => {
                if self.debug {
                    warn!("event=sql_exec module=helper status=error op={operation} error={err}");
                }
                None
            }
        }
    }
}

fn run<E: SqlEngine + ?Sized>(engine: &E, stmt: &Statement) -> HelperResult<usize> {
    Ok(engine.execute(&stmt.sql, &stmt.params)?.rows_changed)
}
