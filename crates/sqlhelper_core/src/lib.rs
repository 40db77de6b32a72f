//! Thin CRUD helper over an embedded SQLite database.
//!
//! A [`ConnectionManager`] provisions the working database from a bundled
//! template on first use and memoizes one connection. [`SqlHelper`] builds
//! statements from structured arguments and runs them on that connection
//! without ever surfacing an error to the caller.

pub mod config;
pub mod db;
pub mod engine;
pub mod helper;
pub mod logging;
pub mod statement;

pub use config::{HelperConfig, HelperPaths, DEFAULT_ASSETS_FOLDER, PLACEHOLDER_DATABASE_NAME};
pub use db::{
    open_database, open_database_in_memory, provision_database_file, ConnectionManager, DbError,
    DbResult, FileProvider, ProvisionOutcome, StdFileProvider,
};
pub use engine::{ConnectionSource, Execution, Record, SqlEngine};
pub use helper::{HelperError, HelperResult, SqlHelper};
pub use logging::{default_log_level, init_logging, logging_status};
pub use rusqlite::types::Value;
pub use statement::{DataField, Statement, Target};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
