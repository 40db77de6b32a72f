//! Database bootstrap: first-run provisioning and connection memoization.
//!
//! # Responsibility
//! - Copy the bundled template database into the writable location on first use.
//! - Open SQLite connections with the pragmas the helper relies on.
//! - Memoize exactly one connection per `ConnectionManager`.
//!
//! # Invariants
//! - A `ConnectionManager` creates at most one connection for its lifetime.
//! - Once a connection is memoized the filesystem is never touched again.
//! - Provisioning failures never abort the open attempt.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod manager;
mod open;
mod provision;

pub use manager::ConnectionManager;
pub use open::{open_database, open_database_in_memory};
pub use provision::{provision_database_file, FileProvider, ProvisionOutcome, StdFileProvider};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database name missing or still set to the placeholder.
    InvalidConfig(String),
    Provision {
        source_path: PathBuf,
        target_path: PathBuf,
        error: io::Error,
    },
    /// A previous holder of the connection lock panicked.
    LockPoisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidConfig(message) => write!(f, "invalid configuration: {message}"),
            Self::Provision {
                source_path,
                target_path,
                error,
            } => write!(
                f,
                "failed to copy template `{}` to `{}`: {error}",
                source_path.display(),
                target_path.display()
            ),
            Self::LockPoisoned => write!(f, "connection lock poisoned"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Provision { error, .. } => Some(error),
            Self::InvalidConfig(_) | Self::LockPoisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
