//! Lazily-initialized, memoized connection owner.

use super::provision::{provision_database_file, FileProvider, StdFileProvider};
use super::{open_database, DbError, DbResult};
use crate::config::HelperConfig;
use crate::engine::ConnectionSource;
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::sync::Mutex;

/// Owns the single connection for one configured database.
///
/// The first successful call to [`ConnectionManager::try_connection`] checks
/// the working file, copies the template when it is missing, and opens it.
/// Every later call returns the same connection without touching the
/// filesystem. Concurrent first calls are serialized, so the template is
/// copied at most once.
///
/// A failed bootstrap is not memoized; the next call starts over.
pub struct ConnectionManager<F: FileProvider = StdFileProvider> {
    config: HelperConfig,
    files: F,
    connection: OnceCell<Mutex<Connection>>,
}

impl ConnectionManager<StdFileProvider> {
    pub fn new(config: HelperConfig) -> Self {
        Self::with_file_provider(config, StdFileProvider)
    }
}

impl<F: FileProvider> ConnectionManager<F> {
    pub fn with_file_provider(config: HelperConfig, files: F) -> Self {
        Self {
            config,
            files,
            connection: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Whether a connection has been memoized.
    pub fn is_connected(&self) -> bool {
        self.connection.get().is_some()
    }

    /// Returns the memoized connection, bootstrapping it on first use.
    ///
    /// # Errors
    /// - `DbError::InvalidConfig` when the database name is blank or the placeholder.
    /// - `DbError::Sqlite` when the working database cannot be opened.
    ///
    /// Provisioning errors are logged and do not fail this call.
    pub fn try_connection(&self) -> DbResult<&Mutex<Connection>> {
        self.connection
            .get_or_try_init(|| self.bootstrap().map(Mutex::new))
    }

    /// Never-fail variant of [`ConnectionManager::try_connection`].
    ///
    /// Configuration errors are always logged; other failures only when
    /// `debug` is enabled.
    pub fn ensure_connection(&self) -> Option<&Mutex<Connection>> {
        match self.try_connection() {
            Ok(conn) => Some(conn),
            Err(err @ DbError::InvalidConfig(_)) => {
                error!("event=db_init module=db status=error error_code=invalid_config error={err}");
                None
            }
            Err(err) => {
                if self.config.debug {
                    error!("event=db_init module=db status=error error_code=db_init_failed error={err}");
                }
                None
            }
        }
    }

    fn bootstrap(&self) -> DbResult<Connection> {
        self.config.validate()?;

        if let Err(err) = provision_database_file(&self.config, &self.files) {
            if self.config.debug {
                warn!("event=db_provision module=db status=error error={err}");
            }
        }

        let path = self.config.database_path();
        let conn = open_database(&path)?;
        if self.config.debug {
            info!(
                "event=db_init module=db status=ok path={} version={}",
                path.display(),
                crate::core_version()
            );
        }
        Ok(conn)
    }
}

impl<F: FileProvider> ConnectionSource for ConnectionManager<F> {
    type Engine = Mutex<Connection>;

    fn ensure_connection(&self) -> Option<&Self::Engine> {
        ConnectionManager::ensure_connection(self)
    }
}
