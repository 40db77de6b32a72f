//! Helper configuration and path resolution.
//!
//! # Responsibility
//! - Hold the immutable settings consumed by bootstrap and the facade.
//! - Resolve the writable database path and the bundled template path.
//!
//! # Invariants
//! - A configuration whose database name is blank or equal to
//!   [`PLACEHOLDER_DATABASE_NAME`] never yields a connection.
//! - Configuration is not mutated once handed to a `ConnectionManager`.

use crate::db::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sentinel meaning "database name not configured yet".
pub const PLACEHOLDER_DATABASE_NAME: &str = "YOUR_DATABASE_NAME.db";

/// Default location of the template database, relative to the app directory.
pub const DEFAULT_ASSETS_FOLDER: &str = "assets/db";

const ENV_DATABASE_NAME: &str = "SQLHELPER_DATABASE_NAME";
const ENV_DEBUG: &str = "SQLHELPER_DEBUG";
const ENV_DOCUMENTS_DIR: &str = "SQLHELPER_DOCUMENTS_DIR";
const ENV_ASSETS_FOLDER: &str = "SQLHELPER_ASSETS_FOLDER";

/// Settings for one helper instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// File name of the database, shared by the template and the working copy.
    pub database_name: String,
    /// Enables failure and provisioning diagnostics.
    #[serde(default)]
    pub debug: bool,
    pub paths: HelperPaths,
}

/// Directory layout used to locate the working database and its template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperPaths {
    /// Writable directory holding the working database.
    pub documents_dir: PathBuf,
    /// Application root that bundles the template database.
    pub app_dir: PathBuf,
    /// Folder under `app_dir` containing the template database.
    #[serde(default = "default_assets_folder")]
    pub assets_folder: PathBuf,
}

fn default_assets_folder() -> PathBuf {
    PathBuf::from(DEFAULT_ASSETS_FOLDER)
}

impl HelperPaths {
    pub fn new(documents_dir: impl Into<PathBuf>, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            app_dir: app_dir.into(),
            assets_folder: default_assets_folder(),
        }
    }

    /// Resolves the platform documents directory and the directory of the
    /// running executable.
    ///
    /// Returns `None` when either location cannot be determined.
    pub fn from_platform() -> Option<Self> {
        let documents_dir = dirs::document_dir()?;
        let exe = std::env::current_exe().ok()?;
        let app_dir = exe.parent()?.to_path_buf();
        Some(Self::new(documents_dir, app_dir))
    }
}

impl HelperConfig {
    pub fn new(database_name: impl Into<String>, paths: HelperPaths) -> Self {
        Self {
            database_name: database_name.into(),
            debug: false,
            paths,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_assets_folder(mut self, assets_folder: impl Into<PathBuf>) -> Self {
        self.paths.assets_folder = assets_folder.into();
        self
    }

    /// Applies `SQLHELPER_*` environment variables on top of this config.
    ///
    /// Blank values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        if let Some(name) = value(ENV_DATABASE_NAME) {
            self.database_name = name;
        }
        if let Some(flag) = value(ENV_DEBUG) {
            self.debug = parse_flag(&flag);
        }
        if let Some(dir) = value(ENV_DOCUMENTS_DIR) {
            self.paths.documents_dir = PathBuf::from(dir);
        }
        if let Some(folder) = value(ENV_ASSETS_FOLDER) {
            self.paths.assets_folder = PathBuf::from(folder);
        }
        self
    }

    /// Rejects a missing or placeholder database name.
    pub fn validate(&self) -> DbResult<()> {
        let name = self.database_name.trim();
        if name.is_empty() {
            return Err(DbError::InvalidConfig(
                "database name is not defined or empty".to_string(),
            ));
        }
        if name == PLACEHOLDER_DATABASE_NAME {
            return Err(DbError::InvalidConfig(format!(
                "database name is still the placeholder `{PLACEHOLDER_DATABASE_NAME}`"
            )));
        }
        Ok(())
    }

    /// Path of the working database inside the documents directory.
    pub fn database_path(&self) -> PathBuf {
        self.paths.documents_dir.join(&self.database_name)
    }

    /// Directory holding the bundled template.
    ///
    /// An absolute `assets_folder` is used as-is.
    pub fn assets_dir(&self) -> PathBuf {
        self.paths.app_dir.join(&self.paths.assets_folder)
    }

    /// Path of the bundled template database.
    pub fn template_path(&self) -> PathBuf {
        self.assets_dir().join(&self.database_name)
    }

    pub fn documents_dir(&self) -> &Path {
        &self.paths.documents_dir
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{HelperConfig, HelperPaths, PLACEHOLDER_DATABASE_NAME};
    use crate::db::DbError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn sample() -> HelperConfig {
        HelperConfig::new("app.db", HelperPaths::new("/data/docs", "/opt/app"))
    }

    #[test]
    fn paths_are_joined_from_documents_and_assets() {
        let config = sample();
        assert_eq!(config.database_path(), PathBuf::from("/data/docs/app.db"));
        assert_eq!(config.assets_dir(), PathBuf::from("/opt/app/assets/db"));
        assert_eq!(
            config.template_path(),
            PathBuf::from("/opt/app/assets/db/app.db")
        );
    }

    #[test]
    fn absolute_assets_folder_replaces_app_dir() {
        let config = sample().with_assets_folder("/bundle/templates");
        assert_eq!(
            config.template_path(),
            PathBuf::from("/bundle/templates/app.db")
        );
    }

    #[test]
    fn validate_rejects_placeholder_and_blank_names() {
        let mut config = sample();
        config.database_name = PLACEHOLDER_DATABASE_NAME.to_string();
        assert!(matches!(config.validate(), Err(DbError::InvalidConfig(_))));

        config.database_name = "   ".to_string();
        assert!(matches!(config.validate(), Err(DbError::InvalidConfig(_))));

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn platform_paths_use_default_assets_folder() {
        if let Some(paths) = HelperPaths::from_platform() {
            assert!(paths.app_dir.is_absolute());
            assert_eq!(paths.assets_folder, PathBuf::from(super::DEFAULT_ASSETS_FOLDER));
        }
    }

    #[test]
    fn overrides_apply_non_blank_values_only() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SQLHELPER_DATABASE_NAME", "other.db"),
            ("SQLHELPER_DEBUG", " YES "),
            ("SQLHELPER_DOCUMENTS_DIR", "  "),
        ]);
        let config = sample().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_name, "other.db");
        assert!(config.debug);
        assert_eq!(config.paths.documents_dir, PathBuf::from("/data/docs"));
    }
}
