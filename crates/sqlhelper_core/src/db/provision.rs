//! First-run copy of the bundled template database.
//!
//! # Invariants
//! - An existing working database is never overwritten.
//! - The template is copied byte-for-byte; no schema work happens here.

use super::{DbError, DbResult};
use crate::config::HelperConfig;
use log::info;
use std::fs;
use std::io;
use std::path::Path;

/// Filesystem capabilities needed to provision the working database.
pub trait FileProvider: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    /// Size in bytes of the file at `path`, or `None` when it is missing.
    fn file_size(&self, path: &Path) -> Option<u64>;
    /// Copies `from` to `to`, returning the number of bytes written.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

/// `FileProvider` backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileProvider;

impl FileProvider for StdFileProvider {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn file_size(&self, path: &Path) -> Option<u64> {
        fs::metadata(path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A working database already existed; nothing was copied.
    AlreadyPresent,
    Copied { bytes: u64 },
}

/// Ensures the working database file exists, copying the template if needed.
///
/// # Errors
/// - Returns `DbError::Provision` when the template is missing or the copy fails.
pub fn provision_database_file(
    config: &HelperConfig,
    files: &dyn FileProvider,
) -> DbResult<ProvisionOutcome> {
    let target_path = config.database_path();
    if files.exists(&target_path) {
        return Ok(ProvisionOutcome::AlreadyPresent);
    }

    let source_path = config.template_path();
    if config.debug {
        let source_bytes = files.file_size(&source_path);
        info!(
            "event=db_provision module=db status=start source={} target={} source_exists={} source_bytes={}",
            source_path.display(),
            target_path.display(),
            source_bytes.is_some(),
            source_bytes.map_or_else(|| "none".to_string(), |bytes| bytes.to_string())
        );
    }

    let bytes = files
        .copy(&source_path, &target_path)
        .map_err(|error| DbError::Provision {
            source_path: source_path.clone(),
            target_path: target_path.clone(),
            error,
        })?;

    if config.debug {
        info!(
            "event=db_provision module=db status=ok target={} bytes={bytes}",
            target_path.display()
        );
    }
    Ok(ProvisionOutcome::Copied { bytes })
}

#[cfg(test)]
mod tests {
    use super::{provision_database_file, FileProvider, ProvisionOutcome, StdFileProvider};
    use crate::config::{HelperConfig, HelperPaths};
    use crate::db::DbError;
    use std::fs;

    #[test]
    fn copies_template_into_missing_documents_subdirectory() {
        let root = tempfile::tempdir().unwrap();
        let assets = root.path().join("app/assets/db");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("app.db"), b"template-bytes").unwrap();

        let config = HelperConfig::new(
            "app.db",
            HelperPaths::new(root.path().join("docs/nested"), root.path().join("app")),
        );

        let outcome = provision_database_file(&config, &StdFileProvider).unwrap();
        assert_eq!(outcome, ProvisionOutcome::Copied { bytes: 14 });
        assert_eq!(fs::read(config.database_path()).unwrap(), b"template-bytes");
    }

    #[test]
    fn file_size_is_none_for_missing_files_and_directories() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("template.db");
        fs::write(&file, b"1234").unwrap();

        assert_eq!(StdFileProvider.file_size(&file), Some(4));
        assert_eq!(StdFileProvider.file_size(&root.path().join("missing.db")), None);
        assert_eq!(StdFileProvider.file_size(root.path()), None);
    }

    #[test]
    fn missing_template_reports_provision_error() {
        let root = tempfile::tempdir().unwrap();
        let config = HelperConfig::new(
            "app.db",
            HelperPaths::new(root.path().join("docs"), root.path().join("app")),
        );

        let err = provision_database_file(&config, &StdFileProvider).unwrap_err();
        match err {
            DbError::Provision { source_path, .. } => {
                assert_eq!(source_path, config.template_path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
