use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use cotizador_common::{Error, Result};
use cotizador_config::MigrationConfig;
use tracing::info;

/// Copy the store byte-for-byte to its timestamped backup path.
///
/// Runs before any schema change; an error here means the store was not
/// touched. An existing file at the backup path is never overwritten.
pub fn create_backup(config: &MigrationConfig, at: NaiveDateTime) -> Result<PathBuf> {
    if !config.db_path.is_file() {
        return Err(Error::StoreNotFound(config.db_path.clone()));
    }

    let backup_path = config.backup_path(at);
    if backup_path.exists() {
        return Err(Error::Backup(format!(
            "refusing to overwrite existing backup {}",
            backup_path.display()
        )));
    }

    if !config.backup_dir.as_os_str().is_empty() {
        fs::create_dir_all(&config.backup_dir).map_err(|e| {
            Error::Backup(format!(
                "failed to create backup directory {}: {e}",
                config.backup_dir.display()
            ))
        })?;
    }

    info!("creating backup at {}", backup_path.display());
    let bytes = fs::copy(&config.db_path, &backup_path).map_err(|e| {
        Error::Backup(format!(
            "failed to copy {} to {}: {e}",
            config.db_path.display(),
            backup_path.display()
        ))
    })?;
    info!("backup written ({bytes} bytes)");

    Ok(backup_path)
}
