use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use cotizador_common::{Error, Result};
use tracing::debug;

/// Location of the store relative to the project root.
pub const DATABASE_DIR: &str = "assets/databases";
pub const DATABASE_FILE: &str = "DB_Cotizador.db";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Builds the backup file name for a store path and a timestamp.
pub type BackupNamer = fn(&Path, NaiveDateTime) -> String;

/// `DB_Cotizador.db` at 2024-01-01 09:30:00 becomes
/// `DB_Cotizador_backup_20240101_093000.db`.
pub fn default_backup_name(db_path: &Path, at: NaiveDateTime) -> String {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "database".to_string());
    let stamp = at.format(BACKUP_TIMESTAMP_FORMAT);

    match db_path.extension() {
        Some(ext) => format!("{stem}_backup_{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_backup_{stamp}"),
    }
}

/// Everything the migration needs to know about where things live on disk.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub db_path: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_namer: BackupNamer,
}

impl MigrationConfig {
    /// Backups land next to the store unless redirected.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let backup_dir = db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            db_path,
            backup_dir,
            backup_namer: default_backup_name,
        }
    }

    pub fn from_project_root(root: &Path) -> Self {
        Self::new(root.join(DATABASE_DIR).join(DATABASE_FILE))
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    pub fn with_backup_namer(mut self, namer: BackupNamer) -> Self {
        self.backup_namer = namer;
        self
    }

    pub fn backup_path(&self, at: NaiveDateTime) -> PathBuf {
        let path = self.backup_dir.join((self.backup_namer)(&self.db_path, at));
        debug!("backup path resolved to {}", path.display());
        path
    }

    pub fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(Error::Config("database path cannot be empty".into()));
        }
        if self.db_path.file_name().is_none() {
            return Err(Error::Config(format!(
                "database path {} does not name a file",
                self.db_path.display()
            )));
        }
        Ok(())
    }
}
