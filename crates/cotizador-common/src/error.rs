use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database not found at {}", .0.display())]
    StoreNotFound(PathBuf),

    #[error("backup error: {0}")]
    Backup(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("database error: {0}")]
    Database(String),

    /// A failure inside the migration transaction. The store was rolled back
    /// and `backup` still holds the pre-migration snapshot.
    #[error("migration rolled back: {source} (backup at {})", .backup.display())]
    RolledBack {
        backup: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the store may have been touched before this error surfaced.
    /// Precondition and backup failures happen before any mutation.
    pub fn mutation_attempted(&self) -> bool {
        matches!(self, Error::RolledBack { .. })
    }

    /// Path of the pre-migration snapshot, when one was taken.
    pub fn backup_path(&self) -> Option<&PathBuf> {
        match self {
            Error::RolledBack { backup, .. } => Some(backup),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Error;

    #[test]
    fn error_display_includes_context() {
        let e = Error::Config("empty database path".into());
        assert_eq!(e.to_string(), "configuration error: empty database path");

        let e = Error::StoreNotFound(PathBuf::from("assets/databases/DB_Cotizador.db"));
        assert_eq!(
            e.to_string(),
            "database not found at assets/databases/DB_Cotizador.db"
        );

        let e = Error::SchemaMismatch("extra column".into());
        assert_eq!(e.to_string(), "schema mismatch: extra column");

        let e = Error::Other("misc".into());
        assert_eq!(e.to_string(), "misc");
    }

    #[test]
    fn rolled_back_carries_backup_and_cause() {
        let e = Error::RolledBack {
            backup: PathBuf::from("db_backup.db"),
            source: Box::new(Error::Database("disk I/O error".into())),
        };
        assert!(e.mutation_attempted());
        assert_eq!(e.backup_path(), Some(&PathBuf::from("db_backup.db")));
        assert_eq!(
            e.to_string(),
            "migration rolled back: database error: disk I/O error (backup at db_backup.db)"
        );
    }

    #[test]
    fn precondition_errors_never_touch_the_store() {
        assert!(!Error::StoreNotFound(PathBuf::from("x.db")).mutation_attempted());
        assert!(!Error::Backup("permission denied".into()).mutation_attempted());
        assert!(Error::Backup("x".into()).backup_path().is_none());
    }
}
