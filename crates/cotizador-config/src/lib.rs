pub mod model;

pub use model::{
    BackupNamer, DATABASE_DIR, DATABASE_FILE, MigrationConfig, default_backup_name,
};
