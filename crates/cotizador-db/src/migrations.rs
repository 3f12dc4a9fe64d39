//! Moves the inline tax columns of `Cotizaciones` out into `TipoImpuestos`
//! and `Impuestos`.
//!
//! The schema changes run in one transaction against a store that was
//! already copied to a timestamped backup. Any failure inside the transaction
//! rolls everything back and is reported as [`Error::RolledBack`].

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use cotizador_common::{Error, Result};
use cotizador_config::MigrationConfig;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::create_backup;
use crate::schema::{
    self, CREATE_QUOTES_REBUILD, CREATE_TAX_TYPES, CREATE_TAXES, ColumnInfo, QUOTE_COLUMNS,
    QUOTE_REBUILD_TABLE, QUOTE_TABLE, TAX_TABLE, TaxTypeRecord,
};

/// What a successful run did, for the caller to report.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub backup_path: PathBuf,
    pub columns_before: Vec<ColumnInfo>,
    pub retained_columns: Vec<String>,
    pub quotes_copied: usize,
    pub tax_types_inserted: usize,
    /// `None` when the post-commit read failed; the migration itself succeeded.
    pub verification: Option<Verification>,
}

/// State of the store re-read after commit.
#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub columns_after: Vec<ColumnInfo>,
    pub tax_types: Vec<TaxTypeRecord>,
    pub tax_rows: usize,
}

struct Applied {
    columns_before: Vec<ColumnInfo>,
    retained_columns: Vec<String>,
    quotes_copied: usize,
    tax_types_inserted: usize,
}

pub fn run_migration(config: &MigrationConfig) -> Result<MigrationReport> {
    run_migration_at(config, Local::now().naive_local())
}

/// Run the migration, naming the backup after `at`.
pub fn run_migration_at(config: &MigrationConfig, at: NaiveDateTime) -> Result<MigrationReport> {
    config.validate()?;
    if !config.db_path.is_file() {
        return Err(Error::StoreNotFound(config.db_path.clone()));
    }

    let backup_path = create_backup(config, at)?;

    let mut conn = open_store(&config.db_path).map_err(|e| Error::RolledBack {
        backup: backup_path.clone(),
        source: Box::new(e),
    })?;

    info!("starting migration of {}", config.db_path.display());
    let applied = match apply(&mut conn) {
        Ok(applied) => applied,
        Err(e) => {
            warn!("migration failed, transaction rolled back: {e}");
            warn!("backup available at {}", backup_path.display());
            return Err(Error::RolledBack {
                backup: backup_path,
                source: Box::new(e),
            });
        }
    };
    info!("migration committed");

    let verification = match verify(&conn) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("post-migration verification failed: {e}");
            None
        }
    };

    Ok(MigrationReport {
        backup_path,
        columns_before: applied.columns_before,
        retained_columns: applied.retained_columns,
        quotes_copied: applied.quotes_copied,
        tax_types_inserted: applied.tax_types_inserted,
        verification,
    })
}

/// Open an existing store for writing. Never creates the file.
fn open_store(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .map_err(|e| Error::Database(format!("failed to open database: {e}")))?;

    // A table rebuild must not trigger the cascade on Impuestos when the old
    // Cotizaciones table is dropped.
    conn.execute_batch("PRAGMA foreign_keys=OFF;")
        .map_err(|e| Error::Database(format!("failed to set pragmas: {e}")))?;
    Ok(conn)
}

fn apply(conn: &mut Connection) -> Result<Applied> {
    let tx = conn
        .transaction()
        .map_err(|e| Error::Database(format!("failed to start transaction: {e}")))?;

    let columns_before = schema::table_columns(&tx, QUOTE_TABLE)?;
    if columns_before.is_empty() {
        return Err(Error::SchemaMismatch(format!("table {QUOTE_TABLE} not found")));
    }
    for column in &columns_before {
        debug!("{QUOTE_TABLE}.{} ({})", column.name, column.declared_type);
    }

    info!("step 1: creating TipoImpuestos");
    tx.execute_batch(CREATE_TAX_TYPES)
        .map_err(|e| Error::Database(format!("failed to create TipoImpuestos: {e}")))?;

    info!("step 2: seeding tax types");
    let tax_types_inserted = schema::seed_tax_types(&tx)?;
    debug!("{tax_types_inserted} tax types inserted");

    info!("step 3: creating Impuestos");
    tx.execute_batch(CREATE_TAXES)
        .map_err(|e| Error::Database(format!("failed to create Impuestos: {e}")))?;

    info!("step 4: rebuilding {QUOTE_TABLE}");
    let retained_columns = schema::retained_columns(&columns_before);
    debug!("retained columns: {retained_columns:?}");
    check_alignment(&retained_columns)?;

    let quotes_before = schema::row_count(&tx, QUOTE_TABLE)?;
    tx.execute_batch(CREATE_QUOTES_REBUILD)
        .map_err(|e| Error::Database(format!("failed to create {QUOTE_REBUILD_TABLE}: {e}")))?;

    let column_list = retained_columns.join(", ");
    let quotes_copied = tx
        .execute(
            &format!(
                "INSERT INTO {QUOTE_REBUILD_TABLE} ({column_list}) \
                 SELECT {column_list} FROM {QUOTE_TABLE}"
            ),
            [],
        )
        .map_err(|e| Error::Database(format!("failed to copy quotes: {e}")))?;
    if quotes_copied != quotes_before {
        return Err(Error::Database(format!(
            "copied {quotes_copied} of {quotes_before} quotes"
        )));
    }

    tx.execute_batch(&format!(
        "DROP TABLE {QUOTE_TABLE};
         ALTER TABLE {QUOTE_REBUILD_TABLE} RENAME TO {QUOTE_TABLE};"
    ))
    .map_err(|e| Error::Database(format!("failed to swap {QUOTE_TABLE}: {e}")))?;

    tx.commit()
        .map_err(|e| Error::Database(format!("failed to commit migration: {e}")))?;

    Ok(Applied {
        columns_before,
        retained_columns,
        quotes_copied,
        tax_types_inserted,
    })
}

/// The copy maps retained columns positionally onto the fixed target layout,
/// so name, order and count must all agree.
fn check_alignment(retained: &[String]) -> Result<()> {
    if retained.iter().map(String::as_str).eq(QUOTE_COLUMNS) {
        return Ok(());
    }
    Err(Error::SchemaMismatch(format!(
        "retained columns {retained:?} do not match target layout {QUOTE_COLUMNS:?}"
    )))
}

fn verify(conn: &Connection) -> Result<Verification> {
    let columns_after = schema::table_columns(conn, QUOTE_TABLE)?;
    let tax_types = schema::tax_types(conn)?;
    let tax_rows = schema::row_count(conn, TAX_TABLE)?;
    info!(
        "verified: {} quote columns, {} tax types, {tax_rows} taxes",
        columns_after.len(),
        tax_types.len()
    );
    Ok(Verification {
        columns_after,
        tax_types,
        tax_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_accepts_exact_target_layout() {
        let retained: Vec<String> = QUOTE_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert!(check_alignment(&retained).is_ok());
    }

    #[test]
    fn alignment_rejects_reordered_extra_or_missing_columns() {
        let reordered = vec![
            "Id".to_string(),
            "Descripcion".to_string(),
            "IdCliente".to_string(),
            "Fecha".to_string(),
        ];
        assert!(matches!(
            check_alignment(&reordered),
            Err(Error::SchemaMismatch(_))
        ));

        let mut extra: Vec<String> = QUOTE_COLUMNS.iter().map(|s| s.to_string()).collect();
        extra.push("Notas".to_string());
        assert!(check_alignment(&extra).is_err());

        let missing = vec!["Id".to_string(), "IdCliente".to_string()];
        assert!(check_alignment(&missing).is_err());
    }

    #[test]
    fn open_store_never_creates_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        assert!(open_store(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn apply_on_in_memory_legacy_store() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Clientes (Id INTEGER PRIMARY KEY, Nombre TEXT);
             CREATE TABLE Cotizaciones (
                Id INTEGER PRIMARY KEY AUTOINCREMENT,
                IdCliente INTEGER NOT NULL,
                Descripcion TEXT,
                Fecha TEXT,
                TipoImpuesto TEXT,
                MontoImpuesto REAL,
                CostoSinImpuesto REAL,
                CostoTotal REAL
             );
             INSERT INTO Clientes (Id, Nombre) VALUES (1, 'A');
             INSERT INTO Cotizaciones (IdCliente, Descripcion, TipoImpuesto, CostoTotal)
                VALUES (1, 'x', 'AGREGADO', 119.0);",
        )
        .unwrap();

        let applied = apply(&mut conn).unwrap();
        assert_eq!(applied.columns_before.len(), 8);
        assert_eq!(applied.retained_columns, QUOTE_COLUMNS.to_vec());
        assert_eq!(applied.quotes_copied, 1);
        assert_eq!(applied.tax_types_inserted, 3);

        let verification = verify(&conn).unwrap();
        let names: Vec<&str> = verification
            .columns_after
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, QUOTE_COLUMNS.to_vec());
        assert_eq!(verification.tax_types.len(), 3);
        assert_eq!(verification.tax_rows, 0);
    }
}
