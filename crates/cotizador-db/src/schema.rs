use cotizador_common::{Error, Result};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

pub const QUOTE_TABLE: &str = "Cotizaciones";
pub const QUOTE_REBUILD_TABLE: &str = "Cotizaciones_new";
pub const TAX_TYPE_TABLE: &str = "TipoImpuestos";
pub const TAX_TABLE: &str = "Impuestos";

/// Inline tax columns that move out of `Cotizaciones`.
pub const LEGACY_QUOTE_COLUMNS: [&str; 4] =
    ["TipoImpuesto", "MontoImpuesto", "CostoSinImpuesto", "CostoTotal"];

/// Column order of the rebuilt `Cotizaciones` table.
pub const QUOTE_COLUMNS: [&str; 4] = ["Id", "IdCliente", "Descripcion", "Fecha"];

/// Fixed population of `TipoImpuestos`, in insertion order.
pub const TAX_TYPE_DESCRIPTIONS: [&str; 3] = ["AGREGADO", "INCLUIDO", "SIN IMPUESTO"];

pub const CREATE_TAX_TYPES: &str = "CREATE TABLE IF NOT EXISTS TipoImpuestos (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Descripcion TEXT NOT NULL UNIQUE
);";

pub const CREATE_TAXES: &str = "CREATE TABLE IF NOT EXISTS Impuestos (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    IdCotizacion INTEGER NOT NULL,
    IdTipoImpuesto INTEGER NOT NULL,
    FOREIGN KEY (IdCotizacion) REFERENCES Cotizaciones(Id) ON DELETE CASCADE,
    FOREIGN KEY (IdTipoImpuesto) REFERENCES TipoImpuestos(Id)
);";

pub const CREATE_QUOTES_REBUILD: &str = "CREATE TABLE Cotizaciones_new (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    IdCliente INTEGER NOT NULL,
    Descripcion TEXT,
    Fecha TEXT,
    FOREIGN KEY (IdCliente) REFERENCES Clientes(Id)
);";

/// One column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// A row of `TipoImpuestos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTypeRecord {
    pub id: i64,
    pub description: String,
}

/// Columns of `table` in declaration order. A missing table yields an empty list.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(|e| Error::Database(format!("failed to prepare table_info query: {e}")))?;

    let rows = stmt
        .query_map(params![table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                declared_type: row.get(1)?,
            })
        })
        .map_err(|e| Error::Database(format!("failed to read columns of {table}: {e}")))?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(
            row.map_err(|e| Error::Database(format!("failed to read column row: {e}")))?,
        );
    }
    Ok(columns)
}

/// Current columns minus the legacy tax columns, order preserved.
pub fn retained_columns(columns: &[ColumnInfo]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !LEGACY_QUOTE_COLUMNS.contains(&c.name.as_str()))
        .map(|c| c.name.clone())
        .collect()
}

/// Insert the fixed tax types, skipping any already present.
/// Returns the number of rows actually inserted.
pub fn seed_tax_types(conn: &Connection) -> Result<usize> {
    let mut stmt = conn
        .prepare("INSERT OR IGNORE INTO TipoImpuestos (Descripcion) VALUES (?1)")
        .map_err(|e| Error::Database(format!("failed to prepare tax type insert: {e}")))?;

    let mut inserted = 0;
    for description in TAX_TYPE_DESCRIPTIONS {
        inserted += stmt
            .execute(params![description])
            .map_err(|e| Error::Database(format!("failed to insert tax type {description}: {e}")))?;
    }
    Ok(inserted)
}

pub fn tax_types(conn: &Connection) -> Result<Vec<TaxTypeRecord>> {
    let mut stmt = conn
        .prepare("SELECT Id, Descripcion FROM TipoImpuestos ORDER BY Id")
        .map_err(|e| Error::Database(format!("failed to prepare query: {e}")))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(TaxTypeRecord {
                id: row.get(0)?,
                description: row.get(1)?,
            })
        })
        .map_err(|e| Error::Database(format!("failed to query tax types: {e}")))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(
            row.map_err(|e| Error::Database(format!("failed to read tax type row: {e}")))?,
        );
    }
    Ok(records)
}

/// `table` must be one of the fixed table names above; it is interpolated.
pub fn row_count(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .map_err(|e| Error::Database(format!("failed to count {table}: {e}")))?;
    Ok(count as usize)
}
