pub mod backup;
pub mod migrations;
pub mod schema;

pub use backup::create_backup;
pub use migrations::{MigrationReport, Verification, run_migration, run_migration_at};
pub use schema::{
    ColumnInfo, TaxTypeRecord, retained_columns, row_count, seed_tax_types, table_columns,
    tax_types,
};
