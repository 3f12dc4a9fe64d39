use cotizador_common::Error;
use cotizador_db::{ColumnInfo, MigrationReport};

const RULE_WIDTH: usize = 60;

pub fn print_header() {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{rule}");
    println!("  MIGRACIÓN DE BASE DE DATOS - DB_Cotizador");
    println!("{rule}");
}

fn print_columns(title: &str, columns: &[ColumnInfo]) {
    println!();
    println!("{title}");
    for column in columns {
        println!("  - {} ({})", column.name, column.declared_type);
    }
}

pub fn print_report(report: &MigrationReport) {
    println!();
    println!("Backup creado en: {}", report.backup_path.display());

    print_columns("Estructura anterior de Cotizaciones:", &report.columns_before);
    println!();
    println!("  Columnas a mantener: {}", report.retained_columns.join(", "));
    println!("  Cotizaciones copiadas: {}", report.quotes_copied);
    println!("  Tipos de impuesto insertados: {}", report.tax_types_inserted);

    let Some(verification) = &report.verification else {
        println!();
        println!("No se pudo verificar la nueva estructura (ver log).");
        return;
    };

    print_columns("Nueva estructura de Cotizaciones:", &verification.columns_after);

    println!();
    println!("Verificando tablas nuevas:");
    println!("  - TipoImpuestos: {} registros", verification.tax_types.len());
    for tax_type in &verification.tax_types {
        println!("    {}: {}", tax_type.id, tax_type.description);
    }
    println!("  - Impuestos: {} registros", verification.tax_rows);
}

pub fn print_success(report: &MigrationReport) {
    println!();
    println!("Migración completada con éxito");
    println!("Backup guardado en: {}", report.backup_path.display());
}

pub fn print_failure(error: &Error) {
    println!();
    match error {
        Error::StoreNotFound(path) => {
            println!("Error: No se encontró la base de datos en {}", path.display());
        }
        Error::RolledBack { backup, source } => {
            println!("Error durante la migración: {source}");
            println!("Se ha revertido la transacción");
            println!("Puedes restaurar el backup desde: {}", backup.display());
        }
        other => {
            println!("Error: {other}");
            println!("La base de datos no fue modificada.");
        }
    }
    println!();
    println!("La migración falló.");
}
