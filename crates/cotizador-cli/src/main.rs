mod banner;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cotizador_config::MigrationConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cotizador-migrate",
    version,
    about = "Move the inline tax columns of Cotizaciones into TipoImpuestos/Impuestos"
)]
struct Cli {
    /// Directory containing assets/databases/DB_Cotizador.db
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Path to the database, overriding the project layout
    #[arg(long)]
    database: Option<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Print the migration report as JSON
    #[arg(long)]
    json: bool,

    /// Show per-column detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cotizador_db=debug,cotizador_config=debug,warn"
    } else {
        "cotizador_db=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.database {
        Some(path) => MigrationConfig::new(path),
        None => MigrationConfig::from_project_root(&cli.project_root),
    };
    config.validate().context("invalid database location")?;

    if !cli.json {
        banner::print_header();
    }

    let proceed = cli.yes || prompt::confirm_migration()?;
    if !proceed {
        println!("Migración cancelada");
        return Ok(ExitCode::SUCCESS);
    }

    info!("migrating {}", config.db_path.display());
    match cotizador_db::run_migration(&config) {
        Ok(report) => {
            if cli.json {
                let json =
                    serde_json::to_string_pretty(&report).context("failed to serialize report")?;
                println!("{json}");
            } else {
                banner::print_report(&report);
                banner::print_success(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            banner::print_failure(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}
