use clap::Parser;
use sesterce_sync::args::{Args, Command};
use sesterce_sync::{commands, ExportConfig, ImportConfig, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Values from .env are only used for variables that are not already set.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => trace!("No .env file found"),
        Err(e) => error!("Unable to load the .env file: {e}"),
    }

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");

    // This allows for testing the program without hitting the Google APIs. When
    // SESTERCE_SYNC_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Google.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Export(export_args) => {
            let config = ExportConfig::try_from(export_args)?;
            commands::export(config).await?.print()
        }

        Command::Import(import_args) => {
            let config = ImportConfig::try_from(import_args)?;
            commands::import(config, mode, import_args.dry_run())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
