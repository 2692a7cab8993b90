use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use relevanssi_rest::cli::{self, Cli, Commands};
use relevanssi_rest::server;
use relevanssi_rest::store::Store;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let args = Cli::parse();

    // The server logs through tracing, one-shot commands through env_logger
    match &args.command {
        Commands::Serve(_) => server::init_logging(),
        _ => env_logger::init(),
    }

    // Load configuration
    let config = args.load_config().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("Content database: {:?}", config.database_path);

    // Dispatch commands
    match &args.command {
        Commands::Serve(cmd) => {
            cli::serve::handle(cmd, config)?;
        }
        Commands::Search(cmd) => {
            let store = Arc::new(Store::new(&config)?);
            if !cli::search::handle(cmd, store, &config)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Import(cmd) => {
            let store = Store::new(&config)?;
            cli::import::handle(cmd, &store)?;
        }
        Commands::Status(cmd) => {
            let store = Store::new(&config)?;
            cli::status::handle(cmd, &store)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
