use crate::config::Config;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Relevanssi REST - paginated JSON search over a full-text content index
#[derive(Parser, Debug)]
#[command(name = "relevanssi-rest")]
#[command(author = "Relevanssi REST Team")]
#[command(version = "0.1.0")]
#[command(about = "Paginated JSON search endpoint over a full-text content index", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/relevanssi/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Content database, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load configuration and apply global overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        Ok(config)
    }
}

// CLI submodule declarations
pub mod import;
pub mod search;
pub mod serve;
pub mod status;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP search server
    Serve(ServeArgs),

    /// Run one search and print the JSON response
    Search(SearchArgs),

    /// Import posts, terms and taxonomies from a JSON file
    Import(ImportArgs),

    /// Show content statistics
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind host, overriding the configuration
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port, overriding the configuration
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Public origin used in pagination links
    #[arg(long)]
    pub public_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Request query string, e.g. "s=rust&fields=id,title&paged=2"
    pub query: String,
    /// Print the HTTP status line to stderr
    #[arg(long)]
    pub status: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file with `taxonomies`, `terms` and `posts`
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format: cli, json
    #[arg(long, default_value = "cli")]
    pub format: String,
}
