//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swift_core::config::SwiftConfig;
use swift_db::DbPool;

pub mod audit;
pub mod import;
pub mod lookup;
pub mod mutate;
pub mod serve;

/// SwiftCodes - SWIFT code headquarters/branch registry
#[derive(Parser)]
#[command(name = "swiftcodes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./swiftcodes.toml when present)
    #[arg(short, long, global = true, env = "SWIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides `database.path`
    #[arg(long, global = true, env = "SWIFT_DB")]
    pub db: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve(serve::ServeArgs),

    /// Bulk import a JSON record file in one transaction
    Import(import::ImportArgs),

    /// Show a SWIFT code, with branches if it is a headquarters
    Get(lookup::GetArgs),

    /// List all SWIFT codes of a country
    Country(lookup::CountryArgs),

    /// Insert a single SWIFT code
    Add(mutate::AddArgs),

    /// Delete a single SWIFT code
    Delete(mutate::DeleteArgs),

    /// Report link inconsistencies without repairing them
    Audit(audit::AuditArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.settings()?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Import(args) => import::execute(args, &config),
            Commands::Get(args) => lookup::get(args, &config),
            Commands::Country(args) => lookup::country(args, &config),
            Commands::Add(args) => mutate::add(args, &config),
            Commands::Delete(args) => mutate::delete(args, &config),
            Commands::Audit(args) => audit::execute(args, &config),
        }
    }

    /// Resolve configuration: flags and environment over the file over defaults.
    fn settings(&self) -> Result<SwiftConfig> {
        let mut config = SwiftConfig::load(self.config.as_deref())?;
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Open the configured database, creating and migrating it if needed.
pub(crate) fn open_pool(config: &SwiftConfig) -> Result<DbPool> {
    let path = &config.database.path;
    tracing::debug!(path = %path.display(), "Opening database");
    swift_db::init_pool_with_timeout(path, config.database.busy_timeout())
        .with_context(|| format!("Failed to open database {}", path.display()))
}
