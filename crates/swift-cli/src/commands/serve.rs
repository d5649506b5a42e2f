//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use swift_core::config::{DeletePolicy, InsertMode, SwiftConfig};
use swift_core::import::BulkImporter;
use swift_core::mutate::Mutator;
use swift_core::records;

use super::open_pool;
use crate::output;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on, overrides `server.port`
    #[arg(long, env = "SWIFT_PORT")]
    pub port: Option<u16>,

    /// Host to bind to, overrides `server.host`
    #[arg(long, env = "SWIFT_HOST")]
    pub host: Option<String>,

    /// Bulk import this record file before listening
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Run each insert in one transaction
    #[arg(long)]
    pub atomic_insert: bool,

    /// Detach links when a code is deleted
    #[arg(long)]
    pub cascade_delete: bool,
}

pub async fn execute(args: ServeArgs, mut config: SwiftConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.atomic_insert {
        config.mutation.insert_mode = InsertMode::Atomic;
    }
    if args.cascade_delete {
        config.mutation.delete_policy = DeletePolicy::Cascade;
    }
    config.validate()?;

    let pool = Arc::new(open_pool(&config)?);

    if let Some(seed) = &args.seed {
        let batch = records::load_records(seed)?;
        let report = BulkImporter::new(config.import).import(&pool, &batch)?;
        output::print_import_report(&report);
    }

    let host = config.server.host.as_str();
    let port = config.server.port;

    println!();
    println!("  {} {}", "SwiftCodes".cyan().bold(), "API Server".bold());
    println!();
    println!("  {}  http://{}:{}/v1/swift-codes", "API".green(), host, port);
    println!(
        "  {}  {}",
        "DB ".green(),
        config.database.path.display().to_string().dimmed()
    );
    println!(
        "  {}  insert={:?} delete={:?}",
        "Mode".green(),
        config.mutation.insert_mode,
        config.mutation.delete_policy
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    swift_web::run_server(pool, Mutator::new(config.mutation), host, port).await?;

    Ok(())
}
