//! Bulk import command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use swift_core::config::{MissingParentPolicy, SwiftConfig};
use swift_core::import::BulkImporter;
use swift_core::records;

use super::open_pool;
use crate::output;

#[derive(Args)]
pub struct ImportArgs {
    /// JSON array of records, imported in file order
    pub file: PathBuf,

    /// Create a stand-in headquarters for branches whose headquarters is absent
    #[arg(long)]
    pub auto_create_parents: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ImportArgs, config: &SwiftConfig) -> Result<()> {
    let mut import_config = config.import;
    if args.auto_create_parents {
        import_config.missing_parent = MissingParentPolicy::AutoCreate;
    }

    let batch = records::load_records(&args.file)?;
    let pool = open_pool(config)?;
    let report = BulkImporter::new(import_config).import(&pool, &batch)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Imported {} from {}",
        "✓".green().bold(),
        format!("{} record(s)", report.records).cyan(),
        args.file.display().to_string().dimmed()
    );
    output::print_import_report(&report);
    Ok(())
}
