//! Consistency audit command.

use anyhow::{bail, Result};
use clap::Args;
use swift_core::audit;
use swift_core::config::SwiftConfig;

use super::open_pool;
use crate::output;

#[derive(Args)]
pub struct AuditArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with an error when any inconsistency is found
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: AuditArgs, config: &SwiftConfig) -> Result<()> {
    let pool = open_pool(config)?;
    let report = audit::audit(&pool)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_audit(&report);
    }

    if args.strict && !report.is_consistent() {
        bail!("Store has link inconsistencies");
    }
    Ok(())
}
