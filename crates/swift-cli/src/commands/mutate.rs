//! Single-record insert and delete commands.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use swift_core::config::{DeletePolicy, InsertMode, SwiftConfig};
use swift_core::model::WriteOutcome;
use swift_core::mutate::Mutator;
use swift_core::normalize::RawRecord;

use super::open_pool;
use crate::output;

#[derive(Args)]
pub struct AddArgs {
    /// SWIFT code
    pub code: String,

    /// ISO 3166-1 alpha-2 country code
    #[arg(long)]
    pub country_iso2: String,

    /// Country name
    #[arg(long)]
    pub country_name: String,

    /// Bank name
    #[arg(long)]
    pub bank_name: String,

    /// Street address
    #[arg(long, default_value = "")]
    pub address: String,

    /// Mark as headquarters regardless of the code suffix
    #[arg(long, conflicts_with = "branch")]
    pub headquarter: bool,

    /// Mark as branch regardless of the code suffix
    #[arg(long)]
    pub branch: bool,

    /// Run the insert in one transaction
    #[arg(long)]
    pub atomic: bool,
}

impl AddArgs {
    fn to_record(&self) -> RawRecord {
        let is_headquarter = match (self.headquarter, self.branch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        RawRecord {
            swift_code: self.code.clone(),
            country_iso2: self.country_iso2.clone(),
            bank_name: self.bank_name.clone(),
            address: self.address.clone(),
            country_name: self.country_name.clone(),
            is_headquarter,
        }
    }
}

#[derive(Args)]
pub struct DeleteArgs {
    /// SWIFT code
    pub code: String,

    /// Detach links that reference the deleted code
    #[arg(long)]
    pub cascade: bool,
}

pub fn add(args: AddArgs, config: &SwiftConfig) -> Result<()> {
    let mut mutation = config.mutation;
    if args.atomic {
        mutation.insert_mode = InsertMode::Atomic;
    }

    let pool = open_pool(config)?;
    let outcome = Mutator::new(mutation).insert(&pool, &args.to_record())?;

    match outcome.write {
        WriteOutcome::Inserted => println!(
            "{} Inserted {}",
            "✓".green().bold(),
            outcome.swift_code.cyan()
        ),
        WriteOutcome::ConflictIgnored => println!(
            "{} {} already exists, insert ignored",
            "·".dimmed(),
            outcome.swift_code.cyan()
        ),
    }
    output::print_insert_outcome(&outcome);
    Ok(())
}

pub fn delete(args: DeleteArgs, config: &SwiftConfig) -> Result<()> {
    let mut mutation = config.mutation;
    if args.cascade {
        mutation.delete_policy = DeletePolicy::Cascade;
    }

    let pool = open_pool(config)?;
    let outcome = Mutator::new(mutation).delete(&pool, &args.code)?;

    println!(
        "{} Deleted {}",
        "✓".green().bold(),
        outcome.swift_code.cyan()
    );
    output::print_delete_outcome(&outcome);
    Ok(())
}
