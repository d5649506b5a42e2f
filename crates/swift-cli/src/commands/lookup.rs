//! Read-only lookups.

use anyhow::Result;
use clap::Args;
use swift_core::config::SwiftConfig;
use swift_core::query;

use super::open_pool;
use crate::output;

#[derive(Args)]
pub struct GetArgs {
    /// SWIFT code, case-insensitive
    pub code: String,

    /// Print the API response body instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CountryArgs {
    /// ISO 3166-1 alpha-2 country code, case-insensitive
    pub iso2: String,

    /// Print the API response body instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn get(args: GetArgs, config: &SwiftConfig) -> Result<()> {
    let pool = open_pool(config)?;
    let details = query::fetch_by_code(&pool, &args.code)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        output::print_details(&details);
    }
    Ok(())
}

pub fn country(args: CountryArgs, config: &SwiftConfig) -> Result<()> {
    let pool = open_pool(config)?;
    let listing = query::fetch_by_country(&pool, &args.iso2)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        output::print_country(&listing);
    }
    Ok(())
}
