//! # Regions Subcommand
//!
//! Prints the loaded reference table in table order, optionally limited to
//! one country.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use salestax_core::{Country, Region};

use crate::render::percent;
use crate::{AppContext, EXIT_NO_RESULT, EXIT_OK};

/// Arguments for the `salestax regions` subcommand.
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// Only list regions of this country (case-insensitive).
    #[arg(long)]
    pub country: Option<String>,
}

/// Execute the regions subcommand.
///
/// Returns exit code: 0 when something was listed, 2 when the country
/// filter matched nothing.
pub fn run_regions(args: &RegionsArgs, ctx: &AppContext, out: &mut impl Write) -> Result<u8> {
    let filter = args.country.as_deref().map(str::to_lowercase);
    let countries: Vec<&Country> = ctx
        .table
        .countries()
        .iter()
        .filter(|c| {
            filter
                .as_deref()
                .map_or(true, |f| c.name().to_lowercase() == f)
        })
        .collect();

    if countries.is_empty() {
        tracing::warn!(country = ?args.country, "no matching country in tax table");
        return Ok(EXIT_NO_RESULT);
    }

    for country in countries {
        write_country(out, country).context("failed to write region listing")?;
    }
    Ok(EXIT_OK)
}

fn write_country(out: &mut impl Write, country: &Country) -> std::io::Result<()> {
    writeln!(out, "{}", country.name())?;
    for (name, region) in country.regions() {
        writeln!(out, "  {name}: {}", describe(region))?;
    }
    Ok(())
}

fn describe(region: &Region) -> String {
    let components = region.components();
    if components.is_empty() {
        return "no sales tax".to_string();
    }
    let parts = components
        .iter()
        .map(|c| format!("{} {}", c.name, percent(c.rate)))
        .collect::<Vec<_>>()
        .join(" + ");
    if components.len() == 1 {
        parts
    } else {
        format!("{parts} = {}", percent(region.combined_rate()))
    }
}
