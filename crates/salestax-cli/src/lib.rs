//! # salestax-cli — Command-Line Shell for the Sales Tax Calculator
//!
//! Provides the `salestax` binary. The CLI is the reactive shell and
//! presenter around `salestax-core`: it turns arguments and stdin lines
//! into input snapshots, hands them to the core, and prints the settled
//! state with two-decimal formatting.
//!
//! ## Subcommands
//!
//! - `salestax calc`: one calculation from free text and/or flags.
//! - `salestax watch`: one calculation per stdin line, sharing flags.
//! - `salestax regions`: list the loaded reference table.
//!
//! ```bash
//! salestax calc 100 in Quebec
//! salestax calc --amount 80 --region ontario --format json
//! salestax --config salestax.yaml calc --amount 80
//! ```
//!
//! ## Exit codes
//!
//! - `0`: a result was produced.
//! - `1`: operational error (unreadable settings or table).
//! - `2`: no result: insufficient input or unknown jurisdiction.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handlers; handlers write to any
//!   `io::Write` so they can be tested without a terminal.
//! - No business logic here. Resolution, lookup and arithmetic live in the
//!   core.

pub mod calc;
pub mod regions;
pub mod render;
pub mod watch;

use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Args;

use salestax_core::{find_region, InputResolver, InputSnapshot, ReferenceTable, Settings};

/// Exit code for a produced result.
pub const EXIT_OK: u8 = 0;
/// Exit code when no result could be produced.
pub const EXIT_NO_RESULT: u8 = 2;

/// Structured input flags shared by `calc` and `watch`.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Amount before tax. Takes priority over an amount in the text.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Option<String>,

    /// Region name (province, state). Disables free-text parsing.
    #[arg(long)]
    pub region: Option<String>,

    /// Restrict lookup to this country.
    #[arg(long)]
    pub country: Option<String>,
}

impl InputArgs {
    /// Build an input snapshot from these flags and the given search text.
    pub fn snapshot(&self, text: impl Into<String>) -> InputSnapshot {
        InputSnapshot {
            text: text.into(),
            amount: self.amount.clone(),
            region: self.region.clone(),
            country: self.country.clone(),
        }
    }
}

/// Everything a handler needs, loaded once at startup.
#[derive(Debug)]
pub struct AppContext {
    /// The reference table in use.
    pub table: ReferenceTable,
    /// Resolver built from the settings.
    pub resolver: InputResolver,
}

impl AppContext {
    /// Assemble a context from already-loaded parts.
    pub fn new(settings: &Settings, table: ReferenceTable) -> Result<Self> {
        let resolver = InputResolver::new(settings).context("failed to build input resolver")?;
        warn_on_unknown_defaults(settings, &table);
        Ok(Self { table, resolver })
    }

    /// Load settings and the reference table, reading overrides from the
    /// process environment.
    pub fn load(config: Option<&Path>, table_override: Option<&Path>) -> Result<Self> {
        Self::load_with(config, table_override, |key| std::env::var(key).ok())
    }

    /// Load settings and the reference table.
    ///
    /// Settings come from `config` (if given) and then `SALESTAX_*`
    /// overrides read through `lookup`. The table path is, first present
    /// wins: `table_override`, the effective settings' `tax_table`, the
    /// built-in table.
    pub fn load_with<F>(
        config: Option<&Path>,
        table_override: Option<&Path>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = match config {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("failed to load settings: {}", path.display()))?,
            None => Settings::default(),
        }
        .with_overrides(lookup);

        let table_path = table_override.or(settings.tax_table.as_deref());
        let table = match table_path {
            Some(path) => ReferenceTable::from_path(path)
                .with_context(|| format!("failed to load tax table: {}", path.display()))?,
            None => ReferenceTable::builtin().context("failed to load built-in tax table")?,
        };
        tracing::info!(
            source = %table_path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
            countries = table.country_count(),
            regions = table.region_count(),
            "tax table ready"
        );

        Self::new(&settings, table)
    }
}

/// Log configured defaults that can never match the loaded table.
fn warn_on_unknown_defaults(settings: &Settings, table: &ReferenceTable) {
    if let Some(region) = settings.default_region.as_deref() {
        let country = settings.default_country.as_deref();
        if find_region(table, region, country).is_none() {
            tracing::warn!(
                default_region = region,
                default_country = ?country,
                "configured default region is not in the tax table"
            );
        }
    }
}
