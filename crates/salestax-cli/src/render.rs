//! # Presenters
//!
//! Text and JSON rendering of a settled [`CalculatorState`]. This is the
//! only place amounts are rounded: every figure is formatted to two
//! decimals at output time.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use salestax_core::{CalculatorState, Resolution};

/// Shown when there is nothing to calculate yet.
pub const PROMPT: &str = "e.g., '100 in Quebec' or 'tax for 50 in ON'";

/// Output format for calculation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary and breakdown.
    #[default]
    Text,
    /// Single-line JSON object.
    Json,
}

/// Format an amount to two decimals.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a fractional rate as a percentage with up to three decimals and
/// no trailing zeros (`0.09975` → `9.975%`, `0.05` → `5%`).
pub fn percent(rate: f64) -> String {
    let formatted = format!("{:.3}", rate * 100.0);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}

/// Render a state in the requested format.
pub fn write_state(
    out: &mut impl Write,
    state: &CalculatorState,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, state),
        OutputFormat::Json => {
            let receipt = Receipt::from_state(state);
            serde_json::to_writer(&mut *out, &receipt).map_err(io::Error::other)?;
            writeln!(out)
        }
    }
}

/// Human-readable rendering.
pub fn write_text(out: &mut impl Write, state: &CalculatorState) -> io::Result<()> {
    match state {
        CalculatorState::Resolved(resolution) => write_resolution(out, resolution),
        CalculatorState::Unresolved(input) => {
            writeln!(out, "No tax rates found for '{}'", input.region_name())?;
            writeln!(out, "{PROMPT}")
        }
        CalculatorState::Idle | CalculatorState::Resolving(_) => writeln!(out, "{PROMPT}"),
    }
}

fn write_resolution(out: &mut impl Write, resolution: &Resolution) -> io::Result<()> {
    let result = &resolution.result;
    writeln!(out, "Total: {}", money(result.total))?;
    writeln!(
        out,
        "Amount: {} + Tax: {}",
        money(result.amount),
        money(result.total_tax)
    )?;
    writeln!(
        out,
        "Based on {} ({}) tax rate of {}%",
        resolution.region,
        resolution.country,
        money(result.effective_rate() * 100.0)
    )?;
    for line in &result.breakdown {
        writeln!(out, "  {}: {}", line.name, money(line.amount))?;
    }
    Ok(())
}

/// JSON view of a settled state. Amounts are two-decimal strings.
#[derive(Debug, Serialize)]
pub struct Receipt {
    /// `idle`, `unresolved` or `resolved`.
    pub status: &'static str,
    /// Region name that failed to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Matched country key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Matched region key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Amount before tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Total tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
    /// Amount plus tax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    /// Effective combined rate in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_percent: Option<String>,
    /// Per-component amounts.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<ReceiptLine>,
}

/// One breakdown entry of a [`Receipt`].
#[derive(Debug, Serialize)]
pub struct ReceiptLine {
    /// Component name.
    pub name: String,
    /// Tax for this component.
    pub amount: String,
}

impl Receipt {
    fn empty(status: &'static str) -> Self {
        Self {
            status,
            query: None,
            country: None,
            region: None,
            amount: None,
            tax: None,
            total: None,
            rate_percent: None,
            breakdown: Vec::new(),
        }
    }

    /// Project a state into its JSON view.
    pub fn from_state(state: &CalculatorState) -> Self {
        match state {
            CalculatorState::Resolved(resolution) => {
                let result = &resolution.result;
                Self {
                    country: Some(resolution.country.clone()),
                    region: Some(resolution.region.clone()),
                    amount: Some(money(result.amount)),
                    tax: Some(money(result.total_tax)),
                    total: Some(money(result.total)),
                    rate_percent: Some(money(result.effective_rate() * 100.0)),
                    breakdown: result
                        .breakdown
                        .iter()
                        .map(|line| ReceiptLine {
                            name: line.name.clone(),
                            amount: money(line.amount),
                        })
                        .collect(),
                    ..Self::empty(state.kind().as_str())
                }
            }
            CalculatorState::Unresolved(input) => Self {
                query: Some(input.region_name().to_string()),
                ..Self::empty(state.kind().as_str())
            },
            CalculatorState::Idle | CalculatorState::Resolving(_) => {
                Self::empty(state.kind().as_str())
            }
        }
    }
}
