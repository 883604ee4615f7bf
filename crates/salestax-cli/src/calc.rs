//! # Calc Subcommand
//!
//! One calculation from free text, structured flags, or both.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use salestax_core::{evaluate, CalculatorState};

use crate::render::{write_state, OutputFormat};
use crate::{AppContext, InputArgs, EXIT_NO_RESULT, EXIT_OK};

/// Arguments for the `salestax calc` subcommand.
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Free-text request, e.g. `100 in Quebec`. Words are joined with spaces.
    #[arg(value_name = "TEXT", allow_negative_numbers = true)]
    pub text: Vec<String>,

    #[command(flatten)]
    pub input: InputArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the calc subcommand.
///
/// Returns exit code: 0 when a result was produced, 2 otherwise.
pub fn run_calc(args: &CalcArgs, ctx: &AppContext, out: &mut impl Write) -> Result<u8> {
    let snapshot = args.input.snapshot(args.text.join(" "));
    let state = evaluate(&ctx.table, &ctx.resolver, &snapshot);
    tracing::info!(state = %state.kind(), "calculation settled");

    write_state(out, &state, args.format).context("failed to write result")?;

    Ok(match state {
        CalculatorState::Resolved(_) => EXIT_OK,
        _ => EXIT_NO_RESULT,
    })
}
