//! # Watch Subcommand
//!
//! Line-driven reactive shell. Each stdin line replaces the search text;
//! the structured flags stay fixed for the whole run. Every line triggers a
//! full recompute through a [`Session`] and the settled state is printed.
//! The session ends at end of input.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use salestax_core::Session;

use crate::render::{write_state, OutputFormat};
use crate::{AppContext, InputArgs, EXIT_OK};

/// Arguments for the `salestax watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format for each settled state.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the watch subcommand over `input` until end of input.
pub fn run_watch(
    args: &WatchArgs,
    ctx: &AppContext,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<u8> {
    let mut session = Session::new(&ctx.table, &ctx.resolver);
    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read input line")?;
        let state = session.update(&args.input.snapshot(line));
        tracing::debug!(line = index + 1, state = %state.kind(), "input processed");
        write_state(out, state, args.format).context("failed to write result")?;
        out.flush().context("failed to flush output")?;
    }
    Ok(EXIT_OK)
}
