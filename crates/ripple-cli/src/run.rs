//! Run command implementation for Ripple CLI.
//!
//! Loads the demo notebook, applies each `--set` as its own cascade, and
//! prints the resulting context.

use std::time::Instant;

use anyhow::{Context, bail};
use ripple_core::{Kernel, KernelConfig, Value};

use crate::colors;
use crate::notebook;
use crate::progress::ProgressCallback;

/// Longest value preview printed in the context table.
const PREVIEW_WIDTH: usize = 60;

/// Execute the demo notebook.
pub fn execute(
    assignments: &[String],
    config: KernelConfig,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let events = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut kernel = Kernel::with_config(notebook::slider_notebook(), config)?;
    if !json {
        println!(
            "\n{}Running{} slider notebook ({} cells)",
            colors::BOLD,
            colors::RESET,
            kernel.cells().count()
        );
        kernel.set_callback(ProgressCallback::new(verbose));
    }

    let mut runs = kernel.run_all().context("failed to load notebook")?.executed.len();

    for (name, value) in events {
        if !json {
            println!(
                "\n{}Set{} {}{name}{} = {}",
                colors::CYAN,
                colors::RESET,
                colors::BOLD,
                colors::RESET,
                preview(&value)
            );
        }
        let report = kernel
            .set_value(&name, value)
            .with_context(|| format!("failed to apply `{name}`"))?;
        runs += report.executed.len();
        tracing::debug!(name = %name, changed = ?report.changed, "assignment applied");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&kernel.context().snapshot())?);
        return Ok(());
    }

    println!("\n{}Context:{}", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));
    for (name, value) in kernel.context().snapshot() {
        println!("  {}{name}{} = {}", colors::BOLD, colors::RESET, preview(&value));
    }

    println!("{}", "─".repeat(50));
    println!(
        "{}Completed{} {} cell runs in {:.2}s",
        colors::GREEN,
        colors::RESET,
        runs,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Parse a `name=value` assignment. The value is a JSON literal, or text.
fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("invalid assignment `{raw}`: expected name=value");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid assignment `{raw}`: name is empty");
    }
    Ok((name.to_string(), Value::parse_literal(value.trim())))
}

/// Single-line, width-limited rendering of a value.
fn preview(value: &Value) -> String {
    let text = value.to_string().replace('\n', "\\n");
    if text.chars().count() > PREVIEW_WIDTH {
        let cut: String = text.chars().take(PREVIEW_WIDTH).collect();
        format!("{cut}…")
    } else {
        text
    }
}
