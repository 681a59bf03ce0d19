//! Graph command implementation for Ripple CLI.
//!
//! Prints the demo notebook's dependency structure without running it.

use anyhow::bail;
use ripple_core::{CellId, Kernel, KernelConfig};

use crate::colors;
use crate::notebook;

/// Print execution levels, or the neighborhood of one cell.
pub fn execute(cell: Option<&str>, config: KernelConfig) -> anyhow::Result<()> {
    let kernel = Kernel::with_config(notebook::slider_notebook(), config)?;

    match cell {
        Some(name) => print_neighborhood(&kernel, name),
        None => {
            print_levels(&kernel);
            Ok(())
        }
    }
}

fn print_levels(kernel: &Kernel) {
    println!(
        "\n{}Dependency graph{} ({} cells, {} edges)",
        colors::BOLD,
        colors::RESET,
        kernel.graph().len(),
        kernel.graph().edge_count()
    );

    for (level, cells) in kernel.scheduler().levels().iter().enumerate() {
        println!("{}Level {level}:{}", colors::DIM, colors::RESET);
        for &id in cells {
            let Some(cell) = kernel.cell(id) else {
                continue;
            };
            let reads = if cell.reads().is_empty() {
                "-".to_string()
            } else {
                cell.reads().join(", ")
            };
            println!(
                "  {}{}{} reads [{}] writes [{}]",
                colors::BOLD,
                cell.name(),
                colors::RESET,
                reads,
                cell.writes().join(", ")
            );
        }
    }

    println!("\nOrder: {}", names(kernel, kernel.full_order()));
}

fn print_neighborhood(kernel: &Kernel, name: &str) -> anyhow::Result<()> {
    let Some(id) = kernel.cell_by_name(name) else {
        bail!("no cell named `{name}`");
    };
    let scheduler = kernel.scheduler();

    println!("{}{name}{}", colors::BOLD, colors::RESET);
    println!("  upstream:   {}", names(kernel, &scheduler.upstream_of(&[id])));
    println!("  downstream: {}", names(kernel, &scheduler.affected_order(&[id])));
    Ok(())
}

fn names(kernel: &Kernel, ids: &[CellId]) -> String {
    if ids.is_empty() {
        return "(none)".to_string();
    }
    ids.iter()
        .filter_map(|&id| kernel.cell(id).map(|cell| cell.name().to_string()))
        .collect::<Vec<_>>()
        .join(" → ")
}
