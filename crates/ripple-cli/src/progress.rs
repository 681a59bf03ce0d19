//! Terminal progress reporting for cascades.

use ripple_core::{CellFailure, CellId, ExecutionCallback};

use crate::colors;

/// Progress callback that prints execution status to the terminal.
pub struct ProgressCallback {
    /// Whether to show verbose output.
    verbose: bool,
}

impl ProgressCallback {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ExecutionCallback for ProgressCallback {
    fn on_cell_started(&self, _cell_id: CellId, name: &str) {
        print!(
            "{}  ▶ Running{} {}{}{}... ",
            colors::CYAN,
            colors::RESET,
            colors::BOLD,
            name,
            colors::RESET
        );
        colors::flush_stdout();
    }

    fn on_cell_completed(&self, _cell_id: CellId, _name: &str) {
        println!("{}✓{}", colors::GREEN, colors::RESET);
    }

    fn on_cell_error(&self, _cell_id: CellId, _name: &str, error: &CellFailure) {
        println!("{}✗{}", colors::RED, colors::RESET);
        eprintln!("{}    Error:{} {}", colors::RED, colors::RESET, error);
    }

    fn on_cascade_started(&self, cell_count: usize) {
        if cell_count == 0 {
            println!("{}  (nothing to re-run){}", colors::DIM, colors::RESET);
        } else if self.verbose {
            println!("{}Cascade:{} {} cells", colors::DIM, colors::RESET, cell_count);
        }
    }
}
