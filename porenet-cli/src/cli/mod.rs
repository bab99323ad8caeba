//! Command-line interface orchestration for the porenet pipeline.
//!
//! The CLI mirrors the three execution stages: `--run_setup` loads the
//! grayscale volume and writes its histogram, `--run_segmentation`
//! binarises it, and `--run_morphology` runs percolation filtering, the
//! morphology reductions, and centerline extraction with its exports.

mod commands;

pub use commands::{Cli, CliError, ExecutionSummary, StageSummary, render_summary, run_cli};

#[cfg(test)]
mod tests;
