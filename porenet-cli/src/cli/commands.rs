//! Stage implementations and argument parsing for the porenet CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use porenet_core::{
    GraphFlavour, Histogram, Network, Shape, Volume, binarise, box_counting, classify_surfaces,
    pore_fraction, porosity, select_threshold,
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{Config, ConfigError};
use crate::export::{
    ExportError, write_box_counts, write_histogram, write_network, write_statistics,
};
use crate::io::{IoError, load_volume, save_volume};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "porenet",
    version,
    about = "Extract the centerline representation of the pore network of a rock sample."
)]
pub struct Cli {
    /// Load the grayscale tomography and calculate its histogram.
    #[arg(long = "run_setup")]
    pub run_setup: bool,

    /// Segment the grayscale tomography and save the binary cube.
    #[arg(long = "run_segmentation")]
    pub run_segmentation: bool,

    /// Extract morphology and save the centerline representation.
    #[arg(long = "run_morphology")]
    pub run_morphology: bool,

    /// Path of the JSON configuration file to load.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Errors surfaced while executing CLI stages.
#[derive(Debug, Error)]
pub enum CliError {
    /// No execution stage was selected on the command line.
    #[error("no execution stage selected; pass at least one of \
             --run_setup, --run_segmentation, --run_morphology")]
    NoStageSelected,
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Volume file I/O failed.
    #[error(transparent)]
    Io(#[from] IoError),
    /// Output serialization failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What one execution stage produced.
#[derive(Clone, Debug, PartialEq)]
pub enum StageSummary {
    /// Histogram written for the loaded grayscale volume.
    Setup,
    /// Binary mask written after thresholding.
    Segmentation {
        /// The applied threshold, absent when the method was `none`.
        threshold: Option<u8>,
        /// Pore fraction of the binarised volume.
        pore_fraction: f64,
    },
    /// Morphology reductions and centerline extraction.
    Morphology {
        /// Number of pore clusters found.
        clusters: usize,
        /// Number of percolating clusters.
        percolating: usize,
        /// Connected porosity after percolation filtering.
        porosity: f64,
        /// Number of extracted centerlines.
        centerlines: usize,
        /// Nodes in the exported capillary network.
        nodes: usize,
        /// Links in the exported capillary network.
        links: usize,
    },
}

/// Summarises the outcome of a CLI invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionSummary {
    /// One entry per executed stage, in execution order.
    pub stages: Vec<StageSummary>,
}

/// Executes the stages selected by `cli`.
///
/// # Errors
/// Returns [`CliError`] when no stage is selected, the configuration is
/// invalid, or any file operation fails.
#[instrument(name = "cli.run", err, skip(cli), fields(config = %cli.config.display()))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    if !cli.run_setup && !cli.run_segmentation && !cli.run_morphology {
        return Err(CliError::NoStageSelected);
    }

    let config = Config::load(&cli.config)?;
    let shape = config.setup.shape.to_shape()?;

    let mut summary = ExecutionSummary::default();
    if cli.run_setup {
        summary.stages.push(run_setup_stage(&config, shape)?);
    }
    if cli.run_segmentation {
        summary.stages.push(run_segmentation_stage(&config, shape)?);
    }
    if cli.run_morphology {
        summary.stages.push(run_morphology_stage(&config, shape)?);
    }
    Ok(summary)
}

#[instrument(name = "cli.setup", err, skip(config, shape))]
fn run_setup_stage(config: &Config, shape: Shape) -> Result<StageSummary, CliError> {
    let volume = load_volume(&config.setup.input_path(), shape)?;
    let histogram = Histogram::compute(&volume);
    write_histogram(&config.setup.folder, &histogram)?;
    Ok(StageSummary::Setup)
}

#[instrument(name = "cli.segmentation", err, skip(config, shape))]
fn run_segmentation_stage(config: &Config, shape: Shape) -> Result<StageSummary, CliError> {
    let mut volume = load_volume(&config.setup.input_path(), shape)?;
    let histogram = Histogram::compute(&volume);
    write_histogram(&config.setup.folder, &histogram)?;

    let threshold = match config.segmentation.rule()? {
        Some(rule) => {
            let threshold = select_threshold(rule, &histogram);
            binarise(&mut volume, threshold);
            Some(threshold)
        }
        // Method `none`: the input is taken to be binary already.
        None => None,
    };

    let fraction = pore_fraction(&volume);
    info!(threshold = ?threshold, pore_fraction = fraction, "segmentation complete");
    save_volume(&config.setup.binary_path(), &volume)?;
    Ok(StageSummary::Segmentation {
        threshold,
        pore_fraction: fraction,
    })
}

#[instrument(name = "cli.morphology", err, skip(config, shape))]
fn run_morphology_stage(config: &Config, shape: Shape) -> Result<StageSummary, CliError> {
    let flavour: GraphFlavour = config.morphology.flavour()?;
    let mut mask: Volume = load_volume(&config.setup.binary_path(), shape)?;

    let outcome = porenet_core::run(&mut mask, flavour);
    let connected_porosity = porosity(&mask);

    let surfaces = classify_surfaces(&mask);
    info!(
        porosity = connected_porosity,
        pore_surface_to_volume = surfaces.pore_surface_to_volume,
        rock_surface_to_volume = surfaces.rock_surface_to_volume,
        "morphology reductions complete"
    );
    write_box_counts(&config.setup.folder, &box_counting(&surfaces.phases))?;

    let network = Network::build(&outcome.centerlines);
    write_network(&config.setup.folder, &network)?;
    write_statistics(&config.setup.folder, &outcome.centerlines)?;

    Ok(StageSummary::Morphology {
        clusters: outcome.clusters.clusters,
        percolating: outcome.clusters.percolating,
        porosity: connected_porosity,
        centerlines: outcome.centerlines.len(),
        nodes: network.nodes().len(),
        links: network.links().len(),
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    for stage in &summary.stages {
        match stage {
            StageSummary::Setup => writeln!(writer, "setup: histogram written")?,
            StageSummary::Segmentation {
                threshold,
                pore_fraction,
            } => match threshold {
                Some(threshold) => writeln!(
                    writer,
                    "segmentation: threshold {threshold}, pore fraction {pore_fraction:.6}"
                )?,
                None => writeln!(
                    writer,
                    "segmentation: skipped, pore fraction {pore_fraction:.6}"
                )?,
            },
            StageSummary::Morphology {
                clusters,
                percolating,
                porosity,
                centerlines,
                nodes,
                links,
            } => {
                writeln!(
                    writer,
                    "morphology: {percolating} of {clusters} clusters percolate, \
                     connected porosity {porosity:.6}"
                )?;
                writeln!(
                    writer,
                    "centerlines: {centerlines} lines, {nodes} nodes, {links} links"
                )?;
            }
        }
    }
    Ok(())
}
