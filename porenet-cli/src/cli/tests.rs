//! End-to-end tests for the CLI stages over a synthetic sample.

use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::{TempDir, tempdir};

use super::{Cli, CliError, ExecutionSummary, StageSummary, render_summary, run_cli};

/// A 3x3x20 grayscale sample with a dark 1x1 channel along z.
fn write_sample(folder: &Path) {
    let (nx, ny, nz) = (3usize, 3usize, 20usize);
    let mut bytes = vec![200u8; nx * ny * nz];
    for z in 0..nz {
        bytes[1 + nx * (1 + ny * z)] = 10;
    }
    fs::write(folder.join("rock.raw"), bytes).expect("sample written");
}

fn write_config(folder: &Path) -> std::path::PathBuf {
    let document = format!(
        r#"{{
            "setup": {{
                "folder": "{}",
                "input_file": "rock.raw",
                "voxel_size": 2.25e-6,
                "shape": {{ "x": 3, "y": 3, "z": 20 }}
            }},
            "segmentation": {{ "method": "global_manual", "threshold": 128 }},
            "morphology": {{ "centerlines_performance": "speed" }}
        }}"#,
        folder.display()
    );
    let path = folder.join("config.json");
    fs::write(&path, document).expect("config written");
    path
}

fn sample_workspace() -> (TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("temp dir");
    write_sample(dir.path());
    let config = write_config(dir.path());
    (dir, config)
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments parse")
}

#[test]
fn all_stages_run_end_to_end() {
    let (dir, config) = sample_workspace();
    let cli = parse(&[
        "porenet",
        "--run_setup",
        "--run_segmentation",
        "--run_morphology",
        config.to_str().expect("utf-8 path"),
    ]);

    let summary = run_cli(cli).expect("pipeline succeeds");
    assert_eq!(summary.stages.len(), 3);
    assert_eq!(summary.stages[0], StageSummary::Setup);

    match &summary.stages[1] {
        StageSummary::Segmentation {
            threshold,
            pore_fraction,
        } => {
            assert_eq!(*threshold, Some(128));
            assert!((pore_fraction - 20.0 / 180.0).abs() < 1e-12);
        }
        other => panic!("unexpected stage summary: {other:?}"),
    }

    match &summary.stages[2] {
        StageSummary::Morphology {
            clusters,
            percolating,
            centerlines,
            nodes,
            links,
            ..
        } => {
            assert_eq!(*clusters, 1);
            assert_eq!(*percolating, 1);
            assert_eq!(*centerlines, 1);
            assert_eq!(*nodes, 20);
            assert_eq!(*links, 19);
        }
        other => panic!("unexpected stage summary: {other:?}"),
    }

    for artifact in [
        "histogram.dat",
        "binary_image.raw",
        "pore_frac_plot.dat",
        "surf_frac_plot.dat",
        "rock_frac_plot.dat",
        "centerlines.json",
        "centerlines.stat",
    ] {
        assert!(
            dir.path().join(artifact).exists(),
            "missing artifact {artifact}"
        );
    }
}

#[test]
fn no_stage_flag_is_an_error() {
    let (_dir, config) = sample_workspace();
    let cli = parse(&["porenet", config.to_str().expect("utf-8 path")]);
    let err = run_cli(cli).expect_err("no stage selected");
    assert!(matches!(err, CliError::NoStageSelected));
}

#[test]
fn missing_config_is_a_configuration_error() {
    let dir = tempdir().expect("temp dir");
    let cli = parse(&[
        "porenet",
        "--run_setup",
        dir.path().join("absent.json").to_str().expect("utf-8"),
    ]);
    let err = run_cli(cli).expect_err("configuration is absent");
    assert!(matches!(err, CliError::Config(_)));
}

#[test]
fn input_size_mismatch_is_fatal_at_the_boundary() {
    let (dir, config) = sample_workspace();
    // Truncate the input so it no longer matches the configured shape.
    fs::write(dir.path().join("rock.raw"), [0u8; 10]).expect("truncate sample");
    let cli = parse(&[
        "porenet",
        "--run_setup",
        config.to_str().expect("utf-8 path"),
    ]);
    let err = run_cli(cli).expect_err("shape mismatch");
    assert!(matches!(err, CliError::Io(_)));
}

#[test]
fn morphology_without_percolation_reports_an_empty_network() {
    let dir = tempdir().expect("temp dir");
    // Binary mask with a single enclosed pore voxel: nothing percolates.
    let (nx, ny, nz) = (5usize, 5usize, 5usize);
    let mut bytes = vec![0u8; nx * ny * nz];
    bytes[2 + nx * (2 + ny * 2)] = 1;
    fs::write(dir.path().join("binary_image.raw"), bytes).expect("mask written");

    let document = format!(
        r#"{{
            "setup": {{
                "folder": "{}",
                "input_file": "rock.raw",
                "voxel_size": 1.0,
                "shape": {{ "x": 5, "y": 5, "z": 5 }}
            }},
            "segmentation": {{ "method": "none" }},
            "morphology": {{ "centerlines_performance": "memory" }}
        }}"#,
        dir.path().display()
    );
    let config = dir.path().join("config.json");
    fs::write(&config, document).expect("config written");

    let cli = parse(&[
        "porenet",
        "--run_morphology",
        config.to_str().expect("utf-8 path"),
    ]);
    let summary = run_cli(cli).expect("stage succeeds");
    match &summary.stages[0] {
        StageSummary::Morphology {
            percolating,
            centerlines,
            nodes,
            links,
            porosity,
            ..
        } => {
            assert_eq!(*percolating, 0);
            assert_eq!(*centerlines, 0);
            assert_eq!(*nodes, 0);
            assert_eq!(*links, 0);
            assert_eq!(*porosity, 0.0);
        }
        other => panic!("unexpected stage summary: {other:?}"),
    }
}

#[test]
fn summary_rendering_is_stable() {
    let summary = ExecutionSummary {
        stages: vec![
            StageSummary::Setup,
            StageSummary::Segmentation {
                threshold: Some(128),
                pore_fraction: 0.25,
            },
        ],
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer).expect("rendering succeeds");
    let rendered = String::from_utf8(buffer).expect("utf-8 output");
    assert!(rendered.contains("setup: histogram written"));
    assert!(rendered.contains("threshold 128"));
}
