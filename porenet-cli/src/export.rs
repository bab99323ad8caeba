//! Output serialization: JSON graph, statistics CSV, and plot files.
//!
//! The capillary network is written as a JSON Graph Format document;
//! centerline statistics as CSV rows; the histogram and box-counting
//! curves as two-column ASCII files for plotting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use porenet_core::{BoxCounts, CenterlineSet, Histogram, Network};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors surfaced while writing output files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An output file could not be written.
    #[error("failed to write `{path}`: {source}")]
    Write {
        /// Path of the output file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The network document could not be serialised.
    #[error("failed to serialise `{path}`: {source}")]
    Serialise {
        /// Path of the output file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct GraphDocument {
    graph: GraphBody,
}

#[derive(Serialize)]
struct GraphBody {
    directed: bool,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Serialize)]
struct NodeRecord {
    id: String,
    metadata: NodeMetadata,
}

#[derive(Serialize)]
struct NodeMetadata {
    node_coordinates: Coordinates,
    node_squared_radius: f64,
}

#[derive(Serialize)]
struct Coordinates {
    x: usize,
    y: usize,
    z: usize,
}

#[derive(Serialize)]
struct EdgeRecord {
    id: String,
    source: String,
    target: String,
    metadata: EdgeMetadata,
}

#[derive(Serialize)]
struct EdgeMetadata {
    link_length: f64,
    link_squared_radius: f64,
}

/// Writes the capillary network to `folder/centerlines.json` as a JSON
/// Graph Format document.
///
/// # Errors
/// Returns [`ExportError`] when serialization or the write fails.
pub fn write_network(folder: &Path, network: &Network) -> Result<PathBuf, ExportError> {
    let document = GraphDocument {
        graph: GraphBody {
            directed: false,
            nodes: network
                .nodes()
                .iter()
                .map(|node| NodeRecord {
                    id: node.id.to_string(),
                    metadata: NodeMetadata {
                        node_coordinates: Coordinates {
                            x: node.voxel.x,
                            y: node.voxel.y,
                            z: node.voxel.z,
                        },
                        node_squared_radius: node.squared_radius,
                    },
                })
                .collect(),
            edges: network
                .links()
                .iter()
                .map(|link| EdgeRecord {
                    id: link.id.to_string(),
                    source: link.source.to_string(),
                    target: link.target.to_string(),
                    metadata: EdgeMetadata {
                        link_length: link.length,
                        link_squared_radius: link.squared_radius,
                    },
                })
                .collect(),
        },
    };

    let path = folder.join("centerlines.json");
    let payload = serde_json::to_string_pretty(&document).map_err(|source| {
        ExportError::Serialise {
            path: path.clone(),
            source,
        }
    })?;
    write_file(&path, &payload)?;
    info!(
        path = %path.display(),
        nodes = network.nodes().len(),
        links = network.links().len(),
        "capillary network written"
    );
    Ok(path)
}

/// Writes per-centerline statistics to `folder/centerlines.stat` as CSV
/// rows `size,tortuosity,avg_property,,`.
///
/// # Errors
/// Returns [`ExportError::Write`] when the write fails.
pub fn write_statistics(folder: &Path, centerlines: &CenterlineSet) -> Result<PathBuf, ExportError> {
    let path = folder.join("centerlines.stat");
    let mut payload = String::new();
    for statistics in centerlines.statistics() {
        payload.push_str(&format!(
            "{},{},{},,\n",
            statistics.length, statistics.tortuosity, statistics.mean_radius
        ));
    }
    write_file(&path, &payload)?;
    info!(path = %path.display(), lines = centerlines.len(), "statistics written");
    Ok(path)
}

/// Writes the grayscale histogram to `folder/histogram.dat` as
/// `level fraction` rows.
///
/// # Errors
/// Returns [`ExportError::Write`] when the write fails.
pub fn write_histogram(folder: &Path, histogram: &Histogram) -> Result<PathBuf, ExportError> {
    let path = folder.join("histogram.dat");
    let mut payload = String::new();
    for (level, fraction) in histogram.normalised.iter().enumerate() {
        payload.push_str(&format!("{level} {fraction:.10e}\n"));
    }
    write_file(&path, &payload)?;
    info!(path = %path.display(), "histogram written");
    Ok(path)
}

/// Writes the box-counting curves to `folder/{pore,surf,rock}_frac_plot.dat`
/// as `size count` rows.
///
/// # Errors
/// Returns [`ExportError::Write`] when any write fails.
pub fn write_box_counts(folder: &Path, counts: &BoxCounts) -> Result<(), ExportError> {
    for (name, column) in [
        ("pore_frac_plot.dat", &counts.pore),
        ("surf_frac_plot.dat", &counts.surface),
        ("rock_frac_plot.dat", &counts.bulk),
    ] {
        let path = folder.join(name);
        let mut payload = String::new();
        for (&size, &count) in counts.sizes.iter().zip(column) {
            payload.push_str(&format!("{size} {count}\n"));
        }
        write_file(&path, &payload)?;
    }
    info!(folder = %folder.display(), "box-counting curves written");
    Ok(())
}

fn write_file(path: &Path, payload: &str) -> Result<(), ExportError> {
    fs::write(path, payload).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use porenet_core::{
        CenterlineSet, GraphFlavour, Histogram, Network, PORE, SOLID, Shape, Volume, Voxel,
        extract_centerlines,
    };
    use tempfile::tempdir;

    fn channel_centerlines() -> CenterlineSet {
        let mut volume = Volume::filled(Shape::new(3, 3, 6), SOLID);
        for z in 0..6 {
            volume.set(Voxel::new(1, 1, z), PORE);
        }
        extract_centerlines(&volume, GraphFlavour::Memory)
    }

    #[test]
    fn network_document_is_valid_json_graph_format() {
        let dir = tempdir().expect("temp dir");
        let set = channel_centerlines();
        let network = Network::build(&set);
        let path = write_network(dir.path(), &network).expect("network writes");

        let raw = std::fs::read_to_string(path).expect("file exists");
        let document: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        let graph = &document["graph"];
        assert_eq!(graph["directed"], serde_json::json!(false));
        assert_eq!(graph["nodes"].as_array().expect("nodes").len(), 6);
        assert_eq!(graph["edges"].as_array().expect("edges").len(), 5);
        let first = &graph["edges"][0];
        assert!(first["metadata"]["link_length"].is_number());
    }

    #[test]
    fn statistics_rows_keep_the_trailing_commas() {
        let dir = tempdir().expect("temp dir");
        let set = channel_centerlines();
        let path = write_statistics(dir.path(), &set).expect("statistics write");
        let raw = std::fs::read_to_string(path).expect("file exists");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), set.len());
        for line in lines {
            assert!(line.ends_with(",,"), "row `{line}` misses trailing commas");
            assert_eq!(line.matches(',').count(), 4);
        }
    }

    #[test]
    fn histogram_file_has_one_row_per_level() {
        let dir = tempdir().expect("temp dir");
        let histogram = Histogram::compute(&Volume::filled(Shape::new(2, 2, 2), 7));
        let path = write_histogram(dir.path(), &histogram).expect("histogram writes");
        let raw = std::fs::read_to_string(path).expect("file exists");
        assert_eq!(raw.lines().count(), 256);
        assert!(raw.lines().nth(7).expect("level 7").starts_with("7 "));
    }
}
