//! JSON configuration loading and validation.
//!
//! One document configures all three execution stages. Validation
//! happens at the boundary: a malformed document, an unknown method, or
//! a shape that does not match the input file is fatal before the core
//! pipeline is ever entered.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use porenet_core::{GraphFlavour, Shape, ThresholdRule};
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration `{path}`: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid JSON or misses required
    /// fields.
    #[error("failed to parse configuration `{path}`: {source}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The segmentation method is not one of the supported rules.
    #[error("unknown segmentation method `{method}`")]
    UnknownSegmentationMethod {
        /// The offending method string.
        method: String,
    },
    /// The manual segmentation rule needs a threshold.
    #[error("segmentation method `global_manual` requires the `threshold` parameter")]
    MissingThreshold,
    /// The manual threshold must be a grayscale level.
    #[error("segmentation threshold {got} is outside the grayscale range 0..=255")]
    ThresholdOutOfRange {
        /// The offending threshold value.
        got: i64,
    },
    /// The performance flavour is not one of `speed` or `memory`.
    #[error("unknown centerlines performance `{value}`; expected `speed` or `memory`")]
    UnknownPerformance {
        /// The offending flavour string.
        value: String,
    },
    /// A shape extent of zero cannot describe a volume.
    #[error("configured shape {x}x{y}x{z} has a zero extent")]
    EmptyShape { x: u64, y: u64, z: u64 },
}

/// Top-level configuration document.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Input location and geometry.
    pub setup: SetupConfig,
    /// Threshold selection parameters.
    pub segmentation: SegmentationConfig,
    /// Morphology and centerline parameters.
    pub morphology: MorphologyConfig,
}

/// The `setup` object: input location and geometry.
#[derive(Clone, Debug, Deserialize)]
pub struct SetupConfig {
    /// Folder holding the input file and receiving all outputs.
    pub folder: PathBuf,
    /// Name of the raw input file inside `folder`.
    pub input_file: String,
    /// Spatial resolution of the tomographic image in metres per voxel.
    /// Passed through to output consumers, never consumed by the core.
    pub voxel_size: f64,
    /// Voxel extents of the sample.
    pub shape: ShapeConfig,
}

/// Voxel extents along the three axes.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ShapeConfig {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

/// The `segmentation` object.
#[derive(Clone, Debug, Deserialize)]
pub struct SegmentationConfig {
    /// Segmentation method name.
    pub method: String,
    /// Manual threshold, required only by `global_manual`.
    #[serde(default)]
    pub threshold: Option<i64>,
}

/// The `morphology` object.
#[derive(Clone, Debug, Deserialize)]
pub struct MorphologyConfig {
    /// Graph flavour for centerline extraction: `speed` or `memory`.
    pub centerlines_performance: String,
}

impl Config {
    /// Loads and parses the configuration document at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SetupConfig {
    /// Absolute path of the raw input file.
    #[must_use]
    pub fn input_path(&self) -> PathBuf {
        self.folder.join(&self.input_file)
    }

    /// Absolute path of the intermediate binary mask.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.folder.join("binary_image.raw")
    }
}

impl ShapeConfig {
    /// Converts the extents into a core [`Shape`].
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyShape`] when any extent is zero.
    pub fn to_shape(self) -> Result<Shape, ConfigError> {
        if self.x == 0 || self.y == 0 || self.z == 0 {
            return Err(ConfigError::EmptyShape {
                x: self.x,
                y: self.y,
                z: self.z,
            });
        }
        Ok(Shape::new(self.x as usize, self.y as usize, self.z as usize))
    }
}

impl SegmentationConfig {
    /// Resolves the method string into a thresholding rule; `None` means
    /// segmentation is skipped.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for unknown methods and invalid manual
    /// thresholds.
    pub fn rule(&self) -> Result<Option<ThresholdRule>, ConfigError> {
        match self.method.as_str() {
            "none" => Ok(None),
            "global_manual" => {
                let threshold = self.threshold.ok_or(ConfigError::MissingThreshold)?;
                let threshold = u8::try_from(threshold)
                    .map_err(|_| ConfigError::ThresholdOutOfRange { got: threshold })?;
                Ok(Some(ThresholdRule::Manual(threshold)))
            }
            "global_mean" => Ok(Some(ThresholdRule::Mean)),
            "global_otsu" => Ok(Some(ThresholdRule::Otsu)),
            "global_isodata" => Ok(Some(ThresholdRule::IsoData)),
            other => Err(ConfigError::UnknownSegmentationMethod {
                method: other.to_owned(),
            }),
        }
    }
}

impl MorphologyConfig {
    /// Resolves the performance string into a graph flavour.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownPerformance`] for anything but
    /// `speed` or `memory`.
    pub fn flavour(&self) -> Result<GraphFlavour, ConfigError> {
        match self.centerlines_performance.as_str() {
            "speed" => Ok(GraphFlavour::Speed),
            "memory" => Ok(GraphFlavour::Memory),
            other => Err(ConfigError::UnknownPerformance {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    const DOCUMENT: &str = r#"{
        "setup": {
            "folder": "/tmp/sample",
            "input_file": "rock.raw",
            "voxel_size": 2.25e-6,
            "shape": { "x": 10, "y": 20, "z": 30 }
        },
        "segmentation": { "method": "global_manual", "threshold": 128 },
        "morphology": { "centerlines_performance": "speed" }
    }"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_a_complete_document() {
        let file = write_config(DOCUMENT);
        let config = Config::load(file.path()).expect("config parses");
        assert_eq!(config.setup.input_file, "rock.raw");
        let shape = config.setup.shape.to_shape().expect("shape is valid");
        assert_eq!(shape, Shape::new(10, 20, 30));
        assert_eq!(
            config.segmentation.rule().expect("rule resolves"),
            Some(ThresholdRule::Manual(128))
        );
        assert_eq!(
            config.morphology.flavour().expect("flavour resolves"),
            GraphFlavour::Speed
        );
    }

    #[test]
    fn missing_sections_fail_to_parse() {
        let file = write_config(r#"{ "setup": {} }"#);
        let err = Config::load(file.path()).expect_err("document is incomplete");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn manual_method_requires_a_threshold() {
        let segmentation = SegmentationConfig {
            method: "global_manual".to_owned(),
            threshold: None,
        };
        assert!(matches!(
            segmentation.rule(),
            Err(ConfigError::MissingThreshold)
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let segmentation = SegmentationConfig {
            method: "global_manual".to_owned(),
            threshold: Some(300),
        };
        assert!(matches!(
            segmentation.rule(),
            Err(ConfigError::ThresholdOutOfRange { got: 300 })
        ));
    }

    #[test]
    fn unknown_method_and_flavour_are_rejected() {
        let segmentation = SegmentationConfig {
            method: "global_sorcery".to_owned(),
            threshold: None,
        };
        assert!(matches!(
            segmentation.rule(),
            Err(ConfigError::UnknownSegmentationMethod { .. })
        ));

        let morphology = MorphologyConfig {
            centerlines_performance: "gpu".to_owned(),
        };
        assert!(matches!(
            morphology.flavour(),
            Err(ConfigError::UnknownPerformance { .. })
        ));
    }

    #[test]
    fn zero_extent_shape_is_rejected() {
        let shape = ShapeConfig { x: 0, y: 4, z: 4 };
        assert!(matches!(
            shape.to_shape(),
            Err(ConfigError::EmptyShape { .. })
        ));
    }
}
