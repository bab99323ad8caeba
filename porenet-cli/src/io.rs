//! Raw volume file I/O.
//!
//! Input volumes are raw byte dumps laid out x-fastest, then y, then z.
//! The file length must match the configured shape exactly; a mismatch
//! is fatal at the boundary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use porenet_core::{Shape, Volume, VolumeError};
use thiserror::Error;
use tracing::info;

/// Errors surfaced while reading or writing raw volumes.
#[derive(Debug, Error)]
pub enum IoError {
    /// The input file could not be read.
    #[error("failed to read volume `{path}`: {source}")]
    Read {
        /// Path of the volume file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The output file could not be written.
    #[error("failed to write volume `{path}`: {source}")]
    Write {
        /// Path of the volume file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file length does not match the configured shape.
    #[error("volume `{path}` does not match the configured shape: {source}")]
    Shape {
        /// Path of the volume file.
        path: PathBuf,
        /// Underlying shape mismatch.
        #[source]
        source: VolumeError,
    },
}

/// Loads a raw volume of the given shape from `path`.
///
/// # Errors
/// Returns [`IoError`] when the file cannot be read or its length does
/// not equal the product of the shape extents.
pub fn load_volume(path: &Path, shape: Shape) -> Result<Volume, IoError> {
    let bytes = fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let volume = Volume::from_raw(shape, bytes).map_err(|source| IoError::Shape {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        nx = shape.nx,
        ny = shape.ny,
        nz = shape.nz,
        "volume loaded"
    );
    Ok(volume)
}

/// Writes `volume` as a raw byte dump to `path`.
///
/// # Errors
/// Returns [`IoError::Write`] when the file cannot be written.
pub fn save_volume(path: &Path, volume: &Volume) -> Result<(), IoError> {
    fs::write(path, volume.data()).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "volume saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use porenet_core::{PORE, Voxel};
    use tempfile::tempdir;

    #[test]
    fn volumes_round_trip_through_disk() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("mask.raw");
        let shape = Shape::new(2, 3, 4);
        let mut volume = Volume::filled(shape, 0);
        volume.set(Voxel::new(1, 2, 3), PORE);

        save_volume(&path, &volume).expect("volume saves");
        let loaded = load_volume(&path, shape).expect("volume loads");
        assert_eq!(loaded, volume);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("short.raw");
        std::fs::write(&path, [0u8; 7]).expect("write file");
        let err = load_volume(&path, Shape::new(2, 2, 2)).expect_err("length mismatch");
        assert!(matches!(err, IoError::Shape { .. }));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("absent.raw");
        let err = load_volume(&path, Shape::new(2, 2, 2)).expect_err("file is absent");
        assert!(err.to_string().contains("absent.raw"));
    }
}
