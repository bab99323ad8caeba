//! Medial-axis annotation of the pore space.
//!
//! Boundary (contour) voxels seed a label-propagation image-foresting
//! transform that stamps every pore voxel with its exact squared distance
//! to the nearest boundary voxel and the identity of the boundary voxel
//! that owns it.

mod annotation;
mod contour;
mod ift;

pub use annotation::{AnnotationMap, SeedAnnotation};
pub use contour::{ContourStats, contour_statistics};
pub use ift::skeletonize;
