//! Morphology reductions over the percolating pore mask.
//!
//! Pure reporting: phase classification into pore, solid surface, and
//! solid bulk, surface-to-volume ratios, and box-counting curves for the
//! fractal dimension of each phase. Nothing here feeds back into the
//! skeleton pipeline.

use crate::volume::{PORE, Volume};

/// Ternary phase codes written into the classified volume.
pub const PHASE_PORE: u8 = 0;
/// A solid voxel with at least one pore 26-neighbour.
pub const PHASE_SURFACE: u8 = 1;
/// A solid voxel surrounded by solid.
pub const PHASE_BULK: u8 = 2;

/// Phase classification plus the derived surface-to-volume ratios.
#[derive(Debug)]
pub struct SurfaceReport {
    /// Ternary volume holding the phase code of every voxel.
    pub phases: Volume,
    /// Pore surface voxels over all pore voxels.
    pub pore_surface_to_volume: f64,
    /// Solid surface voxels over all solid voxels.
    pub rock_surface_to_volume: f64,
}

/// Classifies every voxel of a binary pore mask into the three phases
/// and reports the surface-to-volume ratio of each side of the
/// interface. Off-cube neighbours count as neither pore nor solid.
#[must_use]
pub fn classify_surfaces(mask: &Volume) -> SurfaceReport {
    let shape = mask.shape();
    let mut phases = Volume::filled(shape, PHASE_BULK);
    let mut pore_total = 0usize;
    let mut pore_surface = 0usize;
    let mut rock_total = 0usize;
    let mut rock_surface = 0usize;

    for voxel in shape.voxels() {
        if mask.is_pore(voxel) {
            pore_total += 1;
            phases.set(voxel, PHASE_PORE);
            if shape.neighbours(voxel).any(|n| !mask.is_pore(n)) {
                pore_surface += 1;
            }
        } else {
            rock_total += 1;
            if shape.neighbours(voxel).any(|n| mask.is_pore(n)) {
                rock_surface += 1;
                phases.set(voxel, PHASE_SURFACE);
            }
        }
    }

    let ratio = |surface: usize, total: usize| {
        if total == 0 {
            0.0
        } else {
            surface as f64 / total as f64
        }
    };

    SurfaceReport {
        phases,
        pore_surface_to_volume: ratio(pore_surface, pore_total),
        rock_surface_to_volume: ratio(rock_surface, rock_total),
    }
}

/// Porosity of a binary mask: the pore volume fraction.
#[must_use]
pub fn porosity(mask: &Volume) -> f64 {
    mask.count(PORE) as f64 / mask.shape().len() as f64
}

/// Box-counting curves per phase: `counts[i]` is the number of boxes of
/// linear size `sizes[i]` containing at least one voxel of the phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxCounts {
    /// Box sizes, ascending powers of two.
    pub sizes: Vec<usize>,
    /// Occupied-box counts for the pore phase.
    pub pore: Vec<usize>,
    /// Occupied-box counts for the solid-surface phase.
    pub surface: Vec<usize>,
    /// Occupied-box counts for the solid-bulk phase.
    pub bulk: Vec<usize>,
}

/// Runs box counting over a phase-classified volume. The slope of
/// `ln(count)` against `ln(size)` estimates the fractal dimension of
/// each phase.
#[must_use]
pub fn box_counting(phases: &Volume) -> BoxCounts {
    let shape = phases.shape();
    let largest = shape.nx.max(shape.ny).max(shape.nz);
    let exponent = largest.next_power_of_two().trailing_zeros() as usize;
    let padded = 1usize << exponent;

    let sizes: Vec<usize> = (0..=exponent).map(|e| 1usize << e).collect();
    let mut counts = BoxCounts {
        sizes: sizes.clone(),
        pore: Vec::new(),
        surface: Vec::new(),
        bulk: Vec::new(),
    };

    for (phase, column) in [
        (PHASE_PORE, &mut counts.pore),
        (PHASE_SURFACE, &mut counts.surface),
        (PHASE_BULK, &mut counts.bulk),
    ] {
        *column = count_phase(phases, phase, padded, &sizes);
    }
    counts
}

/// Counts occupied boxes per size by repeatedly folding each cell's
/// eight sub-boxes into its lower corner.
fn count_phase(phases: &Volume, phase: u8, padded: usize, sizes: &[usize]) -> Vec<usize> {
    let shape = phases.shape();
    let index = |x: usize, y: usize, z: usize| x + padded * (y + padded * z);
    let mut cells = vec![false; padded * padded * padded];
    for voxel in shape.voxels() {
        if phases.get(voxel) == phase {
            cells[index(voxel.x, voxel.y, voxel.z)] = true;
        }
    }

    let mut counts = Vec::with_capacity(sizes.len());
    for &size in sizes {
        if size == 1 {
            counts.push(cells.iter().filter(|&&cell| cell).count());
            continue;
        }
        let half = size / 2;
        let mut occupied = 0usize;
        let positions: Vec<usize> = (0..padded).step_by(size).collect();
        for &z in &positions {
            for &y in &positions {
                for &x in &positions {
                    let folded = cells[index(x, y, z)]
                        || cells[index(x + half, y, z)]
                        || cells[index(x, y + half, z)]
                        || cells[index(x, y, z + half)]
                        || cells[index(x, y + half, z + half)]
                        || cells[index(x + half, y, z + half)]
                        || cells[index(x + half, y + half, z)]
                        || cells[index(x + half, y + half, z + half)];
                    cells[index(x, y, z)] = folded;
                    occupied += usize::from(folded);
                }
            }
        }
        counts.push(occupied);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::volume::SOLID;
    use crate::voxel::{Shape, Voxel};

    fn centre_pore_mask() -> Volume {
        let mut mask = Volume::filled(Shape::new(5, 5, 5), SOLID);
        for z in 1..3 {
            for y in 1..3 {
                for x in 1..3 {
                    mask.set(Voxel::new(x, y, z), PORE);
                }
            }
        }
        mask
    }

    #[test]
    fn classification_separates_the_three_phases() {
        let report = classify_surfaces(&centre_pore_mask());
        // All eight pore voxels touch solid; the shell around them is
        // surface; the far corner of the cube stays bulk.
        assert_eq!(report.phases.count(PHASE_PORE), 8);
        assert!((report.pore_surface_to_volume - 1.0).abs() < 1e-12);
        assert_eq!(report.phases.get(Voxel::new(0, 1, 1)), PHASE_SURFACE);
        assert_eq!(report.phases.get(Voxel::new(4, 4, 4)), PHASE_BULK);
        assert!(report.rock_surface_to_volume > 0.0);
        assert!(report.rock_surface_to_volume < 1.0);
    }

    #[test]
    fn porosity_counts_the_pore_fraction() {
        let mask = centre_pore_mask();
        assert!((porosity(&mask) - 8.0 / 125.0).abs() < 1e-12);
    }

    #[test]
    fn solid_volume_fills_every_box_size() {
        let mask = Volume::filled(Shape::new(4, 4, 4), SOLID);
        let report = classify_surfaces(&mask);
        let counts = box_counting(&report.phases);
        assert_eq!(counts.sizes, vec![1, 2, 4]);
        assert_eq!(counts.bulk, vec![64, 8, 1]);
        assert_eq!(counts.pore, vec![0, 0, 0]);
        assert_eq!(counts.surface, vec![0, 0, 0]);
    }

    #[test]
    fn single_voxel_phase_occupies_one_box_per_size() {
        let mut mask = Volume::filled(Shape::new(4, 4, 4), SOLID);
        mask.set(Voxel::new(1, 1, 1), PORE);
        let report = classify_surfaces(&mask);
        let counts = box_counting(&report.phases);
        assert_eq!(counts.pore, vec![1, 1, 1]);
    }
}
