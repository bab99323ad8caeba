//! Grayscale histogram statistics and global threshold selection.
//!
//! The histogram drives a family of global thresholding rules; once a
//! threshold is chosen, binarisation maps every grayscale voxel at or
//! below it to pore and everything brighter to solid.

use tracing::info;

use crate::volume::{PORE, SOLID, Volume};

/// Number of grayscale levels.
pub const LEVELS: usize = 256;

/// Normalised and cumulative grayscale histograms of a volume.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Fraction of voxels at each grayscale level.
    pub normalised: [f64; LEVELS],
    /// Fraction of voxels at or below each grayscale level.
    pub cumulative: [f64; LEVELS],
}

impl Histogram {
    /// Computes both histograms in one sweep of `volume`.
    #[must_use]
    pub fn compute(volume: &Volume) -> Self {
        let mut counts = [0u64; LEVELS];
        for &byte in volume.data() {
            counts[byte as usize] += 1;
        }
        let total = volume.shape().len() as f64;
        let mut normalised = [0.0; LEVELS];
        let mut cumulative = [0.0; LEVELS];
        let mut running = 0.0;
        for level in 0..LEVELS {
            normalised[level] = counts[level] as f64 / total;
            running += normalised[level];
            cumulative[level] = running;
        }
        Self {
            normalised,
            cumulative,
        }
    }

    /// Mean grayscale level over the inclusive interval
    /// `[start, end]`, or zero when the interval holds no mass.
    #[must_use]
    pub fn mean_level(&self, start: usize, end: usize) -> f64 {
        let mass: f64 = self.normalised[start..=end].iter().sum();
        if mass == 0.0 {
            return 0.0;
        }
        let weighted: f64 = (start..=end)
            .map(|level| level as f64 * self.normalised[level])
            .sum();
        weighted / mass
    }
}

/// Global thresholding rules selectable through the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdRule {
    /// Use the user-provided threshold verbatim.
    Manual(u8),
    /// The mean grayscale level.
    Mean,
    /// Otsu's inter-class variance maximisation.
    Otsu,
    /// Ridler–Calvard iterative isodata midpoint.
    IsoData,
}

/// Selects the global threshold for `rule` from `histogram`.
#[must_use]
pub fn select_threshold(rule: ThresholdRule, histogram: &Histogram) -> u8 {
    let threshold = match rule {
        ThresholdRule::Manual(threshold) => threshold,
        ThresholdRule::Mean => histogram.mean_level(0, LEVELS - 1) as u8,
        ThresholdRule::Otsu => otsu_threshold(histogram),
        ThresholdRule::IsoData => isodata_threshold(histogram),
    };
    info!(?rule, threshold, "global threshold selected");
    threshold
}

/// Maximises the inter-class variance
/// `w(t) (1 - w(t)) (mean_bg(t) - mean_fg(t))^2` over all thresholds.
fn otsu_threshold(histogram: &Histogram) -> u8 {
    let global_mean = histogram.mean_level(0, LEVELS - 1);
    let mut best_level = 0usize;
    let mut best_variance = f64::MIN;
    let mut weighted_sum = 0.0;
    for level in 0..LEVELS {
        weighted_sum += level as f64 * histogram.normalised[level];
        let background = histogram.cumulative[level];
        let foreground = 1.0 - background;
        if background == 0.0 || foreground == 0.0 {
            continue;
        }
        let background_mean = weighted_sum / background;
        let foreground_mean = (global_mean - weighted_sum) / foreground;
        let variance =
            background * foreground * (background_mean - foreground_mean).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_level = level;
        }
    }
    best_level as u8
}

/// Iterates the threshold to the midpoint of the background and
/// foreground mean levels until it stabilises.
fn isodata_threshold(histogram: &Histogram) -> u8 {
    let lowest = histogram
        .normalised
        .iter()
        .position(|&fraction| fraction > 0.0)
        .unwrap_or(0);
    let mut tentative = lowest;
    loop {
        tentative += 1;
        if tentative >= LEVELS - 1 {
            return (LEVELS - 1) as u8;
        }
        let background_mean = histogram.mean_level(0, tentative - 1);
        let foreground_mean = histogram.mean_level(tentative + 1, LEVELS - 1);
        let target = ((background_mean + foreground_mean) / 2.0).round() as usize;
        if target == tentative {
            return tentative as u8;
        }
    }
}

/// Binarises `volume` in place: levels at or below `threshold` become
/// pore, brighter levels solid.
pub fn binarise(volume: &mut Volume, threshold: u8) {
    let shape = volume.shape();
    for voxel in shape.voxels() {
        let value = if volume.get(voxel) <= threshold {
            PORE
        } else {
            SOLID
        };
        volume.set(voxel, value);
    }
}

/// Fraction of voxels flagged as pore.
#[must_use]
pub fn pore_fraction(volume: &Volume) -> f64 {
    volume.count(PORE) as f64 / volume.shape().len() as f64
}
