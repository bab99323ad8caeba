//! A single centerline polyline and its statistics.

use crate::voxel::Voxel;

/// One node of a centerline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterlineNode {
    /// The medial-axis voxel.
    pub voxel: Voxel,
    /// Inscribed-sphere radius at that voxel.
    pub radius: f64,
}

/// An ordered sequence of centerline nodes. The first and last nodes are
/// the endpoints; consecutive nodes are 26-neighbours.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Centerline {
    nodes: Vec<CenterlineNode>,
}

impl Centerline {
    #[must_use]
    pub(super) fn new(nodes: Vec<CenterlineNode>) -> Self {
        Self { nodes }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the line holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node at `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds.
    #[must_use]
    pub fn node(&self, index: usize) -> &CenterlineNode {
        &self.nodes[index]
    }

    /// The nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[CenterlineNode] {
        &self.nodes
    }

    /// Iterates the nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = &CenterlineNode> {
        self.nodes.iter()
    }

    /// Splits the line at an internal `index`: the tail from `index`
    /// onward is returned as a new line, and this line keeps the head up
    /// to and including `index`, so the split node becomes a shared
    /// endpoint. Splitting at either endpoint returns an empty line and
    /// leaves this one untouched.
    #[must_use]
    pub fn split(&mut self, index: usize) -> Self {
        if index == 0 || index + 1 >= self.nodes.len() {
            return Self::default();
        }
        let tail = self.nodes[index..].to_vec();
        self.nodes.truncate(index + 1);
        Self::new(tail)
    }
}

/// Per-line descriptive statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStatistics {
    /// Sum of the Euclidean step lengths.
    pub length: f64,
    /// By how much the line exceeds the straight endpoint distance,
    /// relative to it. Zero for degenerate lines with coincident
    /// endpoints.
    pub tortuosity: f64,
    /// Running mean of the node radii.
    pub mean_radius: f64,
}

impl LineStatistics {
    /// Computes the statistics of `line` in one pass.
    #[must_use]
    pub fn compute(line: &Centerline) -> Self {
        let mut length = 0.0;
        for pair in line.nodes().windows(2) {
            length += pair[0].voxel.euclidean(pair[1].voxel);
        }

        let tortuosity = match (line.nodes().first(), line.nodes().last()) {
            (Some(first), Some(last)) => {
                let straight = first.voxel.euclidean(last.voxel);
                if straight > 0.0 { length / straight - 1.0 } else { 0.0 }
            }
            _ => 0.0,
        };

        // One-pass running mean keeps the sum well conditioned on long
        // lines.
        let mut mean_radius = 0.0;
        let mut count = 0.0;
        for node in line.iter() {
            count += 1.0;
            mean_radius += (node.radius - mean_radius) / count;
        }

        Self {
            length,
            tortuosity,
            mean_radius,
        }
    }
}
