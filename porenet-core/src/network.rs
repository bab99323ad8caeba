//! Capillary network built from a centerline set.
//!
//! Every distinct centerline voxel becomes a node carrying its squared
//! inscribed-sphere radius; every 26-adjacent node pair becomes one link
//! annotated with its Euclidean length and the effective squared radius
//! of the capillary joining the two spheres. Downstream flow simulators
//! consume this graph.

use std::collections::BTreeMap;

use crate::centerline::CenterlineSet;
use crate::voxel::Voxel;

/// A network node: one distinct centerline voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkNode {
    /// Dense node identifier, unique within the network.
    pub id: usize,
    /// Voxel coordinate of the node.
    pub voxel: Voxel,
    /// Squared inscribed-sphere radius at the node.
    pub squared_radius: f64,
}

/// A capillary between two adjacent network nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkLink {
    /// Dense link identifier, unique within the network.
    pub id: usize,
    /// Identifier of the lower-id endpoint.
    pub source: usize,
    /// Identifier of the higher-id endpoint.
    pub target: usize,
    /// Euclidean length of the capillary in voxel units.
    pub length: f64,
    /// Effective squared radius of the capillary.
    pub squared_radius: f64,
}

/// The node/link network extracted from a centerline set.
#[derive(Clone, Debug, Default)]
pub struct Network {
    nodes: Vec<NetworkNode>,
    links: Vec<NetworkLink>,
}

impl Network {
    /// Builds the network from `centerlines`.
    ///
    /// Nodes are deduplicated by voxel; links are deduplicated by their
    /// unordered endpoint pair. Node and link identifiers are dense and
    /// deterministic (coordinate order).
    #[must_use]
    pub fn build(centerlines: &CenterlineSet) -> Self {
        let mut by_voxel: BTreeMap<Voxel, f64> = BTreeMap::new();
        for line in centerlines.lines() {
            for node in line.iter() {
                by_voxel.insert(node.voxel, node.radius * node.radius);
            }
        }

        let mut ids: BTreeMap<Voxel, usize> = BTreeMap::new();
        let mut nodes = Vec::with_capacity(by_voxel.len());
        for (id, (&voxel, &squared_radius)) in by_voxel.iter().enumerate() {
            ids.insert(voxel, id);
            nodes.push(NetworkNode {
                id,
                voxel,
                squared_radius,
            });
        }

        let mut links = Vec::new();
        for node in &nodes {
            for delta in crate::voxel::NEIGHBOUR_OFFSETS {
                let Some(other) = offset_voxel(node.voxel, delta) else {
                    continue;
                };
                let Some(&other_id) = ids.get(&other) else {
                    continue;
                };
                // Each unordered pair links once, from its lower id.
                if other_id <= node.id {
                    continue;
                }
                links.push(NetworkLink {
                    id: links.len(),
                    source: node.id,
                    target: other_id,
                    length: node.voxel.euclidean(other),
                    squared_radius: effective_squared_radius(node.squared_radius, by_voxel[&other]),
                });
            }
        }

        Self { nodes, links }
    }

    /// The network nodes in identifier order.
    #[must_use]
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    /// The network links in identifier order.
    #[must_use]
    pub fn links(&self) -> &[NetworkLink] {
        &self.links
    }
}

fn offset_voxel(voxel: Voxel, delta: [i64; 3]) -> Option<Voxel> {
    Some(Voxel::new(
        voxel.x.checked_add_signed(delta[0] as isize)?,
        voxel.y.checked_add_signed(delta[1] as isize)?,
        voxel.z.checked_add_signed(delta[2] as isize)?,
    ))
}

/// Effective squared radius of the capillary joining two inscribed
/// spheres with squared radii `a` and `b`.
fn effective_squared_radius(a: f64, b: f64) -> f64 {
    let denominator = (a * a + b * b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    2.0_f64.sqrt() * a * b / denominator
}
