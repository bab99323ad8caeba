//! Voxel coordinates, cube shapes, and the 26-neighbourhood.
//!
//! A voxel is an ordered triple of non-negative integer coordinates. Two
//! voxels are 26-neighbours when their Chebyshev distance is exactly one;
//! the Manhattan distance then classifies the relation further into face
//! (1), edge (2), or corner (3) adjacency.

/// A voxel coordinate inside a 3D volume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Voxel {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// The 26 neighbour offsets, ordered so that the 13 lexicographically
/// preceding neighbours (smaller `(z, y, x)`) come first.
pub const NEIGHBOUR_OFFSETS: [[i64; 3]; 26] = [
    [-1, -1, -1],
    [0, -1, -1],
    [1, -1, -1],
    [-1, 0, -1],
    [0, 0, -1],
    [1, 0, -1],
    [-1, 1, -1],
    [0, 1, -1],
    [1, 1, -1],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [-1, 0, 0],
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

impl Voxel {
    /// Creates a voxel from its three coordinates.
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate along `axis` (0 = x, 1 = y, 2 = z).
    ///
    /// # Panics
    /// Panics when `axis` exceeds 2.
    #[must_use]
    pub fn coordinate(self, axis: usize) -> usize {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("voxel axis index {axis} out of range"),
        }
    }

    fn deltas(self, other: Self) -> [i64; 3] {
        [
            self.x as i64 - other.x as i64,
            self.y as i64 - other.y as i64,
            self.z as i64 - other.z as i64,
        ]
    }

    /// Chebyshev (chessboard) distance to `other`.
    #[must_use]
    pub fn chebyshev(self, other: Self) -> u64 {
        self.deltas(other)
            .into_iter()
            .map(i64::unsigned_abs)
            .max()
            .unwrap_or(0)
    }

    /// Manhattan (taxicab) distance to `other`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> u64 {
        self.deltas(other).into_iter().map(i64::unsigned_abs).sum()
    }

    /// True when `other` lies in this voxel's 26-neighbourhood.
    #[must_use]
    pub fn is_neighbour(self, other: Self) -> bool {
        self.chebyshev(other) == 1
    }

    /// True when `other` shares a face with this voxel.
    #[must_use]
    pub fn is_face_neighbour(self, other: Self) -> bool {
        self.is_neighbour(other) && self.manhattan(other) == 1
    }

    /// True when `other` shares exactly an edge with this voxel.
    #[must_use]
    pub fn is_edge_neighbour(self, other: Self) -> bool {
        self.is_neighbour(other) && self.manhattan(other) == 2
    }

    /// True when `other` touches this voxel only at a corner.
    #[must_use]
    pub fn is_corner_neighbour(self, other: Self) -> bool {
        self.is_neighbour(other) && self.manhattan(other) == 3
    }

    /// Exact squared Euclidean distance to `other`.
    #[must_use]
    pub fn squared_distance(self, other: Self) -> u64 {
        self.deltas(other)
            .into_iter()
            .map(|d| (d * d) as u64)
            .sum()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn euclidean(self, other: Self) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }
}

/// Extents of a dense voxel cube along x, y, and z.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl Shape {
    /// Creates a shape from its three extents.
    #[must_use]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Total number of voxels in the cube.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// True when any extent is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the extent along `axis` (0 = x, 1 = y, 2 = z).
    ///
    /// # Panics
    /// Panics when `axis` exceeds 2.
    #[must_use]
    pub fn extent(&self, axis: usize) -> usize {
        match axis {
            0 => self.nx,
            1 => self.ny,
            2 => self.nz,
            _ => panic!("shape axis index {axis} out of range"),
        }
    }

    /// True when `voxel` lies inside the cube.
    #[must_use]
    pub fn contains(&self, voxel: Voxel) -> bool {
        voxel.x < self.nx && voxel.y < self.ny && voxel.z < self.nz
    }

    /// Linearises `voxel` with x fastest, then y, then z.
    ///
    /// # Panics
    /// Panics when `voxel` lies outside the cube.
    #[must_use]
    pub fn linear_index(&self, voxel: Voxel) -> usize {
        assert!(
            self.contains(voxel),
            "voxel {voxel:?} lies outside shape {self:?}"
        );
        voxel.x + self.nx * (voxel.y + self.ny * voxel.z)
    }

    /// Inverse of [`Self::linear_index`].
    #[must_use]
    pub fn voxel_at(&self, index: usize) -> Voxel {
        let x = index % self.nx;
        let y = (index / self.nx) % self.ny;
        let z = index / (self.nx * self.ny);
        Voxel::new(x, y, z)
    }

    /// Applies an offset to `voxel`, returning `None` when the result
    /// falls outside the cube.
    #[must_use]
    pub fn offset(&self, voxel: Voxel, delta: [i64; 3]) -> Option<Voxel> {
        let x = voxel.x.checked_add_signed(delta[0] as isize)?;
        let y = voxel.y.checked_add_signed(delta[1] as isize)?;
        let z = voxel.z.checked_add_signed(delta[2] as isize)?;
        let candidate = Voxel::new(x, y, z);
        self.contains(candidate).then_some(candidate)
    }

    /// Iterates the in-cube 26-neighbours of `voxel`.
    pub fn neighbours(&self, voxel: Voxel) -> impl Iterator<Item = Voxel> + '_ {
        NEIGHBOUR_OFFSETS
            .into_iter()
            .filter_map(move |delta| self.offset(voxel, delta))
    }

    /// Iterates the in-cube neighbours of `voxel` whose coordinates
    /// lexicographically precede it in `(z, y, x)` sweep order.
    pub fn preceding_neighbours(&self, voxel: Voxel) -> impl Iterator<Item = Voxel> + '_ {
        NEIGHBOUR_OFFSETS[..13]
            .iter()
            .filter_map(move |&delta| self.offset(voxel, delta))
    }

    /// Iterates the in-cube 26-neighbours of `voxel` confined to the plane
    /// perpendicular to `axis` (at most eight).
    pub fn neighbours_in_plane(
        &self,
        voxel: Voxel,
        axis: usize,
    ) -> impl Iterator<Item = Voxel> + '_ {
        NEIGHBOUR_OFFSETS
            .into_iter()
            .filter(move |delta| delta[axis] == 0)
            .filter_map(move |delta| self.offset(voxel, delta))
    }

    /// Iterates every voxel of the cube in sweep order (x fastest).
    pub fn voxels(&self) -> impl Iterator<Item = Voxel> + '_ {
        (0..self.len()).map(move |index| self.voxel_at(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(Voxel::new(1, 1, 1), Voxel::new(2, 1, 1), true, false, false)]
    #[case(Voxel::new(1, 1, 1), Voxel::new(2, 2, 1), false, true, false)]
    #[case(Voxel::new(1, 1, 1), Voxel::new(2, 2, 2), false, false, true)]
    #[case(Voxel::new(1, 1, 1), Voxel::new(3, 1, 1), false, false, false)]
    fn classifies_neighbour_kinds(
        #[case] a: Voxel,
        #[case] b: Voxel,
        #[case] face: bool,
        #[case] edge: bool,
        #[case] corner: bool,
    ) {
        assert_eq!(a.is_face_neighbour(b), face);
        assert_eq!(a.is_edge_neighbour(b), edge);
        assert_eq!(a.is_corner_neighbour(b), corner);
    }

    #[test]
    fn squared_distance_is_exact() {
        let a = Voxel::new(0, 0, 0);
        let b = Voxel::new(3, 4, 12);
        assert_eq!(a.squared_distance(b), 9 + 16 + 144);
        assert_eq!(a.euclidean(b), 13.0);
    }

    #[test]
    fn linear_index_round_trips() {
        let shape = Shape::new(3, 5, 7);
        for (position, voxel) in shape.voxels().enumerate() {
            assert_eq!(shape.linear_index(voxel), position);
            assert_eq!(shape.voxel_at(position), voxel);
        }
    }

    #[test]
    fn interior_voxel_has_26_neighbours() {
        let shape = Shape::new(3, 3, 3);
        assert_eq!(shape.neighbours(Voxel::new(1, 1, 1)).count(), 26);
        assert_eq!(shape.neighbours(Voxel::new(0, 0, 0)).count(), 7);
    }

    #[test]
    fn preceding_neighbours_are_lexicographically_smaller() {
        let shape = Shape::new(4, 4, 4);
        let centre = Voxel::new(2, 2, 2);
        let preceding: Vec<_> = shape.preceding_neighbours(centre).collect();
        assert_eq!(preceding.len(), 13);
        for voxel in preceding {
            assert!((voxel.z, voxel.y, voxel.x) < (centre.z, centre.y, centre.x));
        }
    }

    #[test]
    fn in_plane_neighbours_stay_in_plane() {
        let shape = Shape::new(5, 5, 5);
        let centre = Voxel::new(2, 2, 0);
        let in_plane: Vec<_> = shape.neighbours_in_plane(centre, 2).collect();
        assert_eq!(in_plane.len(), 8);
        assert!(in_plane.iter().all(|voxel| voxel.z == 0));
    }
}
