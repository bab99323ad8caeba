//! Label link table for Hoshen–Kopelman cluster merging.
//!
//! Labels index into a signed table: a positive entry is the size of the
//! cluster owning that proper label, a negative entry aliases the label
//! to `-entry`. Resolving a label walks the alias chain and shortcuts
//! every visited link straight to the proper label.

/// Size-or-alias table indexed by cluster label. Label 0 is reserved for
/// solid voxels and its slot is never read.
#[derive(Clone, Debug)]
pub(super) struct LinkTable {
    links: Vec<i64>,
}

impl LinkTable {
    pub(super) fn new() -> Self {
        Self { links: vec![0] }
    }

    /// Allocates a fresh proper label with cluster size one.
    pub(super) fn allocate(&mut self) -> u32 {
        let label = u32::try_from(self.links.len()).expect("cluster label space exhausted");
        self.links.push(1);
        label
    }

    /// Resolves `label` to its proper label, compressing the chain.
    pub(super) fn proper(&mut self, label: u32) -> u32 {
        debug_assert!(label != 0, "label 0 is reserved for solid voxels");
        let mut root = label;
        while self.links[root as usize] < 0 {
            root = (-self.links[root as usize]) as u32;
        }
        let mut cursor = label;
        while cursor != root {
            let next = (-self.links[cursor as usize]) as u32;
            self.links[cursor as usize] = -i64::from(root);
            cursor = next;
        }
        root
    }

    /// Cluster size stored under a proper label.
    pub(super) fn size(&self, label: u32) -> i64 {
        self.links[label as usize]
    }

    /// Grows the cluster under proper label `label` by `amount` voxels.
    pub(super) fn grow(&mut self, label: u32, amount: i64) {
        debug_assert!(self.links[label as usize] > 0, "grow target must be proper");
        self.links[label as usize] += amount;
    }

    /// Redirects `label` to proper label `target`, discarding its size.
    pub(super) fn alias(&mut self, label: u32, target: u32) {
        debug_assert!(label != target);
        self.links[label as usize] = -i64::from(target);
    }

    /// Iterates `(label, size)` over the proper labels.
    pub(super) fn proper_labels(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        self.links
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, &size)| size > 0)
            .map(|(label, &size)| (label as u32, size))
    }
}
