//! Core traits for surfcrate

use crate::point::*;

/// Trait for nearest neighbor search functionality.
///
/// An index is built once over the positions of a reference cloud and then
/// queried read-only. Results are `(index, squared_distance)` pairs sorted by
/// ascending distance, where `index` addresses the reference cloud the index
/// was built from.
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point.
    ///
    /// Returns fewer than `k` entries when the index holds fewer than `k`
    /// points, and nothing when `k == 0`.
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Number of indexed points
    fn len(&self) -> usize;

    /// Check if the index holds no points
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
