//! Nearest neighbor search implementations

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use surfcrate_core::{Error, NearestNeighborSearch, Point3f, Result};
use tracing::debug;

/// KD-Tree implementation for nearest neighbor search, backed by `kiddo`.
///
/// The tree is bulk-built once and never mutated afterwards, which also lets
/// it hold any number of points sharing a coordinate (planar scans).
pub struct KdTree {
    tree: Option<ImmutableKdTree<f32, 3>>,
    len: usize,
}

impl KdTree {
    /// Build the tree over the given positions.
    ///
    /// Item `i` of the tree refers to `points[i]`.
    pub fn new(points: &[Point3f]) -> Result<Self> {
        if let Some(idx) = points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidData(format!(
                "Point {} has non-finite coordinates",
                idx
            )));
        }

        let entries: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree = if entries.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&entries))
        };
        debug!(points = points.len(), "built kd-tree");

        Ok(Self {
            tree,
            len: points.len(),
        })
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let tree = match &self.tree {
            Some(tree) if k > 0 => tree,
            _ => return Vec::new(),
        };

        tree.nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k.min(self.len))
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance))
            .collect()
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn squared_distances(&self, query: &Point3f) -> Vec<(usize, f32)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, (point - query).norm_squared()))
            .collect()
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances = self.squared_distances(query);

        // Sort by distance and take k nearest
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        distances.truncate(k);
        distances
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
