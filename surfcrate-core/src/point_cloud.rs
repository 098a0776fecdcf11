//! Point cloud data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with normal vectors
pub type NormalPointCloud3f = PointCloud<NormalPoint3f>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.points.iter_mut()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl PointCloud<NormalPoint3f> {
    /// Pair index-aligned positions and normals into an oriented cloud.
    ///
    /// Fails with [`Error::InvalidData`] when the two sequences differ in length.
    pub fn from_positions_and_normals(
        positions: Vec<Point3f>,
        normals: Vec<Vector3f>,
    ) -> Result<Self> {
        if positions.len() != normals.len() {
            return Err(Error::InvalidData(format!(
                "Point cloud has {} positions but {} normals",
                positions.len(),
                normals.len()
            )));
        }

        Ok(positions
            .into_iter()
            .zip(normals)
            .map(|(position, normal)| NormalPoint3f { position, normal })
            .collect())
    }

    /// Positions of the cloud, index-aligned with [`Self::normals`]
    pub fn positions(&self) -> Vec<Point3f> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Normals of the cloud, index-aligned with [`Self::positions`]
    pub fn normals(&self) -> Vec<Vector3f> {
        self.points.iter().map(|p| p.normal).collect()
    }

    /// Check whether every normal has unit length within `tolerance`
    pub fn has_unit_normals(&self, tolerance: f32) -> bool {
        self.points
            .iter()
            .all(|p| (p.normal.norm() - 1.0).abs() <= tolerance)
    }

    /// Rescale every normal to unit length. Zero normals are left untouched.
    pub fn normalize_normals(&mut self) {
        for point in &mut self.points {
            if let Some(unit) = point.normal.try_normalize(f32::EPSILON) {
                point.normal = unit;
            }
        }
    }

    /// Move positions and turn normals; normal lengths are preserved
    pub fn transform(&mut self, transform: &Transform3D) {
        for point in &mut self.points {
            *point = transform.transform_oriented(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_from_positions_and_normals() {
        let positions = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
        let normals = vec![Vector3f::z(), Vector3f::x()];
        let cloud = PointCloud::from_positions_and_normals(positions.clone(), normals.clone()).unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions(), positions);
        assert_eq!(cloud.normals(), normals);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let positions = vec![Point3f::origin(); 3];
        let normals = vec![Vector3f::z(); 2];
        let result = PointCloud::from_positions_and_normals(positions, normals);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_normalize_normals() {
        let mut cloud = PointCloud::from_points(vec![
            NormalPoint3f::new(Point3f::origin(), Vector3f::new(0.0, 0.0, 4.0)),
            NormalPoint3f::new(Point3f::origin(), Vector3f::zeros()),
        ]);
        assert!(!cloud.has_unit_normals(1e-6));

        cloud.normalize_normals();
        assert_relative_eq!(cloud[0].normal, Vector3f::z());
        assert_eq!(cloud[1].normal, Vector3f::zeros());
    }

    #[test]
    fn test_rigid_transform_keeps_unit_normals() {
        let mut cloud = PointCloud::from_points(vec![
            NormalPoint3f::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::x()),
            NormalPoint3f::new(Point3f::new(0.0, 1.0, 0.0), Vector3f::y()),
        ]);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        let transform = Transform3D::from_translation_rotation(Vector3::new(0.0, 0.0, 2.0), rotation);

        cloud.transform(&transform);

        assert_relative_eq!(cloud[0].position, Point3f::new(0.0, 1.0, 2.0), epsilon = 1e-6);
        assert_relative_eq!(cloud[0].normal, Vector3f::y(), epsilon = 1e-6);
        assert!(cloud.has_unit_normals(1e-5));
    }
}
