//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use bytemuck::{Pod, Zeroable};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A point with normal vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct NormalPoint3f {
    pub position: Point3f,
    pub normal: Vector3f,
}

unsafe impl Pod for NormalPoint3f {}
unsafe impl Zeroable for NormalPoint3f {}

impl NormalPoint3f {
    /// Create a point from a position and a normal
    pub fn new(position: Point3f, normal: Vector3f) -> Self {
        Self { position, normal }
    }

    /// Check that both the position and the normal are finite
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.normal.iter().all(|c| c.is_finite())
    }
}

impl Default for NormalPoint3f {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            normal: Vector3f::new(0.0, 0.0, 1.0),
        }
    }
}
