//! Similarity transforms for oriented point clouds
//!
//! Preprocessing only ever rotates, translates and uniformly scales a
//! reference cloud, so a transform keeps normals perpendicular to the surface
//! and only their length has to be restored.

use crate::point::NormalPoint3f;
use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Homogeneous similarity transform (rotation, translation, uniform scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Shift every position by `offset`; normals are unaffected
    pub fn translation(offset: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Scale positions about the origin by `factor`
    pub fn uniform_scaling(factor: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(factor),
        }
    }

    /// Rotate about the origin, then translate
    pub fn from_translation_rotation(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
    ) -> Self {
        Self {
            matrix: Isometry3::from_parts(translation.into(), rotation).to_homogeneous(),
        }
    }

    fn linear(&self) -> Matrix3<f32> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        Point3::from_homogeneous(self.matrix * point.to_homogeneous()).unwrap_or(*point)
    }

    /// Map a direction, ignoring translation. Lengths scale with the transform.
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.linear() * vector
    }

    /// Map a position/normal pair.
    ///
    /// The normal keeps its original length, so unit normals stay unit under
    /// scaling as well. A zero normal stays zero.
    pub fn transform_oriented(&self, point: &NormalPoint3f) -> NormalPoint3f {
        let length = point.normal.norm();
        let normal = self
            .transform_vector(&point.normal)
            .try_normalize(f32::EPSILON)
            .map_or(point.normal, |unit| unit * length);

        NormalPoint3f {
            position: self.transform_point(&point.position),
            normal,
        }
    }

    /// `self ∘ other`: `other` is applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compose_applies_right_first() {
        let scale = Transform3D::uniform_scaling(2.0);
        let shift = Transform3D::translation(Vector3::new(1.0, 0.0, 0.0));

        let p = (scale * shift).transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(4.0, 2.0, 2.0));
    }

    #[test]
    fn test_scaling_keeps_normal_length() {
        let t = Transform3D::uniform_scaling(0.25) * Transform3D::translation(Vector3::new(1.0, 2.0, 3.0));
        let point = NormalPoint3f::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.6, 0.8));

        let mapped = t.transform_oriented(&point);
        assert_relative_eq!(mapped.position, Point3::new(0.5, 0.5, 0.75));
        assert_relative_eq!(mapped.normal, point.normal, epsilon = 1e-6);
        assert_relative_eq!(t.transform_vector(&point.normal).norm(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_rotation_turns_normal() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f32::consts::FRAC_PI_2);
        let t = Transform3D::from_translation_rotation(Vector3::new(0.0, 0.0, 1.0), rotation);
        let point = NormalPoint3f::new(Point3::origin(), Vector3::z());

        let mapped = t.transform_oriented(&point);
        assert_relative_eq!(mapped.position, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(mapped.normal, -Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_zero_normal_and_translation() {
        let t = Transform3D::translation(Vector3::new(5.0, 5.0, 5.0));
        assert_eq!(t.transform_vector(&Vector3::z()), Vector3::z());

        let flat = NormalPoint3f::new(Point3::origin(), Vector3::zeros());
        assert_eq!(t.transform_oriented(&flat).normal, Vector3::zeros());
    }
}
