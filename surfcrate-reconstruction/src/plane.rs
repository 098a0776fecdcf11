//! Plane projection primitive

use surfcrate_core::{Point3f, Vector3f};

/// Project `point` onto the plane through `plane_point` with normal `plane_normal`.
///
/// The signed offset is divided by `|n|`, not `|n|²`, so the result is the
/// orthogonal projection only when `plane_normal` has unit length. A zero
/// normal produces NaN coordinates.
pub fn project_on_plane(point: &Point3f, plane_point: &Point3f, plane_normal: &Vector3f) -> Point3f {
    let offset = (point - plane_point).dot(plane_normal) / plane_normal.norm();
    point - plane_normal * offset
}
