//! Point cloud utility transforms for oriented clouds
//!
//! These helpers prepare reference clouds and query sets for projection:
//! normalizing a cloud into a unit box, applying a random rigid motion,
//! random subsampling, and perturbing samples along their normals. Every
//! function takes an explicit random number generator so callers can seed it.

use nalgebra::{Unit, UnitQuaternion, Vector3};
use rand::seq::SliceRandom;
use rand::Rng;
use surfcrate_core::{Error, NormalPoint3f, Point3f, PointCloud, Result, Transform3D, Vector3f};
use tracing::debug;

/// Axis-aligned bounding box of the positions, or `None` for an empty cloud
pub fn bounding_box(cloud: &PointCloud<NormalPoint3f>) -> Option<(Point3f, Point3f)> {
    let first = cloud.points.first()?.position;
    let mut min = first;
    let mut max = first;

    for point in &cloud.points {
        let p = point.position;
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);

        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }

    Some((min, max))
}

/// Center the cloud's bounding box on the origin and scale it so its longest
/// axis has unit length. Normals are left untouched.
///
/// Returns the applied transform. A cloud whose extent is zero is only centered.
pub fn scale_and_center(cloud: &mut PointCloud<NormalPoint3f>) -> Transform3D {
    let Some((min, max)) = bounding_box(cloud) else {
        return Transform3D::identity();
    };

    let center = nalgebra::center(&min, &max);
    let extent = max - min;
    let longest_axis = extent.x.max(extent.y).max(extent.z);

    let shift = Transform3D::translation(-center.coords);
    let transform = if longest_axis > 0.0 {
        Transform3D::uniform_scaling(1.0 / longest_axis) * shift
    } else {
        shift
    };

    for point in &mut cloud.points {
        point.position = transform.transform_point(&point.position);
    }
    transform
}

/// Draw a random rotation and a translation in `[-1, 1]^3`.
pub fn random_rigid_transform<R: Rng + ?Sized>(rng: &mut R) -> Transform3D {
    let axis = loop {
        let candidate = Vector3::new(
            rng.gen_range(-1.0f32..=1.0),
            rng.gen_range(-1.0f32..=1.0),
            rng.gen_range(-1.0f32..=1.0),
        );
        if let Some(axis) = Unit::try_new(candidate, 1e-3) {
            break axis;
        }
    };
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let translation = Vector3::new(
        rng.gen_range(-1.0f32..=1.0),
        rng.gen_range(-1.0f32..=1.0),
        rng.gen_range(-1.0f32..=1.0),
    );

    Transform3D::from_translation_rotation(translation, UnitQuaternion::from_axis_angle(&axis, angle))
}

/// Apply a random rigid motion to positions and normals.
///
/// Returns the transform that was applied.
pub fn apply_random_rigid_transform<R: Rng + ?Sized>(
    cloud: &mut PointCloud<NormalPoint3f>,
    rng: &mut R,
) -> Transform3D {
    let transform = random_rigid_transform(rng);
    cloud.transform(&transform);
    transform
}

/// Keep a random subset of the cloud whose size is a fraction of the original
/// drawn uniformly from `[min_fraction, max_fraction]`.
pub fn subsample<R: Rng + ?Sized>(
    cloud: &PointCloud<NormalPoint3f>,
    min_fraction: f32,
    max_fraction: f32,
    rng: &mut R,
) -> Result<PointCloud<NormalPoint3f>> {
    if !(0.0..=1.0).contains(&min_fraction)
        || !(0.0..=1.0).contains(&max_fraction)
        || min_fraction > max_fraction
    {
        return Err(Error::InvalidData(format!(
            "Subsample fractions must satisfy 0 <= min <= max <= 1, got [{}, {}]",
            min_fraction, max_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..cloud.len()).collect();
    indices.shuffle(rng);

    let fraction = min_fraction + (max_fraction - min_fraction) * rng.gen::<f32>();
    let new_size = ((cloud.len() as f32 * fraction) as usize).min(cloud.len());
    debug!(from = cloud.len(), to = new_size, "subsampling point cloud");

    Ok(indices[..new_size].iter().map(|&i| cloud[i]).collect())
}

/// [`subsample`] keeping between 10% and 20% of the points
pub fn subsample_default<R: Rng + ?Sized>(
    cloud: &PointCloud<NormalPoint3f>,
    rng: &mut R,
) -> Result<PointCloud<NormalPoint3f>> {
    subsample(cloud, 0.1, 0.2, rng)
}

/// Displace every position along its own normal by an offset drawn uniformly
/// from `[-range, range]`.
pub fn noise_along_normal<R: Rng + ?Sized>(
    cloud: &mut PointCloud<NormalPoint3f>,
    range: f32,
    rng: &mut R,
) {
    if range <= 0.0 {
        return;
    }
    for point in &mut cloud.points {
        let offset: f32 = rng.gen_range(-range..=range);
        point.position += offset * point.normal;
    }
}

/// Generate `count` points on a sphere of the given radius centered on the
/// origin, by drawing in the cube `[-radius, radius]^3` and pushing each
/// sample out to the sphere. The normal of each sample points outwards.
pub fn sample_sphere<R: Rng + ?Sized>(
    count: usize,
    radius: f32,
    rng: &mut R,
) -> PointCloud<NormalPoint3f> {
    let mut cloud = PointCloud::with_capacity(count);
    while cloud.len() < count {
        let v = Vector3f::new(
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
        );
        // Samples too close to the center have no usable direction
        let Some(direction) = v.try_normalize(1e-6) else {
            continue;
        };
        cloud.push(NormalPoint3f::new(Point3f::from(direction * radius), direction));
    }
    cloud
}
