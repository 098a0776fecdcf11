//! Moving Least Squares (MLS) point projection
//!
//! This module projects arbitrary query points onto the implicit MLS surface
//! of an oriented reference cloud. Each iteration queries the neighbors of the
//! current estimate, blends them into a local plane with a distance kernel and
//! projects the estimate onto that plane. Two operators are provided:
//!
//! - **Simple** (SPSS): the plane passes through the weighted centroid of the
//!   neighbor positions.
//! - **Hermite-like** (HPSS): every neighbor first projects the estimate onto
//!   its own tangent plane, and the plane passes through the weighted centroid
//!   of those projections.
//!
//! In both cases the plane normal is the weighted average of the neighbor
//! normals. The loop always runs the configured number of iterations unless a
//! caller-supplied predicate stops it.

use crate::kernel::{distance, Kernel, WeightFn};
use crate::plane::project_on_plane;
use serde::{Deserialize, Serialize};
use surfcrate_core::{
    Error, NearestNeighborSearch, NormalPoint3f, Point3f, PointCloud, Result, Vector3, Vector3f,
};
use tracing::{debug, trace, warn};

/// Number of refinement iterations per query point
pub const DEFAULT_ITERATIONS: usize = 10;

/// Neighbors gathered per iteration by the simple operator
pub const SIMPLE_DEFAULT_NEIGHBORS: usize = 200;

/// Neighbors gathered per iteration by the Hermite-like operator
pub const HERMITE_DEFAULT_NEIGHBORS: usize = 20;

/// Support radius used when none is configured
pub const DEFAULT_SUPPORT_RADIUS: f32 = 0.05;

/// Allowed deviation from unit length before the reference normals are reported
pub const UNIT_NORMAL_TOLERANCE: f32 = 1e-3;

/// Local plane construction used by the projection operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionMethod {
    /// Plane through the weighted centroid of neighbor positions (SPSS)
    Simple,
    /// Plane through the weighted centroid of per-neighbor tangent projections (HPSS)
    HermiteLike,
}

impl ProjectionMethod {
    /// Neighbor count the operator is tuned for
    pub fn default_num_neighbors(self) -> usize {
        match self {
            ProjectionMethod::Simple => SIMPLE_DEFAULT_NEIGHBORS,
            ProjectionMethod::HermiteLike => HERMITE_DEFAULT_NEIGHBORS,
        }
    }

    fn anchor_fn(self) -> fn(&Point3f, &NormalPoint3f) -> Point3f {
        match self {
            ProjectionMethod::Simple => position_anchor,
            ProjectionMethod::HermiteLike => tangent_anchor,
        }
    }
}

fn position_anchor(_estimate: &Point3f, sample: &NormalPoint3f) -> Point3f {
    sample.position
}

/// The estimate projected onto the sample's own tangent plane
fn tangent_anchor(estimate: &Point3f, sample: &NormalPoint3f) -> Point3f {
    project_on_plane(estimate, &sample.position, &sample.normal)
}

impl Default for ProjectionMethod {
    fn default() -> Self {
        ProjectionMethod::Simple
    }
}

impl std::fmt::Display for ProjectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionMethod::Simple => f.write_str("simple"),
            ProjectionMethod::HermiteLike => f.write_str("hermite"),
        }
    }
}

impl std::str::FromStr for ProjectionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" | "spss" => Ok(ProjectionMethod::Simple),
            "hermite" | "hermite-like" | "hpss" => Ok(ProjectionMethod::HermiteLike),
            other => Err(format!("unknown projection method '{}'", other)),
        }
    }
}

/// Configuration for MLS point projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Local plane construction
    pub method: ProjectionMethod,
    /// Weight function to use
    pub kernel: Kernel,
    /// Support radius for weight function
    pub support_radius: f32,
    /// Number of neighbors gathered per iteration
    pub num_neighbors: usize,
    /// Number of projection iterations
    pub iterations: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::simple()
    }
}

impl ProjectionConfig {
    /// Simple projection with its default neighbor count
    pub fn simple() -> Self {
        Self {
            method: ProjectionMethod::Simple,
            kernel: Kernel::Gaussian,
            support_radius: DEFAULT_SUPPORT_RADIUS,
            num_neighbors: SIMPLE_DEFAULT_NEIGHBORS,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Hermite-like projection with its default neighbor count
    pub fn hermite() -> Self {
        Self {
            method: ProjectionMethod::HermiteLike,
            num_neighbors: HERMITE_DEFAULT_NEIGHBORS,
            ..Self::simple()
        }
    }

    /// Set the projection method. The neighbor count is left unchanged.
    pub fn with_method(mut self, method: ProjectionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the weight function
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Set the support radius
    pub fn with_support_radius(mut self, support_radius: f32) -> Self {
        self.support_radius = support_radius;
        self
    }

    /// Set the number of neighbors gathered per iteration
    pub fn with_num_neighbors(mut self, num_neighbors: usize) -> Self {
        self.num_neighbors = num_neighbors;
        self
    }

    /// Set the number of iterations
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Reject parameters for which the kernels are undefined.
    ///
    /// A zero neighbor count is accepted here and reported as a degenerate
    /// weight sum on the first iteration.
    pub fn validate(&self) -> Result<()> {
        if !(self.support_radius.is_finite() && self.support_radius > 0.0) {
            return Err(Error::InvalidData(format!(
                "Support radius must be positive and finite, got {}",
                self.support_radius
            )));
        }
        if self.iterations == 0 {
            return Err(Error::InvalidData(
                "At least one projection iteration is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of a projection after one iteration, handed to early-exit predicates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationState {
    /// Zero-based index of the iteration that just completed
    pub iteration: usize,
    /// Estimate after the iteration
    pub position: Point3f,
    /// Averaged normal of the iteration's local plane
    pub normal: Vector3f,
    /// Distance moved during the iteration
    pub displacement: f32,
    /// Number of neighbors the index returned
    pub neighbors: usize,
}

/// Plane fitted around the current estimate
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalPlane {
    centroid: Point3f,
    normal: Vector3f,
}

/// Running weighted sums of anchors and normals, kept in `f64`
#[derive(Debug, Clone, Copy)]
struct PlaneAccumulator {
    centroid: Vector3<f64>,
    normal: Vector3<f64>,
    weight_sum: f64,
}

impl PlaneAccumulator {
    fn new() -> Self {
        Self {
            centroid: Vector3::zeros(),
            normal: Vector3::zeros(),
            weight_sum: 0.0,
        }
    }

    fn add(&mut self, anchor: &Point3f, normal: &Vector3f, weight: f64) {
        self.centroid += anchor.coords.cast::<f64>() * weight;
        self.normal += normal.cast::<f64>() * weight;
        self.weight_sum += weight;
    }

    fn finish(self, iteration: usize) -> Result<LocalPlane> {
        if !self.weight_sum.is_finite() {
            return Err(Error::NumericalDivergence {
                iteration,
                reason: format!("weight sum is {}", self.weight_sum),
            });
        }
        if self.weight_sum == 0.0 {
            return Err(Error::DegenerateWeights {
                iteration,
                weight_sum: self.weight_sum,
            });
        }

        let centroid = Point3f::from((self.centroid / self.weight_sum).cast::<f32>());
        let normal = (self.normal / self.weight_sum).cast::<f32>();
        if !centroid.iter().chain(normal.iter()).all(|c| c.is_finite()) {
            return Err(Error::NumericalDivergence {
                iteration,
                reason: "weighted centroid or normal overflowed".to_string(),
            });
        }

        Ok(LocalPlane { centroid, normal })
    }
}

/// MLS projection operator over a borrowed reference cloud and its spatial index
pub struct MLSProjector<'a, S: NearestNeighborSearch> {
    cloud: &'a PointCloud<NormalPoint3f>,
    index: &'a S,
    config: ProjectionConfig,
}

impl<'a, S: NearestNeighborSearch> MLSProjector<'a, S> {
    /// Create a projector over `cloud`, whose positions `index` was built from.
    ///
    /// The projection divides by `|n|` rather than `|n|²`, which only matches an
    /// orthogonal projection for unit normals, so non-unit reference normals
    /// are reported here.
    pub fn new(
        cloud: &'a PointCloud<NormalPoint3f>,
        index: &'a S,
        config: ProjectionConfig,
    ) -> Result<Self> {
        let projector = Self::with_validated_config(cloud, index, config)?;

        if !cloud.has_unit_normals(UNIT_NORMAL_TOLERANCE) {
            warn!(
                tolerance = UNIT_NORMAL_TOLERANCE,
                "reference cloud has non-unit normals; plane projections will not be orthogonal"
            );
        }
        debug!(
            points = cloud.len(),
            method = %projector.config.method,
            kernel = %projector.config.kernel,
            radius = projector.config.support_radius,
            k = projector.config.num_neighbors,
            iterations = projector.config.iterations,
            "created MLS projector"
        );

        Ok(projector)
    }

    fn with_validated_config(
        cloud: &'a PointCloud<NormalPoint3f>,
        index: &'a S,
        config: ProjectionConfig,
    ) -> Result<Self> {
        config.validate()?;

        if cloud.is_empty() {
            return Err(Error::InvalidData("Point cloud is empty".to_string()));
        }
        if index.len() != cloud.len() {
            return Err(Error::InvalidData(format!(
                "Spatial index holds {} points but the reference cloud has {}",
                index.len(),
                cloud.len()
            )));
        }

        Ok(Self {
            cloud,
            index,
            config,
        })
    }

    /// Projection parameters
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a query point, returning the projected position and its normal
    pub fn project(&self, query: &Point3f) -> Result<NormalPoint3f> {
        self.project_with(query, |_| false)
    }

    /// Project a query point, calling `stop` after every iteration.
    ///
    /// Returning `true` from `stop` ends the projection with the current state.
    pub fn project_with<F>(&self, query: &Point3f, mut stop: F) -> Result<NormalPoint3f>
    where
        F: FnMut(&IterationState) -> bool,
    {
        if !query.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidData(format!(
                "Query point has non-finite coordinates: {:?}",
                query
            )));
        }

        let weight = self.config.kernel.weight_fn();
        let mut position = *query;
        let mut normal = Vector3f::zeros();

        for iteration in 0..self.config.iterations {
            let neighbors = self
                .index
                .find_k_nearest(&position, self.config.num_neighbors);
            let plane = self.fit_local_plane(&position, &neighbors, weight, iteration)?;

            let next = project_on_plane(&position, &plane.centroid, &plane.normal);
            if !next.iter().all(|c| c.is_finite()) {
                return Err(Error::NumericalDivergence {
                    iteration,
                    reason: "projected position is not finite".to_string(),
                });
            }

            let state = IterationState {
                iteration,
                position: next,
                normal: plane.normal,
                displacement: (next - position).norm(),
                neighbors: neighbors.len(),
            };
            trace!(
                iteration,
                neighbors = state.neighbors,
                displacement = state.displacement,
                "mls iteration"
            );

            position = next;
            normal = plane.normal;

            if stop(&state) {
                debug!(iteration, "projection stopped early");
                break;
            }
        }

        Ok(NormalPoint3f { position, normal })
    }

    /// Project every query point in order
    pub fn project_all(&self, queries: &[Point3f]) -> Result<Vec<NormalPoint3f>> {
        queries.iter().map(|q| self.project(q)).collect()
    }

    fn fit_local_plane(
        &self,
        position: &Point3f,
        neighbors: &[(usize, f32)],
        weight: WeightFn,
        iteration: usize,
    ) -> Result<LocalPlane> {
        let anchor_of = self.config.method.anchor_fn();
        let radius = f64::from(self.config.support_radius);
        let mut acc = PlaneAccumulator::new();

        for &(idx, _) in neighbors {
            let sample = self.cloud.points.get(idx).ok_or_else(|| {
                Error::Algorithm(format!(
                    "Spatial index returned index {} outside a cloud of {} points",
                    idx,
                    self.cloud.len()
                ))
            })?;
            let w = weight(distance(position, &sample.position), radius);
            acc.add(&anchor_of(position, sample), &sample.normal, w);
        }

        acc.finish(iteration)
    }
}

fn project_once<S: NearestNeighborSearch>(
    config: ProjectionConfig,
    query: &Point3f,
    cloud: &PointCloud<NormalPoint3f>,
    index: &S,
) -> Result<NormalPoint3f> {
    MLSProjector::with_validated_config(cloud, index, config)?.project(query)
}

/// Simple (SPSS) projection of a single query point
pub fn simple_projection<S: NearestNeighborSearch>(
    kernel: Kernel,
    query: &Point3f,
    cloud: &PointCloud<NormalPoint3f>,
    index: &S,
    radius: f32,
    num_neighbors: usize,
    iterations: usize,
) -> Result<NormalPoint3f> {
    let config = ProjectionConfig::simple()
        .with_kernel(kernel)
        .with_support_radius(radius)
        .with_num_neighbors(num_neighbors)
        .with_iterations(iterations);
    project_once(config, query, cloud, index)
}

/// Hermite-like (HPSS) projection of a single query point
pub fn hermite_projection<S: NearestNeighborSearch>(
    kernel: Kernel,
    query: &Point3f,
    cloud: &PointCloud<NormalPoint3f>,
    index: &S,
    radius: f32,
    num_neighbors: usize,
    iterations: usize,
) -> Result<NormalPoint3f> {
    let config = ProjectionConfig::hermite()
        .with_kernel(kernel)
        .with_support_radius(radius)
        .with_num_neighbors(num_neighbors)
        .with_iterations(iterations);
    project_once(config, query, cloud, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surfcrate_algorithms::{BruteForceSearch, KdTree};

    fn square_cloud() -> PointCloud<NormalPoint3f> {
        let positions = vec![
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(-1.0, 1.0, 0.0),
            Point3f::new(1.0, -1.0, 0.0),
            Point3f::new(-1.0, -1.0, 0.0),
        ];
        let normals = vec![Vector3f::z(); 4];
        PointCloud::from_positions_and_normals(positions, normals).unwrap()
    }

    #[test]
    fn test_projection_config_default() {
        let config = ProjectionConfig::default();
        assert_eq!(config.method, ProjectionMethod::Simple);
        assert_eq!(config.kernel, Kernel::Gaussian);
        assert_eq!(config.num_neighbors, 200);
        assert_eq!(config.iterations, 10);

        let hermite = ProjectionConfig::hermite();
        assert_eq!(hermite.method, ProjectionMethod::HermiteLike);
        assert_eq!(hermite.num_neighbors, 20);
        assert_eq!(hermite.num_neighbors, ProjectionMethod::HermiteLike.default_num_neighbors());
    }

    #[test]
    fn test_config_validation() {
        assert!(ProjectionConfig::default().validate().is_ok());
        assert!(ProjectionConfig::default().with_support_radius(0.0).validate().is_err());
        assert!(ProjectionConfig::default().with_support_radius(-1.0).validate().is_err());
        assert!(ProjectionConfig::default().with_support_radius(f32::NAN).validate().is_err());
        assert!(ProjectionConfig::default().with_iterations(0).validate().is_err());
        assert!(ProjectionConfig::default().with_num_neighbors(0).validate().is_ok());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("spss".parse::<ProjectionMethod>().unwrap(), ProjectionMethod::Simple);
        assert_eq!("HPSS".parse::<ProjectionMethod>().unwrap(), ProjectionMethod::HermiteLike);
        assert_eq!(
            ProjectionMethod::HermiteLike.to_string().parse::<ProjectionMethod>().unwrap(),
            ProjectionMethod::HermiteLike
        );
        assert!("apss".parse::<ProjectionMethod>().is_err());
    }

    #[test]
    fn test_uniform_weights_give_plain_average() {
        let anchors = [
            Point3f::new(1.0, 2.0, 3.0),
            Point3f::new(-2.0, 0.5, 1.0),
            Point3f::new(0.0, -1.0, 4.0),
        ];
        let normals = [Vector3f::x(), Vector3f::y(), Vector3f::z()];

        for weight in [1.0, 0.25, 7.5] {
            let mut acc = PlaneAccumulator::new();
            for (a, n) in anchors.iter().zip(normals.iter()) {
                acc.add(a, n, weight);
            }
            let plane = acc.finish(0).unwrap();

            assert_relative_eq!(plane.centroid, Point3f::new(-1.0 / 3.0, 0.5, 8.0 / 3.0), epsilon = 1e-5);
            assert_relative_eq!(plane.normal, Vector3f::new(1.0, 1.0, 1.0) / 3.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_weight_sum_is_degenerate() {
        let result = PlaneAccumulator::new().finish(3);
        assert!(matches!(
            result,
            Err(Error::DegenerateWeights { iteration: 3, .. })
        ));
    }

    #[test]
    fn test_infinite_weight_is_divergence() {
        let mut acc = PlaneAccumulator::new();
        acc.add(&Point3f::origin(), &Vector3f::z(), f64::INFINITY);
        assert!(matches!(
            acc.finish(0),
            Err(Error::NumericalDivergence { iteration: 0, .. })
        ));
    }

    #[test]
    fn test_square_projects_to_plane() {
        let cloud = square_cloud();
        let index = KdTree::new(&cloud.positions()).unwrap();
        let config = ProjectionConfig::simple()
            .with_support_radius(10.0)
            .with_num_neighbors(4);
        let projector = MLSProjector::new(&cloud, &index, config).unwrap();

        let result = projector.project(&Point3f::new(0.0, 0.0, 5.0)).unwrap();
        assert_relative_eq!(result.position, Point3f::origin(), epsilon = 1e-5);
        assert_relative_eq!(result.normal, Vector3f::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_early_exit_predicate() {
        let cloud = square_cloud();
        let index = BruteForceSearch::new(&cloud.positions());
        let config = ProjectionConfig::hermite()
            .with_support_radius(10.0)
            .with_num_neighbors(4);
        let projector = MLSProjector::new(&cloud, &index, config).unwrap();

        let mut seen = Vec::new();
        let result = projector
            .project_with(&Point3f::new(0.2, 0.1, 3.0), |state| {
                seen.push(state.iteration);
                state.displacement < 1e-6
            })
            .unwrap();

        // The first iteration lands on the plane, the second does not move
        assert_eq!(seen, vec![0, 1]);
        assert_relative_eq!(result.position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_predicate_never_stopping_runs_all_iterations() {
        let cloud = square_cloud();
        let index = BruteForceSearch::new(&cloud.positions());
        let config = ProjectionConfig::simple()
            .with_support_radius(10.0)
            .with_num_neighbors(4)
            .with_iterations(7);
        let projector = MLSProjector::new(&cloud, &index, config).unwrap();

        let mut count = 0;
        projector
            .project_with(&Point3f::new(0.0, 0.0, 1.0), |_| {
                count += 1;
                false
            })
            .unwrap();
        assert_eq!(count, 7);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let cloud = square_cloud();
        let index = BruteForceSearch::new(&cloud.positions());

        let empty = PointCloud::new();
        let empty_index = BruteForceSearch::new(&[]);
        assert!(MLSProjector::new(&empty, &empty_index, ProjectionConfig::default()).is_err());

        let other_index = BruteForceSearch::new(&[Point3f::origin()]);
        assert!(MLSProjector::new(&cloud, &other_index, ProjectionConfig::default()).is_err());

        let projector = MLSProjector::new(&cloud, &index, ProjectionConfig::default()).unwrap();
        let result = projector.project(&Point3f::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_zero_neighbors_is_degenerate() {
        let cloud = square_cloud();
        let index = BruteForceSearch::new(&cloud.positions());
        let result = simple_projection(Kernel::Gaussian, &Point3f::new(0.0, 0.0, 1.0), &cloud, &index, 1.0, 0, 10);
        assert!(matches!(result, Err(Error::DegenerateWeights { iteration: 0, .. })));
    }
}
