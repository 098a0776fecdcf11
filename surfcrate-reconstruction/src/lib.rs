//! # SurfCrate Reconstruction
//!
//! Moving-least-squares surface projection for oriented point clouds.
//!
//! Query points are projected onto the implicit surface defined by a noisy
//! reference cloud with either the simple (SPSS) or the Hermite-like (HPSS)
//! operator. The reference cloud and its spatial index are only ever borrowed
//! immutably, so a caller may share them between threads and project points
//! concurrently; the crate itself runs everything on the calling thread.
//!
//! ```rust
//! use surfcrate_algorithms::KdTree;
//! use surfcrate_core::{Point3f, PointCloud, Vector3f};
//! use surfcrate_reconstruction::{Kernel, MLSProjector, ProjectionConfig};
//!
//! let positions = vec![
//!     Point3f::new(1.0, 1.0, 0.0),
//!     Point3f::new(-1.0, 1.0, 0.0),
//!     Point3f::new(1.0, -1.0, 0.0),
//!     Point3f::new(-1.0, -1.0, 0.0),
//! ];
//! let cloud = PointCloud::from_positions_and_normals(positions, vec![Vector3f::z(); 4])?;
//! let index = KdTree::new(&cloud.positions())?;
//!
//! let config = ProjectionConfig::simple()
//!     .with_kernel(Kernel::Wendland)
//!     .with_support_radius(10.0)
//!     .with_num_neighbors(4);
//! let projector = MLSProjector::new(&cloud, &index, config)?;
//! let projected = projector.project(&Point3f::new(0.0, 0.0, 5.0))?;
//! assert!(projected.position.z.abs() < 1e-5);
//! # Ok::<(), surfcrate_core::Error>(())
//! ```

pub mod kernel;
pub mod plane;
pub mod moving_least_squares;

// Re-export commonly used items
pub use kernel::*;
pub use plane::*;
pub use moving_least_squares::*;
