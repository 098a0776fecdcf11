//! Distance-weighted kernels for MLS projection
//!
//! A kernel maps the distance between the current estimate and a neighbor to
//! the influence of that neighbor in the local plane fit. None of the kernels
//! guard their inputs: `radius <= 0` yields NaN or infinite weights, and the
//! singular kernel diverges as the distance goes to zero.
//!
//! Weights are evaluated in `f64` so that the Gaussian tail stays representable
//! well past the point where `f32` underflows to zero.

use serde::{Deserialize, Serialize};
use surfcrate_core::Point3f;

/// Exponent of the singular kernel
pub const SINGULAR_EXPONENT: f64 = 0.6;

/// Weighting function used to blend neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kernel {
    /// Singular weight: (h/d)^0.6, infinite at d = 0
    Singular,
    /// Gaussian weight: exp(-d²/h²)
    Gaussian,
    /// Wendland weight: (1-d/h)⁴ * (1 + 4d/h), not clamped beyond h
    Wendland,
}

/// Kernel evaluated on `(distance, radius)`
pub type WeightFn = fn(f64, f64) -> f64;

impl Kernel {
    /// Resolve the weighting function once so hot loops do not branch per neighbor
    pub fn weight_fn(self) -> WeightFn {
        match self {
            Kernel::Singular => singular_weight,
            Kernel::Gaussian => gaussian_weight,
            Kernel::Wendland => wendland_weight,
        }
    }

    /// Weight of `neighbor` as seen from `query`
    pub fn weight(self, query: &Point3f, neighbor: &Point3f, radius: f64) -> f64 {
        self.weight_at_distance(distance(query, neighbor), radius)
    }

    /// Weight for a neighbor at Euclidean distance `distance`
    pub fn weight_at_distance(self, distance: f64, radius: f64) -> f64 {
        (self.weight_fn())(distance, radius)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::Gaussian
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kernel::Singular => "singular",
            Kernel::Gaussian => "gaussian",
            Kernel::Wendland => "wendland",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "singular" => Ok(Kernel::Singular),
            "gaussian" => Ok(Kernel::Gaussian),
            "wendland" => Ok(Kernel::Wendland),
            other => Err(format!("unknown kernel '{}'", other)),
        }
    }
}

/// Euclidean distance between two points, evaluated in `f64`
pub fn distance(a: &Point3f, b: &Point3f) -> f64 {
    (a.coords.cast::<f64>() - b.coords.cast::<f64>()).norm()
}

/// `(radius / d)^0.6`
pub fn singular_weight(distance: f64, radius: f64) -> f64 {
    (radius / distance).powf(SINGULAR_EXPONENT)
}

/// `exp(-d² / radius²)`
pub fn gaussian_weight(distance: f64, radius: f64) -> f64 {
    (-(distance * distance) / (radius * radius)).exp()
}

/// `(1 - d/radius)^4 * (1 + 4 d/radius)`
///
/// The value is not clamped to zero for `d >= radius`: past the support the
/// polynomial rises again.
pub fn wendland_weight(distance: f64, radius: f64) -> f64 {
    let r = distance / radius;
    (1.0 - r).powi(4) * (1.0 + 4.0 * r)
}
