//! Error types for surfcrate

use thiserror::Error;

/// Main error type for surfcrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    /// The kernel weights of an iteration summed to zero, so no local plane exists
    #[error("Degenerate weight sum {weight_sum} at iteration {iteration}")]
    DegenerateWeights { iteration: usize, weight_sum: f64 },

    /// A weight, centroid or normal overflowed to a non-finite value
    #[error("Numerical divergence at iteration {iteration}: {reason}")]
    NumericalDivergence { iteration: usize, reason: String },
}

/// Result type alias for surfcrate operations
pub type Result<T> = std::result::Result<T, Error>;
