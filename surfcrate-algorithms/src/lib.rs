//! # SurfCrate Algorithms
//!
//! Spatial indexing and point cloud utilities for surfcrate.
//!
//! This crate provides the nearest neighbor indices consumed by the projection
//! engine and the helpers used to prepare reference clouds and query sets.

pub mod nearest_neighbor;
pub mod point_cloud_ops;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use point_cloud_ops::*;
