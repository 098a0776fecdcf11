//! I/O operations for oriented point clouds
//!
//! This crate reads and writes the point sets consumed by the projection
//! engine. The only format is PN, a headerless binary array of position and
//! normal records.

pub mod pn;

pub use pn::{read_pn, read_pn_from, write_pn, write_pn_to, PnReader, PnWriter};

use surfcrate_core::{Error, NormalPoint3f, PointCloud, Result};

/// Trait for reading oriented point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<PointCloud<NormalPoint3f>>;
}

/// Trait for writing oriented point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<std::path::Path>>(
        cloud: &PointCloud<NormalPoint3f>,
        path: P,
    ) -> Result<()>;
}

/// Auto-detect format and read point cloud
pub fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<PointCloud<NormalPoint3f>> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("pn") => PnReader::read_point_cloud(path),
        _ => Err(Error::InvalidData(format!(
            "Unsupported point cloud format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write point cloud
pub fn write_point_cloud<P: AsRef<std::path::Path>>(
    cloud: &PointCloud<NormalPoint3f>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("pn") => PnWriter::write_point_cloud(cloud, path),
        _ => Err(Error::InvalidData(format!(
            "Unsupported point cloud format: {:?}",
            path.extension()
        ))),
    }
}
