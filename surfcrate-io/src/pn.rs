//! PN format support
//!
//! A PN file is a headerless sequence of records, one per point, each made of
//! six little-endian `f32` values: `px py pz nx ny nz`.

use crate::{PointCloudReader, PointCloudWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use surfcrate_core::{NormalPoint3f, PointCloud, Result};
use tracing::{debug, warn};

/// Number of `f32` values per point record
pub const FLOATS_PER_RECORD: usize = 6;

/// Size in bytes of one point record
pub const RECORD_SIZE: usize = FLOATS_PER_RECORD * std::mem::size_of::<f32>();

pub struct PnReader;
pub struct PnWriter;

impl PointCloudReader for PnReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<NormalPoint3f>> {
        read_pn(path)
    }
}

impl PointCloudWriter for PnWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &PointCloud<NormalPoint3f>, path: P) -> Result<()> {
        write_pn(path, cloud)
    }
}

/// Read a PN file from disk
pub fn read_pn<P: AsRef<Path>>(path: P) -> Result<PointCloud<NormalPoint3f>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let cloud = read_pn_from(BufReader::new(file))?;
    debug!(path = %path.display(), points = cloud.len(), "read PN point set");
    Ok(cloud)
}

/// Read PN records from any reader.
///
/// A trailing partial record is dropped with a warning.
pub fn read_pn_from<R: Read>(mut reader: R) -> Result<PointCloud<NormalPoint3f>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let records = bytes.chunks_exact(RECORD_SIZE);
    let leftover = records.remainder().len();
    if leftover != 0 {
        warn!(bytes = leftover, "ignoring truncated PN record at end of input");
    }

    Ok(records.map(decode_record).collect())
}

/// Write a PN file to disk
pub fn write_pn<P: AsRef<Path>>(path: P, cloud: &PointCloud<NormalPoint3f>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_pn_to(&mut writer, cloud)?;
    writer.flush()?;
    debug!(path = %path.display(), points = cloud.len(), "wrote PN point set");
    Ok(())
}

/// Write PN records to any writer
pub fn write_pn_to<W: Write>(writer: &mut W, cloud: &PointCloud<NormalPoint3f>) -> Result<()> {
    for point in cloud {
        writer.write_all(&encode_record(point))?;
    }
    Ok(())
}

/// Records are stored little-endian regardless of the host byte order
fn decode_record(record: &[u8]) -> NormalPoint3f {
    let raw: [u32; FLOATS_PER_RECORD] = bytemuck::pod_read_unaligned(record);
    bytemuck::cast(raw.map(|bits| f32::from_bits(u32::from_le(bits))))
}

fn encode_record(point: &NormalPoint3f) -> [u8; RECORD_SIZE] {
    let values: [f32; FLOATS_PER_RECORD] = bytemuck::cast(*point);
    bytemuck::cast(values.map(|v| v.to_bits().to_le()))
}
