//! NumPy `.npy` encoding and `.npz` archives.
//!
//! Only what parcel exports need: one-dimensional, little-endian `<i4` and
//! `<f4` arrays in format version 1.0, stored uncompressed as `np.savez` does.

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use num_traits::AsPrimitive;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use super::{Column, FrameError};

const MAGIC: &[u8] = b"\x93NUMPY";

/// Header blocks are padded so the array data starts on this boundary.
const ALIGNMENT: usize = 64;

/// Fixed bytes before the header dict: magic, version, and header length.
const PREAMBLE_LEN: usize = 10;

/// A scalar type that can be stored in an `.npy` array.
trait NpyElement: Copy {
    const DESCR: &'static str;
    fn extend_le(self, buf: &mut Vec<u8>);
}

impl NpyElement for i32 {
    const DESCR: &'static str = "<i4";
    fn extend_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl NpyElement for f32 {
    const DESCR: &'static str = "<f4";
    fn extend_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

/// Encodes a one-dimensional array as a complete `.npy` file.
fn encode<T: NpyElement>(values: &[T]) -> io::Result<Vec<u8>> {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({},), }}",
        T::DESCR,
        values.len()
    );
    let unpadded = PREAMBLE_LEN + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let header_len = u16::try_from(header.len()).map_err(io::Error::other)?;

    let mut buf = Vec::with_capacity(PREAMBLE_LEN + header.len() + values.len() * 4);
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&[1, 0]);
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(header.as_bytes());
    for &value in values {
        value.extend_le(&mut buf);
    }
    Ok(buf)
}

/// Writes one column to `<outdir>/<name>.npz` and returns the archive path.
///
/// Missing (`NaN`) values are dropped and the remaining entries are sorted by
/// value. The archive holds two arrays: `parcel_id` (the index as `<i4`) and
/// `values` (the column as `<f4`). An empty `name` writes `tmp.npz`.
///
/// # Errors
///
/// Returns [`FrameError::NotNumeric`] for a text column, or
/// [`FrameError::Write`] if the archive cannot be written.
pub fn write_npz(
    index: &[i64],
    column: &Column,
    name: &str,
    outdir: &Path,
) -> Result<PathBuf, FrameError> {
    let values = column.to_f64().ok_or_else(|| FrameError::NotNumeric {
        name: name.to_owned(),
    })?;

    let mut pairs: Vec<(i64, f64)> = index
        .iter()
        .copied()
        .zip(values)
        .filter(|(_, v)| !v.is_nan())
        .collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));

    let ids: Vec<i32> = pairs.iter().map(|&(id, _)| id.as_()).collect();
    let values: Vec<f32> = pairs.iter().map(|&(_, v)| v.as_()).collect();

    let stem = if name.is_empty() { "tmp" } else { name };
    let path = outdir.join(format!("{stem}.npz"));

    write_archive(&path, &ids, &values).map_err(|source| FrameError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), len = ids.len(), "wrote npz archive");
    Ok(path)
}

fn write_archive(path: &Path, ids: &[i32], values: &[f32]) -> io::Result<()> {
    let entries = [("parcel_id.npy", encode(ids)?), ("values.npy", encode(values)?)];

    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, bytes) in entries {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }
    zip.finish()?;
    Ok(())
}
