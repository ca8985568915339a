//! A minimal column store for parcel-level model data.
//!
//! [`Frame`] holds named, equal-length [`Column`]s keyed by an `i64` index
//! (typically parcel or building ids). It exists to shrink data before it is
//! stored or shipped:
//!
//! - [`Frame::compact`] narrows 64-bit columns to 32 bits,
//! - [`Frame::write_npz_dir`] writes each column as a NumPy `.npz` archive.

mod npy;

use std::path::{Path, PathBuf};

use num_traits::AsPrimitive;
use thiserror::Error;

pub use npy::write_npz;

/// Errors produced by [`Frame`] construction and export.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A column's length differs from the index length.
    #[error("column `{name}` has {len} values but the index has {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    /// A matrix row has a different width than the first row.
    #[error("matrix row {row} has {len} values, expected {expected}")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// The column holds values that cannot be exported as numbers.
    #[error("column `{name}` is not numeric")]
    NotNumeric { name: String },

    /// An archive could not be written.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int64(Vec<i64>),
    Int32(Vec<i32>),
    Text(Vec<String>),
}

impl Column {
    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Float64(v) => v.len(),
            Column::Float32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Narrows 64-bit columns to 32 bits, leaving other columns unchanged.
    ///
    /// Floats are rounded to the nearest `f32`. Integers outside the `i32`
    /// range wrap, matching a NumPy `astype` cast.
    #[must_use]
    pub fn compact(self) -> Self {
        match self {
            Column::Float64(v) => Column::Float32(narrow(&v)),
            Column::Int64(v) => Column::Int32(narrow(&v)),
            other => other,
        }
    }

    /// Returns the values as `f64`, or `None` for text columns.
    #[must_use]
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float64(v) => Some(v.clone()),
            Column::Float32(v) => Some(widen(v)),
            Column::Int64(v) => Some(widen(v)),
            Column::Int32(v) => Some(widen(v)),
            Column::Text(_) => None,
        }
    }
}

fn narrow<T, U>(values: &[T]) -> Vec<U>
where
    T: AsPrimitive<U>,
    U: Copy + 'static,
{
    values.iter().map(|&v| v.as_()).collect()
}

fn widen<T: AsPrimitive<f64>>(values: &[T]) -> Vec<f64> {
    values.iter().map(|&v| v.as_()).collect()
}

/// Named columns sharing one index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    index: Vec<i64>,
    columns: Vec<(String, Column)>,
}

impl Frame {
    /// Creates an empty frame over `index`.
    #[must_use]
    pub fn new(index: Vec<i64>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    /// Builds a frame from row-major data, naming the columns `x0`, `x1`, ….
    ///
    /// The index is the row position.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::RaggedMatrix`] if the rows differ in width.
    pub fn from_matrix<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, FrameError> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.as_ref().len() != width)
        {
            return Err(FrameError::RaggedMatrix {
                row,
                len: r.as_ref().len(),
                expected: width,
            });
        }

        let index = (0..rows.len()).map(|i| i as i64).collect();
        let mut frame = Self::new(index);
        for j in 0..width {
            let values = rows.iter().map(|r| r.as_ref()[j]).collect();
            frame.columns.push((format!("x{j}"), Column::Float64(values)));
        }
        Ok(frame)
    }

    /// Appends or replaces a column.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::LengthMismatch`] if the column length differs from
    /// the index length.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), FrameError> {
        let name = name.into();
        if column.len() != self.index.len() {
            return Err(FrameError::LengthMismatch {
                name,
                len: column.len(),
                expected: self.index.len(),
            });
        }

        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    #[must_use]
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Iterates over `(name, column)` pairs in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Narrows every column with [`Column::compact`], keeping the index.
    #[must_use]
    pub fn compact(self) -> Self {
        Self {
            index: self.index,
            columns: self
                .columns
                .into_iter()
                .map(|(name, column)| (name, column.compact()))
                .collect(),
        }
    }

    /// Writes every column to `<outdir>/<column>.npz` with [`write_npz`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NotNumeric`] for a text column, or
    /// [`FrameError::Write`] if an archive cannot be written. Columns before
    /// the failing one have already been written.
    pub fn write_npz_dir(&self, outdir: &Path) -> Result<Vec<PathBuf>, FrameError> {
        self.columns
            .iter()
            .map(|(name, column)| write_npz(&self.index, column, name, outdir))
            .collect()
    }
}
