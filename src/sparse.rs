//! Sparse vectors: an explicit dimension plus ascending nonzero entries.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use bytes::{Buf, BufMut};

use crate::dense::Element;
use crate::error::Error;
use crate::input::{Flat, Input, NumericArray, parse_float};
use crate::interchange::{CooMatrix, SparseMatrix};

/// Largest dimension the `i32` binary header can describe.
pub const MAX_SPARSE_DIM: usize = i32::MAX as usize;

/// Binary header: dimension, nonzero count and a reserved field, all `i32`.
const HEADER_LEN: usize = 12;

/// A sparse vector (`sparsevec` column).
///
/// Indices are zero-based, strictly ascending and below the dimension;
/// `values` runs parallel to `indices` and never holds a zero.
#[derive(Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f32>,
}

fn check_dimensions(dim: usize) -> Result<(), Error> {
    if dim > MAX_SPARSE_DIM {
        return Err(Error::Shape(format!(
            "expected at most {MAX_SPARSE_DIM} dimensions, not {dim}"
        )));
    }
    Ok(())
}

impl SparseVector {
    /// Builds a sparse vector from any accepted input.
    ///
    /// Index maps need `dimensions`; dense sequences, arrays and matrices
    /// carry their own and reject it as an extra argument.
    pub fn new(input: impl Into<Input>, dimensions: Option<usize>) -> Result<Self, Error> {
        match input.into() {
            Input::Map(map) => {
                let dim = dimensions.ok_or(Error::MissingDimension)?;
                Self::from_map(map, dim)
            }
            Input::Matrix(matrix) => {
                if dimensions.is_some() {
                    return Err(Error::extra_argument());
                }
                Self::from_matrix(&matrix)
            }
            other => {
                if dimensions.is_some() {
                    return Err(Error::extra_argument());
                }
                let dense = match other.into_flat()? {
                    Flat::Array(array) => array.to_f32_vec(),
                    flat => flat.to_f64s()?.into_iter().map(f32::from_f64).collect(),
                };
                Self::from_dense(&dense)
            }
        }
    }

    /// Builds a sparse vector from a dense one; the dimension is its length.
    pub fn from_dense(dense: &[f32]) -> Result<Self, Error> {
        check_dimensions(dense.len())?;
        let (indices, values) = dense
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v != 0.0)
            .unzip();
        Ok(Self {
            dim: dense.len(),
            indices,
            values,
        })
    }

    /// Builds a sparse vector from `index -> value` entries.
    ///
    /// Zero values are dropped. When an index repeats the last value wins.
    pub fn from_map(
        entries: impl IntoIterator<Item = (usize, f32)>,
        dimensions: usize,
    ) -> Result<Self, Error> {
        check_dimensions(dimensions)?;
        let entries: BTreeMap<usize, f32> = entries.into_iter().collect();
        if let Some((&index, _)) = entries.range(dimensions..).next() {
            return Err(Error::Shape(format!(
                "index {index} out of bounds for {dimensions} dimensions"
            )));
        }
        let (indices, values) = entries.into_iter().filter(|&(_, v)| v != 0.0).unzip();
        Ok(Self {
            dim: dimensions,
            indices,
            values,
        })
    }

    /// Builds a sparse vector from a single-row matrix.
    ///
    /// Repeated coordinates are summed and explicit zeros dropped.
    pub fn from_matrix(matrix: &SparseMatrix) -> Result<Self, Error> {
        let (dim, entries) = matrix.to_coo().single_row()?;
        check_dimensions(dim)?;
        let (indices, values) = entries.into_iter().unzip();
        Ok(Self {
            dim,
            indices,
            values,
        })
    }

    /// Validates wire-supplied entries and drops zero values.
    fn from_wire_parts(dim: usize, indices: Vec<usize>, values: Vec<f32>) -> Result<Self, Error> {
        if dim > MAX_SPARSE_DIM {
            return Err(Error::Format(format!(
                "expected at most {MAX_SPARSE_DIM} dimensions, not {dim}"
            )));
        }
        if let Some(pair) = indices.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::Format(format!(
                "indices must be strictly ascending, found {} after {}",
                pair[1] + 1,
                pair[0] + 1
            )));
        }
        if let Some(&index) = indices.last().filter(|&&i| i >= dim) {
            return Err(Error::Format(format!(
                "index {} out of bounds for {dim} dimensions",
                index + 1
            )));
        }
        let (indices, values) = indices
            .into_iter()
            .zip(values)
            .filter(|&(_, v)| v != 0.0)
            .unzip();
        Ok(Self {
            dim,
            indices,
            values,
        })
    }

    /// Parses the text form `{i:v,...}/dim` with one-based indices.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let (body, dim) = text
            .rsplit_once('/')
            .ok_or_else(|| Error::Format(format!("expected '{{...}}/dimensions', got {text:?}")))?;
        let dim: usize = dim
            .trim()
            .parse()
            .map_err(|e| Error::Format(format!("invalid dimensions {dim:?}: {e}")))?;
        let inner = body
            .strip_prefix('{')
            .and_then(|b| b.strip_suffix('}'))
            .ok_or_else(|| Error::Format(format!("expected '{{...}}/dimensions', got {text:?}")))?;

        let mut indices = Vec::new();
        let mut values = Vec::new();
        if !inner.is_empty() {
            for entry in inner.split(',') {
                let (index, value) = entry
                    .split_once(':')
                    .ok_or_else(|| Error::Format(format!("expected 'index:value', got {entry:?}")))?;
                let index: usize = index
                    .trim()
                    .parse()
                    .map_err(|e| Error::Format(format!("invalid index {index:?}: {e}")))?;
                let index = index
                    .checked_sub(1)
                    .ok_or_else(|| Error::Format("indices start at 1".to_string()))?;
                let value = f32::from_f64(parse_float(value)?);
                indices.push(index);
                values.push(value);
            }
        }
        Self::from_wire_parts(dim, indices, values)
    }

    /// Parses the binary form: `i32` dimension, `i32` count, reserved `i32`,
    /// then the indices and the values.
    pub fn from_binary(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::Format(format!(
                "expected at least {HEADER_LEN} bytes, got {}",
                data.len()
            )));
        }
        let mut buf = data;
        let dim = buf.get_i32();
        let nnz = buf.get_i32();
        let _reserved = buf.get_i32();

        let dim = usize::try_from(dim)
            .map_err(|_| Error::Format(format!("negative dimensions {dim}")))?;
        let nnz = usize::try_from(nnz)
            .map_err(|_| Error::Format(format!("negative nonzero count {nnz}")))?;
        if nnz.checked_mul(8) != Some(buf.remaining()) {
            return Err(Error::Format(format!(
                "expected {} bytes for {nnz} entries, got {}",
                nnz.saturating_mul(8).saturating_add(HEADER_LEN),
                data.len()
            )));
        }

        let indices = (0..nnz)
            .map(|_| {
                let index = buf.get_i32();
                usize::try_from(index).map_err(|_| Error::Format(format!("negative index {index}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let values = (0..nnz).map(|_| buf.get_f32()).collect();
        Self::from_wire_parts(dim, indices, values)
    }

    /// Total dimension, zeros included.
    pub fn dimensions(&self) -> usize {
        self.dim
    }

    /// Number of stored nonzero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Zero-based indices of the nonzero entries, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Nonzero values, parallel to [`indices`](Self::indices).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Iterates over `(index, value)` pairs in ascending index order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dense reconstruction.
    pub fn to_list(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dim];
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }

    /// Dense reconstruction as a big-endian `f32` array.
    pub fn to_array(&self) -> NumericArray {
        NumericArray::from_f32s(&self.to_list())
    }

    /// Single-row coordinate matrix of shape `(1, dimensions)`.
    pub fn to_coo(&self) -> CooMatrix {
        CooMatrix::from_parts_unchecked(
            (1, self.dim),
            vec![0; self.nnz()],
            self.indices.clone(),
            self.values.clone(),
        )
    }

    /// Renders the text form `{i:v,...}/dim` with one-based indices.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(8 + self.nnz() * 12);
        text.push('{');
        for (i, (index, value)) in self.iter().enumerate() {
            if i > 0 {
                text.push(',');
            }
            let _ = write!(text, "{}:{value:?}", index + 1);
        }
        let _ = write!(text, "}}/{}", self.dim);
        text
    }

    /// Renders the binary form.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.nnz() * 8);
        // dim <= MAX_SPARSE_DIM and every index is below dim
        out.put_i32(self.dim as i32);
        out.put_i32(self.nnz() as i32);
        out.put_i32(0);
        for &index in &self.indices {
            out.put_i32(index as i32);
        }
        for &value in &self.values {
            out.put_f32(value);
        }
        out
    }
}

impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SparseVector({")?;
        for (i, (index, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}: {value:?}")?;
        }
        write!(f, "}}, {})", self.dim)
    }
}

impl fmt::Debug for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for SparseVector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}
