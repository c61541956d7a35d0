//! Minimal sparse-matrix interchange structures.
//!
//! Sparse vectors accept single-row matrices in coordinate (COO), compressed
//! row (CSR) and dictionary-of-keys (DOK) layout, and export COO. Only the
//! row/column/value/shape contract is modelled; a one-dimensional COO array
//! of length `n` is represented with shape `(1, n)`.

use std::collections::BTreeMap;

use crate::error::Error;

/// Coordinate-format sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix {
    shape: (usize, usize),
    row: Vec<usize>,
    col: Vec<usize>,
    data: Vec<f32>,
}

impl CooMatrix {
    /// Creates a matrix from parallel coordinate and value arrays.
    ///
    /// Coordinates may repeat; repeated entries are summed when the matrix is
    /// densified or converted.
    pub fn new(
        shape: (usize, usize),
        row: Vec<usize>,
        col: Vec<usize>,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        if row.len() != col.len() || row.len() != data.len() {
            return Err(Error::Shape(format!(
                "row, col and data lengths differ: {}, {}, {}",
                row.len(),
                col.len(),
                data.len()
            )));
        }
        check_coordinates(shape, row.iter().copied().zip(col.iter().copied()))?;
        Ok(Self {
            shape,
            row,
            col,
            data,
        })
    }

    /// Single-row matrix holding the nonzero entries of `values`.
    pub fn from_row(values: &[f32]) -> Self {
        let (col, data): (Vec<usize>, Vec<f32>) = values
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v != 0.0)
            .unzip();
        Self {
            shape: (1, values.len()),
            row: vec![0; col.len()],
            col,
            data,
        }
    }

    pub(crate) fn from_parts_unchecked(
        shape: (usize, usize),
        row: Vec<usize>,
        col: Vec<usize>,
        data: Vec<f32>,
    ) -> Self {
        Self {
            shape,
            row,
            col,
            data,
        }
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Row coordinate of each stored entry.
    pub fn row(&self) -> &[usize] {
        &self.row
    }

    /// Column coordinate of each stored entry.
    pub fn col(&self) -> &[usize] {
        &self.col
    }

    /// Value of each stored entry.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of stored entries, explicit zeros and duplicates included.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Dense row-major copy of the matrix.
    pub fn to_dense(&self) -> Vec<Vec<f32>> {
        let mut dense = vec![vec![0.0; self.shape.1]; self.shape.0];
        for ((&r, &c), &v) in self.row.iter().zip(&self.col).zip(&self.data) {
            dense[r][c] += v;
        }
        dense
    }

    fn entries(&self) -> impl Iterator<Item = ((usize, usize), f32)> + '_ {
        self.row
            .iter()
            .copied()
            .zip(self.col.iter().copied())
            .zip(self.data.iter().copied())
    }

    /// Column width and the summed, nonzero, column-sorted entries of a
    /// single-row matrix.
    pub(crate) fn single_row(&self) -> Result<(usize, Vec<(usize, f32)>), Error> {
        if self.shape.0 != 1 {
            return Err(Error::ndim());
        }
        let mut summed: BTreeMap<usize, f32> = BTreeMap::new();
        for ((_, c), v) in self.entries() {
            *summed.entry(c).or_insert(0.0) += v;
        }
        let entries = summed.into_iter().filter(|&(_, v)| v != 0.0).collect();
        Ok((self.shape.1, entries))
    }
}

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    shape: (usize, usize),
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f32>,
}

impl CsrMatrix {
    /// Creates a matrix from its row pointer, column index and value arrays.
    pub fn new(
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f32>,
    ) -> Result<Self, Error> {
        if indptr.len() != shape.0 + 1 {
            return Err(Error::Shape(format!(
                "expected {} row pointers, got {}",
                shape.0 + 1,
                indptr.len()
            )));
        }
        if indptr.first() != Some(&0)
            || indptr.windows(2).any(|w| w[0] > w[1])
            || indptr.last() != Some(&indices.len())
        {
            return Err(Error::Shape("row pointers are not monotonic".to_string()));
        }
        if indices.len() != data.len() {
            return Err(Error::Shape(format!(
                "indices and data lengths differ: {}, {}",
                indices.len(),
                data.len()
            )));
        }
        if let Some(&col) = indices.iter().find(|&&c| c >= shape.1) {
            return Err(Error::Shape(format!(
                "column {col} out of bounds for {} columns",
                shape.1
            )));
        }
        Ok(Self {
            shape,
            indptr,
            indices,
            data,
        })
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Converts to coordinate format.
    pub fn to_coo(&self) -> CooMatrix {
        let row = self
            .indptr
            .windows(2)
            .enumerate()
            .flat_map(|(r, w)| std::iter::repeat_n(r, w[1] - w[0]))
            .collect();
        CooMatrix::from_parts_unchecked(self.shape, row, self.indices.clone(), self.data.clone())
    }
}

/// Dictionary-of-keys sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DokMatrix {
    shape: (usize, usize),
    entries: BTreeMap<(usize, usize), f32>,
}

impl DokMatrix {
    /// Creates a matrix from `(row, column) -> value` entries.
    pub fn new(
        shape: (usize, usize),
        entries: impl IntoIterator<Item = ((usize, usize), f32)>,
    ) -> Result<Self, Error> {
        let entries: BTreeMap<(usize, usize), f32> = entries.into_iter().collect();
        check_coordinates(shape, entries.keys().copied())?;
        Ok(Self { shape, entries })
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Converts to coordinate format, entries in row-major order.
    pub fn to_coo(&self) -> CooMatrix {
        let mut row = Vec::with_capacity(self.entries.len());
        let mut col = Vec::with_capacity(self.entries.len());
        let mut data = Vec::with_capacity(self.entries.len());
        for (&(r, c), &v) in &self.entries {
            row.push(r);
            col.push(c);
            data.push(v);
        }
        CooMatrix::from_parts_unchecked(self.shape, row, col, data)
    }
}

/// Any supported sparse matrix layout.
#[derive(Debug, Clone, PartialEq)]
pub enum SparseMatrix {
    /// Coordinate format.
    Coo(CooMatrix),
    /// Compressed sparse row format.
    Csr(CsrMatrix),
    /// Dictionary of keys.
    Dok(DokMatrix),
}

impl SparseMatrix {
    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            SparseMatrix::Coo(m) => m.shape(),
            SparseMatrix::Csr(m) => m.shape(),
            SparseMatrix::Dok(m) => m.shape(),
        }
    }

    /// Converts to coordinate format.
    pub fn to_coo(&self) -> CooMatrix {
        match self {
            SparseMatrix::Coo(m) => m.clone(),
            SparseMatrix::Csr(m) => m.to_coo(),
            SparseMatrix::Dok(m) => m.to_coo(),
        }
    }
}

impl From<CooMatrix> for SparseMatrix {
    fn from(matrix: CooMatrix) -> Self {
        SparseMatrix::Coo(matrix)
    }
}

impl From<CsrMatrix> for SparseMatrix {
    fn from(matrix: CsrMatrix) -> Self {
        SparseMatrix::Csr(matrix)
    }
}

impl From<DokMatrix> for SparseMatrix {
    fn from(matrix: DokMatrix) -> Self {
        SparseMatrix::Dok(matrix)
    }
}

fn check_coordinates(
    shape: (usize, usize),
    mut coordinates: impl Iterator<Item = (usize, usize)>,
) -> Result<(), Error> {
    match coordinates.find(|&(r, c)| r >= shape.0 || c >= shape.1) {
        Some((r, c)) => Err(Error::Shape(format!(
            "coordinate ({r}, {c}) out of bounds for shape {shape:?}"
        ))),
        None => Ok(()),
    }
}
