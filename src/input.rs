//! Accepted input shapes and the numeric buffer normalizer.
//!
//! Every value kind accepts an [`Input`], a closed union of the shapes a
//! caller may hand over: flat sequences of [`Scalar`]s, native
//! [`NumericArray`] buffers, digit strings, raw bytes, index maps and sparse
//! matrices. Each kind's `new` classifies the input once and forwards to the
//! constructor for that concrete shape.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::interchange::{CooMatrix, CsrMatrix, DokMatrix, SparseMatrix};

/// A single element of a sequence input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// An absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string, parsed when a number is needed.
    Str(String),
}

impl Scalar {
    /// Converts the element to a float.
    ///
    /// Booleans map to `0.0` and `1.0`, strings are trimmed and parsed.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Result<f64, Error> {
        match self {
            Scalar::Null => Err(Error::Conversion(
                "could not convert null to float".to_string(),
            )),
            Scalar::Bool(value) => Ok(f64::from(u8::from(*value))),
            Scalar::Int(value) => Ok(*value as f64),
            Scalar::Float(value) => Ok(*value),
            Scalar::Str(value) => parse_float(value),
        }
    }

    /// Truthiness of the element: null is false, numbers are true when
    /// nonzero, strings are true when non-empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(value) => *value,
            Scalar::Int(value) => *value != 0,
            Scalar::Float(value) => *value != 0.0,
            Scalar::Str(value) => !value.is_empty(),
        }
    }

    /// Returns `true` for the `Bool` variant.
    pub fn is_bool(&self) -> bool {
        matches!(self, Scalar::Bool(_))
    }
}

/// Parses one numeric field, keeping the parser's own failure message.
pub(crate) fn parse_float(field: &str) -> Result<f64, Error> {
    field.trim().parse::<f64>().map_err(|e| {
        Error::Conversion(format!("could not convert string to float: '{field}': {e}"))
    })
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(f64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// Byte order of a multi-byte [`DType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Most significant byte first (network order).
    Big,
    /// Least significant byte first.
    Little,
}

/// Element type of a [`NumericArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// One byte per element, nonzero is `true`.
    Bool,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16(ByteOrder),
    /// Signed 32-bit integer.
    I32(ByteOrder),
    /// Signed 64-bit integer.
    I64(ByteOrder),
    /// IEEE 754 half precision float.
    F16(ByteOrder),
    /// IEEE 754 single precision float.
    F32(ByteOrder),
    /// IEEE 754 double precision float.
    F64(ByteOrder),
}

macro_rules! read_element {
    ($ty:ty, $order:expr, $raw:expr) => {{
        let mut buf = [0u8; std::mem::size_of::<$ty>()];
        buf.copy_from_slice($raw);
        match $order {
            ByteOrder::Big => <$ty>::from_be_bytes(buf),
            ByteOrder::Little => <$ty>::from_le_bytes(buf),
        }
    }};
}

impl DType {
    /// Bytes per element.
    pub fn width(self) -> usize {
        match self {
            DType::Bool | DType::U8 => 1,
            DType::U16(_) | DType::F16(_) => 2,
            DType::I32(_) | DType::F32(_) => 4,
            DType::I64(_) | DType::F64(_) => 8,
        }
    }

    /// Decodes one element. `raw` is exactly `width()` bytes.
    #[allow(clippy::cast_precision_loss)]
    fn decode(self, raw: &[u8]) -> f64 {
        match self {
            DType::Bool | DType::U8 => f64::from(raw[0]),
            DType::U16(order) => f64::from(read_element!(u16, order, raw)),
            DType::I32(order) => f64::from(read_element!(i32, order, raw)),
            DType::I64(order) => read_element!(i64, order, raw) as f64,
            DType::F16(order) => read_element!(f16, order, raw).to_f64(),
            DType::F32(order) => f64::from(read_element!(f32, order, raw)),
            DType::F64(order) => read_element!(f64, order, raw),
        }
    }
}

/// A native numeric buffer with an element type and a shape.
///
/// The bytes live in a reference-counted [`Bytes`] buffer. Cloning an array,
/// or adopting it as a vector's storage, shares that buffer instead of
/// copying it. Shared buffers are never written to.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    dtype: DType,
    shape: Vec<usize>,
    data: Bytes,
}

impl NumericArray {
    /// Creates an array, checking that `data` holds exactly the elements the
    /// shape calls for. An empty shape is a single scalar.
    pub fn new(dtype: DType, shape: Vec<usize>, data: impl Into<Bytes>) -> Result<Self, Error> {
        let data = data.into();
        let count = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .and_then(|n| n.checked_mul(dtype.width()));
        if count != Some(data.len()) {
            return Err(Error::Shape(format!(
                "buffer of {} bytes does not match shape {shape:?} of {dtype:?}",
                data.len()
            )));
        }
        Ok(Self { dtype, shape, data })
    }

    /// Creates a one-dimensional array over `data`.
    pub fn vector(dtype: DType, data: impl Into<Bytes>) -> Result<Self, Error> {
        let data = data.into();
        if data.len() % dtype.width() != 0 {
            return Err(Error::Shape(format!(
                "buffer of {} bytes is not a whole number of {dtype:?} elements",
                data.len()
            )));
        }
        let len = data.len() / dtype.width();
        Ok(Self::from_raw(dtype, vec![len], data))
    }

    pub(crate) fn from_raw(dtype: DType, shape: Vec<usize>, data: Bytes) -> Self {
        Self { dtype, shape, data }
    }

    /// Big-endian `f32` array holding `values`.
    pub fn from_f32s(values: &[f32]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::from_raw(DType::F32(ByteOrder::Big), vec![values.len()], data.into())
    }

    /// Big-endian `f16` array holding `values`.
    pub fn from_f16s(values: &[f16]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::from_raw(DType::F16(ByteOrder::Big), vec![values.len()], data.into())
    }

    /// Big-endian `f64` array holding `values`.
    pub fn from_f64s(values: &[f64]) -> Self {
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        Self::from_raw(DType::F64(ByteOrder::Big), vec![values.len()], data.into())
    }

    /// Boolean array holding `values`.
    pub fn from_bools(values: &[bool]) -> Self {
        let data: Vec<u8> = values.iter().map(|&v| u8::from(v)).collect();
        Self::from_raw(DType::Bool, vec![values.len()], data.into())
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Extent of each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len() / self.dtype.width()
    }

    /// Returns `true` if the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw element bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Returns `true` if both arrays view the same memory.
    pub fn shares_buffer(&self, other: &NumericArray) -> bool {
        self.data.as_ptr() == other.data.as_ptr() && self.data.len() == other.data.len()
    }

    /// Iterates over the elements widened to `f64`, in memory order.
    pub fn iter_f64(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        let dtype = self.dtype;
        self.data
            .chunks_exact(dtype.width())
            .map(move |raw| dtype.decode(raw))
    }

    /// Copies the elements out as `f32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.iter_f64().map(|v| v as f32).collect()
    }
}

/// Every input shape accepted by the value constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A bare scalar (rank 0).
    Scalar(Scalar),
    /// An ordered sequence; rank 1 when every item is a scalar.
    Seq(Vec<Input>),
    /// A native numeric buffer.
    Array(NumericArray),
    /// A digit string.
    Text(String),
    /// A raw byte buffer.
    Bytes(Bytes),
    /// Index to value mapping for sparse vectors.
    Map(BTreeMap<usize, f32>),
    /// A single-row sparse matrix.
    Matrix(SparseMatrix),
}

/// Rank-1 content pulled out of an [`Input`].
pub(crate) enum Flat {
    Scalars(Vec<Scalar>),
    Array(NumericArray),
}

impl Input {
    /// Classifies a rank-1 input; every other shape fails the rank check.
    pub(crate) fn into_flat(self) -> Result<Flat, Error> {
        match self {
            Input::Seq(items) => items
                .into_iter()
                .map(|item| match item {
                    Input::Scalar(scalar) => Ok(scalar),
                    _ => Err(Error::ndim()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Flat::Scalars),
            Input::Array(array) if array.ndim() == 1 => Ok(Flat::Array(array)),
            _ => Err(Error::ndim()),
        }
    }
}

impl Flat {
    /// Converts every element to `f64`, failing on the first bad element.
    pub(crate) fn to_f64s(&self) -> Result<Vec<f64>, Error> {
        match self {
            Flat::Scalars(scalars) => scalars.iter().map(Scalar::to_f64).collect(),
            Flat::Array(array) => Ok(array.iter_f64().collect()),
        }
    }
}

macro_rules! impl_from_sequence {
    ($($ty:ty),*) => {
        $(
            impl From<Vec<$ty>> for Input {
                fn from(values: Vec<$ty>) -> Self {
                    Input::Seq(values.into_iter().map(|v| Input::Scalar(v.into())).collect())
                }
            }

            impl From<&[$ty]> for Input {
                fn from(values: &[$ty]) -> Self {
                    Input::Seq(values.iter().cloned().map(|v| Input::Scalar(v.into())).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Input {
                fn from(values: [$ty; N]) -> Self {
                    Input::Seq(values.into_iter().map(|v| Input::Scalar(v.into())).collect())
                }
            }
        )*
    };
}

impl_from_sequence!(bool, i32, i64, f32, f64, &str, Scalar, Option<bool>);

impl<T> From<Vec<Vec<T>>> for Input
where
    Vec<T>: Into<Input>,
{
    fn from(rows: Vec<Vec<T>>) -> Self {
        Input::Seq(rows.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for Input {
    fn from(value: Scalar) -> Self {
        Input::Scalar(value)
    }
}

impl From<NumericArray> for Input {
    fn from(array: NumericArray) -> Self {
        Input::Array(array)
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Bytes> for Input {
    fn from(bytes: Bytes) -> Self {
        Input::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes.into())
    }
}

impl From<&[u8]> for Input {
    fn from(bytes: &[u8]) -> Self {
        Input::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Input {
    fn from(bytes: &[u8; N]) -> Self {
        Input::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<BTreeMap<usize, f32>> for Input {
    fn from(map: BTreeMap<usize, f32>) -> Self {
        Input::Map(map)
    }
}

impl From<HashMap<usize, f32>> for Input {
    fn from(map: HashMap<usize, f32>) -> Self {
        Input::Map(map.into_iter().collect())
    }
}

impl From<SparseMatrix> for Input {
    fn from(matrix: SparseMatrix) -> Self {
        Input::Matrix(matrix)
    }
}

impl From<CooMatrix> for Input {
    fn from(matrix: CooMatrix) -> Self {
        Input::Matrix(SparseMatrix::Coo(matrix))
    }
}

impl From<CsrMatrix> for Input {
    fn from(matrix: CsrMatrix) -> Self {
        Input::Matrix(SparseMatrix::Csr(matrix))
    }
}

impl From<DokMatrix> for Input {
    fn from(matrix: DokMatrix) -> Self {
        Input::Matrix(SparseMatrix::Dok(matrix))
    }
}
