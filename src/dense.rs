//! Dense vectors at full (`f32`) and half (`f16`) precision.
//!
//! Both kinds share [`DenseVector`], parameterized by its [`Element`] type.
//! Storage is the binary wire payload itself: `dimension` big-endian
//! elements in a [`Bytes`] buffer. A big-endian [`NumericArray`] of the
//! matching element type is adopted as storage without copying.

use std::fmt;
use std::fmt::Write as _;
use std::marker::PhantomData;
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes};
use half::f16;

use crate::error::Error;
use crate::input::{ByteOrder, DType, Flat, Input, NumericArray, Scalar, parse_float};

/// Largest dimension the `u16` binary header can describe.
pub const MAX_DENSE_DIM: usize = u16::MAX as usize;

/// Binary header: `u16` dimension followed by a reserved `u16`.
const HEADER_LEN: usize = 4;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for half::f16 {}
}

/// Element type of a [`DenseVector`].
pub trait Element: sealed::Sealed + Copy + PartialEq + Send + Sync + 'static {
    /// Bytes per element in storage and on the wire.
    const WIDTH: usize;
    /// Type name used by `Display`.
    const KIND: &'static str;
    /// Storage dtype; arrays of exactly this dtype are adopted without copying.
    const DTYPE: DType;

    /// Narrows a float to this element type.
    fn from_f64(value: f64) -> Self;
    /// Widens the element to `f32`, which is exact for both element types.
    fn to_f32(self) -> f32;
    /// Reads one big-endian element.
    fn get_be(buf: &mut &[u8]) -> Self;
    /// Appends one big-endian element.
    fn put_be(self, buf: &mut Vec<u8>);
}

impl Element for f32 {
    const WIDTH: usize = 4;
    const KIND: &'static str = "Vector";
    const DTYPE: DType = DType::F32(ByteOrder::Big);

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f32(self) -> f32 {
        self
    }

    fn get_be(buf: &mut &[u8]) -> Self {
        buf.get_f32()
    }

    fn put_be(self, buf: &mut Vec<u8>) {
        buf.put_f32(self);
    }
}

impl Element for f16 {
    const WIDTH: usize = 2;
    const KIND: &'static str = "HalfVector";
    const DTYPE: DType = DType::F16(ByteOrder::Big);

    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }

    fn get_be(buf: &mut &[u8]) -> Self {
        f16::from_bits(buf.get_u16())
    }

    fn put_be(self, buf: &mut Vec<u8>) {
        buf.put_u16(self.to_bits());
    }
}

/// A dense vector of [`Element`]s.
#[derive(Clone)]
pub struct DenseVector<E: Element> {
    data: Bytes,
    _element: PhantomData<E>,
}

/// Single precision vector (`vector` column).
pub type Vector = DenseVector<f32>;

/// Half precision vector (`halfvec` column).
pub type HalfVector = DenseVector<f16>;

fn check_dimensions(dim: usize) -> Result<(), Error> {
    if dim > MAX_DENSE_DIM {
        return Err(Error::Shape(format!(
            "expected at most {MAX_DENSE_DIM} dimensions, not {dim}"
        )));
    }
    Ok(())
}

impl<E: Element> DenseVector<E> {
    fn from_storage(data: Bytes) -> Self {
        Self {
            data,
            _element: PhantomData,
        }
    }

    fn collect(values: impl ExactSizeIterator<Item = E>) -> Result<Self, Error> {
        check_dimensions(values.len())?;
        let mut data = Vec::with_capacity(values.len() * E::WIDTH);
        for value in values {
            value.put_be(&mut data);
        }
        Ok(Self::from_storage(data.into()))
    }

    /// Builds a vector from any rank-1 input.
    pub fn new(input: impl Into<Input>) -> Result<Self, Error> {
        match input.into().into_flat()? {
            Flat::Array(array) => Self::from_array(array),
            Flat::Scalars(scalars) => Self::from_scalars(&scalars),
        }
    }

    /// Builds a vector from elements of the storage type.
    pub fn from_slice(values: &[E]) -> Result<Self, Error> {
        Self::collect(values.iter().copied())
    }

    /// Builds a vector from `f32` values, narrowing them to the element type.
    pub fn from_f32s(values: &[f32]) -> Result<Self, Error> {
        Self::collect(values.iter().map(|&v| E::from_f64(f64::from(v))))
    }

    /// Builds a vector from scalars, converting each one to a number.
    pub fn from_scalars(values: &[Scalar]) -> Result<Self, Error> {
        let values = values
            .iter()
            .map(|v| v.to_f64().map(E::from_f64))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slice(&values)
    }

    /// Builds a vector from a one-dimensional array.
    ///
    /// An array whose dtype is already the big-endian storage dtype becomes
    /// the vector's storage as is; the caller and the vector then share one
    /// immutable buffer. Any other dtype is converted into a new buffer.
    pub fn from_array(array: NumericArray) -> Result<Self, Error> {
        if array.ndim() != 1 {
            return Err(Error::ndim());
        }
        check_dimensions(array.len())?;
        if array.dtype() == E::DTYPE {
            log::trace!("adopting {} element buffer for {}", array.len(), E::KIND);
            return Ok(Self::from_storage(array.into_bytes()));
        }
        Self::collect(array.iter_f64().map(E::from_f64))
    }

    /// Parses the text form `[v1,v2,...]`.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let inner = text
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| Error::Format(format!("expected '[...]', got {text:?}")))?;
        if inner.is_empty() {
            return Self::from_slice(&[]);
        }
        let values = inner
            .split(',')
            .map(|field| parse_float(field).map(E::from_f64))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slice(&values)
    }

    /// Parses the binary form: `u16` dimension, reserved `u16`, elements.
    pub fn from_binary(data: &[u8]) -> Result<Self, Error> {
        Self::from_wire(Bytes::copy_from_slice(data))
    }

    /// Parses the binary form, keeping the payload as a slice of `data`.
    pub(crate) fn from_wire(data: Bytes) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::Format(format!(
                "expected at least {HEADER_LEN} bytes, got {}",
                data.len()
            )));
        }
        let dim = usize::from((&data[..2]).get_u16());
        let expected = HEADER_LEN + dim * E::WIDTH;
        if data.len() != expected {
            return Err(Error::Format(format!(
                "expected {expected} bytes for {dim} dimensions, got {}",
                data.len()
            )));
        }
        Ok(Self::from_storage(data.slice(HEADER_LEN..)))
    }

    /// Number of elements.
    pub fn dimensions(&self) -> usize {
        self.data.len() / E::WIDTH
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = E> + '_ {
        self.data.chunks_exact(E::WIDTH).map(|mut raw| E::get_be(&mut raw))
    }

    /// Copies the elements out at storage precision.
    pub fn to_vec(&self) -> Vec<E> {
        self.iter().collect()
    }

    /// Copies the elements out as `f32`.
    pub fn to_list(&self) -> Vec<f32> {
        self.iter().map(E::to_f32).collect()
    }

    /// Returns the storage as a big-endian array.
    ///
    /// The array shares the vector's buffer. For a vector built from an
    /// adopted array this is the caller's original buffer.
    pub fn to_array(&self) -> NumericArray {
        NumericArray::from_raw(E::DTYPE, vec![self.dimensions()], self.data.clone())
    }

    /// Converts the vector into its storage array.
    pub fn into_array(self) -> NumericArray {
        let dim = self.dimensions();
        NumericArray::from_raw(E::DTYPE, vec![dim], self.data)
    }

    /// Renders the text form `[v1,v2,...]`.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(2 + self.dimensions() * 8);
        text.push('[');
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                text.push(',');
            }
            let _ = write!(text, "{:?}", value.to_f32());
        }
        text.push(']');
        text
    }

    /// Renders the binary form.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
        // dimensions() <= MAX_DENSE_DIM
        out.put_u16(self.dimensions() as u16);
        out.put_u16(0);
        out.extend_from_slice(&self.data);
        out
    }
}

impl<E: Element> PartialEq for DenseVector<E> {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.iter().eq(other.iter())
    }
}

impl<E: Element> fmt::Display for DenseVector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}([", E::KIND)?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", value.to_f32())?;
        }
        f.write_str("])")
    }
}

impl<E: Element> fmt::Debug for DenseVector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<E: Element> FromStr for DenseVector<E> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}
