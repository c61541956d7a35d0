//! Fixed-length bit strings.
//!
//! Bits are packed most significant bit first; the unused low bits of the
//! final byte are always zero.

use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut};

use crate::error::Error;
use crate::input::{DType, Flat, Input, NumericArray, Scalar};

/// Largest length the `i32` binary header can describe.
pub const MAX_BIT_LEN: usize = i32::MAX as usize;

/// Binary header: the bit length as `i32`.
const HEADER_LEN: usize = 4;

/// A bit string (`bit` column).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Bit {
    len: usize,
    data: Vec<u8>,
}

impl Bit {
    fn pack(len: usize, bits: impl Iterator<Item = bool>) -> Result<Self, Error> {
        if len > MAX_BIT_LEN {
            return Err(Error::Shape(format!(
                "expected at most {MAX_BIT_LEN} bits, not {len}"
            )));
        }
        let mut data = vec![0u8; len.div_ceil(8)];
        for (i, bit) in bits.enumerate() {
            if bit {
                data[i / 8] |= 0x80 >> (i % 8);
            }
        }
        Ok(Self { len, data })
    }

    /// Builds a bit string from any accepted input.
    ///
    /// Text is read as `'0'`/`'1'` digits and raw bytes are unpacked eight
    /// bits each. Sequences and arrays are coerced by truthiness.
    pub fn new(input: impl Into<Input>) -> Result<Self, Error> {
        match input.into() {
            Input::Text(text) => Self::from_text(&text),
            Input::Bytes(bytes) => Self::from_bytes(&bytes),
            other => match other.into_flat()? {
                Flat::Array(array) => Self::from_array(&array),
                Flat::Scalars(scalars) => Self::from_scalars(&scalars),
            },
        }
    }

    /// Builds a bit string from booleans.
    pub fn from_bools(bits: &[bool]) -> Result<Self, Error> {
        Self::pack(bits.len(), bits.iter().copied())
    }

    /// Builds a bit string by truthiness.
    ///
    /// Logs a warning when any element is not a boolean; construction still
    /// succeeds with the coerced bits.
    pub fn from_scalars(elements: &[Scalar]) -> Result<Self, Error> {
        if !elements.iter().all(Scalar::is_bool) {
            warn_coercion();
        }
        Self::pack(elements.len(), elements.iter().map(Scalar::is_truthy))
    }

    /// Builds a bit string from a one-dimensional array.
    ///
    /// Nonzero elements are set bits. Arrays of any dtype other than
    /// [`DType::Bool`] log the coercion warning.
    pub fn from_array(array: &NumericArray) -> Result<Self, Error> {
        if array.ndim() != 1 {
            return Err(Error::ndim());
        }
        if array.dtype() != DType::Bool {
            warn_coercion();
        }
        Self::pack(array.len(), array.iter_f64().map(|v| v != 0.0))
    }

    /// Unpacks raw bytes, eight bits per byte, most significant first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let len = bytes.len().checked_mul(8).unwrap_or(usize::MAX);
        if len > MAX_BIT_LEN {
            return Err(Error::Shape(format!(
                "expected at most {MAX_BIT_LEN} bits, not {len}"
            )));
        }
        Ok(Self {
            len,
            data: bytes.to_vec(),
        })
    }

    /// Parses the text form, one `'0'` or `'1'` per bit.
    pub fn from_text(text: &str) -> Result<Self, Error> {
        let bits = text
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(Error::Format(format!(
                    "expected '0' or '1', found {other:?}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_bools(&bits)
    }

    /// Parses the binary form: `i32` bit length, then the packed bytes.
    pub fn from_binary(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::Format(format!(
                "expected at least {HEADER_LEN} bytes, got {}",
                data.len()
            )));
        }
        let mut buf = data;
        let len = buf.get_i32();
        let len = usize::try_from(len)
            .map_err(|_| Error::Format(format!("negative bit length {len}")))?;
        if buf.len() != len.div_ceil(8) {
            return Err(Error::Format(format!(
                "expected {} bytes for {len} bits, got {}",
                HEADER_LEN + len.div_ceil(8),
                data.len()
            )));
        }
        let mut data = buf.to_vec();
        if let Some(last) = data.last_mut() {
            let used = len % 8;
            if used != 0 {
                *last &= 0xff << (8 - used);
            }
        }
        Ok(Self { len, data })
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bit string has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.data[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Iterates over the bits, index 0 first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.data[i / 8] & (0x80 >> (i % 8)) != 0)
    }

    /// Packed bytes, `len().div_ceil(8)` of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies the bits out as booleans.
    pub fn to_list(&self) -> Vec<bool> {
        self.iter().collect()
    }

    /// Copies the bits out as a boolean array.
    pub fn to_array(&self) -> NumericArray {
        NumericArray::from_bools(&self.to_list())
    }

    /// Renders the text form.
    pub fn to_text(&self) -> String {
        self.iter().map(|bit| if bit { '1' } else { '0' }).collect()
    }

    /// Renders the binary form.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn to_binary(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
        // len <= MAX_BIT_LEN
        out.put_i32(self.len as i32);
        out.extend_from_slice(&self.data);
        out
    }
}

fn warn_coercion() {
    log::warn!(target: "pgvec::bit", "expected elements to be boolean");
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bit({})", self.to_text())
    }
}

impl fmt::Debug for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Bit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_is_msb_first() {
        let bit = Bit::from_bools(&[true, false, true]).unwrap();
        assert_eq!(bit.as_bytes(), &[0b1010_0000]);
        assert_eq!(bit.get(2), Some(true));
        assert_eq!(bit.get(3), None);
    }

    #[test]
    fn test_binary_layout() {
        let bit = Bit::from_text("101").unwrap();
        assert_eq!(bit.to_binary(), vec![0, 0, 0, 3, 0b1010_0000]);
        assert_eq!(Bit::from_bools(&[]).unwrap().to_binary(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_binary_clears_trailing_bits() {
        let bit = Bit::from_binary(&[0, 0, 0, 3, 0xff]).unwrap();
        assert_eq!(bit.to_text(), "111");
        assert_eq!(bit.as_bytes(), &[0b1110_0000]);
        assert_eq!(bit, Bit::from_text("111").unwrap());
    }

    #[test]
    fn test_binary_rejects_bad_lengths() {
        assert!(matches!(Bit::from_binary(&[0, 0, 0, 9, 0xff]), Err(Error::Format(_))));
        assert!(matches!(Bit::from_binary(&[0, 0]), Err(Error::Format(_))));
        assert!(matches!(Bit::from_binary(&[0xff, 0xff, 0xff, 0xff]), Err(Error::Format(_))));
    }

    #[test]
    fn test_text_rejects_other_digits() {
        assert!(matches!(Bit::from_text("102"), Err(Error::Format(_))));
    }

    #[test]
    fn test_length_distinguishes_zero_strings() {
        assert_ne!(Bit::from_text("000").unwrap(), Bit::from_text("0000").unwrap());
    }
}
