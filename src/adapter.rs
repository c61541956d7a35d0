//! Database column dispatch.
//!
//! A column-type layer binds parameters through [`ColumnValue::to_db`] /
//! [`ColumnValue::to_db_binary`] and reads result columns back through
//! [`ColumnValue::from_db`] / [`ColumnValue::from_db_binary`]. SQL
//! generation, dialects and connections stay with that layer.
//!
//! Decoding is deliberately not uniform: [`Vector`] columns decode to a bare
//! [`NumericArray`], while the other kinds decode to their own type.

use bytes::Bytes;

use crate::bit::Bit;
use crate::dense::{HalfVector, Vector};
use crate::error::Error;
use crate::input::{Input, NumericArray};
use crate::sparse::SparseVector;

/// A parameter about to be bound to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    /// An already constructed value.
    Value(T),
    /// Raw input, constructed on the way out.
    Input(Input),
}

/// A value read back from a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// An already decoded value, passed through untouched.
    Value(T),
    /// The text wire form.
    Text(String),
    /// The binary wire form.
    Binary(Bytes),
}

/// A value kind that can be bound to and read from a database column.
pub trait ColumnValue: Sized {
    /// What [`from_db`](Self::from_db) and
    /// [`from_db_binary`](Self::from_db_binary) produce.
    type Decoded;

    /// Constructs a value from raw input. `expected_dimensions` is only a
    /// construction argument for inputs that cannot describe their own
    /// dimension.
    fn from_input(input: Input, expected_dimensions: Option<usize>) -> Result<Self, Error>;

    /// Dimension checked against the expected one.
    fn column_dimensions(&self) -> usize;

    /// Text wire form.
    fn encode_text(&self) -> String;

    /// Binary wire form.
    fn encode_binary(&self) -> Vec<u8>;

    /// Parses the text wire form.
    fn decode_text(text: &str) -> Result<Self::Decoded, Error>;

    /// Parses the binary wire form.
    fn decode_binary(data: Bytes) -> Result<Self::Decoded, Error>;

    /// Binds a parameter as text. `None` stays `None`.
    fn to_db(
        value: Option<Param<Self>>,
        expected_dimensions: Option<usize>,
    ) -> Result<Option<String>, Error> {
        Ok(bind(value, expected_dimensions)?.map(|v| v.encode_text()))
    }

    /// Binds a parameter in binary form. `None` stays `None`.
    fn to_db_binary(
        value: Option<Param<Self>>,
        expected_dimensions: Option<usize>,
    ) -> Result<Option<Vec<u8>>, Error> {
        Ok(bind(value, expected_dimensions)?.map(|v| v.encode_binary()))
    }

    /// Reads a text column. Decoded values are returned as is.
    fn from_db(value: Option<Field<Self::Decoded>>) -> Result<Option<Self::Decoded>, Error> {
        match value {
            None => Ok(None),
            Some(Field::Value(value)) => Ok(Some(value)),
            Some(Field::Text(text)) => Self::decode_text(&text).map(Some),
            Some(Field::Binary(_)) => Err(Error::Format("expected text".to_string())),
        }
    }

    /// Reads a binary column. Decoded values are returned as is.
    fn from_db_binary(
        value: Option<Field<Self::Decoded>>,
    ) -> Result<Option<Self::Decoded>, Error> {
        match value {
            None => Ok(None),
            Some(Field::Value(value)) => Ok(Some(value)),
            Some(Field::Binary(data)) => Self::decode_binary(data).map(Some),
            Some(Field::Text(_)) => Err(Error::Format("expected bytes".to_string())),
        }
    }
}

fn bind<T: ColumnValue>(
    value: Option<Param<T>>,
    expected_dimensions: Option<usize>,
) -> Result<Option<T>, Error> {
    let value = match value {
        None => return Ok(None),
        Some(Param::Value(value)) => value,
        Some(Param::Input(input)) => T::from_input(input, expected_dimensions)?,
    };
    if let Some(expected) = expected_dimensions {
        let actual = value.column_dimensions();
        if actual != expected {
            log::debug!("rejecting parameter with {actual} dimensions, column has {expected}");
            return Err(Error::Dimension { expected, actual });
        }
    }
    Ok(Some(value))
}

impl ColumnValue for Vector {
    type Decoded = NumericArray;

    fn from_input(input: Input, _expected_dimensions: Option<usize>) -> Result<Self, Error> {
        Vector::new(input)
    }

    fn column_dimensions(&self) -> usize {
        self.dimensions()
    }

    fn encode_text(&self) -> String {
        self.to_text()
    }

    fn encode_binary(&self) -> Vec<u8> {
        self.to_binary()
    }

    fn decode_text(text: &str) -> Result<NumericArray, Error> {
        Vector::from_text(text).map(Vector::into_array)
    }

    fn decode_binary(data: Bytes) -> Result<NumericArray, Error> {
        Vector::from_wire(data).map(Vector::into_array)
    }
}

impl ColumnValue for HalfVector {
    type Decoded = HalfVector;

    fn from_input(input: Input, _expected_dimensions: Option<usize>) -> Result<Self, Error> {
        HalfVector::new(input)
    }

    fn column_dimensions(&self) -> usize {
        self.dimensions()
    }

    fn encode_text(&self) -> String {
        self.to_text()
    }

    fn encode_binary(&self) -> Vec<u8> {
        self.to_binary()
    }

    fn decode_text(text: &str) -> Result<HalfVector, Error> {
        HalfVector::from_text(text)
    }

    fn decode_binary(data: Bytes) -> Result<HalfVector, Error> {
        HalfVector::from_wire(data)
    }
}

impl ColumnValue for SparseVector {
    type Decoded = SparseVector;

    fn from_input(input: Input, expected_dimensions: Option<usize>) -> Result<Self, Error> {
        match input {
            Input::Map(map) => SparseVector::new(map, expected_dimensions),
            other => SparseVector::new(other, None),
        }
    }

    fn column_dimensions(&self) -> usize {
        self.dimensions()
    }

    fn encode_text(&self) -> String {
        self.to_text()
    }

    fn encode_binary(&self) -> Vec<u8> {
        self.to_binary()
    }

    fn decode_text(text: &str) -> Result<SparseVector, Error> {
        SparseVector::from_text(text)
    }

    fn decode_binary(data: Bytes) -> Result<SparseVector, Error> {
        SparseVector::from_binary(&data)
    }
}

impl ColumnValue for Bit {
    type Decoded = Bit;

    fn from_input(input: Input, _expected_dimensions: Option<usize>) -> Result<Self, Error> {
        Bit::new(input)
    }

    fn column_dimensions(&self) -> usize {
        self.len()
    }

    fn encode_text(&self) -> String {
        self.to_text()
    }

    fn encode_binary(&self) -> Vec<u8> {
        self.to_binary()
    }

    fn decode_text(text: &str) -> Result<Bit, Error> {
        Bit::from_text(text)
    }

    fn decode_binary(data: Bytes) -> Result<Bit, Error> {
        Bit::from_binary(&data)
    }
}
