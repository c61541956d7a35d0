//! Error type shared by every value kind.

use std::fmt;

/// Errors raised while constructing, encoding or decoding a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input has the wrong rank, holds more than one row, or carries a
    /// construction argument that is redundant for its shape.
    Shape(String),
    /// An element could not be converted to the target numeric type.
    Conversion(String),
    /// The declared dimension does not match the actual one.
    Dimension {
        /// Dimension the caller asked for.
        expected: usize,
        /// Dimension of the value.
        actual: usize,
    },
    /// A text or binary wire form is malformed, or the wrong kind of wire
    /// form was handed to a decoder.
    Format(String),
    /// A sparse vector was built from an index map without a dimension.
    MissingDimension,
}

impl Error {
    pub(crate) fn ndim() -> Self {
        Error::Shape("expected ndim to be 1".to_string())
    }

    pub(crate) fn extra_argument() -> Self {
        Error::Shape("extra argument".to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Shape(msg) | Error::Conversion(msg) | Error::Format(msg) => f.write_str(msg),
            Error::Dimension { expected, actual } => {
                write!(f, "expected {expected} dimensions, not {actual}")
            }
            Error::MissingDimension => f.write_str("missing dimensions"),
        }
    }
}

impl std::error::Error for Error {}
