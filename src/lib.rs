//! # pgvec
//!
//! Value types for the four column kinds of a vector-capable Postgres
//! (pgvector): [`Vector`], [`HalfVector`], [`SparseVector`] and [`Bit`].
//!
//! Each kind normalizes many input shapes into one canonical, immutable
//! representation and converts it losslessly to and from:
//!
//! - the **text wire form**: `[1.0,2.0]`, `{1:1.0,3:2.0}/4`, `0101`
//! - the **binary wire form**: big-endian, length-prefixed payloads
//! - **column values** through the [`ColumnValue`] dispatch functions used by
//!   a column-type layer
//!
//! No connection is ever opened; this crate only produces and consumes bytes
//! and text.
//!
//! ## Quick Start
//!
//! ```rust
//! use pgvec::{Bit, ColumnValue, Field, Param, SparseVector, Vector};
//!
//! # fn main() -> Result<(), pgvec::Error> {
//! let embedding = Vector::new(vec![1.0f32, 2.0, 3.0])?;
//! assert_eq!(embedding.to_text(), "[1.0,2.0,3.0]");
//!
//! // Round trip through the binary form
//! let restored = Vector::from_binary(&embedding.to_binary())?;
//! assert_eq!(restored, embedding);
//!
//! // Bind with a dimension check, read back as a raw buffer
//! let bound = Vector::to_db(Some(Param::Value(embedding)), Some(3))?;
//! let array = Vector::from_db(bound.map(Field::Text))?.expect("not null");
//! assert_eq!(array.to_f32_vec(), vec![1.0, 2.0, 3.0]);
//!
//! let sparse = SparseVector::new(vec![1.0f32, 0.0, 2.0, 0.0], None)?;
//! assert_eq!(sparse.to_text(), "{1:1.0,3:2.0}/4");
//!
//! let bits = Bit::new("101")?;
//! assert_eq!(bits.to_list(), vec![true, false, true]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Buffer sharing
//!
//! A [`NumericArray`] whose element type and byte order already match a
//! dense vector's storage (big-endian `f32` for [`Vector`], big-endian `f16`
//! for [`HalfVector`]) is adopted without copying: the caller and the vector
//! share one reference-counted buffer. Buffers are immutable, and nothing in
//! this crate writes to an adopted one.
//!
//! ## Diagnostics
//!
//! Building a [`Bit`] from non-boolean elements succeeds but logs the warning
//! `expected elements to be boolean` through the [`log`] facade (target
//! `pgvec::bit`).

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapter;
pub mod bit;
pub mod dense;
pub mod error;
pub mod input;
pub mod interchange;
pub mod sparse;

mod serde_impl;

pub use adapter::{ColumnValue, Field, Param};
pub use bit::Bit;
pub use dense::{DenseVector, Element, HalfVector, Vector};
pub use error::Error;
pub use input::{ByteOrder, DType, Input, NumericArray, Scalar};
pub use interchange::{CooMatrix, CsrMatrix, DokMatrix, SparseMatrix};
pub use sparse::SparseVector;

/// Half precision float, re-exported from [`half`].
pub use half::f16;
