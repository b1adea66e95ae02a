//! Utility types shared by every codec.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ScalarType`] / [`Scalar`] - the ten numeric element types
//! - [`Buffer`] - runtime-typed bulk numeric storage
//! - [`Content`] / [`Cursor`] - a loaded file and a read position into it
//! - [`Error`] / [`Result`] - error handling
//! - [`DecodeOptions`] / [`JsonOptions`] - configuration
//! - Math type re-exports from glam

mod scalar;
mod buffer;
mod content;
mod error;
mod math;
mod options;

pub use scalar::*;
pub use buffer::*;
pub use content::*;
pub use error::*;
pub use math::*;
pub use options::*;
