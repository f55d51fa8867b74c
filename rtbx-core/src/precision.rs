//! Numeric precision used by every array-holding type.
//!
//! Atmospheres, grids and tables are generic over a [`Precision`] so callers
//! can pick single or double precision once, at construction time.

use std::fmt::{Debug, Display};

/// Floating point type used to store numeric buffers.
///
/// Implemented for `f32` and `f64`. Unit conversion factors are always
/// computed in `f64` and cast into the storage precision.
pub trait Precision:
    num::Float + ndarray::ScalarOperand + Debug + Display + Default + Send + Sync + 'static
{
    /// Cast an `f64` into this precision.
    fn from_f64(value: f64) -> Self;

    /// Widen this value into an `f64` (used for error reporting and unit factors).
    fn as_f64(self) -> f64;
}

impl Precision for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Precision for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn as_f64(self) -> f64 {
        self
    }
}
