use thiserror::Error;

use crate::units::{ConversionError, ParseError};

/// Error type for invalid operations.
///
/// Every fallible operation in the workspace validates its preconditions
/// before touching any state, so an `Err` always means nothing was mutated.
#[derive(Error, Debug)]
pub enum RTBXError {
    #[error(transparent)]
    Dimension(#[from] ConversionError),
    #[error("{axis} value {value} is outside of the table range [{lower}, {upper}]")]
    Bounds {
        axis: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("Shape mismatch for {target}. Expected {expected} elements, got {got}")]
    ShapeMismatch {
        target: String,
        expected: usize,
        got: usize,
    },
    #[error("{name} stores {stored} values and cannot be accessed as {requested}")]
    SpectralFamilyMismatch {
        name: String,
        stored: String,
        requested: String,
    },
    #[error("Invalid construction of {what}: {reason}")]
    Construction { what: String, reason: String },
    #[error("{owner} has no field named '{field}'")]
    UnknownField { owner: String, field: String },
    #[error(transparent)]
    UnitParse(#[from] ParseError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl RTBXError {
    pub fn construction(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn shape_mismatch(target: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            target: target.into(),
            expected,
            got,
        }
    }
}

/// Convenience type for `Result<T, RTBXError>`.
pub type RTBXResult<T> = Result<T, RTBXError>;
