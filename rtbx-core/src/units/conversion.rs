//! Unit conversion calculations.
//!
//! This module provides the high-level [`Unit`] type that combines parsing,
//! normalization, classification and conversion into a single API.
//!
//! # Example
//!
//! ```
//! use rtbx_core::units::{DimensionClass, Unit};
//!
//! let hpa = Unit::parse("hPa").unwrap();
//! let pa = Unit::parse("Pa").unwrap();
//! assert_eq!(hpa.dimension_class(), DimensionClass::Pressure);
//! assert_eq!(hpa.convert_to(1013.25, &pa).unwrap(), 101325.0);
//!
//! // Celsius is a relative scale and is never converted
//! let celsius = Unit::parse("degC").unwrap();
//! let kelvin = Unit::parse("K").unwrap();
//! assert!(celsius.conversion_factor(&kelvin).is_err());
//! ```

use super::dimension::{Dimension, DimensionClass};
use super::parser::{ParseError, ParsedUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for unit conversion failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Units have incompatible dimensions.
    IncompatibleDimensions {
        from: Dimension,
        to: Dimension,
        from_unit: String,
        to_unit: String,
    },
    /// One of the units is an offset temperature scale.
    RelativeTemperature { unit: String },
    /// A unit of a specific class was required.
    WrongClass {
        unit: String,
        expected: DimensionClass,
        found: DimensionClass,
    },
    /// A value without unit cannot be converted.
    MissingUnit { target: String },
    /// Failed to parse one of the units.
    ParseError(ParseError),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleDimensions {
                from,
                to,
                from_unit,
                to_unit,
            } => {
                write!(
                    f,
                    "cannot convert from '{from_unit}' to '{to_unit}': \
                     incompatible dimensions ({from} vs {to})"
                )
            }
            Self::RelativeTemperature { unit } => write!(
                f,
                "'{unit}' is a relative temperature scale; only absolute temperatures convert"
            ),
            Self::WrongClass {
                unit,
                expected,
                found,
            } => write!(f, "expected a {expected} unit, got '{unit}' ({found})"),
            Self::MissingUnit { target } => {
                write!(f, "value carries no unit and cannot be converted to '{target}'")
            }
            Self::ParseError(e) => write!(f, "unit parse error: {e}"),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for ConversionError {
    fn from(e: ParseError) -> Self {
        Self::ParseError(e)
    }
}

/// Which of the two spectral coordinate families a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectralFamily {
    /// Length units (nm, um, ...)
    Wavelength,
    /// Inverse length units (cm^-1, ...)
    Wavenumber,
}

impl fmt::Display for SpectralFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectralFamily::Wavelength => write!(f, "wavelength"),
            SpectralFamily::Wavenumber => write!(f, "wavenumber"),
        }
    }
}

/// A parsed and validated unit.
///
/// Units are side-channel metadata: numeric buffers are plain arrays and a
/// `Unit` describes how to read them. Nothing is inferred through arithmetic.
///
/// # Equality
///
/// Two units are equal if they have the same normalized representation.
/// This means `Unit::parse("cm^-1") == Unit::parse("1/cm")`.
///
/// Units (de)serialize as their original string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    /// The original input string (preserved for display).
    original: String,
    /// The parsed unit representation.
    parsed: ParsedUnit,
}

impl Unit {
    /// Parses a unit string.
    ///
    /// Every symbol must be known to the [`UNIT_REGISTRY`](super::UNIT_REGISTRY),
    /// otherwise this fails with [`ParseError::UnknownUnit`].
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let parsed = ParsedUnit::parse(input)?;
        parsed.dimension()?;
        Ok(Self {
            original: input.to_string(),
            parsed,
        })
    }

    /// The dimensionless unit "1".
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            original: "1".to_string(),
            parsed: ParsedUnit::dimensionless(),
        }
    }

    /// Returns the original input string.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns the normalized string representation.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.parsed.normalized()
    }

    /// Returns true if this unit is physically dimensionless.
    ///
    /// Returns false if the dimension cannot be computed (unknown unit).
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.parsed.is_dimensionless().unwrap_or(false)
    }

    /// Returns the physical dimension of this unit.
    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.parsed.dimension()
    }

    /// Returns the dimension class, or [`DimensionClass::Other`] for units
    /// whose dimension cannot be computed.
    #[must_use]
    pub fn dimension_class(&self) -> DimensionClass {
        self.dimension()
            .map(|d| d.class())
            .unwrap_or(DimensionClass::Other)
    }

    /// True for offset temperature scales such as `degC`.
    #[must_use]
    pub fn is_relative_scale(&self) -> bool {
        self.parsed.has_relative_scale().unwrap_or(false)
    }

    /// True for temperature units on an absolute scale (kelvin).
    #[must_use]
    pub fn is_absolute_temperature(&self) -> bool {
        self.dimension_class() == DimensionClass::Temperature && !self.is_relative_scale()
    }

    /// The spectral family of this unit, if it is a length or an inverse length.
    #[must_use]
    pub fn spectral_family(&self) -> Option<SpectralFamily> {
        match self.dimension_class() {
            DimensionClass::Length => Some(SpectralFamily::Wavelength),
            DimensionClass::InverseLength => Some(SpectralFamily::Wavenumber),
            _ => None,
        }
    }

    /// Returns the conversion factor to SI base units.
    pub fn to_si_factor(&self) -> Result<f64, ParseError> {
        self.parsed.to_si_factor()
    }

    /// Checks that this unit belongs to `expected`.
    ///
    /// Temperature checks additionally require an absolute scale.
    pub fn require_class(&self, expected: DimensionClass) -> Result<(), ConversionError> {
        let found = self.dimension()?.class();
        if found != expected {
            return Err(ConversionError::WrongClass {
                unit: self.original.clone(),
                expected,
                found,
            });
        }
        self.require_absolute()
    }

    fn require_absolute(&self) -> Result<(), ConversionError> {
        if self.parsed.has_relative_scale()? {
            return Err(ConversionError::RelativeTemperature {
                unit: self.original.clone(),
            });
        }
        Ok(())
    }

    /// Returns true if this unit can be converted to the target unit.
    ///
    /// Units are compatible if they have the same physical dimension and
    /// neither is a relative temperature scale.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.conversion_factor(other).is_ok()
    }

    /// Calculates the conversion factor from this unit to the target unit.
    ///
    /// The factor is the multiplier to convert a value in `self` to a value
    /// in `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if the units have incompatible dimensions, or if
    /// either of them is a relative temperature scale.
    pub fn conversion_factor(&self, other: &Self) -> Result<f64, ConversionError> {
        self.require_absolute()?;
        other.require_absolute()?;

        let dim_self = self.dimension()?;
        let dim_other = other.dimension()?;

        if !dim_self.is_compatible(&dim_other) {
            return Err(ConversionError::IncompatibleDimensions {
                from: dim_self,
                to: dim_other,
                from_unit: self.original.clone(),
                to_unit: other.original.clone(),
            });
        }

        // value_other = value_self * (factor_self / factor_other)
        Ok(self.to_si_factor()? / other.to_si_factor()?)
    }

    /// Converts a value from this unit to the target unit.
    pub fn convert_to(&self, value: f64, other: &Self) -> Result<f64, ConversionError> {
        let factor = self.conversion_factor(other)?;
        Ok(value * factor)
    }

    /// Converts a spectral coordinate, crossing between wavelength and
    /// wavenumber when the two units belong to different families.
    ///
    /// Within one family this is [`Self::convert_to`]. Across families the
    /// value goes through SI and is inverted: `λ[m] = 1 / ν[m⁻¹]`.
    ///
    /// ```
    /// use rtbx_core::units::Unit;
    ///
    /// let nm = Unit::parse("nm").unwrap();
    /// let wavenumber = Unit::parse("cm^-1").unwrap();
    /// let nu = nm.convert_spectral(760.0, &wavenumber).unwrap();
    /// assert!((nu - 13157.894736842105).abs() < 1e-6);
    /// ```
    pub fn convert_spectral(&self, value: f64, other: &Self) -> Result<f64, ConversionError> {
        match (self.spectral_family(), other.spectral_family()) {
            (Some(from), Some(to)) if from != to => {
                let si = value * self.to_si_factor()?;
                Ok(1.0 / si / other.to_si_factor()?)
            }
            _ => self.convert_to(value, other),
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        // Compare by normalized representation
        self.parsed == other.parsed
    }
}

impl Eq for Unit {}

impl std::hash::Hash for Unit {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash the normalized string for consistency with PartialEq
        self.normalized().hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl TryFrom<String> for Unit {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.original
    }
}

impl std::str::FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

/// Calculates the conversion factor between two unit strings.
///
/// # Example
///
/// ```
/// use rtbx_core::units::conversion_factor;
///
/// let factor = conversion_factor("atm", "hPa").unwrap();
/// assert!((factor - 1013.25).abs() < 1e-9);
/// ```
pub fn conversion_factor(from: &str, to: &str) -> Result<f64, ConversionError> {
    let from_unit = Unit::parse(from)?;
    let to_unit = Unit::parse(to)?;
    from_unit.conversion_factor(&to_unit)
}
