//! Physical dimensions for unit validation.
//!
//! Dimensions are represented as integer exponents of the SI base dimensions
//! that matter for atmospheric state and spectroscopy:
//! - Mass (M)
//! - Length (L)
//! - Time (T)
//! - Temperature (Θ)
//! - Amount of substance (N)
//! - Plane angle (A)
//!
//! SI treats the plane angle as dimensionless. It is tracked as its own
//! exponent here so that an angle never converts to a mass ratio.
//!
//! On top of the raw exponents, every dimension maps onto exactly one
//! [`DimensionClass`]. The class is what the rest of the workspace checks when
//! deciding whether a unit is acceptable for a field (a temperature profile
//! must be an absolute temperature, a pressure grid must be a pressure, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// Represents the physical dimension of a quantity.
///
/// For example:
/// - Pressure has dimensions M·L⁻¹·T⁻² (mass = 1, length = -1, time = -2)
/// - Acceleration has dimensions L·T⁻²
/// - Wavenumber has dimensions L⁻¹
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimension {
    /// Mass exponent (M)
    pub mass: i8,
    /// Length exponent (L)
    pub length: i8,
    /// Time exponent (T)
    pub time: i8,
    /// Temperature exponent (Θ)
    pub temperature: i8,
    /// Amount of substance exponent (N)
    pub amount: i8,
    /// Plane angle exponent (A)
    pub angle: i8,
}

impl Dimension {
    /// Creates a new dimension with all exponents set to zero (dimensionless).
    #[must_use]
    pub const fn dimensionless() -> Self {
        Self::new(0, 0, 0, 0, 0)
    }

    /// Creates a dimension with the specified exponents and no angle.
    #[must_use]
    pub const fn new(mass: i8, length: i8, time: i8, temperature: i8, amount: i8) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
            amount,
            angle: 0,
        }
    }

    /// Mass dimension (M¹).
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0);

    /// Length dimension (L¹).
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0);

    /// Time dimension (T¹).
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);

    /// Temperature dimension (Θ¹).
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);

    /// Amount of substance dimension (N¹).
    pub const AMOUNT: Self = Self::new(0, 0, 0, 0, 1);

    /// Plane angle (A¹).
    pub const ANGLE: Self = Self {
        angle: 1,
        ..Self::dimensionless()
    };

    /// Area dimension (L²), used for absorption cross sections.
    pub const AREA: Self = Self::new(0, 2, 0, 0, 0);

    /// Inverse length (L⁻¹), used for wavenumbers.
    pub const INVERSE_LENGTH: Self = Self::new(0, -1, 0, 0, 0);

    /// Acceleration dimension (L·T⁻²).
    pub const ACCELERATION: Self = Self::new(0, 1, -2, 0, 0);

    /// Force dimension (M·L·T⁻²).
    pub const FORCE: Self = Self::new(1, 1, -2, 0, 0);

    /// Pressure dimension (M·L⁻¹·T⁻²), equivalent to N/m².
    pub const PRESSURE: Self = Self::new(1, -1, -2, 0, 0);

    /// Returns true if this dimension is dimensionless.
    #[must_use]
    pub const fn is_dimensionless(&self) -> bool {
        self.mass == 0
            && self.length == 0
            && self.time == 0
            && self.temperature == 0
            && self.amount == 0
            && self.angle == 0
    }

    /// Returns true if this dimension is compatible with another for conversion.
    ///
    /// Two dimensions are compatible if they are identical.
    #[must_use]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        self.mass == other.mass
            && self.length == other.length
            && self.time == other.time
            && self.temperature == other.temperature
            && self.amount == other.amount
            && self.angle == other.angle
    }

    /// Raises this dimension to an integer power.
    #[must_use]
    pub const fn pow(&self, exp: i8) -> Self {
        Self {
            mass: self.mass * exp,
            length: self.length * exp,
            time: self.time * exp,
            temperature: self.temperature * exp,
            amount: self.amount * exp,
            angle: self.angle * exp,
        }
    }

    /// The dimension class this dimension belongs to.
    #[must_use]
    pub fn class(&self) -> DimensionClass {
        match *self {
            d if d.is_dimensionless() => DimensionClass::Dimensionless,
            Self::PRESSURE => DimensionClass::Pressure,
            Self::TEMPERATURE => DimensionClass::Temperature,
            Self::LENGTH => DimensionClass::Length,
            Self::INVERSE_LENGTH => DimensionClass::InverseLength,
            Self::ACCELERATION => DimensionClass::Acceleration,
            Self::AREA => DimensionClass::Area,
            Self::ANGLE => DimensionClass::Angle,
            _ => DimensionClass::Other,
        }
    }
}

/// Physical category of a unit.
///
/// Units are mutually convertible only within one class. Mass ratios (VMR,
/// specific humidity) are [`DimensionClass::Dimensionless`]; angles are
/// [`DimensionClass::Angle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionClass {
    Pressure,
    /// Temperature. Only absolute scales may be converted; see
    /// [`Unit::is_absolute_temperature`](super::Unit::is_absolute_temperature).
    Temperature,
    /// Lengths, including wavelengths.
    Length,
    /// Inverse lengths, i.e. wavenumbers.
    InverseLength,
    Acceleration,
    /// Areas, including absorption cross sections per molecule.
    Area,
    /// Pure ratios: VMR, specific humidity, broadener fractions.
    Dimensionless,
    Angle,
    /// Anything the workspace has no dedicated use for.
    Other,
}

impl fmt::Display for DimensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DimensionClass::Pressure => "pressure",
            DimensionClass::Temperature => "temperature",
            DimensionClass::Length => "length",
            DimensionClass::InverseLength => "inverse length",
            DimensionClass::Acceleration => "acceleration",
            DimensionClass::Area => "area",
            DimensionClass::Dimensionless => "dimensionless",
            DimensionClass::Angle => "angle",
            DimensionClass::Other => "other",
        };
        write!(f, "{name}")
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            mass: self.mass + rhs.mass,
            length: self.length + rhs.length,
            time: self.time + rhs.time,
            temperature: self.temperature + rhs.temperature,
            amount: self.amount + rhs.amount,
            angle: self.angle + rhs.angle,
        }
    }
}

impl Add for Dimension {
    type Output = Self;

    /// Adding dimensions is the same as multiplying them (adding exponents).
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self::Output {
        self * rhs
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let mut parts = Vec::new();
        let symbols = [
            (self.mass, "M"),
            (self.length, "L"),
            (self.time, "T"),
            (self.temperature, "Θ"),
            (self.amount, "N"),
            (self.angle, "A"),
        ];

        for (exp, sym) in symbols {
            if exp == 1 {
                parts.push(sym.to_string());
            } else if exp != 0 {
                parts.push(format!("{sym}^{exp}"));
            }
        }

        write!(f, "{}", parts.join(" "))
    }
}
