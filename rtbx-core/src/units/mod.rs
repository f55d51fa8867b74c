//! Unit parsing, classification and conversion.
//!
//! Every numeric buffer in the workspace is a plain array with a [`Unit`]
//! attached as metadata. This module is where those tags are parsed, compared
//! and converted. There is no unit algebra: nothing is propagated through
//! arithmetic, and every cross-unit operation goes through an explicit
//! conversion call.
//!
//! # Quick Start
//!
//! ```
//! use rtbx_core::units::{DimensionClass, Unit};
//!
//! // Parse units with flexible syntax
//! let u1 = Unit::parse("cm^-1").unwrap();
//! let u2 = Unit::parse("cm⁻¹").unwrap();
//! assert_eq!(u1, u2);
//! assert_eq!(u1.dimension_class(), DimensionClass::InverseLength);
//!
//! // Convert between compatible units
//! let hpa = Unit::parse("hPa").unwrap();
//! let atm = Unit::parse("atm").unwrap();
//! let factor = atm.conversion_factor(&hpa).unwrap();
//! assert!((factor - 1013.25).abs() < 1e-9);
//!
//! // Incompatible units produce errors
//! let kelvin = Unit::parse("K").unwrap();
//! assert!(!hpa.is_compatible(&kelvin));
//! assert!(hpa.conversion_factor(&kelvin).is_err());
//! ```
//!
//! # Dimension classes
//!
//! | Class | Examples |
//! |-------|----------|
//! | Pressure | `Pa`, `hPa`, `mbar`, `atm`, `Torr` |
//! | Temperature | `K` (absolute); `degC`, `degF` parse but never convert |
//! | Length | `m`, `km`, `nm`, `um`, `micron` |
//! | Inverse length | `cm^-1`, `m^-1` |
//! | Acceleration | `m/s^2`, `cm s^-2` |
//! | Area | `cm^2/molecule`, `m^2` |
//! | Dimensionless | `1`, `kg/kg`, `g/kg`, `ppm`, `mol/mol` |
//! | Angle | `deg`, `rad` |
//!
//! # Module Structure
//!
//! - [`dimension`]: Physical dimension exponents and [`DimensionClass`]
//! - [`registry`]: Known units with conversion factors
//! - [`parser`]: Unit string parsing with normalization
//! - [`conversion`]: High-level [`Unit`] type and conversion API
//! - [`quantity`]: [`PhysicalQuantity`] and the [`ingest`] operation

pub mod conversion;
pub mod dimension;
pub mod parser;
pub mod quantity;
pub mod registry;

// Re-export the main types for convenient access
pub use conversion::{conversion_factor, ConversionError, SpectralFamily, Unit};
pub use dimension::{Dimension, DimensionClass};
pub use parser::{ParseError, ParsedUnit};
pub use quantity::{ingest, Ingest, PhysicalQuantity, QuantityValue};
pub use registry::{UnitInfo, UnitRegistry, UNIT_REGISTRY};

#[cfg(test)]
mod tests {
    use super::*;

    /// Typical inputs of a retrieval setup all classify as expected.
    #[test]
    fn test_retrieval_input_units() {
        let cases = [
            ("hPa", DimensionClass::Pressure),
            ("Pa", DimensionClass::Pressure),
            ("K", DimensionClass::Temperature),
            ("kg/kg", DimensionClass::Dimensionless),
            ("g/kg", DimensionClass::Dimensionless),
            ("km", DimensionClass::Length),
            ("m/s^2", DimensionClass::Acceleration),
            ("nm", DimensionClass::Length),
            ("cm^-1", DimensionClass::InverseLength),
            ("cm^2/molecule", DimensionClass::Area),
            ("deg", DimensionClass::Angle),
        ];
        for (text, class) in cases {
            let unit = Unit::parse(text).unwrap();
            assert_eq!(unit.dimension_class(), class, "{text}");
        }
    }

    #[test]
    fn test_specific_humidity_conversion() {
        let g_per_kg = Unit::parse("g/kg").unwrap();
        let kg_per_kg = Unit::parse("kg/kg").unwrap();
        let factor = g_per_kg.conversion_factor(&kg_per_kg).unwrap();
        assert!((factor - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn test_unknown_unit_is_rejected_at_parse() {
        assert!(matches!(
            Unit::parse("furlong"),
            Err(ParseError::UnknownUnit(symbol)) if symbol == "furlong"
        ));
        assert!(matches!(
            Unit::parse("kg/furlong"),
            Err(ParseError::UnknownUnit(_))
        ));
        assert!(serde_json::from_str::<Unit>("\"furlong\"").is_err());
    }

    #[test]
    fn test_angles_do_not_convert_to_ratios() {
        let deg = Unit::parse("deg").unwrap();
        let rad = Unit::parse("rad").unwrap();
        let ppm = Unit::parse("ppm").unwrap();

        let factor = deg.conversion_factor(&rad).unwrap();
        assert!((factor - std::f64::consts::PI / 180.0).abs() < 1e-15);

        assert!(deg.conversion_factor(&ppm).is_err());
        assert!(matches!(
            deg.require_class(DimensionClass::Dimensionless),
            Err(ConversionError::WrongClass {
                found: DimensionClass::Angle,
                ..
            })
        ));
        assert!(!deg.is_dimensionless());
    }
}
