//! Numeric values paired with an explicit unit tag.
//!
//! A [`PhysicalQuantity`] is the currency for moving numbers into unit-tagged
//! storage. Its unit is optional: a quantity built with
//! [`PhysicalQuantity::unitless`] is copied verbatim by [`ingest`], i.e. it is
//! assumed to already be expressed in the target unit. That is a convenience
//! with a sharp edge, so it is logged every time it happens.

use log::warn;
use ndarray::Array1;

use super::conversion::{ConversionError, Unit};
use crate::buffer::SharedArray;
use crate::errors::{RTBXError, RTBXResult};
use crate::precision::Precision;

/// Numeric payload of a [`PhysicalQuantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityValue<T> {
    Scalar(T),
    Array(Array1<T>),
}

impl<T: Precision> QuantityValue<T> {
    /// Number of elements (1 for a scalar).
    pub fn len(&self) -> usize {
        match self {
            QuantityValue::Scalar(_) => 1,
            QuantityValue::Array(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a vector, in order.
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            QuantityValue::Scalar(v) => vec![*v],
            QuantityValue::Array(values) => values.to_vec(),
        }
    }

    fn map(&self, f: impl Fn(T) -> T) -> Self {
        match self {
            QuantityValue::Scalar(v) => QuantityValue::Scalar(f(*v)),
            QuantityValue::Array(values) => QuantityValue::Array(values.mapv(f)),
        }
    }
}

/// A scalar or array value with an optional unit.
///
/// # Examples
///
/// ```rust
/// use rtbx_core::units::{PhysicalQuantity, Unit};
///
/// let p = PhysicalQuantity::array(vec![1013.25, 850.0], Unit::parse("hPa").unwrap());
/// let p_pa = p.convert(&Unit::parse("Pa").unwrap()).unwrap();
/// assert_eq!(p_pa.values(), vec![101325.0, 85000.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalQuantity<T> {
    value: QuantityValue<T>,
    unit: Option<Unit>,
}

impl<T: Precision> PhysicalQuantity<T> {
    /// A unit-tagged scalar.
    pub fn scalar(value: T, unit: Unit) -> Self {
        Self {
            value: QuantityValue::Scalar(value),
            unit: Some(unit),
        }
    }

    /// A unit-tagged array.
    pub fn array(values: impl Into<Array1<T>>, unit: Unit) -> Self {
        Self {
            value: QuantityValue::Array(values.into()),
            unit: Some(unit),
        }
    }

    /// A value without unit.
    ///
    /// Ingesting it copies the numbers verbatim into the target field,
    /// whatever that field's unit is.
    pub fn unitless(value: QuantityValue<T>) -> Self {
        Self { value, unit: None }
    }

    pub fn value(&self) -> &QuantityValue<T> {
        &self.value
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// The numbers in this quantity's own unit.
    pub fn values(&self) -> Vec<T> {
        self.value.to_vec()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Express this quantity in `target`.
    ///
    /// Fails if the quantity has no unit, if the classes differ, or if either
    /// unit is a relative temperature scale.
    pub fn convert(&self, target: &Unit) -> Result<Self, ConversionError> {
        let source = self.unit.as_ref().ok_or_else(|| ConversionError::MissingUnit {
            target: target.to_string(),
        })?;
        let factor = T::from_f64(source.conversion_factor(target)?);
        Ok(Self {
            value: self.value.map(|v| v * factor),
            unit: Some(target.clone()),
        })
    }

    /// The numbers expressed in `target`, following the [`ingest`] rules:
    /// tagged values are converted, untagged values are taken as-is.
    pub fn values_in(&self, target: &Unit) -> RTBXResult<Vec<T>> {
        match &self.unit {
            Some(_) => Ok(self.convert(target)?.values()),
            None => {
                warn!("Interpreting unitless values as '{target}' without conversion");
                Ok(self.values())
            }
        }
    }
}

/// Objects with named, unit-tagged fields that accept quantities.
///
/// Implementors resolve `field` to one of their buffers and its declared unit,
/// then defer to [`ingest`]. Unknown names fail with
/// [`RTBXError::UnknownField`].
pub trait Ingest<T: Precision> {
    /// Copy `source` into the field called `field`, converting as needed.
    fn ingest(&self, field: &str, source: &PhysicalQuantity<T>) -> RTBXResult<()>;
}

/// Copy a quantity into unit-tagged storage.
///
/// If `source` carries a unit, its values are converted into `target_unit`
/// first. If it does not, the values are copied verbatim and interpreted as
/// already being in `target_unit`.
///
/// All checks (dimension, relative scales, element count) happen before the
/// target is touched: on error the target keeps its previous contents.
pub fn ingest<T: Precision>(
    target: &SharedArray<T>,
    target_unit: &Unit,
    source: &PhysicalQuantity<T>,
) -> RTBXResult<()> {
    if source.len() != target.len() {
        return Err(RTBXError::shape_mismatch(
            format!("field in '{target_unit}'"),
            target.len(),
            source.len(),
        ));
    }
    let values = source.values_in(target_unit)?;
    target.assign(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(s: &str) -> Unit {
        Unit::parse(s).unwrap()
    }

    #[test]
    fn test_convert_scalar() {
        let q = PhysicalQuantity::scalar(9.80665_f64, unit("m/s^2"));
        let converted = q.convert(&unit("cm/s^2")).unwrap();
        assert_relative_eq!(converted.values()[0], 980.665, epsilon = 1e-9);
        assert_eq!(converted.unit(), Some(&unit("cm s^-2")));
    }

    #[test]
    fn test_convert_round_trip() {
        let q = PhysicalQuantity::array(vec![0.5_f64, 2.0, 17.25], unit("km"));
        let back = q
            .convert(&unit("m"))
            .unwrap()
            .convert(&unit("km"))
            .unwrap();
        for (a, b) in q.values().iter().zip(back.values()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_convert_without_unit_fails() {
        let q = PhysicalQuantity::unitless(QuantityValue::Scalar(1.0_f64));
        assert!(matches!(
            q.convert(&unit("K")),
            Err(ConversionError::MissingUnit { .. })
        ));
    }

    #[test]
    fn test_ingest_scales_by_factor() {
        let target = SharedArray::from_vec(vec![0.0_f64; 3]);
        let source = PhysicalQuantity::array(vec![1000.0, 500.0, 1.0], unit("hPa"));
        ingest(&target, &unit("Pa"), &source).unwrap();
        assert_eq!(target.to_vec(), vec![100000.0, 50000.0, 100.0]);
    }

    #[test]
    fn test_ingest_unitless_copies_verbatim() {
        let target = SharedArray::from_vec(vec![0.0_f32; 2]);
        let source = PhysicalQuantity::unitless(QuantityValue::Array(Array1::from(vec![
            250.0_f32, 260.0,
        ])));
        ingest(&target, &unit("K"), &source).unwrap();
        assert_eq!(target.to_vec(), vec![250.0, 260.0]);
    }

    #[test]
    fn test_ingest_dimension_error_is_atomic() {
        let target = SharedArray::from_vec(vec![1.0_f64, 2.0]);
        let source = PhysicalQuantity::array(vec![5.0, 6.0], unit("K"));
        let result = ingest(&target, &unit("hPa"), &source);
        assert!(matches!(result, Err(RTBXError::Dimension(_))));
        assert_eq!(target.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_ingest_shape_error_is_atomic() {
        let target = SharedArray::from_vec(vec![1.0_f64, 2.0, 3.0]);
        let source = PhysicalQuantity::array(vec![5.0, 6.0], unit("hPa"));
        let result = ingest(&target, &unit("hPa"), &source);
        assert!(matches!(
            result,
            Err(RTBXError::ShapeMismatch {
                expected: 3,
                got: 2,
                ..
            })
        ));
        assert_eq!(target.to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ingest_celsius_into_kelvin_rejected() {
        let target = SharedArray::from_vec(vec![273.15_f64]);
        let source = PhysicalQuantity::scalar(25.0, unit("degC"));
        assert!(ingest(&target, &unit("K"), &source).is_err());
        assert_eq!(target.to_vec(), vec![273.15]);
    }
}
