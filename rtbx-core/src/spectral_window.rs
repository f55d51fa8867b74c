//! Spectral regions of interest.
//!
//! A [`SpectralWindow`] stores its limits, reference point and high-resolution
//! grid in one unit. The unit's [`SpectralFamily`] is fixed at construction and
//! decides which accessor family may be used: `wavelength_*` on a window built
//! in `nm` works, `wavenumber_*` on the same window fails with
//! [`RTBXError::SpectralFamilyMismatch`]. Accessors never convert; use
//! [`SpectralWindow::convert_to`] to obtain a window in the other family.

use std::fmt;

use log::warn;
use ndarray::Array1;

use crate::errors::{RTBXError, RTBXResult};
use crate::precision::Precision;
use crate::units::{SpectralFamily, Unit};

/// A named spectral interval with its high-resolution evaluation grid.
#[derive(Debug, Clone)]
pub struct SpectralWindow<T> {
    name: String,
    lower: T,
    upper: T,
    grid: Array1<T>,
    unit: Unit,
    family: SpectralFamily,
    reference: T,
}

impl<T: Precision> SpectralWindow<T> {
    /// Build a window.
    ///
    /// `unit` must be a length or inverse-length unit, `lower < upper` and the
    /// grid must be non-empty. A grid that does not extend beyond both limits
    /// is accepted with a warning. `reference` may lie anywhere.
    pub fn new(
        name: &str,
        lower: T,
        upper: T,
        grid: impl Into<Array1<T>>,
        unit: Unit,
        reference: T,
    ) -> RTBXResult<Self> {
        let family = unit.spectral_family().ok_or_else(|| {
            RTBXError::construction(
                format!("spectral window '{name}'"),
                format!(
                    "unit '{unit}' is {}, expected a wavelength or wavenumber unit",
                    unit.dimension_class()
                ),
            )
        })?;
        if !(lower < upper) {
            return Err(RTBXError::construction(
                format!("spectral window '{name}'"),
                format!("lower limit {lower} must be below upper limit {upper}"),
            ));
        }
        let grid = grid.into();
        if grid.is_empty() {
            return Err(RTBXError::construction(
                format!("spectral window '{name}'"),
                "high-resolution grid is empty",
            ));
        }

        let grid_min = grid.iter().copied().fold(T::infinity(), T::min);
        let grid_max = grid.iter().copied().fold(T::neg_infinity(), T::max);
        if grid_min > lower || grid_max < upper {
            warn!(
                "Spectral window '{name}': grid [{grid_min}, {grid_max}] \
                 does not span limits [{lower}, {upper}] {unit}"
            );
        }

        Ok(Self {
            name: name.to_string(),
            lower,
            upper,
            grid,
            unit,
            family,
            reference,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn family(&self) -> SpectralFamily {
        self.family
    }

    /// Number of high-resolution samples.
    pub fn n_hires(&self) -> usize {
        self.grid.len()
    }

    fn require(&self, requested: SpectralFamily) -> RTBXResult<()> {
        if self.family == requested {
            Ok(())
        } else {
            Err(RTBXError::SpectralFamilyMismatch {
                name: format!("spectral window '{}'", self.name),
                stored: self.family.to_string(),
                requested: requested.to_string(),
            })
        }
    }

    pub fn wavelength_lower(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavelength)?;
        Ok(self.lower)
    }

    pub fn wavelength_upper(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavelength)?;
        Ok(self.upper)
    }

    pub fn wavelength_grid(&self) -> RTBXResult<&Array1<T>> {
        self.require(SpectralFamily::Wavelength)?;
        Ok(&self.grid)
    }

    pub fn wavelength_reference(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavelength)?;
        Ok(self.reference)
    }

    pub fn wavenumber_lower(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavenumber)?;
        Ok(self.lower)
    }

    pub fn wavenumber_upper(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavenumber)?;
        Ok(self.upper)
    }

    pub fn wavenumber_grid(&self) -> RTBXResult<&Array1<T>> {
        self.require(SpectralFamily::Wavenumber)?;
        Ok(&self.grid)
    }

    pub fn wavenumber_reference(&self) -> RTBXResult<T> {
        self.require(SpectralFamily::Wavenumber)?;
        Ok(self.reference)
    }

    /// True if `value` (in the window's unit) lies within the limits.
    pub fn contains(&self, value: T) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Grid indices whose samples lie inside the limits.
    pub fn inner_index_range(&self) -> Vec<usize> {
        self.grid
            .iter()
            .enumerate()
            .filter(|&(_, &v)| self.contains(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// The same window expressed in `unit`.
    ///
    /// Crossing families inverts every value, so the limits swap and the grid
    /// is reversed to stay ascending.
    pub fn convert_to(&self, unit: &Unit) -> RTBXResult<Self> {
        let convert = |v: T| -> RTBXResult<T> {
            Ok(T::from_f64(self.unit.convert_spectral(v.as_f64(), unit)?))
        };
        let target_family = unit.spectral_family();
        let flips = target_family.is_some_and(|f| f != self.family);

        let mut grid = self
            .grid
            .iter()
            .map(|&v| convert(v))
            .collect::<RTBXResult<Vec<T>>>()?;
        let (mut lower, mut upper) = (convert(self.lower)?, convert(self.upper)?);
        if flips {
            grid.reverse();
            std::mem::swap(&mut lower, &mut upper);
        }

        Self::new(
            &self.name,
            lower,
            upper,
            grid,
            unit.clone(),
            convert(self.reference)?,
        )
    }
}

impl<T: Precision> fmt::Display for SpectralWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}, {}] {} ({} samples)",
            self.name,
            self.lower,
            self.upper,
            self.unit,
            self.n_hires()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn o2_a_band() -> SpectralWindow<f64> {
        let grid: Vec<f64> = (0..=40).map(|i| 755.0 + 0.5 * i as f64).collect();
        SpectralWindow::new(
            "o2a",
            757.0,
            773.0,
            grid,
            Unit::parse("nm").unwrap(),
            765.0,
        )
        .unwrap()
    }

    #[test]
    fn test_wavelength_window_accessors() {
        let window = o2_a_band();
        assert_eq!(window.family(), SpectralFamily::Wavelength);
        assert_eq!(window.n_hires(), 41);
        assert_eq!(window.wavelength_lower().unwrap(), 757.0);
        assert_eq!(window.wavelength_upper().unwrap(), 773.0);
        assert_eq!(window.wavelength_reference().unwrap(), 765.0);
        assert_eq!(window.wavelength_grid().unwrap().len(), 41);
    }

    #[test]
    fn test_wrong_family_is_rejected() {
        let window = o2_a_band();
        assert!(matches!(
            window.wavenumber_lower(),
            Err(RTBXError::SpectralFamilyMismatch { .. })
        ));
        assert!(matches!(
            window.wavenumber_grid(),
            Err(RTBXError::SpectralFamilyMismatch { .. })
        ));
        assert!(window.wavenumber_upper().is_err());
        assert!(window.wavenumber_reference().is_err());
    }

    #[test]
    fn test_construction_checks() {
        let nm = Unit::parse("nm").unwrap();
        assert!(matches!(
            SpectralWindow::new("x", 1.0, 2.0, vec![1.0], Unit::parse("hPa").unwrap(), 1.5),
            Err(RTBXError::Construction { .. })
        ));
        assert!(matches!(
            SpectralWindow::new("x", 2.0, 1.0, vec![1.0, 2.0], nm.clone(), 1.5),
            Err(RTBXError::Construction { .. })
        ));
        assert!(matches!(
            SpectralWindow::<f64>::new("x", 1.0, 2.0, Vec::new(), nm, 1.5),
            Err(RTBXError::Construction { .. })
        ));
    }

    #[test]
    fn test_reference_outside_limits_is_allowed() {
        let window = SpectralWindow::new(
            "x",
            1.0_f64,
            2.0,
            vec![0.5, 1.5, 2.5],
            Unit::parse("cm^-1").unwrap(),
            10.0,
        )
        .unwrap();
        assert_eq!(window.wavenumber_reference().unwrap(), 10.0);
    }

    #[test]
    fn test_inner_index_range() {
        let window = o2_a_band();
        let inner = window.inner_index_range();
        assert_eq!(inner.first(), Some(&4));
        assert_eq!(inner.last(), Some(&36));
        assert!(window.contains(760.0));
        assert!(!window.contains(780.0));
    }

    #[test]
    fn test_convert_to_wavenumber() {
        let window = o2_a_band();
        let converted = window.convert_to(&Unit::parse("cm^-1").unwrap()).unwrap();
        assert_eq!(converted.family(), SpectralFamily::Wavenumber);
        assert_relative_eq!(converted.wavenumber_lower().unwrap(), 1e7 / 773.0, epsilon = 1e-6);
        assert_relative_eq!(converted.wavenumber_upper().unwrap(), 1e7 / 757.0, epsilon = 1e-6);

        let grid = converted.wavenumber_grid().unwrap();
        assert!(grid.windows(2).into_iter().all(|w| w[0] < w[1]));
        assert!(converted.wavelength_lower().is_err());
    }

    #[test]
    fn test_convert_within_family() {
        let window = o2_a_band();
        let um = window.convert_to(&Unit::parse("um").unwrap()).unwrap();
        assert_relative_eq!(um.wavelength_lower().unwrap(), 0.757, epsilon = 1e-12);
        assert_relative_eq!(um.wavelength_reference().unwrap(), 0.765, epsilon = 1e-12);
    }
}
