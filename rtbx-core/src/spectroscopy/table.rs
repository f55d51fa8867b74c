use std::fmt;

use log::{debug, info};
use ndarray::{Array1, Array2, Array4, ArrayView1, Axis};

use super::interpolate::{
    clamp_to_axis, is_strictly_ascending, is_strictly_descending, locate, Bracket,
};
use super::schema::SpectroscopyFile;
use crate::errors::{RTBXError, RTBXResult};
use crate::precision::Precision;
use crate::units::{DimensionClass, PhysicalQuantity, SpectralFamily, Unit};

/// Brackets on the pressure axis and on both pressure columns' temperature rows.
#[derive(Debug, Clone, Copy)]
struct StateBrackets<T> {
    pressure: Bracket<T>,
    temperature_lo: Bracket<T>,
    temperature_hi: Bracket<T>,
    broadener: Bracket<T>,
}

/// A 4-axis absorption cross-section table for one gas.
///
/// The tensor is indexed `[spectral, broadener, temperature, pressure]`. The
/// temperature axis is not shared: every pressure point owns its own
/// ascending temperature row, so the (pressure, temperature) plane is
/// curvilinear.
///
/// Tables are immutable once loaded and are shared between absorbers through
/// `Arc`.
#[derive(Debug, Clone)]
pub struct SpectroscopyTable<T> {
    file_name: String,
    gas_name: String,
    spectral: Array1<T>,
    spectral_unit: Unit,
    spectral_family: SpectralFamily,
    broadener_vmrs: Array1<T>,
    pressures: Array1<T>,
    pressure_unit: Unit,
    temperatures: Array2<T>,
    temperature_unit: Unit,
    cross_section: Array4<T>,
    cross_section_unit: Unit,
    scale_factor: Option<f64>,
}

fn to_array<T: Precision>(values: &[f64]) -> Array1<T> {
    values.iter().map(|&v| T::from_f64(v)).collect()
}

fn invalid(file: &SpectroscopyFile, reason: impl Into<String>) -> RTBXError {
    RTBXError::construction(format!("spectroscopy table '{}'", file.file_name), reason)
}

impl<T: Precision> SpectroscopyTable<T> {
    /// Validate a parsed file and build the table.
    ///
    /// Checks unit classes, axis ordering and tensor shape before anything is
    /// built. A scale factor, if present, is multiplied into the tensor here
    /// and only recorded afterwards. A descending pressure axis is reversed,
    /// together with its temperature rows and the tensor's pressure axis.
    pub fn load(mut file: SpectroscopyFile) -> RTBXResult<Self> {
        let spectral_family = file.spectral.unit.spectral_family().ok_or_else(|| {
            let unit = &file.spectral.unit;
            invalid(
                &file,
                format!("spectral unit '{unit}' is neither wavelength nor wavenumber"),
            )
        })?;
        file.pressures.unit.require_class(DimensionClass::Pressure)?;
        file.temperatures.unit.require_class(DimensionClass::Temperature)?;
        file.cross_section.unit.require_class(DimensionClass::Area)?;

        let nw = file.spectral.values.len();
        let nb = file.broadener_vmrs.len();
        let np = file.pressures.values.len();
        let nt = file.temperatures.values.first().map_or(0, Vec::len);

        if nw < 2 || !is_strictly_ascending(&file.spectral.values) {
            return Err(invalid(&file, "spectral axis needs at least 2 strictly ascending points"));
        }
        if nb < 1 || !is_strictly_ascending(&file.broadener_vmrs) {
            return Err(invalid(&file, "broadener axis must be non-empty and strictly ascending"));
        }
        let pressures_descending = is_strictly_descending(&file.pressures.values);
        if np < 2 || !(pressures_descending || is_strictly_ascending(&file.pressures.values)) {
            return Err(invalid(&file, "pressure axis needs at least 2 strictly ordered points"));
        }
        if file.temperatures.values.len() != np {
            return Err(RTBXError::shape_mismatch(
                "temperature rows",
                np,
                file.temperatures.values.len(),
            ));
        }
        if nt < 2 {
            return Err(invalid(&file, "temperature rows need at least 2 points"));
        }
        for (i, row) in file.temperatures.values.iter().enumerate() {
            if row.len() != nt {
                return Err(RTBXError::shape_mismatch(
                    format!("temperature row {i}"),
                    nt,
                    row.len(),
                ));
            }
            if !is_strictly_ascending(row) {
                let reason = format!("temperature row {i} is not strictly ascending");
                return Err(invalid(&file, reason));
            }
        }

        let expected_shape = [nw, nb, nt, np];
        if file.cross_section.shape != expected_shape {
            return Err(invalid(
                &file,
                format!(
                    "cross section shape {:?} does not match axes {:?}",
                    file.cross_section.shape, expected_shape
                ),
            ));
        }
        let n_values: usize = expected_shape.iter().product();
        if file.cross_section.values.len() != n_values {
            return Err(RTBXError::shape_mismatch(
                "cross section values",
                n_values,
                file.cross_section.values.len(),
            ));
        }

        if pressures_descending {
            debug!("{}: reversing descending pressure axis", file.file_name);
            file.pressures.values.reverse();
            file.temperatures.values.reverse();
        }

        let flat_temperatures: Vec<T> = file
            .temperatures
            .values
            .iter()
            .flatten()
            .map(|&v| T::from_f64(v))
            .collect();
        let temperatures = Array2::from_shape_vec((np, nt), flat_temperatures)
            .map_err(|e| invalid(&file, e.to_string()))?;

        let scale = file.scale_factor.unwrap_or(1.0);
        let scaled: Vec<T> = file
            .cross_section
            .values
            .iter()
            .map(|&v| T::from_f64(v * scale))
            .collect();
        let mut cross_section = Array4::from_shape_vec((nw, nb, nt, np), scaled)
            .map_err(|e| invalid(&file, e.to_string()))?;
        if pressures_descending {
            cross_section.invert_axis(Axis(3));
            cross_section = cross_section.as_standard_layout().into_owned();
        }

        info!(
            "Loaded {} absorption table '{}' \
             [{nw} spectral x {nb} broadener x {nt} temperature x {np} pressure], \
             scale factor {}",
            file.gas_name,
            file.file_name,
            file.scale_factor.map_or("none".to_string(), |s| s.to_string())
        );

        Ok(Self {
            spectral: to_array(&file.spectral.values),
            broadener_vmrs: to_array(&file.broadener_vmrs),
            pressures: to_array(&file.pressures.values),
            temperatures,
            cross_section,
            file_name: file.file_name,
            gas_name: file.gas_name,
            spectral_unit: file.spectral.unit,
            spectral_family,
            pressure_unit: file.pressures.unit,
            temperature_unit: file.temperatures.unit,
            cross_section_unit: file.cross_section.unit,
            scale_factor: file.scale_factor,
        })
    }

    /// Parse a TOML document in the [`SpectroscopyFile`] layout and load it.
    pub fn from_toml_str(text: &str) -> RTBXResult<Self> {
        Self::load(SpectroscopyFile::from_toml_str(text)?)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn gas_name(&self) -> &str {
        &self.gas_name
    }

    pub fn spectral(&self) -> ArrayView1<'_, T> {
        self.spectral.view()
    }

    pub fn spectral_unit(&self) -> &Unit {
        &self.spectral_unit
    }

    pub fn spectral_family(&self) -> SpectralFamily {
        self.spectral_family
    }

    pub fn broadener_vmrs(&self) -> ArrayView1<'_, T> {
        self.broadener_vmrs.view()
    }

    pub fn pressures(&self) -> ArrayView1<'_, T> {
        self.pressures.view()
    }

    pub fn pressure_unit(&self) -> &Unit {
        &self.pressure_unit
    }

    /// Temperature rows, shape `(Np, Nt)`.
    pub fn temperatures(&self) -> &Array2<T> {
        &self.temperatures
    }

    pub fn temperature_unit(&self) -> &Unit {
        &self.temperature_unit
    }

    /// Cross sections, shape `(Nw, Nb, Nt, Np)`, scale factor applied.
    pub fn cross_section(&self) -> &Array4<T> {
        &self.cross_section
    }

    pub fn cross_section_unit(&self) -> &Unit {
        &self.cross_section_unit
    }

    /// Scale factor that was baked into the tensor at load time.
    pub fn scale_factor(&self) -> Option<f64> {
        self.scale_factor
    }

    fn bounds_error(axis: &str, value: T, values: ArrayView1<T>) -> RTBXError {
        RTBXError::Bounds {
            axis: axis.to_string(),
            value: value.as_f64(),
            lower: values[0].as_f64(),
            upper: values[values.len() - 1].as_f64(),
        }
    }

    fn locate_spectral(&self, spectral: T) -> RTBXResult<Bracket<T>> {
        locate(self.spectral.view(), spectral)
            .ok_or_else(|| Self::bounds_error("spectral", spectral, self.spectral.view()))
    }

    fn locate_state(
        &self,
        pressure: T,
        temperature: T,
        broadener: T,
    ) -> RTBXResult<StateBrackets<T>> {
        let (clamped, moved) = clamp_to_axis(self.pressures.view(), pressure);
        if moved {
            debug!(
                "{}: pressure {pressure} {} clamped to {clamped}",
                self.gas_name, self.pressure_unit
            );
        }
        let pressure_bracket = locate(self.pressures.view(), clamped)
            .ok_or_else(|| Self::bounds_error("pressure", pressure, self.pressures.view()))?
            .collapsed();

        let locate_temperature = |ip: usize| {
            let row = self.temperatures.row(ip);
            locate(row, temperature).ok_or_else(|| {
                Self::bounds_error(&format!("temperature (pressure index {ip})"), temperature, row)
            })
        };
        let temperature_lo = locate_temperature(pressure_bracket.lo)?;
        let temperature_hi = locate_temperature(pressure_bracket.hi)?;

        let broadener_bracket = if self.broadener_vmrs.len() == 1 {
            Bracket::degenerate()
        } else {
            locate(self.broadener_vmrs.view(), broadener).ok_or_else(|| {
                Self::bounds_error("broadener", broadener, self.broadener_vmrs.view())
            })?
        };

        Ok(StateBrackets {
            pressure: pressure_bracket,
            temperature_lo,
            temperature_hi,
            broadener: broadener_bracket,
        })
    }

    /// Blend over spectral, broadener and temperature within one pressure column.
    fn column(&self, w: &Bracket<T>, b: &Bracket<T>, t: &Bracket<T>, ip: usize) -> T {
        let at = |iw: usize, ib: usize, it: usize| self.cross_section[[iw, ib, it, ip]];
        let spectral_blend = |ib: usize, it: usize| w.blend(at(w.lo, ib, it), at(w.hi, ib, it));
        let broadener_blend =
            |it: usize| b.blend(spectral_blend(b.lo, it), spectral_blend(b.hi, it));
        t.blend(broadener_blend(t.lo), broadener_blend(t.hi))
    }

    fn evaluate(&self, w: &Bracket<T>, state: &StateBrackets<T>) -> T {
        let lo = self.column(w, &state.broadener, &state.temperature_lo, state.pressure.lo);
        let hi = self.column(w, &state.broadener, &state.temperature_hi, state.pressure.hi);
        state.pressure.blend(lo, hi)
    }

    /// Interpolated cross section at one point.
    ///
    /// All inputs are in the table's own units. Pressure outside the table is
    /// clamped to the nearest end; temperature, broadener fraction and
    /// spectral coordinate outside their axes fail with
    /// [`RTBXError::Bounds`]. Querying an exact grid point returns the stored
    /// value.
    pub fn lookup(&self, spectral: T, pressure: T, temperature: T, broadener: T) -> RTBXResult<T> {
        let state = self.locate_state(pressure, temperature, broadener)?;
        let w = self.locate_spectral(spectral)?;
        Ok(self.evaluate(&w, &state))
    }

    /// Interpolated cross sections along a spectral grid at a fixed state.
    ///
    /// Fails on the first spectral point outside the table.
    pub fn lookup_spectrum(
        &self,
        spectral: ArrayView1<T>,
        pressure: T,
        temperature: T,
        broadener: T,
    ) -> RTBXResult<Array1<T>> {
        let state = self.locate_state(pressure, temperature, broadener)?;
        spectral
            .iter()
            .map(|&s| -> RTBXResult<T> { Ok(self.evaluate(&self.locate_spectral(s)?, &state)) })
            .collect()
    }

    /// [`Self::lookup`] with unit-tagged inputs.
    ///
    /// Each quantity must hold a single value. The spectral coordinate may be
    /// given in either family. Untagged quantities are taken as already in
    /// the table's units.
    pub fn lookup_in_units(
        &self,
        spectral: &PhysicalQuantity<T>,
        pressure: &PhysicalQuantity<T>,
        temperature: &PhysicalQuantity<T>,
        broadener: T,
    ) -> RTBXResult<PhysicalQuantity<T>> {
        let spectral_value = match spectral.unit() {
            Some(unit) => T::from_f64(
                unit.convert_spectral(single(spectral, "spectral")?.as_f64(), &self.spectral_unit)?,
            ),
            None => single(spectral, "spectral")?,
        };
        let pressure_value = single_in(pressure, &self.pressure_unit, "pressure")?;
        let temperature_value = single_in(temperature, &self.temperature_unit, "temperature")?;

        let value = self.lookup(spectral_value, pressure_value, temperature_value, broadener)?;
        Ok(PhysicalQuantity::scalar(value, self.cross_section_unit.clone()))
    }
}

fn single<T: Precision>(quantity: &PhysicalQuantity<T>, what: &str) -> RTBXResult<T> {
    match quantity.values().as_slice() {
        [value] => Ok(*value),
        values => Err(RTBXError::shape_mismatch(what, 1, values.len())),
    }
}

fn single_in<T: Precision>(
    quantity: &PhysicalQuantity<T>,
    unit: &Unit,
    what: &str,
) -> RTBXResult<T> {
    match quantity.values_in(unit)?.as_slice() {
        [value] => Ok(*value),
        values => Err(RTBXError::shape_mismatch(what, 1, values.len())),
    }
}

impl<T: Precision> fmt::Display for SpectroscopyTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.cross_section.shape();
        write!(
            f,
            "{} ({}): {}x{}x{}x{} [{}]",
            self.gas_name,
            self.file_name,
            shape[0],
            shape[1],
            shape[2],
            shape[3],
            self.cross_section_unit
        )
    }
}
