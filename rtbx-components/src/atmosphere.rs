//! The Earth atmosphere container.
//!
//! An [`EarthAtmosphere`] has two independent pressure grids:
//!
//! - the retrieval grid, on which retrieved quantities such as gas VMRs live
//! - the meteorological grid, carrying temperature, specific humidity,
//!   altitude and gravity
//!
//! Level counts and units are fixed when the atmosphere is built; every buffer
//! is zero-filled and then filled in place, usually through [`Ingest`].
//! Layer buffers are only refreshed by [`EarthAtmosphere::calculate_layers`].

use std::fmt;

use log::debug;
use rtbx_core::errors::{RTBXError, RTBXResult};
use rtbx_core::grid::LayeredGrid;
use rtbx_core::precision::Precision;
use rtbx_core::units::{DimensionClass, Ingest, PhysicalQuantity, Unit};
use serde::{Deserialize, Serialize};

use crate::components::GasAbsorber;
use crate::element::{any_matches_capability, AtmosphereElement, Capability};

/// Declared units of every grid and profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereUnits {
    pub retrieval_pressure: Unit,
    pub met_pressure: Unit,
    pub temperature: Unit,
    pub specific_humidity: Unit,
    pub altitude: Unit,
    pub gravity: Unit,
}

impl AtmosphereUnits {
    /// hPa for both pressure grids, K, kg/kg, m and m/s^2.
    pub fn standard() -> RTBXResult<Self> {
        Ok(Self {
            retrieval_pressure: Unit::parse("hPa")?,
            met_pressure: Unit::parse("hPa")?,
            temperature: Unit::parse("K")?,
            specific_humidity: Unit::parse("kg/kg")?,
            altitude: Unit::parse("m")?,
            gravity: Unit::parse("m/s^2")?,
        })
    }
}

/// Serialized construction arguments of an [`EarthAtmosphere`].
///
/// ```toml
/// n_retrieval_levels = 20
/// n_met_levels = 72
///
/// [units]
/// retrieval_pressure = "hPa"
/// met_pressure = "Pa"
/// temperature = "K"
/// specific_humidity = "g/kg"
/// altitude = "km"
/// gravity = "m s^-2"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereConfig {
    pub n_retrieval_levels: usize,
    pub n_met_levels: usize,
    pub units: AtmosphereUnits,
}

impl AtmosphereConfig {
    pub fn from_toml_str(text: &str) -> RTBXResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Physical state of the atmosphere plus its constituents.
pub struct EarthAtmosphere<T> {
    retrieval_pressure: LayeredGrid<T>,
    met_pressure: LayeredGrid<T>,
    temperature: LayeredGrid<T>,
    specific_humidity: LayeredGrid<T>,
    altitude: LayeredGrid<T>,
    gravity: LayeredGrid<T>,
    elements: Vec<AtmosphereElement<T>>,
}

impl<T: Precision> EarthAtmosphere<T> {
    /// A zero-filled atmosphere.
    ///
    /// Each unit must belong to its grid's class; temperature must be an
    /// absolute scale.
    pub fn new(
        n_retrieval_levels: usize,
        n_met_levels: usize,
        units: AtmosphereUnits,
    ) -> RTBXResult<Self> {
        Ok(Self {
            retrieval_pressure: LayeredGrid::with_class(
                "retrieval_pressure",
                n_retrieval_levels,
                units.retrieval_pressure,
                DimensionClass::Pressure,
            )?,
            met_pressure: LayeredGrid::with_class(
                "met_pressure",
                n_met_levels,
                units.met_pressure,
                DimensionClass::Pressure,
            )?,
            temperature: LayeredGrid::with_class(
                "temperature",
                n_met_levels,
                units.temperature,
                DimensionClass::Temperature,
            )?,
            specific_humidity: LayeredGrid::with_class(
                "specific_humidity",
                n_met_levels,
                units.specific_humidity,
                DimensionClass::Dimensionless,
            )?,
            altitude: LayeredGrid::with_class(
                "altitude",
                n_met_levels,
                units.altitude,
                DimensionClass::Length,
            )?,
            gravity: LayeredGrid::with_class(
                "gravity",
                n_met_levels,
                units.gravity,
                DimensionClass::Acceleration,
            )?,
            elements: Vec::new(),
        })
    }

    pub fn from_config(config: &AtmosphereConfig) -> RTBXResult<Self> {
        Self::new(
            config.n_retrieval_levels,
            config.n_met_levels,
            config.units.clone(),
        )
    }

    pub fn from_toml_str(text: &str) -> RTBXResult<Self> {
        Self::from_config(&AtmosphereConfig::from_toml_str(text)?)
    }

    pub fn config(&self) -> AtmosphereConfig {
        AtmosphereConfig {
            n_retrieval_levels: self.n_retrieval_levels(),
            n_met_levels: self.n_met_levels(),
            units: self.units(),
        }
    }

    pub fn units(&self) -> AtmosphereUnits {
        AtmosphereUnits {
            retrieval_pressure: self.retrieval_pressure.unit().clone(),
            met_pressure: self.met_pressure.unit().clone(),
            temperature: self.temperature.unit().clone(),
            specific_humidity: self.specific_humidity.unit().clone(),
            altitude: self.altitude.unit().clone(),
            gravity: self.gravity.unit().clone(),
        }
    }

    pub fn n_retrieval_levels(&self) -> usize {
        self.retrieval_pressure.n_levels()
    }

    pub fn n_retrieval_layers(&self) -> usize {
        self.retrieval_pressure.n_layers()
    }

    pub fn n_met_levels(&self) -> usize {
        self.met_pressure.n_levels()
    }

    pub fn n_met_layers(&self) -> usize {
        self.met_pressure.n_layers()
    }

    pub fn retrieval_pressure(&self) -> &LayeredGrid<T> {
        &self.retrieval_pressure
    }

    pub fn met_pressure(&self) -> &LayeredGrid<T> {
        &self.met_pressure
    }

    pub fn temperature(&self) -> &LayeredGrid<T> {
        &self.temperature
    }

    pub fn specific_humidity(&self) -> &LayeredGrid<T> {
        &self.specific_humidity
    }

    pub fn altitude(&self) -> &LayeredGrid<T> {
        &self.altitude
    }

    pub fn gravity(&self) -> &LayeredGrid<T> {
        &self.gravity
    }

    fn grids(&self) -> [&LayeredGrid<T>; 6] {
        [
            &self.retrieval_pressure,
            &self.met_pressure,
            &self.temperature,
            &self.specific_humidity,
            &self.altitude,
            &self.gravity,
        ]
    }

    /// Grid or profile by name, e.g. `"met_pressure"` or `"temperature"`.
    pub fn grid(&self, name: &str) -> Option<&LayeredGrid<T>> {
        self.grids().into_iter().find(|g| g.name() == name)
    }

    /// Pressure at the bottom level of the meteorological grid.
    pub fn surface_pressure(&self) -> T {
        self.met_pressure.last_level()
    }

    /// Recompute the layers of both pressure grids and every profile.
    ///
    /// Nothing tracks level changes; call this after filling or editing
    /// levels and before reading layers.
    pub fn calculate_layers(&self) {
        for grid in self.grids() {
            grid.calculate_layers();
        }
        debug!(
            "Recomputed layers ({} retrieval, {} met)",
            self.n_retrieval_layers(),
            self.n_met_layers()
        );
    }

    pub fn elements(&self) -> &[AtmosphereElement<T>] {
        &self.elements
    }

    /// Append an element. Gas absorbers must carry one VMR per retrieval level.
    pub fn add_element(&mut self, element: AtmosphereElement<T>) -> RTBXResult<()> {
        if let Some(absorber) = element.as_gas_absorber() {
            if absorber.n_levels() != self.n_retrieval_levels() {
                return Err(RTBXError::shape_mismatch(
                    format!("VMR profile of '{}'", absorber.name()),
                    self.n_retrieval_levels(),
                    absorber.n_levels(),
                ));
            }
        }
        debug!("Adding atmosphere element '{}'", element.name());
        self.elements.push(element);
        Ok(())
    }

    /// Remove and return the element at `index`, if any.
    pub fn remove_element(&mut self, index: usize) -> Option<AtmosphereElement<T>> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    /// Remove and return the first element called `name`, if any.
    pub fn remove_element_named(&mut self, name: &str) -> Option<AtmosphereElement<T>> {
        let index = self.elements.iter().position(|e| e.name() == name)?;
        Some(self.elements.remove(index))
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        any_matches_capability(&self.elements, capability)
    }

    /// Gas absorbers in insertion order.
    pub fn gas_absorbers(&self) -> impl Iterator<Item = &GasAbsorber<T>> {
        self.elements.iter().filter_map(AtmosphereElement::as_gas_absorber)
    }

    pub fn gas_absorber(&self, name: &str) -> Option<&GasAbsorber<T>> {
        self.gas_absorbers().find(|g| g.name() == name)
    }
}

impl<T: Precision> Ingest<T> for EarthAtmosphere<T> {
    /// Fields are `<grid>_levels` and `<grid>_layers`, for example
    /// `temperature_levels` or `met_pressure_layers`.
    fn ingest(&self, field: &str, source: &PhysicalQuantity<T>) -> RTBXResult<()> {
        let target = field
            .strip_suffix("_levels")
            .map(|name| (name, "levels"))
            .or_else(|| field.strip_suffix("_layers").map(|name| (name, "layers")));

        match target.and_then(|(name, part)| Some((self.grid(name)?, part))) {
            Some((grid, part)) => grid.ingest(part, source),
            None => Err(RTBXError::UnknownField {
                owner: "Earth atmosphere".to_string(),
                field: field.to_string(),
            }),
        }
    }
}

impl<T: Precision> fmt::Debug for EarthAtmosphere<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EarthAtmosphere")
            .field("retrieval_pressure", &self.retrieval_pressure)
            .field("met_pressure", &self.met_pressure)
            .field("temperature", &self.temperature)
            .field("specific_humidity", &self.specific_humidity)
            .field("altitude", &self.altitude)
            .field("gravity", &self.gravity)
            .field("elements", &self.elements)
            .finish()
    }
}

impl<T: Precision> fmt::Display for EarthAtmosphere<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Earth atmosphere")?;
        for grid in self.grids() {
            writeln!(f, "  {grid}")?;
        }
        let names: Vec<&str> = self.elements.iter().map(AtmosphereElement::name).collect();
        write!(f, "  elements: [{}]", names.join(", "))
    }
}
