//! Trace gas absorption by one species.
//!
//! A [`GasAbsorber`] pairs a shared [`SpectroscopyTable`] with a volume mixing
//! ratio profile on the retrieval grid. The profile is held through a
//! [`SharedArray`] handle: by default the caller's buffer is shared, so later
//! writes on either side are seen by both. [`GasAbsorber::new_copied`] takes a
//! private copy instead.

use std::fmt;
use std::sync::Arc;

use rtbx_core::buffer::SharedArray;
use rtbx_core::errors::{RTBXError, RTBXResult};
use rtbx_core::precision::Precision;
use rtbx_core::spectroscopy::SpectroscopyTable;
use rtbx_core::units::{ingest, DimensionClass, Ingest, PhysicalQuantity, Unit};
use serde::{Deserialize, Serialize};

use crate::element::{Capability, CapabilitySet};

/// Serialized form of the non-array part of a [`GasAbsorber`].
///
/// `vmr_unit` has no default: leaving it out is a construction error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasAbsorberConfig {
    pub name: String,
    #[serde(default)]
    pub vmr_unit: Option<Unit>,
}

/// Absorption by a single gas.
#[derive(Clone)]
pub struct GasAbsorber<T> {
    name: String,
    spectroscopy: Arc<SpectroscopyTable<T>>,
    vmr_levels: SharedArray<T>,
    vmr_unit: Unit,
}

impl<T> GasAbsorber<T> {
    pub const CAPABILITIES: CapabilitySet = CapabilitySet::of(Capability::GasAbsorption);

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Precision> GasAbsorber<T> {
    /// Build an absorber sharing `vmr_levels` with the caller.
    ///
    /// `vmr_unit` must be dimensionless (`1`, `ppm`, `mol/mol`, ...).
    pub fn new(
        name: &str,
        spectroscopy: Arc<SpectroscopyTable<T>>,
        vmr_levels: SharedArray<T>,
        vmr_unit: Unit,
    ) -> RTBXResult<Self> {
        let what = || format!("gas absorber '{name}'");
        if let Err(e) = vmr_unit.require_class(DimensionClass::Dimensionless) {
            return Err(RTBXError::construction(what(), format!("VMR unit: {e}")));
        }
        if vmr_levels.is_empty() {
            return Err(RTBXError::construction(what(), "VMR profile is empty"));
        }
        Ok(Self {
            name: name.to_string(),
            spectroscopy,
            vmr_levels,
            vmr_unit,
        })
    }

    /// Build an absorber over a private copy of `vmr_levels`.
    pub fn new_copied(
        name: &str,
        spectroscopy: Arc<SpectroscopyTable<T>>,
        vmr_levels: &[T],
        vmr_unit: Unit,
    ) -> RTBXResult<Self> {
        Self::new(name, spectroscopy, SharedArray::from_slice(vmr_levels), vmr_unit)
    }

    pub fn from_config(
        config: &GasAbsorberConfig,
        spectroscopy: Arc<SpectroscopyTable<T>>,
        vmr_levels: SharedArray<T>,
    ) -> RTBXResult<Self> {
        let vmr_unit = config.vmr_unit.clone().ok_or_else(|| {
            RTBXError::construction(
                format!("gas absorber '{}'", config.name),
                "vmr_unit is required",
            )
        })?;
        Self::new(&config.name, spectroscopy, vmr_levels, vmr_unit)
    }

    pub fn config(&self) -> GasAbsorberConfig {
        GasAbsorberConfig {
            name: self.name.clone(),
            vmr_unit: Some(self.vmr_unit.clone()),
        }
    }

    pub fn spectroscopy(&self) -> &Arc<SpectroscopyTable<T>> {
        &self.spectroscopy
    }

    pub fn vmr_levels(&self) -> &SharedArray<T> {
        &self.vmr_levels
    }

    pub fn vmr_unit(&self) -> &Unit {
        &self.vmr_unit
    }

    pub fn n_levels(&self) -> usize {
        self.vmr_levels.len()
    }

    pub fn vmr_quantity(&self) -> PhysicalQuantity<T> {
        PhysicalQuantity::array(self.vmr_levels.to_vec(), self.vmr_unit.clone())
    }

    /// Cross section from this gas's table, in table units.
    pub fn cross_section(
        &self,
        spectral: T,
        pressure: T,
        temperature: T,
        broadener: T,
    ) -> RTBXResult<T> {
        self.spectroscopy.lookup(spectral, pressure, temperature, broadener)
    }
}

impl<T: Precision> Ingest<T> for GasAbsorber<T> {
    fn ingest(&self, field: &str, source: &PhysicalQuantity<T>) -> RTBXResult<()> {
        match field {
            "vmr_levels" => ingest(&self.vmr_levels, &self.vmr_unit, source),
            _ => Err(RTBXError::UnknownField {
                owner: format!("gas absorber '{}'", self.name),
                field: field.to_string(),
            }),
        }
    }
}

impl<T: Precision> fmt::Debug for GasAbsorber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GasAbsorber")
            .field("name", &self.name)
            .field("spectroscopy", &self.spectroscopy.file_name())
            .field("vmr_levels", &self.vmr_levels)
            .field("vmr_unit", &self.vmr_unit.to_string())
            .finish()
    }
}
