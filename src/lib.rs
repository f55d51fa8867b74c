//! Atmospheric state model and absorption cross-section lookup for trace-gas
//! retrievals.
//!
//! This crate re-exports the workspace members:
//!
//! - [`rtbx_core`]: units, shared buffers, layered grids, spectral windows and
//!   spectroscopy tables
//! - [`rtbx_components`]: the Earth atmosphere and its elements
//!
//! ```rust
//! use rtbx::prelude::*;
//!
//! let units = AtmosphereUnits::standard().unwrap();
//! let atmosphere = EarthAtmosphere::<f64>::new(4, 4, units).unwrap();
//! let hpa = Unit::parse("hPa").unwrap();
//! let levels = PhysicalQuantity::array(vec![1.0, 100.0, 500.0, 1000.0], hpa);
//! atmosphere.ingest("met_pressure_levels", &levels).unwrap();
//! atmosphere.calculate_layers();
//! assert_eq!(atmosphere.met_pressure().layers().to_vec(), vec![50.5, 300.0, 750.0]);
//! ```

pub use ndarray;
pub use rtbx_components;
pub use rtbx_core;

pub mod prelude {
    pub use rtbx_components::{
        any_matches_capability, elements_with_capability, AtmosphereConfig, AtmosphereElement,
        AtmosphereUnits, Capability, CapabilitySet, EarthAtmosphere, GasAbsorber,
        GasAbsorberConfig, RayleighScattering,
    };
    pub use rtbx_core::buffer::SharedArray;
    pub use rtbx_core::errors::{RTBXError, RTBXResult};
    pub use rtbx_core::grid::{levels_to_layers, LayeredGrid};
    pub use rtbx_core::precision::Precision;
    pub use rtbx_core::spectral_window::SpectralWindow;
    pub use rtbx_core::spectroscopy::{SpectroscopyFile, SpectroscopyTable};
    pub use rtbx_core::units::{
        DimensionClass, Ingest, PhysicalQuantity, QuantityValue, SpectralFamily, Unit,
    };
}
