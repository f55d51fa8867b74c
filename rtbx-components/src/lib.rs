//! Earth atmosphere state and the elements that live in it.
//!
//! [`EarthAtmosphere`] owns the retrieval and meteorological pressure grids,
//! the profiles on the meteorological grid and an ordered list of
//! [`AtmosphereElement`]s. Physics downstream is gated on capabilities:
//!
//! ```rust
//! use rtbx_components::{
//!     any_matches_capability, AtmosphereUnits, Capability, EarthAtmosphere, RayleighScattering,
//! };
//!
//! let units = AtmosphereUnits::standard().unwrap();
//! let mut atmosphere = EarthAtmosphere::<f64>::new(20, 40, units).unwrap();
//! atmosphere.add_element(RayleighScattering.into()).unwrap();
//! assert!(any_matches_capability(atmosphere.elements(), Capability::RayleighScattering));
//! assert!(!any_matches_capability(atmosphere.elements(), Capability::GasAbsorption));
//! ```

pub mod atmosphere;
pub mod components;
pub mod element;

pub use atmosphere::{AtmosphereConfig, AtmosphereUnits, EarthAtmosphere};
pub use components::{GasAbsorber, GasAbsorberConfig, RayleighScattering};
pub use element::{
    any_matches_capability, elements_with_capability, AtmosphereElement, Capability,
    CapabilitySet,
};
