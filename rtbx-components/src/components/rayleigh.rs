use crate::element::{Capability, CapabilitySet};

/// Marker element enabling Rayleigh scattering by the bulk atmosphere.
///
/// Carries no state: the scattering itself is computed downstream from the
/// pressure and gravity profiles of the atmosphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayleighScattering;

impl RayleighScattering {
    pub const NAME: &'static str = "rayleigh";
    pub const CAPABILITIES: CapabilitySet = CapabilitySet::of(Capability::RayleighScattering);
}
