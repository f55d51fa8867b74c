//! Atmosphere constituents and capability dispatch.
//!
//! Downstream calculations do not ask "is there a gas absorber?" but "does
//! anything provide gas absorption?". Every [`AtmosphereElement`] variant
//! declares a [`CapabilitySet`] and callers gate their physics branches on
//! [`any_matches_capability`].

use std::fmt;

use rtbx_core::precision::Precision;
use serde::{Deserialize, Serialize};

use crate::components::{GasAbsorber, RayleighScattering};

/// A physical process an element can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    GasAbsorption,
    RayleighScattering,
    AerosolScattering,
}

impl Capability {
    const fn bit(self) -> u32 {
        match self {
            Capability::GasAbsorption => 1 << 0,
            Capability::RayleighScattering => 1 << 1,
            Capability::AerosolScattering => 1 << 2,
        }
    }

    pub const ALL: [Capability; 3] = [
        Capability::GasAbsorption,
        Capability::RayleighScattering,
        Capability::AerosolScattering,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::GasAbsorption => write!(f, "gas absorption"),
            Capability::RayleighScattering => write!(f, "Rayleigh scattering"),
            Capability::AerosolScattering => write!(f, "aerosol scattering"),
        }
    }
}

/// Bitmask of [`Capability`] tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);

    pub const fn of(capability: Capability) -> Self {
        Self(capability.bit())
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// One constituent of an atmosphere.
///
/// New variants (aerosols, clouds) are expected, so matches outside this
/// crate need a wildcard arm.
#[derive(Clone)]
#[non_exhaustive]
pub enum AtmosphereElement<T> {
    RayleighScattering(RayleighScattering),
    GasAbsorber(GasAbsorber<T>),
}

impl<T> AtmosphereElement<T> {
    pub fn capabilities(&self) -> CapabilitySet {
        match self {
            AtmosphereElement::RayleighScattering(_) => RayleighScattering::CAPABILITIES,
            AtmosphereElement::GasAbsorber(_) => GasAbsorber::<T>::CAPABILITIES,
        }
    }

    pub fn provides(&self, capability: Capability) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn name(&self) -> &str {
        match self {
            AtmosphereElement::RayleighScattering(_) => RayleighScattering::NAME,
            AtmosphereElement::GasAbsorber(absorber) => absorber.name(),
        }
    }

    pub fn as_gas_absorber(&self) -> Option<&GasAbsorber<T>> {
        match self {
            AtmosphereElement::GasAbsorber(absorber) => Some(absorber),
            _ => None,
        }
    }
}

impl<T: Precision> fmt::Debug for AtmosphereElement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtmosphereElement::RayleighScattering(rayleigh) => {
                f.debug_tuple("RayleighScattering").field(rayleigh).finish()
            }
            AtmosphereElement::GasAbsorber(absorber) => {
                f.debug_tuple("GasAbsorber").field(absorber).finish()
            }
        }
    }
}

impl<T> From<GasAbsorber<T>> for AtmosphereElement<T> {
    fn from(value: GasAbsorber<T>) -> Self {
        AtmosphereElement::GasAbsorber(value)
    }
}

impl<T> From<RayleighScattering> for AtmosphereElement<T> {
    fn from(value: RayleighScattering) -> Self {
        AtmosphereElement::RayleighScattering(value)
    }
}

/// True if at least one element provides `capability`. False when empty.
pub fn any_matches_capability<T>(
    elements: &[AtmosphereElement<T>],
    capability: Capability,
) -> bool {
    elements.iter().any(|e| e.provides(capability))
}

/// Every element providing `capability`, in insertion order.
pub fn elements_with_capability<T>(
    elements: &[AtmosphereElement<T>],
    capability: Capability,
) -> Vec<&AtmosphereElement<T>> {
    elements.iter().filter(|e| e.provides(capability)).collect()
}
