mod gas_absorber;
mod rayleigh;

pub use gas_absorber::{GasAbsorber, GasAbsorberConfig};
pub use rayleigh::RayleighScattering;
