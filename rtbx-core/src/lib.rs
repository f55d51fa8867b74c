//! Core data model for atmospheric retrievals.
//!
//! Numeric buffers are plain arrays tagged with a [`units::Unit`]. On top of
//! that sit level/layer [`grid::LayeredGrid`]s, [`spectral_window::SpectralWindow`]s
//! and the absorption [`spectroscopy::SpectroscopyTable`].

pub mod buffer;
pub mod errors;
pub mod grid;
pub mod precision;
pub mod spectral_window;
pub mod spectroscopy;
pub mod units;
