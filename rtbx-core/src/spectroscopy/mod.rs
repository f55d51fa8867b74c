//! Gas absorption cross-section tables.
//!
//! A [`SpectroscopyTable`] holds cross sections on four axes: spectral
//! coordinate, broadener fraction, temperature and pressure. Temperature is
//! tabulated per pressure point, so a lookup brackets temperature separately
//! in each of the two pressure columns around the query before blending.
//!
//! Corners are combined in a fixed order: spectral, broadener, temperature
//! (per column), then pressure. Up to 16 tensor values contribute.
//!
//! | Axis | Out of range |
//! |------|--------------|
//! | pressure | clamped to the nearest end |
//! | temperature | [`RTBXError::Bounds`](crate::errors::RTBXError::Bounds) |
//! | broadener | `Bounds`, unless the axis has a single entry |
//! | spectral | `Bounds` |

pub mod interpolate;
pub mod schema;
mod table;

pub use schema::{AxisValues, CrossSectionValues, SpectroscopyFile, TemperatureRows};
pub use table::SpectroscopyTable;
