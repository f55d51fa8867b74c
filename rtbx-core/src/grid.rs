//! Level/layer grids.
//!
//! A [`LayeredGrid`] is an ordered sequence of N level values plus the N-1
//! layer values between them. Index 0 is the top of the atmosphere. The same
//! type carries pressure grids and every level-indexed profile (temperature,
//! humidity, altitude, gravity).
//!
//! Layers are not tracked: after changing levels, call
//! [`LayeredGrid::calculate_layers`] to bring the layer buffer up to date.
//!
//! ```rust
//! use rtbx_core::grid::levels_to_layers;
//!
//! assert_eq!(levels_to_layers(&[1.0, 100.0, 500.0, 1000.0]), vec![50.5, 300.0, 750.0]);
//! ```

use std::fmt;

use crate::buffer::SharedArray;
use crate::errors::{RTBXError, RTBXResult};
use crate::precision::Precision;
use crate::units::{ingest, DimensionClass, Ingest, PhysicalQuantity, QuantityValue, Unit};

/// Midpoints between consecutive levels: `layer[i] = (level[i] + level[i+1]) / 2`.
///
/// Returns an empty vector for fewer than two levels.
pub fn levels_to_layers<T: Precision>(levels: &[T]) -> Vec<T> {
    let two = T::one() + T::one();
    levels.windows(2).map(|w| (w[0] + w[1]) / two).collect()
}

/// Unit-preserving form of [`levels_to_layers`].
pub fn quantity_levels_to_layers<T: Precision>(
    levels: &PhysicalQuantity<T>,
) -> PhysicalQuantity<T> {
    let layers = levels_to_layers(&levels.values());
    match levels.unit() {
        Some(unit) => PhysicalQuantity::array(layers, unit.clone()),
        None => PhysicalQuantity::unitless(QuantityValue::Array(layers.into())),
    }
}

/// An ordered level sequence with its derived layer sequence.
///
/// The name, unit and element counts are fixed at construction. Level and
/// layer contents live in [`SharedArray`]s that may be aliased by the caller;
/// the handles themselves can never be replaced.
#[derive(Clone)]
pub struct LayeredGrid<T> {
    name: String,
    unit: Unit,
    levels: SharedArray<T>,
    layers: SharedArray<T>,
}

impl<T: Precision> LayeredGrid<T> {
    /// A zero-filled grid with `n_levels` levels.
    pub fn new(name: &str, n_levels: usize, unit: Unit) -> RTBXResult<Self> {
        Self::from_shared(name, SharedArray::zeros(n_levels), unit)
    }

    /// A zero-filled grid whose unit must belong to `class`.
    pub fn with_class(
        name: &str,
        n_levels: usize,
        unit: Unit,
        class: DimensionClass,
    ) -> RTBXResult<Self> {
        unit.require_class(class)?;
        Self::new(name, n_levels, unit)
    }

    /// A grid over caller-owned level storage.
    ///
    /// `levels` is shared, not copied: writes through the caller's handle are
    /// visible through the grid. Layers are computed once here.
    pub fn from_shared(name: &str, levels: SharedArray<T>, unit: Unit) -> RTBXResult<Self> {
        if levels.len() < 2 {
            return Err(RTBXError::construction(
                format!("grid '{name}'"),
                format!("needs at least 2 levels, got {}", levels.len()),
            ));
        }
        let layers = SharedArray::from_vec(levels_to_layers(&levels.read()));
        Ok(Self {
            name: name.to_string(),
            unit,
            levels,
            layers,
        })
    }

    /// A grid over a copy of `levels`.
    pub fn from_levels(name: &str, levels: &[T], unit: Unit) -> RTBXResult<Self> {
        Self::from_shared(name, SharedArray::from_slice(levels), unit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Handle onto the level buffer.
    pub fn levels(&self) -> &SharedArray<T> {
        &self.levels
    }

    /// Handle onto the layer buffer. May be stale; see [`Self::calculate_layers`].
    pub fn layers(&self) -> &SharedArray<T> {
        &self.layers
    }

    /// Level values as a unit-tagged quantity.
    pub fn levels_quantity(&self) -> PhysicalQuantity<T> {
        PhysicalQuantity::array(self.levels.to_vec(), self.unit.clone())
    }

    /// Layer values as a unit-tagged quantity.
    pub fn layers_quantity(&self) -> PhysicalQuantity<T> {
        PhysicalQuantity::array(self.layers.to_vec(), self.unit.clone())
    }

    /// Level values converted into `unit`.
    pub fn levels_in(&self, unit: &Unit) -> RTBXResult<Vec<T>> {
        Ok(self.levels_quantity().convert(unit)?.values())
    }

    /// Overwrite the layer buffer from the current levels.
    pub fn calculate_layers(&self) {
        let layers = levels_to_layers(&self.levels.read());
        self.layers.write().copy_from_slice(&layers);
    }

    /// True if levels are strictly increasing or strictly decreasing.
    pub fn is_monotonic(&self) -> bool {
        let levels = self.levels.read();
        levels.windows(2).all(|w| w[0] < w[1]) || levels.windows(2).all(|w| w[0] > w[1])
    }

    /// Value of the last level (the surface, by convention).
    pub fn last_level(&self) -> T {
        self.levels.read()[self.n_levels() - 1]
    }
}

impl<T: Precision> Ingest<T> for LayeredGrid<T> {
    /// Accepts the fields `levels` and `layers`.
    fn ingest(&self, field: &str, source: &PhysicalQuantity<T>) -> RTBXResult<()> {
        match field {
            "levels" => ingest(&self.levels, &self.unit, source),
            "layers" => ingest(&self.layers, &self.unit, source),
            _ => Err(RTBXError::UnknownField {
                owner: format!("grid '{}'", self.name),
                field: field.to_string(),
            }),
        }
    }
}

impl<T: Precision> fmt::Debug for LayeredGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredGrid")
            .field("name", &self.name)
            .field("unit", &self.unit.to_string())
            .field("levels", &self.levels)
            .field("layers", &self.layers)
            .finish()
    }
}

impl<T: Precision> fmt::Display for LayeredGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} levels, {} layers",
            self.name,
            self.unit,
            self.n_levels(),
            self.n_layers()
        )
    }
}
