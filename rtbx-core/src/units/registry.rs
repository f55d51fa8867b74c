//! Unit registry with the units used by atmospheric state and spectroscopy.
//!
//! This module provides a registry of known units with their dimensions
//! and conversion factors to SI base units. It includes:
//!
//! - SI base units and prefixes
//! - Pressure units (`Pa`, `bar`, `atm`, `Torr`)
//! - Mixing ratio units (`ppm`, `ppb`, `ppt`, `percent`) and the molecule count
//! - Angles, kept apart from the dimensionless ratios
//! - Temperature scales, flagged as absolute (`K`) or relative (`degC`, `degF`)
//!
//! # Conversion Factor Convention
//!
//! All conversion factors are defined as the multiplier to convert FROM
//! the registered unit TO the SI base unit. For example:
//! - hPa has factor 100 (1 hPa = 100 Pa)
//! - atm has factor 101325

use super::dimension::Dimension;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Information about a known unit.
#[derive(Debug, Clone)]
pub struct UnitInfo {
    /// The canonical name of this unit.
    pub name: String,
    /// The physical dimension of this unit.
    pub dimension: Dimension,
    /// Conversion factor to SI base units.
    pub to_si_factor: f64,
    /// Optional: the base unit this is derived from (for prefixed units like hPa).
    pub base_unit: Option<String>,
    /// True for offset temperature scales (degC, degF).
    ///
    /// These have no multiplicative conversion to kelvin and are rejected
    /// by every conversion.
    pub relative_scale: bool,
}

impl UnitInfo {
    /// Creates a new unit info.
    fn new(name: &str, dimension: Dimension, to_si_factor: f64) -> Self {
        Self {
            name: name.to_string(),
            dimension,
            to_si_factor,
            base_unit: None,
            relative_scale: false,
        }
    }

    /// Creates a unit info for an offset temperature scale.
    fn relative(name: &str, to_si_factor: f64) -> Self {
        Self {
            relative_scale: true,
            ..Self::new(name, Dimension::TEMPERATURE, to_si_factor)
        }
    }
}

/// SI prefix multipliers.
#[derive(Debug, Clone, Copy)]
pub struct SiPrefix {
    pub symbol: &'static str,
    pub factor: f64,
}

/// SI prefixes from pico to giga.
pub static SI_PREFIXES: &[SiPrefix] = &[
    SiPrefix {
        symbol: "G",
        factor: 1e9,
    },
    SiPrefix {
        symbol: "M",
        factor: 1e6,
    },
    SiPrefix {
        symbol: "k",
        factor: 1e3,
    },
    SiPrefix {
        symbol: "h",
        factor: 1e2,
    },
    SiPrefix {
        symbol: "da",
        factor: 1e1,
    },
    SiPrefix {
        symbol: "d",
        factor: 1e-1,
    },
    SiPrefix {
        symbol: "c",
        factor: 1e-2,
    },
    SiPrefix {
        symbol: "m",
        factor: 1e-3,
    },
    SiPrefix {
        symbol: "u",
        factor: 1e-6,
    }, // using 'u' for micro (μ)
    SiPrefix {
        symbol: "n",
        factor: 1e-9,
    },
    SiPrefix {
        symbol: "p",
        factor: 1e-12,
    },
];

/// Standard atmosphere in pascal.
pub const PASCAL_PER_ATMOSPHERE: f64 = 101_325.0;
/// Pascal per bar.
pub const PASCAL_PER_BAR: f64 = 1.0e5;
/// Pascal per torr (1/760 of a standard atmosphere).
pub const PASCAL_PER_TORR: f64 = PASCAL_PER_ATMOSPHERE / 760.0;

/// The global unit registry.
pub static UNIT_REGISTRY: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

/// Registry of known units with their dimensions and conversion factors.
#[derive(Debug)]
pub struct UnitRegistry {
    /// Map from unit symbol to unit info.
    units: HashMap<&'static str, UnitInfo>,
    /// Map from alias to canonical name.
    aliases: HashMap<&'static str, &'static str>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Creates a new unit registry populated with standard units.
    pub fn new() -> Self {
        let mut registry = Self {
            units: HashMap::new(),
            aliases: HashMap::new(),
        };
        registry.register_base_units();
        registry.register_length_units();
        registry.register_pressure_units();
        registry.register_ratio_units();
        registry.register_angle_units();
        registry.register_temperature_units();
        registry
    }

    /// Looks up a unit by symbol, handling prefixes and aliases.
    pub fn lookup(&self, symbol: &str) -> Option<UnitInfo> {
        // First check for exact match
        if let Some(info) = self.units.get(symbol) {
            return Some(info.clone());
        }

        // Check aliases
        if let Some(&canonical) = self.aliases.get(symbol) {
            if let Some(info) = self.units.get(canonical) {
                return Some(info.clone());
            }
        }

        // Try to parse as prefixed unit
        self.lookup_prefixed(symbol)
    }

    /// Attempts to parse a symbol as a prefixed version of a base unit.
    fn lookup_prefixed(&self, symbol: &str) -> Option<UnitInfo> {
        // Sort prefixes by length descending to match longer prefixes first
        let mut prefixes: Vec<_> = SI_PREFIXES.iter().collect();
        prefixes.sort_by(|a, b| b.symbol.len().cmp(&a.symbol.len()));

        for prefix in prefixes {
            let Some(base_symbol) = symbol.strip_prefix(prefix.symbol) else {
                continue;
            };
            let base_info = self.units.get(base_symbol).or_else(|| {
                self.aliases
                    .get(base_symbol)
                    .and_then(|canonical| self.units.get(canonical))
            });
            // Offset scales cannot carry a prefix
            if let Some(base_info) = base_info.filter(|info| !info.relative_scale) {
                return Some(UnitInfo {
                    name: symbol.to_string(),
                    dimension: base_info.dimension,
                    to_si_factor: base_info.to_si_factor * prefix.factor,
                    base_unit: Some(base_info.name.clone()),
                    relative_scale: false,
                });
            }
        }
        None
    }

    /// Registers SI base units.
    fn register_base_units(&mut self) {
        // Mass
        self.units
            .insert("kg", UnitInfo::new("kg", Dimension::MASS, 1.0));
        self.units
            .insert("g", UnitInfo::new("g", Dimension::MASS, 1e-3));

        // Length
        self.units
            .insert("m", UnitInfo::new("m", Dimension::LENGTH, 1.0));

        // Time (base unit: second)
        self.units
            .insert("s", UnitInfo::new("s", Dimension::TIME, 1.0));

        // Temperature
        self.units
            .insert("K", UnitInfo::new("K", Dimension::TEMPERATURE, 1.0));

        // Amount of substance
        self.units
            .insert("mol", UnitInfo::new("mol", Dimension::AMOUNT, 1.0));

        // Force, so that pressures can be written as N/m^2
        self.units
            .insert("N", UnitInfo::new("N", Dimension::FORCE, 1.0));

        // Dimensionless
        self.units
            .insert("1", UnitInfo::new("1", Dimension::dimensionless(), 1.0));
        self.aliases.insert("dimensionless", "1");
    }

    /// Registers non-SI lengths used for wavelengths.
    fn register_length_units(&mut self) {
        self.units
            .insert("micron", UnitInfo::new("micron", Dimension::LENGTH, 1e-6));
        self.units.insert(
            "angstrom",
            UnitInfo::new("angstrom", Dimension::LENGTH, 1e-10),
        );
        self.aliases.insert("microns", "micron");
    }

    /// Registers pressure units.
    fn register_pressure_units(&mut self) {
        self.units
            .insert("Pa", UnitInfo::new("Pa", Dimension::PRESSURE, 1.0));
        self.units.insert(
            "bar",
            UnitInfo::new("bar", Dimension::PRESSURE, PASCAL_PER_BAR),
        );
        self.units.insert(
            "atm",
            UnitInfo::new("atm", Dimension::PRESSURE, PASCAL_PER_ATMOSPHERE),
        );
        self.units.insert(
            "Torr",
            UnitInfo::new("Torr", Dimension::PRESSURE, PASCAL_PER_TORR),
        );
        self.aliases.insert("torr", "Torr");
    }

    /// Registers dimensionless ratios.
    ///
    /// Mixing ratios are dimensionless. A molecule is a pure count, so a
    /// cross section in `cm^2/molecule` has the dimension of an area.
    fn register_ratio_units(&mut self) {
        self.units.insert(
            "percent",
            UnitInfo::new("percent", Dimension::dimensionless(), 1e-2),
        );
        self.units.insert(
            "ppm",
            UnitInfo::new("ppm", Dimension::dimensionless(), 1e-6),
        );
        self.units.insert(
            "ppb",
            UnitInfo::new("ppb", Dimension::dimensionless(), 1e-9),
        );
        self.units.insert(
            "ppt",
            UnitInfo::new("ppt", Dimension::dimensionless(), 1e-12),
        );
        self.units.insert(
            "molecule",
            UnitInfo::new("molecule", Dimension::dimensionless(), 1.0),
        );

        self.aliases.insert("molec", "molecule");
        self.aliases.insert("molecules", "molecule");
    }

    /// Registers plane angles.
    fn register_angle_units(&mut self) {
        self.units
            .insert("rad", UnitInfo::new("rad", Dimension::ANGLE, 1.0));
        self.units.insert(
            "deg",
            UnitInfo::new("deg", Dimension::ANGLE, std::f64::consts::PI / 180.0),
        );
        self.aliases.insert("degree", "deg");
        self.aliases.insert("degrees", "deg");
    }

    /// Registers offset temperature scales.
    ///
    /// Kelvin is the only absolute scale. Celsius and Fahrenheit are
    /// registered so they parse and can be reported, but they are flagged as
    /// relative and never converted.
    fn register_temperature_units(&mut self) {
        self.units.insert("degC", UnitInfo::relative("degC", 1.0));
        self.units
            .insert("degF", UnitInfo::relative("degF", 5.0 / 9.0));

        // Aliases
        self.aliases.insert("celsius", "degC");
        self.aliases.insert("Celsius", "degC");
        self.aliases.insert("deg_C", "degC");
        self.aliases.insert("fahrenheit", "degF");
        self.aliases.insert("Fahrenheit", "degF");
        self.aliases.insert("deg_F", "degF");
    }
}
