//! Logical on-disk layout of an absorption table.
//!
//! The schema is format agnostic: anything serde can read will do. TOML is
//! supported directly through [`SpectroscopyFile::from_toml_str`]. Values are
//! stored in double precision and cast on load.
//!
//! ```toml
//! file_name = "o2_abs.toml"
//! gas_name = "O2"
//! scale_factor = 1.0
//!
//! [spectral]
//! values = [13000.0, 13010.0]
//! unit = "cm^-1"
//!
//! [pressures]
//! values = [100.0, 1000.0]
//! unit = "hPa"
//!
//! [temperatures]
//! values = [[200.0, 300.0], [210.0, 310.0]]
//! unit = "K"
//!
//! [cross_section]
//! shape = [2, 1, 2, 2]
//! values = [1e-24, 2e-24, 3e-24, 4e-24, 5e-24, 6e-24, 7e-24, 8e-24]
//! unit = "cm^2/molecule"
//! ```
//!
//! `broadener_vmrs` defaults to `[0.0]` (a single, degenerate broadener axis).

use serde::{Deserialize, Serialize};

use crate::errors::RTBXResult;
use crate::units::Unit;

/// A 1-D axis with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValues {
    pub values: Vec<f64>,
    pub unit: Unit,
}

/// Per-pressure temperature rows (`Np` rows of `Nt` values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRows {
    pub values: Vec<Vec<f64>>,
    pub unit: Unit,
}

/// Cross sections, flattened in row-major order over `[Nw, Nb, Nt, Np]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionValues {
    pub shape: [usize; 4],
    pub values: Vec<f64>,
    pub unit: Unit,
}

fn default_broadener() -> Vec<f64> {
    vec![0.0]
}

/// Everything needed to build a [`super::SpectroscopyTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectroscopyFile {
    pub file_name: String,
    pub gas_name: String,
    pub spectral: AxisValues,
    #[serde(default = "default_broadener")]
    pub broadener_vmrs: Vec<f64>,
    pub pressures: AxisValues,
    pub temperatures: TemperatureRows,
    pub cross_section: CrossSectionValues,
    #[serde(default)]
    pub scale_factor: Option<f64>,
}

impl SpectroscopyFile {
    pub fn from_toml_str(text: &str) -> RTBXResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
file_name = "o2_abs.toml"
gas_name = "O2"

[spectral]
values = [13000.0, 13010.0]
unit = "cm^-1"

[pressures]
values = [100.0, 1000.0]
unit = "hPa"

[temperatures]
values = [[200.0, 300.0], [210.0, 310.0]]
unit = "K"

[cross_section]
shape = [2, 1, 2, 2]
values = [1e-24, 2e-24, 3e-24, 4e-24, 5e-24, 6e-24, 7e-24, 8e-24]
unit = "cm^2/molecule"
"#;

    #[test]
    fn test_parse_minimal() {
        let file = SpectroscopyFile::from_toml_str(MINIMAL).unwrap();
        assert_eq!(file.gas_name, "O2");
        assert_eq!(file.broadener_vmrs, vec![0.0]);
        assert_eq!(file.scale_factor, None);
        assert_eq!(file.spectral.unit, Unit::parse("1/cm").unwrap());
        assert_eq!(file.cross_section.shape, [2, 1, 2, 2]);
    }

    #[test]
    fn test_bad_unit_is_a_config_error() {
        let text = MINIMAL.replace("unit = \"hPa\"", "unit = \"hPa^\"");
        assert!(SpectroscopyFile::from_toml_str(&text).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let file = SpectroscopyFile::from_toml_str(MINIMAL).unwrap();
        let text = file.to_toml_string().unwrap();
        assert_eq!(SpectroscopyFile::from_toml_str(&text).unwrap(), file);
    }
}
