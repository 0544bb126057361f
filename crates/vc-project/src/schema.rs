//! Project file schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vc_core::DEFAULT_PRECISION;
use vc_units::Units;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub name: String,
    pub inputs: InputsDef,
    #[serde(default)]
    pub units: Units,
    /// Significant digits for inputs that enter as `f64`.
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Calibration file, relative to the project file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<PathBuf>,
}

/// Raw inputs as decimal strings, in the units of [`ProjectFile::units`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsDef {
    pub flowrate: String,
    pub total_head: String,
    pub viscosity: String,
    #[serde(default = "zero_text")]
    pub density: String,
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

fn zero_text() -> String {
    "0".to_string()
}

impl Default for InputsDef {
    fn default() -> Self {
        Self {
            flowrate: zero_text(),
            total_head: zero_text(),
            viscosity: zero_text(),
            density: zero_text(),
        }
    }
}

impl ProjectFile {
    pub fn new(name: impl Into<String>, inputs: InputsDef, units: Units) -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: name.into(),
            inputs,
            units,
            precision: DEFAULT_PRECISION,
            calibration: None,
        }
    }
}
