//! Result of one correction pass.

use serde::{Deserialize, Serialize};

/// Bits of [`CorrectionFactors::error_flag`].
pub mod flags {
    pub const FLOWRATE: u32 = 1;
    pub const TOTAL_HEAD: u32 = 1 << 1;
    pub const VISCOSITY: u32 = 1 << 2;
    /// A scale lookup fell above its last breakpoint.
    pub const OFF_SCALE: u32 = 1 << 3;
}

/// Ratio of operating flow to best-efficiency flow for the head factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HRatio {
    H06,
    H08,
    H10,
    H12,
}

impl HRatio {
    pub const ALL: [HRatio; 4] = [HRatio::H06, HRatio::H08, HRatio::H10, HRatio::H12];

    pub fn index(self) -> usize {
        match self {
            HRatio::H06 => 0,
            HRatio::H08 => 1,
            HRatio::H10 => 2,
            HRatio::H12 => 3,
        }
    }

    /// Q/Qopt
    pub fn value(self) -> f64 {
        match self {
            HRatio::H06 => 0.6,
            HRatio::H08 => 0.8,
            HRatio::H10 => 1.0,
            HRatio::H12 => 1.2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HRatio::H06 => "H0.6",
            HRatio::H08 => "H0.8",
            HRatio::H10 => "H1.0",
            HRatio::H12 => "H1.2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectionFactors {
    pub q: f64,
    pub eta: f64,
    /// Indexed by [`HRatio::index`].
    pub h: [f64; 4],
    pub error_flag: u32,
}

impl CorrectionFactors {
    /// Zeroed factors carrying `flag`.
    pub fn failed(flag: u32) -> Self {
        Self {
            error_flag: flag,
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_flag == 0
    }

    pub fn h_for(&self, ratio: HRatio) -> f64 {
        self.h[ratio.index()]
    }

    /// One message per set bit, lowest bit first.
    pub fn error_messages(&self) -> Vec<&'static str> {
        [
            (flags::FLOWRATE, "flow rate outside 6..2000 m³/h"),
            (flags::TOTAL_HEAD, "total head outside 5..200 m"),
            (flags::VISCOSITY, "viscosity outside 10..4000 mm²/s"),
            (flags::OFF_SCALE, "input lies beyond the chart scale"),
        ]
        .into_iter()
        .filter(|(bit, _)| self.error_flag & bit != 0)
        .map(|(_, message)| message)
        .collect()
    }
}
