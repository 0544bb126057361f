//! Piecewise-linear chart axes.
//!
//! Each axis of the printed chart is logarithmic-looking but hand-spaced. It is
//! digitized as ascending breakpoints, each storing the pixel span from the
//! previous breakpoint (the first one stores 0). A value is mapped to pixels by
//! summing spans up to its bracket and interpolating linearly inside it.

use serde::{Deserialize, Serialize};

use crate::{EngineError, EngineResult};

/// Returned by [`fit_to_scale`] for values above the last breakpoint.
pub const OFF_SCALE: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub value: u32,
    /// Pixels from the previous breakpoint to this one.
    pub pixels: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct Scale {
    breakpoints: Vec<Breakpoint>,
}

impl Scale {
    /// Build a scale, rejecting empty or non-ascending tables.
    pub fn new(breakpoints: Vec<Breakpoint>) -> EngineResult<Self> {
        if breakpoints.is_empty() {
            return Err(EngineError::InvalidScale {
                scale: "chart axis",
                reason: "no breakpoints".to_string(),
            });
        }
        if let Some(pair) = breakpoints.windows(2).find(|w| w[0].value >= w[1].value) {
            return Err(EngineError::InvalidScale {
                scale: "chart axis",
                reason: format!(
                    "breakpoints must ascend ({} is followed by {})",
                    pair[0].value, pair[1].value
                ),
            });
        }
        Ok(Self { breakpoints })
    }

    /// Trusted compiled-in tables.
    pub(crate) fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        Self {
            breakpoints: pairs
                .iter()
                .map(|&(value, pixels)| Breakpoint { value, pixels })
                .collect(),
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn min(&self) -> f64 {
        self.breakpoints.first().map_or(0.0, |b| f64::from(b.value))
    }

    pub fn max(&self) -> f64 {
        self.breakpoints.last().map_or(0.0, |b| f64::from(b.value))
    }

    /// Total pixel length from the first to the last breakpoint.
    pub fn length(&self) -> f64 {
        self.breakpoints.iter().map(|b| f64::from(b.pixels)).sum()
    }

    /// Pixel position of `value`, or `None` above the last breakpoint.
    ///
    /// ```text
    /// pos = start
    /// for (k, d) in breakpoints:
    ///     value == k -> pos + d
    ///     value <  k -> pos + (value - prev) / (k - prev) * d
    ///     else       -> pos += d, prev = k
    /// ```
    ///
    /// `prev` starts at zero, so values below the first breakpoint land on
    /// `start` plus a fraction of the first span.
    pub fn position(&self, value: f64, start: f64) -> Option<f64> {
        let mut pos = start;
        let mut prev = 0.0;
        for bp in &self.breakpoints {
            let key = f64::from(bp.value);
            let span = f64::from(bp.pixels);
            if value == key {
                return Some(pos + span);
            }
            if value < key {
                return Some(pos + (value - prev) / (key - prev) * span);
            }
            pos += span;
            prev = key;
        }
        None
    }
}

impl TryFrom<Vec<Breakpoint>> for Scale {
    type Error = EngineError;

    fn try_from(breakpoints: Vec<Breakpoint>) -> Result<Self, Self::Error> {
        Self::new(breakpoints)
    }
}

impl From<Scale> for Vec<Breakpoint> {
    fn from(scale: Scale) -> Self {
        scale.breakpoints
    }
}

/// Map `value` onto `scale` starting at pixel `start`; [`OFF_SCALE`] if the
/// value lies above the last breakpoint.
pub fn fit_to_scale(scale: &Scale, value: f64, start: f64) -> f64 {
    scale.position(value, start).unwrap_or(OFF_SCALE)
}
