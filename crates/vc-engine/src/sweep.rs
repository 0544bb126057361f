//! Parametric sweeps of one input across a range.
//!
//! Used to tabulate how the factors move with viscosity (or any other input)
//! at a fixed operating point. Points are evaluated in parallel; output order
//! follows the generated points.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vc_core::ExactDecimal;
use vc_units::Parameters;

use crate::engine::Calculator;
use crate::factors::CorrectionFactors;
use crate::{EngineError, EngineResult};

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepSpacing {
    Linear,
    Logarithmic,
}

/// Which input a sweep replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    Flowrate,
    TotalHead,
    Viscosity,
}

impl SweepAxis {
    fn apply(self, base: &Parameters, value: f64) -> Parameters {
        let value = ExactDecimal::from_f64(value);
        let mut params = *base;
        match self {
            SweepAxis::Flowrate => params.flowrate = value,
            SweepAxis::TotalHead => params.total_head = value,
            SweepAxis::Viscosity => params.viscosity = value,
        }
        params
    }
}

/// Bounds are in base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
    pub spacing: SweepSpacing,
}

impl SweepDefinition {
    pub fn new(start: f64, end: f64, num_points: usize, spacing: SweepSpacing) -> EngineResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(EngineError::InvalidSweep {
                what: "bounds must be finite",
            });
        }
        if num_points < 2 {
            return Err(EngineError::InvalidSweep {
                what: "sweep must have at least 2 points",
            });
        }
        if (start - end).abs() < 1e-12 {
            return Err(EngineError::InvalidSweep {
                what: "start and end values must be different",
            });
        }
        if spacing == SweepSpacing::Logarithmic && (start <= 0.0 || end <= 0.0) {
            return Err(EngineError::InvalidSweep {
                what: "logarithmic bounds must be positive",
            });
        }
        Ok(Self {
            start,
            end,
            num_points,
            spacing,
        })
    }

    /// Generate all points; the first and last are exactly `start` and `end`.
    pub fn generate_points(&self) -> Vec<f64> {
        if self.num_points <= 1 {
            return vec![self.start];
        }
        let last = self.num_points - 1;
        let mut points: Vec<f64> = match self.spacing {
            SweepSpacing::Linear => {
                let delta = (self.end - self.start) / last as f64;
                (0..self.num_points)
                    .map(|i| self.start + i as f64 * delta)
                    .collect()
            }
            SweepSpacing::Logarithmic => {
                let log_start = self.start.ln();
                let log_delta = (self.end.ln() - log_start) / last as f64;
                (0..self.num_points)
                    .map(|i| (log_start + i as f64 * log_delta).exp())
                    .collect()
            }
        };
        points[0] = self.start;
        points[last] = self.end;
        points
    }
}

impl fmt::Display for SweepSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Logarithmic => write!(f, "logarithmic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub axis: SweepAxis,
    /// Swept input values, base units.
    pub values: Vec<f64>,
    pub factors: Vec<CorrectionFactors>,
    pub num_ok: usize,
    pub num_failed: usize,
}

impl SweepResult {
    /// `(value, factors)` pairs with a zero error flag.
    pub fn successful(&self) -> impl Iterator<Item = (f64, &CorrectionFactors)> {
        self.values
            .iter()
            .copied()
            .zip(&self.factors)
            .filter(|(_, f)| f.is_ok())
    }
}

/// Evaluate `calculator` with `axis` of `base` replaced by each sweep point.
pub fn sweep(
    calculator: &Calculator,
    base: &Parameters,
    axis: SweepAxis,
    definition: &SweepDefinition,
) -> SweepResult {
    let values = definition.generate_points();
    let factors: Vec<CorrectionFactors> = values
        .par_iter()
        .map(|&value| calculator.calculate_base(&axis.apply(base, value)))
        .collect();
    let num_ok = factors.iter().filter(|f| f.is_ok()).count();
    let num_failed = factors.len() - num_ok;
    debug!(?axis, points = values.len(), num_failed, "sweep finished");
    SweepResult {
        axis,
        values,
        factors,
        num_ok,
        num_failed,
    }
}

/// Sweep viscosity at the flow rate and head of `base`.
pub fn sweep_viscosity(
    calculator: &Calculator,
    base: &Parameters,
    definition: &SweepDefinition,
) -> SweepResult {
    sweep(calculator, base, SweepAxis::Viscosity, definition)
}
