//! Curve functions fitted to the chart.

use serde::{Deserialize, Serialize};

/// A fixed-coefficient function of one variable.
///
/// ## Shapes
///
/// ```text
/// Linear:      y = pitch * (x - x0) + y0
/// Polynomial:  y = c[0] + c[1] x + ... + c[5] x^5
/// Logistic:    y = amplitude / (1 + exp(-rate * (x - midpoint)))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveFunction {
    Linear { pitch: f64, x0: f64, y0: f64 },
    /// Coefficients in ascending power order.
    Polynomial { coefficients: [f64; 6] },
    Logistic {
        amplitude: f64,
        rate: f64,
        midpoint: f64,
    },
}

impl CurveFunction {
    /// Line of slope `pitch` through `(x0, y0)`.
    pub fn linear(pitch: f64, x0: f64, y0: f64) -> Self {
        Self::Linear { pitch, x0, y0 }
    }

    /// Polynomial from coefficients listed highest power first, the order
    /// used by calibration tables.
    pub fn polynomial_highest_first(coefficients: [f64; 6]) -> Self {
        let mut ascending = coefficients;
        ascending.reverse();
        Self::Polynomial {
            coefficients: ascending,
        }
    }

    pub fn logistic(amplitude: f64, rate: f64, midpoint: f64) -> Self {
        Self::Logistic {
            amplitude,
            rate,
            midpoint,
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            Self::Linear { pitch, x0, y0 } => pitch * (x - x0) + y0,
            Self::Polynomial { coefficients } => {
                coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
            }
            Self::Logistic {
                amplitude,
                rate,
                midpoint,
            } => amplitude / (1.0 + (-rate * (x - midpoint)).exp()),
        }
    }

    /// Inverse of a line: the `x` at which it reaches `y`.
    ///
    /// A flat line yields `0.0`. Non-linear shapes have no inverse and return `None`.
    pub fn solve_for_x(&self, y: f64) -> Option<f64> {
        match *self {
            Self::Linear { pitch, x0, y0 } => {
                if pitch == 0.0 {
                    Some(0.0)
                } else {
                    Some((y - y0) / pitch + x0)
                }
            }
            Self::Polynomial { .. } | Self::Logistic { .. } => None,
        }
    }

    /// Every coefficient, for finiteness checks.
    pub fn coefficients(&self) -> Vec<f64> {
        match *self {
            Self::Linear { pitch, x0, y0 } => vec![pitch, x0, y0],
            Self::Polynomial { coefficients } => coefficients.to_vec(),
            Self::Logistic {
                amplitude,
                rate,
                midpoint,
            } => vec![amplitude, rate, midpoint],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::defaults;

    #[test]
    fn linear_evaluates_and_inverts() {
        let line = CurveFunction::linear(2.0, 49.0, 0.0);
        assert_eq!(line.evaluate(50.0), 2.0);
        assert_eq!(line.solve_for_x(2.0), Some(50.0));
    }

    #[test]
    fn flat_line_solves_to_zero() {
        let flat = CurveFunction::linear(0.0, 10.0, 3.0);
        assert_eq!(flat.solve_for_x(100.0), Some(0.0));
    }

    #[test]
    fn only_lines_invert() {
        let poly = CurveFunction::polynomial_highest_first([0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(poly.solve_for_x(1.0), None);
    }

    #[test]
    fn polynomial_is_stored_ascending() {
        let poly = CurveFunction::polynomial_highest_first([1.0, 0.0, 0.0, 0.0, 2.0, 3.0]);
        // x^5 + 2x + 3
        assert_eq!(poly.evaluate(2.0), 32.0 + 4.0 + 3.0);
        match poly {
            CurveFunction::Polynomial { coefficients } => {
                assert_eq!(coefficients, [3.0, 2.0, 0.0, 0.0, 0.0, 1.0])
            }
            _ => panic!("expected polynomial"),
        }
    }

    #[test]
    fn chart_q_polynomial_reference_point() {
        let q = CurveFunction::polynomial_highest_first(defaults::Q_COEFFICIENTS);
        assert!((q.evaluate(242.0) - 173.483_274_755_728_42).abs() < 1e-6);
    }

    #[test]
    fn chart_h_logistic_reference_points() {
        let [amplitude, rate, midpoint] = defaults::H_COEFFICIENTS[0];
        let h = CurveFunction::logistic(amplitude, rate, midpoint);
        assert!((h.evaluate(146.0) - 284.662_474_810_271_7).abs() < 1e-9);
        assert!((h.evaluate(382.0) - 227.203_146_021_106_16).abs() < 1e-9);
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_string(&CurveFunction::logistic(1.0, 2.0, 3.0)).unwrap();
        assert!(json.contains(r#""kind":"logistic""#));
        let back: CurveFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CurveFunction::logistic(1.0, 2.0, 3.0));
    }
}
