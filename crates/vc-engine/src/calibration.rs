//! Chart calibration: scales, line geometry and fitted correction curves.
//!
//! A [`Calibration`] is everything the engine knows about the printed chart.
//! It is passed to [`Calculator::new`](crate::Calculator::new) so tests and
//! callers can substitute their own digitization; [`Calibration::default`] is
//! the compiled-in one.

use serde::{Deserialize, Serialize};

use crate::curve::CurveFunction;
use crate::scale::Scale;
use crate::{EngineError, EngineResult};

/// Chart constants of the compiled-in digitization.
pub mod defaults {
    /// Pixels per 0.1 on the correction-factor axis.
    pub const PIXEL_SCALE: f64 = 21.8;

    pub const START_TOTAL_HEAD: [f64; 2] = [0.0, 300.0];
    pub const PITCH_TOTAL_HEAD: f64 = -1.875;
    pub const START_VISCOSITY: [f64; 2] = [49.0, 0.0];
    pub const PITCH_VISCOSITY: f64 = 2.0;
    pub const START_FLOWRATE: f64 = 0.0;

    /// Highest power first.
    pub const Q_COEFFICIENTS: [f64; 6] = [
        4.328_637_344_202_127_8e-9,
        -6.593_546_665_530_920_9e-6,
        0.003_970_410_254_141_132_4,
        -1.187_033_764_737_610_1,
        176.521_908_326_908_91,
        -10_276.558_815_133_236,
    ];

    /// Highest power first.
    pub const ETA_COEFFICIENTS: [f64; 6] = [
        2.511_698_737_813_198_5e-10,
        -3.241_653_244_727_441_8e-7,
        0.000_155_317_473_943_997_14,
        -0.037_300_324_399_145_976,
        4.239_180_377_816_096_8,
        -6.236_402_557_346_584_9,
    ];

    /// Logistic `(amplitude, rate, midpoint)` for H at 0.6, 0.8, 1.0, 1.2 Q/Qopt.
    pub const H_COEFFICIENTS: [[f64; 3]; 4] = [
        [285.391_136_390_630_04, -0.019_515_612_319_848_788, 451.798_760_548_476_99],
        [286.443_316_404_618_77, -0.016_739_174_282_778_945, 453.119_495_553_017_83],
        [285.708_236_361_188_65, -0.016_126_836_943_018_912, 443.605_735_013_329_37],
        [285.911_758_908_166_75, -0.015_057_232_233_799_856, 436.033_770_395_790_27],
    ];

    /// Closed validity ranges of `pos_main` for each fitted curve.
    pub const Q_DOMAIN: (f64, f64) = (242.0, 420.0);
    pub const ETA_DOMAIN: (f64, f64) = (122.0, 370.0);
    pub const H_DOMAIN: (f64, f64) = (146.0, 382.0);

    pub const Q_OFFSET: f64 = 0.2;
    pub const ETA_OFFSET: f64 = 0.2;
    pub const H_OFFSET: f64 = -0.3;

    /// `(breakpoint m³/h, pixels from previous)`.
    pub const FLOWRATE_SCALE: &[(u32, u32)] = &[
        (6, 0),
        (7, 8),
        (8, 7),
        (9, 6),
        (10, 6),
        (15, 21),
        (20, 15),
        (25, 11),
        (30, 10),
        (40, 15),
        (50, 11),
        (60, 10),
        (70, 8),
        (80, 7),
        (90, 6),
        (100, 6),
        (150, 21),
        (200, 15),
        (250, 11),
        (300, 10),
        (400, 15),
        (500, 11),
        (600, 10),
        (700, 8),
        (800, 7),
        (900, 6),
        (1000, 6),
        (1500, 21),
        (2000, 15),
    ];

    /// `(breakpoint m, pixels from previous)`.
    pub const TOTAL_HEAD_SCALE: &[(u32, u32)] = &[
        (5, 0),
        (6, 6),
        (7, 6),
        (8, 4),
        (9, 4),
        (10, 4),
        (15, 14),
        (20, 10),
        (25, 8),
        (30, 6),
        (40, 10),
        (50, 8),
        (60, 6),
        (70, 6),
        (80, 4),
        (90, 4),
        (100, 4),
        (150, 14),
        (200, 10),
    ];

    /// `(breakpoint mm²/s, pixels from previous)`.
    pub const VISCOSITY_SCALE: &[(u32, u32)] = &[
        (10, 0),
        (15, 26),
        (20, 19),
        (30, 27),
        (40, 18),
        (50, 15),
        (60, 12),
        (80, 18),
        (100, 15),
        (150, 26),
        (200, 19),
        (300, 27),
        (400, 18),
        (500, 15),
        (600, 12),
        (800, 18),
        (1000, 15),
        (1500, 26),
        (2000, 19),
        (3000, 27),
        (4000, 18),
    ];
}

/// Where the two construction lines start and how steep they are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    /// Pixels per 0.1 on the correction-factor axis.
    pub pixel_scale: f64,
    /// `(x, y)`; the head scale position replaces `y`.
    pub start_total_head: [f64; 2],
    pub pitch_total_head: f64,
    /// `(x, y)`; the viscosity scale position replaces `x`.
    pub start_viscosity: [f64; 2],
    pub pitch_viscosity: f64,
    pub start_flowrate: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            pixel_scale: defaults::PIXEL_SCALE,
            start_total_head: defaults::START_TOTAL_HEAD,
            pitch_total_head: defaults::PITCH_TOTAL_HEAD,
            start_viscosity: defaults::START_VISCOSITY,
            pitch_viscosity: defaults::PITCH_VISCOSITY,
            start_flowrate: defaults::START_FLOWRATE,
        }
    }
}

/// One fitted curve with its validity range on the correction axis.
///
/// Inside `[domain_min, domain_max]` the factor is
/// `function(pos) / pixel_scale / 10 + offset`; below the range it is 1.0,
/// above it 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionCurve {
    pub function: CurveFunction,
    pub domain_min: f64,
    pub domain_max: f64,
    pub offset: f64,
}

impl CorrectionCurve {
    pub fn new(function: CurveFunction, domain: (f64, f64), offset: f64) -> Self {
        Self {
            function,
            domain_min: domain.0,
            domain_max: domain.1,
            offset,
        }
    }

    pub fn contains(&self, pos: f64) -> bool {
        vc_core::within(pos, self.domain_min, self.domain_max)
    }

    pub fn factor(&self, pos: f64, pixel_scale: f64) -> f64 {
        if self.contains(pos) {
            self.function.evaluate(pos) / pixel_scale / 10.0 + self.offset
        } else if pos < self.domain_min {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub geometry: ChartGeometry,
    pub flowrate_scale: Scale,
    pub total_head_scale: Scale,
    pub viscosity_scale: Scale,
    pub q: CorrectionCurve,
    pub eta: CorrectionCurve,
    pub h: [CorrectionCurve; 4],
}

impl Default for Calibration {
    fn default() -> Self {
        Self::from_coefficients(
            defaults::Q_COEFFICIENTS,
            defaults::ETA_COEFFICIENTS,
            defaults::H_COEFFICIENTS,
        )
    }
}

impl Calibration {
    /// Compiled-in chart geometry with substituted curve coefficients.
    ///
    /// Polynomials are listed highest power first; H rows are logistic
    /// `(amplitude, rate, midpoint)`.
    pub fn from_coefficients(q: [f64; 6], eta: [f64; 6], h: [[f64; 3]; 4]) -> Self {
        let h_curve = |[amplitude, rate, midpoint]: [f64; 3]| {
            CorrectionCurve::new(
                CurveFunction::logistic(amplitude, rate, midpoint),
                defaults::H_DOMAIN,
                defaults::H_OFFSET,
            )
        };
        Self {
            geometry: ChartGeometry::default(),
            flowrate_scale: Scale::from_pairs(defaults::FLOWRATE_SCALE),
            total_head_scale: Scale::from_pairs(defaults::TOTAL_HEAD_SCALE),
            viscosity_scale: Scale::from_pairs(defaults::VISCOSITY_SCALE),
            q: CorrectionCurve::new(
                CurveFunction::polynomial_highest_first(q),
                defaults::Q_DOMAIN,
                defaults::Q_OFFSET,
            ),
            eta: CorrectionCurve::new(
                CurveFunction::polynomial_highest_first(eta),
                defaults::ETA_DOMAIN,
                defaults::ETA_OFFSET,
            ),
            h: h.map(h_curve),
        }
    }

    /// Check that every number is usable. Scales are checked on construction.
    pub fn validate(&self) -> EngineResult<()> {
        let g = &self.geometry;
        let geometry = [
            ("pixel_scale", g.pixel_scale),
            ("start_total_head.x", g.start_total_head[0]),
            ("start_total_head.y", g.start_total_head[1]),
            ("pitch_total_head", g.pitch_total_head),
            ("start_viscosity.x", g.start_viscosity[0]),
            ("start_viscosity.y", g.start_viscosity[1]),
            ("pitch_viscosity", g.pitch_viscosity),
            ("start_flowrate", g.start_flowrate),
        ];
        for (what, value) in geometry {
            ensure_finite(what, value)?;
        }
        if g.pixel_scale == 0.0 {
            return Err(EngineError::InvalidCalibration {
                what: "pixel_scale must be non-zero".to_string(),
            });
        }

        let curves = [("q", &self.q), ("eta", &self.eta)]
            .into_iter()
            .chain(["h0.6", "h0.8", "h1.0", "h1.2"].into_iter().zip(self.h.iter()));
        for (name, curve) in curves {
            for (i, c) in curve.function.coefficients().into_iter().enumerate() {
                ensure_finite(&format!("{name} coefficient {i}"), c)?;
            }
            ensure_finite(&format!("{name} offset"), curve.offset)?;
            if !(curve.domain_min <= curve.domain_max) {
                return Err(EngineError::InvalidCalibration {
                    what: format!(
                        "{name} domain [{}, {}] is empty",
                        curve.domain_min, curve.domain_max
                    ),
                });
            }
        }
        Ok(())
    }
}

fn ensure_finite(what: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NonFinite {
            what: what.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calibration_is_valid() {
        let cal = Calibration::default();
        cal.validate().unwrap();
        assert_eq!(cal.flowrate_scale.min(), 6.0);
        assert_eq!(cal.flowrate_scale.max(), 2000.0);
        assert_eq!(cal.total_head_scale.max(), 200.0);
        assert_eq!(cal.viscosity_scale.max(), 4000.0);
    }

    #[test]
    fn scale_tables_ascend() {
        for table in [
            defaults::FLOWRATE_SCALE,
            defaults::TOTAL_HEAD_SCALE,
            defaults::VISCOSITY_SCALE,
        ] {
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
            assert_eq!(table[0].1, 0);
        }
    }

    #[test]
    fn curve_factor_clamps_outside_domain() {
        let q = Calibration::default().q;
        assert_eq!(q.factor(241.9, defaults::PIXEL_SCALE), 1.0);
        assert_eq!(q.factor(420.1, defaults::PIXEL_SCALE), 0.0);
        let at_cutoff = q.factor(242.0, defaults::PIXEL_SCALE);
        assert!((at_cutoff - (173.483_274_755_728_42 / 218.0 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn nan_position_is_above_domain() {
        let h = Calibration::default().h[0];
        assert_eq!(h.factor(f64::NAN, defaults::PIXEL_SCALE), 0.0);
    }

    #[test]
    fn validate_rejects_non_finite_and_zero_scale() {
        let mut cal = Calibration::default();
        cal.h[2].function = CurveFunction::logistic(f64::NAN, 1.0, 1.0);
        let err = cal.validate().unwrap_err();
        assert!(err.to_string().contains("h1.0"));

        let mut cal = Calibration::default();
        cal.geometry.pixel_scale = 0.0;
        assert!(matches!(
            cal.validate(),
            Err(EngineError::InvalidCalibration { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_domain() {
        let mut cal = Calibration::default();
        cal.eta.domain_min = 400.0;
        assert!(cal.validate().is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let cal = Calibration::default();
        let text = serde_yaml::to_string(&cal).unwrap();
        let back: Calibration = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, cal);
    }
}
