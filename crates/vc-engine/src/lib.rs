//! vc-engine: nomogram digitization for viscous pump correction factors.
//!
//! Provides:
//! - Piecewise-linear chart scales (`fit_to_scale`)
//! - Curve functions (linear, polynomial, logistic)
//! - Chart calibration injected at construction
//! - Input range validation and error flags
//! - `Calculator`, the single-pass correction pipeline
//! - Parallel sweeps over one input
//!
//! # Pipeline
//!
//! ```text
//! Parameters (base units)
//!   -> validate            range bits, short-circuit on failure
//!   -> fit_to_scale x3     chart pixel positions
//!   -> line intersection   pos_main on the correction axis
//!   -> curve evaluation    q, eta, h[0..4]
//! ```

pub mod calibration;
pub mod curve;
pub mod engine;
pub mod error;
pub mod factors;
pub mod scale;
pub mod sweep;
pub mod validation;

pub use calibration::{Calibration, ChartGeometry, CorrectionCurve};
pub use curve::CurveFunction;
pub use engine::Calculator;
pub use error::{EngineError, EngineResult};
pub use factors::{CorrectionFactors, HRatio, flags};
pub use scale::{Breakpoint, OFF_SCALE, Scale, fit_to_scale};
pub use sweep::{SweepAxis, SweepDefinition, SweepResult, SweepSpacing, sweep, sweep_viscosity};
pub use validation::validate;
