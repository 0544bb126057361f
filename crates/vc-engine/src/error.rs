//! Engine errors.
//!
//! Range failures of the inputs are reported through
//! [`CorrectionFactors::error_flag`](crate::CorrectionFactors), never here.
//! These variants only cover calibration data that cannot describe a chart.

use thiserror::Error;
use vc_core::VcError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid scale '{scale}': {reason}")]
    InvalidScale { scale: &'static str, reason: String },

    #[error("Non-finite calibration value for {what}: {value}")]
    NonFinite { what: String, value: f64 },

    #[error("Invalid calibration: {what}")]
    InvalidCalibration { what: String },

    #[error("Invalid sweep: {what}")]
    InvalidSweep { what: &'static str },
}

impl From<EngineError> for VcError {
    fn from(err: EngineError) -> Self {
        VcError::Other(err.to_string())
    }
}
