//! Unit parsing errors.

use thiserror::Error;
use vc_core::VcError;

pub type UnitResult<T> = Result<T, UnitError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unit not recognized for this quantity.
    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: &'static str },
}

impl From<UnitError> for VcError {
    fn from(err: UnitError) -> Self {
        VcError::Other(err.to_string())
    }
}
