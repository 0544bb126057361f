use thiserror::Error;

use crate::decimal::DecimalError;

pub type VcResult<T> = Result<T, VcError>;

#[derive(Error, Debug)]
pub enum VcError {
    #[error("Invalid decimal for {what}: {error}")]
    Decimal {
        what: &'static str,
        error: DecimalError,
    },

    #[error("{0}")]
    Other(String),
}
