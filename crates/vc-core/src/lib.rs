//! vc-core: shared foundation for the viscous correction workspace.
//!
//! Contains:
//! - decimal (ExactDecimal fixed-point type used by unit conversion)
//! - units (uom SI types + constructors for the four input quantities)
//! - numeric (float range helper)
//! - error (shared error types)

pub mod decimal;
pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use decimal::{DEFAULT_PRECISION, DecimalError, ExactDecimal, MulOutcome};
pub use error::{VcError, VcResult};
pub use numeric::*;
pub use units::*;
