//! vc-units: unit tags and exact conversion to the chart's base units.
//!
//! Every physical input has one base unit (m³/h, m, mm²/s, g/L). Converting a
//! value is a single [`ExactDecimal`](vc_core::ExactDecimal) multiplication
//! against a fixed factor, except for dynamic viscosity, which is divided by
//! the converted density.

pub mod convert;
pub mod error;
pub mod kinds;
pub mod parse;

pub use convert::{Parameters, Quantities, Units, to_base, viscosity_to_base};
pub use error::{UnitError, UnitResult};
pub use kinds::{AnyUnit, DensityUnit, FlowrateUnit, HeadUnit, LinearUnit, UnitKind, ViscosityUnit};
pub use parse::{Measured, parse_any, parse_with_unit, split_value_and_unit};
