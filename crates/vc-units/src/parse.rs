//! Text input of values with an optional unit suffix.
//!
//! `"12.5 l/min"`, `"40ft"` and `"100"` are all accepted; a missing unit means
//! the base unit of the requested quantity. The numeric part is parsed exactly.

use vc_core::ExactDecimal;

use crate::kinds::{AnyUnit, UnitKind};
use crate::{UnitError, UnitResult};

/// A value as entered, with its parsed decimal and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<U> {
    /// Raw text as the user entered it (e.g., "12.5 l/min")
    pub raw_text: String,
    pub value: ExactDecimal,
    pub unit: U,
}

impl<U> Measured<U>
where
    U: UnitKind + std::str::FromStr<Err = UnitError>,
{
    pub fn from_text(raw_text: impl Into<String>) -> UnitResult<Self> {
        let raw_text = raw_text.into();
        let (value, unit) = parse_with_unit(&raw_text)?;
        Ok(Self {
            raw_text,
            value,
            unit,
        })
    }
}

/// Parse `"<value> [unit]"` for one quantity.
pub fn parse_with_unit<U>(input: &str) -> UnitResult<(ExactDecimal, U)>
where
    U: UnitKind + std::str::FromStr<Err = UnitError>,
{
    let (value, unit) = split_value_and_unit(input)?;
    if unit.is_empty() {
        return Ok((value, U::base()));
    }
    Ok((value, unit.parse()?))
}

/// Parse `"<value> <unit>"` where the unit decides the quantity.
pub fn parse_any(input: &str) -> UnitResult<(ExactDecimal, AnyUnit)> {
    let (value, unit) = split_value_and_unit(input)?;
    if unit.is_empty() {
        return Err(UnitError::ParseError(format!(
            "A unit is required to infer the quantity of '{}'",
            input.trim()
        )));
    }
    Ok((value, unit.parse()?))
}

/// Split a value+unit string into (decimal value, unit string).
///
/// Examples:
/// - "40ft" -> (40, "ft")
/// - "12.5 l/min" -> (12.5, "l/min")
/// - "300" -> (300, "")
pub fn split_value_and_unit(input: &str) -> UnitResult<(ExactDecimal, String)> {
    let trimmed = input.trim();

    // Find where the numeric part ends
    let split_idx = trimmed
        .find(|c: char| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .unwrap_or(trimmed.len());

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let num_part = num_part.trim();
    if num_part.is_empty() {
        return Err(UnitError::ParseError(format!(
            "Could not parse numeric value from '{}'",
            input
        )));
    }

    let value = ExactDecimal::parse(num_part);
    if !value.is_valid() {
        return Err(UnitError::ParseError(format!(
            "Could not parse numeric value from '{}' ({})",
            input,
            value.error()
        )));
    }

    Ok((value, unit_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{FlowrateUnit, HeadUnit, ViscosityUnit};

    #[test]
    fn split_with_and_without_space() {
        let (v, u) = split_value_and_unit("40ft").unwrap();
        assert_eq!((v, u.as_str()), (ExactDecimal::parse("40"), "ft"));
        let (v, u) = split_value_and_unit("  12.5 l/min ").unwrap();
        assert_eq!((v, u.as_str()), (ExactDecimal::parse("12.5"), "l/min"));
        let (v, u) = split_value_and_unit("1.5e2").unwrap();
        assert_eq!((v.to_f64(), u.as_str()), (150.0, ""));
    }

    #[test]
    fn split_rejects_missing_or_bad_number() {
        assert!(matches!(
            split_value_and_unit("ft"),
            Err(UnitError::ParseError(_))
        ));
        assert!(matches!(
            split_value_and_unit("1.2.3 m"),
            Err(UnitError::ParseError(_))
        ));
        assert!(split_value_and_unit("99999999999999999999999 m").is_err());
    }

    #[test]
    fn missing_unit_means_base_unit() {
        let (v, u) = parse_with_unit::<HeadUnit>("100").unwrap();
        assert_eq!(v.to_f64(), 100.0);
        assert_eq!(u, HeadUnit::Meters);
    }

    #[test]
    fn unit_must_match_quantity() {
        assert!(matches!(
            parse_with_unit::<HeadUnit>("100 cSt"),
            Err(UnitError::UnknownUnit { quantity: "total head", .. })
        ));
    }

    #[test]
    fn measured_keeps_raw_text() {
        let m = Measured::<ViscosityUnit>::from_text("120 cP").unwrap();
        assert_eq!(m.raw_text, "120 cP");
        assert_eq!(m.unit, ViscosityUnit::Centipoise);
        assert_eq!(m.value, ExactDecimal::parse("120"));
    }

    #[test]
    fn parse_any_infers_quantity() {
        let (v, u) = parse_any("250 gpm").unwrap();
        assert_eq!(v.to_f64(), 250.0);
        assert_eq!(u, AnyUnit::Flowrate(FlowrateUnit::GallonsPerMinute));
        assert!(parse_any("250").is_err());
    }
}
