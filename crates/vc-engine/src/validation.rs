//! Input range checks.

use std::ops::RangeInclusive;

use vc_units::Parameters;

use crate::factors::flags;

/// m³/h
pub const FLOWRATE_RANGE: RangeInclusive<f64> = 6.0..=2000.0;
/// m
pub const TOTAL_HEAD_RANGE: RangeInclusive<f64> = 5.0..=200.0;
/// mm²/s
pub const VISCOSITY_RANGE: RangeInclusive<f64> = 10.0..=4000.0;

/// Error bits for base-unit inputs outside the chart. Zero means all inputs
/// are usable. Density is not checked.
///
/// Invalid decimals read as NaN or infinity and always fail their check.
pub fn validate(params: &Parameters) -> u32 {
    let checks = [
        (params.flowrate.to_f64(), &FLOWRATE_RANGE, flags::FLOWRATE),
        (params.total_head.to_f64(), &TOTAL_HEAD_RANGE, flags::TOTAL_HEAD),
        (params.viscosity.to_f64(), &VISCOSITY_RANGE, flags::VISCOSITY),
    ];
    checks
        .into_iter()
        .filter(|(value, range, _)| !range.contains(value))
        .fold(0, |mask, (_, _, bit)| mask | bit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_core::ExactDecimal;

    #[test]
    fn nominal_inputs_pass() {
        assert_eq!(validate(&Parameters::from_f64(100.0, 100.0, 100.0)), 0);
    }

    #[test]
    fn each_input_owns_one_bit() {
        assert_eq!(validate(&Parameters::from_f64(5.0, 50.0, 100.0)), flags::FLOWRATE);
        assert_eq!(validate(&Parameters::from_f64(100.0, 201.0, 100.0)), flags::TOTAL_HEAD);
        assert_eq!(validate(&Parameters::from_f64(100.0, 100.0, 9.9)), flags::VISCOSITY);
        assert_eq!(
            validate(&Parameters::from_f64(0.0, 0.0, 0.0)),
            flags::FLOWRATE | flags::TOTAL_HEAD | flags::VISCOSITY
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(validate(&Parameters::from_f64(6.0, 5.0, 10.0)), 0);
        assert_eq!(validate(&Parameters::from_f64(2000.0, 200.0, 4000.0)), 0);
    }

    #[test]
    fn density_is_ignored() {
        let p = Parameters::from_f64(100.0, 100.0, 100.0).with_density(ExactDecimal::nan());
        assert_eq!(validate(&p), 0);
    }

    #[test]
    fn invalid_decimals_are_out_of_range() {
        let p = Parameters::new(
            ExactDecimal::nan(),
            ExactDecimal::infinite(false),
            ExactDecimal::infinite(true),
        );
        assert_eq!(validate(&p), flags::FLOWRATE | flags::TOTAL_HEAD | flags::VISCOSITY);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn flowrate_bit_matches_range(q in 0.0f64..3000.0) {
                let mask = validate(&Parameters::from_f64(q, 100.0, 100.0));
                prop_assert_eq!(mask == flags::FLOWRATE, !FLOWRATE_RANGE.contains(&q));
                prop_assert_eq!(mask & !flags::FLOWRATE, 0);
            }

            #[test]
            fn widening_viscosity_never_clears_a_bit(v in 10.0f64..=4000.0, extra in 0.1f64..1e4) {
                let inside = validate(&Parameters::from_f64(100.0, 100.0, v));
                let outside = validate(&Parameters::from_f64(100.0, 100.0, 4000.0 + extra));
                prop_assert_eq!(inside, 0);
                prop_assert_eq!(outside, flags::VISCOSITY);
            }
        }
    }
}
