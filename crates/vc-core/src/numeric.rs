/// Closed-interval membership; NaN is never inside.
#[inline]
pub fn within(v: f64, lo: f64, hi: f64) -> bool {
    v >= lo && v <= hi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_is_inclusive_and_rejects_nan() {
        assert!(within(6.0, 6.0, 2000.0));
        assert!(within(2000.0, 6.0, 2000.0));
        assert!(!within(5.999, 6.0, 2000.0));
        assert!(!within(f64::NAN, 6.0, 2000.0));
    }
}
