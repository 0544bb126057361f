//! Exact fixed-point decimal used to chain unit-conversion factors.
//!
//! An [`ExactDecimal`] is `±magnitude / 10^exponent` with a `u64` magnitude and
//! a `u32` exponent. Parsing a decimal string is exact, and so are addition,
//! subtraction and multiplication as long as the magnitude fits in 64 bits.
//! Division goes through `f64` and is the one inexact operation.
//!
//! Failures are carried as state instead of being returned as `Err`:
//! malformed text yields [`DecimalError::NotANumber`], magnitude overflow or
//! division by zero yields [`DecimalError::Infinite`]. Any arithmetic with an
//! invalid operand returns an invalid result.
//!
//! Equality is structural. `1.10` stored as `(110, 2)` and `1.1` stored as
//! `(11, 1)` compare unequal even though [`ExactDecimal::to_f64`] agrees.

use std::convert::Infallible;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use tracing::trace;

use crate::{VcError, VcResult};

/// Significant digits used when converting from `f64`.
pub const DEFAULT_PRECISION: usize = 17;

const MAX_PRECISION: usize = 17;

/// Largest sci-notation exponent we bother tracking; anything beyond
/// overflows the representation either way.
const SCI_EXPONENT_LIMIT: i64 = 1 << 40;

/// Powers of ten that are exact in `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Validity state of a decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecimalError {
    #[default]
    None,
    /// Input text did not match the decimal grammar.
    NotANumber,
    /// Magnitude overflow or division by zero.
    Infinite,
}

impl fmt::Display for DecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no error"),
            Self::NotANumber => write!(f, "not a number"),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

/// How much precision a multiplication gave up to fit in 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MulOutcome {
    /// Low-order decimal digits dropped across both operands.
    pub dropped_digits: u32,
    /// Significant digits left in the most-truncated operand, if any was truncated.
    pub kept_digits: Option<u32>,
}

impl MulOutcome {
    pub fn is_exact(&self) -> bool {
        self.dropped_digits == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExactDecimal {
    magnitude: u64,
    exponent: u32,
    negative: bool,
    error: DecimalError,
}

impl Default for ExactDecimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl ExactDecimal {
    /// `±magnitude / 10^exponent`. Zero is never negative.
    pub const fn new(magnitude: u64, exponent: u32, negative: bool) -> Self {
        Self {
            magnitude,
            exponent,
            negative: negative && magnitude != 0,
            error: DecimalError::None,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, false)
    }

    pub const fn nan() -> Self {
        Self {
            magnitude: 0,
            exponent: 0,
            negative: false,
            error: DecimalError::NotANumber,
        }
    }

    pub const fn infinite(negative: bool) -> Self {
        Self {
            magnitude: 0,
            exponent: 0,
            negative,
            error: DecimalError::Infinite,
        }
    }

    /// Parse `[+-]?[0-9]*(\.[0-9]*)?([eE][+-]?[0-9]+)?`.
    ///
    /// Leading zeros and trailing fractional zeros are dropped, so `"00120.500"`
    /// becomes `(1205, 1)`. Integer trailing zeros are kept: `"100"` is `(100, 0)`.
    /// A positive sci exponent first consumes fractional digits and then scales
    /// the magnitude up; it overflows to `Infinite` only if that scaling does.
    /// A negative one too large for the `u32` exponent underflows to zero.
    pub fn parse(text: &str) -> Self {
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, sci) = match body.find(['e', 'E']) {
            Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Self::nan();
        }

        let sci_exponent = match sci {
            None => 0,
            Some(s) => match parse_sci_exponent(s) {
                Some(v) => v,
                None => return Self::nan(),
            },
        };

        let int_digits = int_part.trim_start_matches('0');
        let frac_digits = frac_part.trim_end_matches('0');
        let mut joined = String::with_capacity(int_digits.len() + frac_digits.len());
        joined.push_str(int_digits);
        joined.push_str(frac_digits);
        let digits = joined.trim_start_matches('0');
        if digits.is_empty() {
            return Self::zero();
        }

        let mut magnitude: u64 = 0;
        for b in digits.bytes() {
            match magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add(u64::from(b - b'0')))
            {
                Some(m) => magnitude = m,
                None => return Self::infinite(negative),
            }
        }

        let exponent = frac_digits.len() as i64 - sci_exponent;
        if exponent < 0 {
            let scaled = u32::try_from(-exponent)
                .ok()
                .and_then(|shift| 10u64.checked_pow(shift))
                .and_then(|p| magnitude.checked_mul(p));
            return match scaled {
                Some(m) => Self::new(m, 0, negative),
                None => Self::infinite(negative),
            };
        }
        match u32::try_from(exponent) {
            Ok(exponent) => Self::new(magnitude, exponent, negative),
            // Below 10^-u32::MAX; nothing representable is closer than zero.
            Err(_) => Self::zero(),
        }
    }

    /// Convert via a `precision`-significant-digit scientific rendering.
    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_with_precision(value, DEFAULT_PRECISION)
    }

    /// Precision is clamped to `1..=17`.
    pub fn from_f64_with_precision(value: f64, precision: usize) -> Self {
        if value.is_nan() {
            return Self::nan();
        }
        if value.is_infinite() {
            return Self::infinite(value < 0.0);
        }
        let precision = precision.clamp(1, MAX_PRECISION);
        Self::parse(&format!("{:.*e}", precision - 1, value))
    }

    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn error(&self) -> DecimalError {
        self.error
    }

    pub fn is_valid(&self) -> bool {
        self.error == DecimalError::None
    }

    pub fn is_zero(&self) -> bool {
        self.is_valid() && self.magnitude == 0
    }

    /// `magnitude / 10^exponent`, or NaN / ±infinity for invalid values.
    pub fn to_f64(&self) -> f64 {
        let value = match self.error {
            DecimalError::NotANumber => return f64::NAN,
            DecimalError::Infinite => f64::INFINITY,
            DecimalError::None => match POW10.get(self.exponent as usize) {
                Some(scale) => self.magnitude as f64 / scale,
                None => format!("{}e-{}", self.magnitude, self.exponent)
                    .parse::<f64>()
                    .unwrap_or(0.0),
            },
        };
        if self.negative { -value } else { value }
    }

    pub fn to_result(self, what: &'static str) -> VcResult<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(VcError::Decimal {
                what,
                error: self.error,
            })
        }
    }

    /// Multiply, reporting any digits dropped to keep the product in 64 bits.
    ///
    /// On overflow the operand with the larger exponent loses its last digit
    /// and the product is retried. When both exponents are zero and it still
    /// overflows, the result is `Infinite`.
    pub fn checked_mul(self, rhs: Self) -> (Self, MulOutcome) {
        if let Some(tainted) = Self::taint(self, rhs) {
            return (tainted, MulOutcome::default());
        }
        let negative = self.negative != rhs.negative;
        let (mut a, mut b) = (self, rhs);
        let (mut a_cut, mut b_cut) = (false, false);
        let mut outcome = MulOutcome::default();

        let magnitude = loop {
            let product = u128::from(a.magnitude) * u128::from(b.magnitude);
            if let Ok(m) = u64::try_from(product) {
                break m;
            }
            let (target, cut) = if a.exponent >= b.exponent {
                (&mut a, &mut a_cut)
            } else {
                (&mut b, &mut b_cut)
            };
            if target.exponent == 0 {
                trace!(
                    dropped = outcome.dropped_digits,
                    "decimal product overflowed with integral operands"
                );
                return (Self::infinite(negative), outcome);
            }
            target.magnitude /= 10;
            target.exponent -= 1;
            *cut = true;
            outcome.dropped_digits += 1;
        };

        if outcome.dropped_digits > 0 {
            outcome.kept_digits = [(a_cut, a.magnitude), (b_cut, b.magnitude)]
                .iter()
                .filter(|(cut, _)| *cut)
                .map(|(_, m)| digit_count(*m))
                .min();
            trace!(
                dropped = outcome.dropped_digits,
                "decimal product truncated to fit 64 bits"
            );
        }

        match a.exponent.checked_add(b.exponent) {
            Some(exponent) => (Self::new(magnitude, exponent, negative), outcome),
            None => (Self::infinite(negative), outcome),
        }
    }

    /// Divide through `f64`; the quotient is re-parsed at full precision and
    /// is therefore not exact.
    pub fn checked_div(self, rhs: Self) -> Self {
        if let Some(tainted) = Self::taint(self, rhs) {
            return tainted;
        }
        let negative = self.negative != rhs.negative;
        if rhs.magnitude == 0 {
            return Self::infinite(negative);
        }
        let (a, b) = Self::align(self, rhs);
        if b.magnitude == 0 {
            return Self::infinite(negative);
        }
        let quotient = Self::from_f64(a.magnitude as f64 / b.magnitude as f64);
        Self::new(quotient.magnitude, quotient.exponent, negative).with_error(quotient.error)
    }

    /// Exact addition after exponent alignment.
    pub fn checked_add(self, rhs: Self) -> Self {
        if let Some(tainted) = Self::taint(self, rhs) {
            return tainted;
        }
        let (mut a, mut b) = Self::align(self, rhs);
        loop {
            let sum = a.signed() + b.signed();
            if let Ok(m) = u64::try_from(sum.unsigned_abs()) {
                return Self::new(m, a.exponent, sum < 0);
            }
            if a.exponent == 0 {
                return Self::infinite(sum < 0);
            }
            for operand in [&mut a, &mut b] {
                operand.magnitude /= 10;
                operand.exponent -= 1;
            }
        }
    }

    pub fn checked_sub(self, rhs: Self) -> Self {
        self.checked_add(-rhs)
    }

    fn with_error(mut self, error: DecimalError) -> Self {
        self.error = error;
        self
    }

    fn signed(&self) -> i128 {
        let m = i128::from(self.magnitude);
        if self.negative { -m } else { m }
    }

    /// NaN wins over infinity; otherwise the first invalid operand is returned.
    fn taint(a: Self, b: Self) -> Option<Self> {
        if a.error == DecimalError::NotANumber || b.error == DecimalError::NotANumber {
            return Some(Self::nan());
        }
        [a, b].into_iter().find(|v| !v.is_valid())
    }

    /// Bring both operands to one exponent by scaling the smaller-exponent side
    /// up, truncating the other side whenever scaling would overflow.
    fn align(mut a: Self, mut b: Self) -> (Self, Self) {
        while a.exponent != b.exponent {
            let (low, high) = if a.exponent < b.exponent {
                (&mut a, &mut b)
            } else {
                (&mut b, &mut a)
            };
            if low.magnitude == 0 {
                low.exponent = high.exponent;
            } else if high.magnitude == 0 {
                high.exponent = low.exponent;
            } else if let Some(m) = low.magnitude.checked_mul(10) {
                low.magnitude = m;
                low.exponent += 1;
            } else {
                trace!("decimal alignment truncated an operand");
                high.magnitude /= 10;
                high.exponent -= 1;
            }
        }
        (a, b)
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_sci_exponent(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !all_digits(digits) {
        return None;
    }
    let value = digits.bytes().fold(0i64, |acc, b| {
        (acc * 10 + i64::from(b - b'0')).min(SCI_EXPONENT_LIMIT)
    });
    Some(if negative { -value } else { value })
}

fn digit_count(mut m: u64) -> u32 {
    let mut n = 0;
    while m > 0 {
        m /= 10;
        n += 1;
    }
    n
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            DecimalError::NotANumber => return f.write_str("NaN"),
            DecimalError::Infinite if self.negative => return f.write_str("-inf"),
            DecimalError::Infinite => return f.write_str("inf"),
            DecimalError::None => {}
        }
        let sign = if self.negative { "-" } else { "" };
        let digits = self.magnitude.to_string();
        let exp = self.exponent as usize;
        if exp == 0 {
            write!(f, "{sign}{digits}")
        } else if digits.len() > exp {
            let (int, frac) = digits.split_at(digits.len() - exp);
            write!(f, "{sign}{int}.{frac}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(exp - digits.len()))
        }
    }
}

impl FromStr for ExactDecimal {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ExactDecimal {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<f64> for ExactDecimal {
    fn from(v: f64) -> Self {
        Self::from_f64(v)
    }
}

impl From<u64> for ExactDecimal {
    fn from(v: u64) -> Self {
        Self::new(v, 0, false)
    }
}

impl From<i64> for ExactDecimal {
    fn from(v: i64) -> Self {
        Self::new(v.unsigned_abs(), 0, v < 0)
    }
}

impl Neg for ExactDecimal {
    type Output = Self;

    fn neg(self) -> Self {
        match self.error {
            DecimalError::NotANumber => self,
            DecimalError::Infinite => Self::infinite(!self.negative),
            DecimalError::None => Self::new(self.magnitude, self.exponent, !self.negative),
        }
    }
}

impl Mul for ExactDecimal {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.checked_mul(rhs).0
    }
}

impl Div for ExactDecimal {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.checked_div(rhs)
    }
}

impl Add for ExactDecimal {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs)
    }
}

impl Sub for ExactDecimal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs)
    }
}

impl MulAssign for ExactDecimal {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for ExactDecimal {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl AddAssign for ExactDecimal {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ExactDecimal {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::ExactDecimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for ExactDecimal {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    impl<'de> Deserialize<'de> for ExactDecimal {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match Repr::deserialize(deserializer)? {
                Repr::Text(text) => match text.trim() {
                    "inf" => ExactDecimal::infinite(false),
                    "-inf" => ExactDecimal::infinite(true),
                    other => ExactDecimal::parse(other),
                },
                Repr::Signed(v) => ExactDecimal::from(v),
                Repr::Unsigned(v) => ExactDecimal::from(v),
                Repr::Float(v) => ExactDecimal::from_f64(v),
            })
        }
    }
}
