//! Exact decimal and fractional literals.
//!
//! Calibration values such as `9.8` must be represented exactly (`49/5`); going
//! through `f64` would hand the solver `9.800000000000000710542735760100185871124267578125`.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    #[error("empty number")]
    Empty,
    #[error("invalid number {0:?}, expected a decimal like `9.8` or a fraction like `49/5`")]
    Invalid(String),
    #[error("zero denominator in {0:?}")]
    ZeroDenominator(String),
}

/// A decimal constant `mantissa · 10^-scale`, usable in `const` items.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Decimal {
    mantissa: i64,
    scale: u32,
}

impl Decimal {
    pub const fn new(mantissa: i64, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn to_rational(self) -> BigRational {
        BigRational::new(BigInt::from(self.mantissa), BigInt::from(10).pow(self.scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = format!("{:0>width$}", self.mantissa.unsigned_abs(), width = self.scale as usize + 1);
        let (int, frac) = digits.split_at(digits.len() - self.scale as usize);
        write!(f, "{}{}.{}", sign, int, frac)
    }
}

/// Parse `[-]digits[.digits]` or `[-]digits/digits` into an exact rational.
pub fn parse_rational(s: &str) -> Result<BigRational, ParseDecimalError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseDecimalError::Empty);
    }

    if let Some((num, den)) = s.split_once('/') {
        let num = parse_integer(num.trim()).ok_or_else(|| ParseDecimalError::Invalid(s.to_string()))?;
        let den = parse_integer(den.trim()).ok_or_else(|| ParseDecimalError::Invalid(s.to_string()))?;
        if den.is_zero() {
            return Err(ParseDecimalError::ZeroDenominator(s.to_string()));
        }
        return Ok(BigRational::new(num, den));
    }

    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int.is_empty() && frac.is_empty() || !is_digits(int) || !is_digits(frac) {
        return Err(ParseDecimalError::Invalid(s.to_string()));
    }

    let digits = format!("{}{}", int, frac);
    let mantissa: BigInt = digits.parse().map_err(|_| ParseDecimalError::Invalid(s.to_string()))?;
    let mantissa = if negative { -mantissa } else { mantissa };
    let scale = BigInt::from(10).pow(frac.len() as u32);
    Ok(BigRational::new(mantissa, scale))
}

fn parse_integer(s: &str) -> Option<BigInt> {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
