use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monetary amount stored in the smallest currency unit (for example cents).
///
/// All cart arithmetic happens on whole cents, so sums never drift. Decimal
/// values entering the system are rounded half away from zero at the cent
/// boundary by [`Money::from_decimal`] and [`Money::parse`]. Operators
/// saturate at the `i64` bounds instead of overflowing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

/// Errors produced when parsing a human-entered amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a valid amount")]
    Invalid(String),
    #[error("`{0}` is out of range")]
    OutOfRange(String),
}

/// Largest cent magnitude an `f64` holds exactly (2^53).
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Convert a decimal amount, rounding half away from zero to whole cents.
    pub fn from_decimal(value: f64) -> Result<Self, MoneyParseError> {
        if !value.is_finite() {
            return Err(MoneyParseError::Invalid(value.to_string()));
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_EXACT_CENTS {
            return Err(MoneyParseError::OutOfRange(value.to_string()));
        }
        Ok(Self(cents as i64))
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Money {
        Money(self.0.saturating_abs())
    }

    /// Parse a user supplied amount such as `12.5`, `12,50` or `-1`.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let normalized = trimmed.replace(',', ".");
        match normalized.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::from_decimal(value)
                .map_err(|_| MoneyParseError::OutOfRange(trimmed.to_string())),
            _ => Err(MoneyParseError::Invalid(trimmed.to_string())),
        }
    }

    /// Returns `self - other`, floored at zero.
    pub fn saturating_sub_floor(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_cents(1250).to_string(), "12.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-125).to_string(), "-1.25");
    }

    #[test]
    fn from_decimal_rounds_half_up_at_cent_boundary() {
        assert_eq!(Money::from_decimal(33.95), Ok(Money::from_cents(3395)));
        assert_eq!(Money::from_decimal(0.125), Ok(Money::from_cents(13)));
        assert_eq!(Money::from_decimal(-0.125), Ok(Money::from_cents(-13)));
    }

    #[test]
    fn huge_amounts_are_rejected() {
        assert!(matches!(
            Money::parse("1e17"),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Money::from_decimal(-1e300),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Money::from_decimal(f64::NAN),
            Err(MoneyParseError::Invalid(_))
        ));
    }

    #[test]
    fn arithmetic_saturates_instead_of_overflowing() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!((big * 2).cents(), i64::MAX);
        assert_eq!((big + big).cents(), i64::MAX);
        assert_eq!(
            [big, big, big].into_iter().sum::<Money>().cents(),
            i64::MAX
        );
        assert_eq!((Money::from_cents(i64::MIN) - big).cents(), i64::MIN);
        assert_eq!(
            Money::from_cents(i64::MIN).abs().cents(),
            i64::MAX
        );
    }

    #[test]
    fn parse_accepts_comma_and_rejects_garbage() {
        assert_eq!(Money::parse(" 12,5 "), Ok(Money::from_cents(1250)));
        assert_eq!(Money::parse("-2"), Ok(Money::from_cents(-200)));
        assert_eq!(Money::parse(""), Err(MoneyParseError::Empty));
        assert!(matches!(
            Money::parse("abc"),
            Err(MoneyParseError::Invalid(_))
        ));
    }

    #[test]
    fn saturating_sub_floor_never_goes_negative() {
        let tendered = Money::from_cents(1000);
        assert_eq!(
            tendered.saturating_sub_floor(Money::from_cents(1250)),
            Money::ZERO
        );
        assert_eq!(
            tendered.saturating_sub_floor(Money::from_cents(750)),
            Money::from_cents(250)
        );
    }
}
