//! Fixed-point money type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally with scale enforcement so that sums of
//! user-entered amounts never pick up floating-point drift.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A decimal amount that maintains exactly 2 decimal places.
///
/// Addition and subtraction saturate at the limits of `Decimal` instead of
/// panicking, so totals over stored records can never abort a query.
///
/// `Display` prints the plain normalized number (`"1500.50"`); use
/// [`Money::to_rupiah`] for the user-facing currency rendering.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use ledger_engine::Money;
///
/// let amount = Money::from_str("1500.5").unwrap();
/// assert_eq!(amount.to_string(), "1500.50");
/// assert_eq!(amount.to_rupiah(), "Rp 1.500,5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// Largest amount a single record may carry: Rp 10^15.
    pub const MAX_AMOUNT: Self =
        Money(Decimal::from_parts(1_569_325_056, 23_283_064, 0, false, Self::SCALE));

    /// Creates a new `Money` from a `Decimal`, normalizing to 2 decimal places.
    ///
    /// Extra precision is rounded half away from zero.
    pub fn new(value: Decimal) -> Self {
        let mut normalized =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(Self::SCALE);
        Money(normalized)
    }

    /// Creates a whole-unit amount (e.g. `Money::from_units(50_000)` is Rp 50.000).
    pub fn from_units(units: i64) -> Self {
        Money::new(Decimal::from(units))
    }

    /// Returns `true` if this value is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Formats the amount the way an Indonesian Rupiah price is written:
    /// `.` groups thousands, `,` separates decimals, and the fraction is only
    /// shown when it is non-zero.
    ///
    /// `Rp` is followed by a plain ASCII space rather than the no-break
    /// space `id-ID` locale formatting emits, so output stays greppable.
    pub fn to_rupiah(&self) -> String {
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        let plain = self.0.abs().normalize().to_string();
        let (whole, fraction) = match plain.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (plain.as_str(), None),
        };

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        match fraction {
            Some(fraction) => format!("{}Rp {},{}", sign, grouped, fraction),
            None => format!("{}Rp {}", sign, grouped),
        }
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Money::new(decimal))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money::new(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.0))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_from_str_normalizes_scale() {
        assert_eq!(money("1").to_string(), "1.00");
        assert_eq!(money("1.5").to_string(), "1.50");
        assert_eq!(money("  2.25  ").to_string(), "2.25");
        assert_eq!(money("0.005").to_string(), "0.01");
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(Money::from_str("abc").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn test_arithmetic_preserves_scale() {
        let a = money("1.5");
        let b = money("2.5");

        assert_eq!((a + b).to_string(), "4.00");
        assert_eq!((a - b).to_string(), "-1.00");
        assert_eq!((-a).to_string(), "-1.50");
    }

    #[test]
    fn test_sum() {
        let total: Money = [money("10"), money("0.25"), money("5")].iter().sum();
        assert_eq!(total, money("15.25"));
        assert_eq!(Vec::<Money>::new().into_iter().sum::<Money>(), Money::ZERO);
    }

    #[test]
    fn test_is_positive() {
        assert!(money("0.01").is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!money("-3").is_positive());
    }

    #[test]
    fn test_max_amount_is_ten_to_the_fifteenth() {
        assert_eq!(Money::MAX_AMOUNT, money("1000000000000000"));
        assert_eq!(Money::MAX_AMOUNT.to_rupiah(), "Rp 1.000.000.000.000.000");
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::new(Decimal::MAX);
        let tiny = Money::new(Decimal::MIN);

        assert_eq!(huge + huge, huge);
        assert_eq!(tiny - huge, tiny);
        let total: Money = [huge, huge, money("-1")].iter().sum();
        assert!(total > Money::MAX_AMOUNT);
    }

    #[test]
    fn test_rupiah_formatting() {
        assert_eq!(Money::ZERO.to_rupiah(), "Rp 0");
        assert_eq!(Money::from_units(500).to_rupiah(), "Rp 500");
        assert_eq!(Money::from_units(30_000).to_rupiah(), "Rp 30.000");
        assert_eq!(Money::from_units(1_234_567).to_rupiah(), "Rp 1.234.567");
        assert_eq!(money("1500.50").to_rupiah(), "Rp 1.500,5");
        assert_eq!(money("-20000").to_rupiah(), "-Rp 20.000");
        assert!(!Money::ZERO.to_rupiah().contains('\u{a0}'));
    }
}
