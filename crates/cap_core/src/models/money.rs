//! Money arithmetic in integer cents.
//!
//! Every dollar figure in the engine (salaries, charges, pool balances,
//! sale proceeds) is a [`Money`]. Values are exact to the cent so repeated
//! buydown edits never drift. On the wire a `Money` is a plain number of
//! dollars; fractional cents are rounded half away from zero on input.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed amount of money stored as whole cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// Error text for dollar inputs outside [`Money::MAX_DOLLARS`].
pub const OUT_OF_RANGE: &str = "money out of range";

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted from outside the engine. Sums of any
    /// realistic roster stay far inside `i64` cents.
    pub const MAX_DOLLARS: i64 = 1_000_000_000_000;

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Converts a dollar amount that may carry fractional cents.
    /// Non-finite input maps to zero; magnitudes above `MAX_DOLLARS` are
    /// clamped.
    pub fn from_dollars_f64(dollars: f64) -> Self {
        if !dollars.is_finite() {
            return Money::ZERO;
        }
        let limit = Self::MAX_DOLLARS as f64;
        Money((dollars.clamp(-limit, limit) * 100.0).round() as i64)
    }

    /// Like [`Money::from_dollars_f64`] but `None` for non-finite input or
    /// a magnitude above `MAX_DOLLARS`.
    pub fn try_from_dollars_f64(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() || dollars.abs() > Self::MAX_DOLLARS as f64 {
            return None;
        }
        Some(Money((dollars * 100.0).round() as i64))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_dollars_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Dollars rounded to the nearest whole dollar (half away from zero).
    pub fn rounded_dollars(self) -> i64 {
        let rem = self.0 % 100;
        let whole = self.0 / 100;
        if rem >= 50 {
            whole + 1
        } else if rem <= -50 {
            whole - 1
        } else {
            whole
        }
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self - other`, floored at zero.
    pub fn saturating_sub_floor(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }

    pub fn clamp(self, lo: Money, hi: Money) -> Money {
        Money(self.0.max(lo.0).min(hi.0.max(lo.0)))
    }

    /// Multiplies by `bps / 10_000`, rounding to the nearest cent.
    pub fn apply_bps(self, bps: u32) -> Money {
        let num = self.0 as i128 * bps as i128;
        Money(saturate(div_round(num, 10_000)))
    }

    /// Divides into `parts` equal shares, rounding to the nearest cent.
    /// Returns `None` for zero parts.
    pub fn split_even(self, parts: u32) -> Option<Money> {
        if parts == 0 {
            return None;
        }
        Some(Money(saturate(div_round(self.0 as i128, parts as i128))))
    }
}

fn saturate(cents: i128) -> i64 {
    cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

fn div_round(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if r.abs() * 2 >= den.abs() {
        q + num.signum() * den.signum()
    } else {
        q
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl fmt::Display for Money {
    /// `$1,234,567` (nearest dollar), with a leading minus for negatives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.rounded_dollars();
        let digits = dollars.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if dollars < 0 {
            write!(f, "-${}", grouped)
        } else {
            write!(f, "${}", grouped)
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_dollars_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        Money::try_from_dollars_f64(dollars).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "{OUT_OF_RANGE}: {dollars} (limit {} dollars)",
                Money::MAX_DOLLARS
            ))
        })
    }
}

impl JsonSchema for Money {
    fn schema_name() -> String {
        "Money".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = match f64::json_schema(gen) {
            schemars::schema::Schema::Object(obj) => obj,
            other => return other,
        };
        schema.metadata().description = Some("Amount in US dollars".to_string());
        schemars::schema::Schema::Object(schema)
    }
}
