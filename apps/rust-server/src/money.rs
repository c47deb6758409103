// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Money
//!
//! Prices are fixed-point decimals with two fractional digits, stored as
//! integer cents. The JSON representation is a plain number (`12.5`), and
//! both numbers and decimal strings are accepted on input so the same type
//! works for request bodies and query strings.
//!
//! Values are limited to precision 10 / scale 2, i.e. at most
//! `99999999.99`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest representable amount in cents (precision 10, scale 2).
const MAX_CENTS: i64 = 99_999_999_99;

/// A monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

/// Error returned when a decimal string cannot be parsed as [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    NotANumber(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' exceeds the maximum amount of 99999999.99")]
    OutOfRange(String),
}

impl Money {
    #[cfg(test)]
    pub(crate) const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(MoneyParseError::NotANumber(trimmed.to_string()));
        }

        // Trailing zeros beyond the scale carry no value ("12.500").
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(trimmed.to_string()));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > 8 {
            return Err(MoneyParseError::OutOfRange(trimmed.to_string()));
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| MoneyParseError::NotANumber(trimmed.to_string()))?
                * 100
        };
        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let cents = whole_cents + fraction_cents;
        if cents > MAX_CENTS {
            return Err(MoneyParseError::OutOfRange(trimmed.to_string()));
        }

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two decimal places")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        // `Display` for f64 yields the shortest round-tripping representation,
        // so 12.5 parses as exactly 1250 cents.
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings() {
        assert_eq!("12.50".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_cents(1250));
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!(".99".parse::<Money>().unwrap(), Money::from_cents(99));
        assert_eq!("-0.01".parse::<Money>().unwrap(), Money::from_cents(-1));
        assert_eq!("13.990".parse::<Money>().unwrap(), Money::from_cents(1399));
    }

    #[test]
    fn rejects_invalid_amounts() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!(
            "abc".parse::<Money>(),
            Err(MoneyParseError::NotANumber(_))
        ));
        assert!(matches!(
            "1.234".parse::<Money>(),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(matches!(
            "100000000".parse::<Money>(),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(matches!(".".parse::<Money>(), Err(MoneyParseError::NotANumber(_))));
    }

    #[test]
    fn json_numbers_and_strings_deserialize() {
        let from_number: Money = serde_json::from_str("12.50").unwrap();
        let from_string: Money = serde_json::from_str("\"13.99\"").unwrap();
        let from_int: Money = serde_json::from_str("7").unwrap();
        assert_eq!(from_number, Money::from_cents(1250));
        assert_eq!(from_string, Money::from_cents(1399));
        assert_eq!(from_int, Money::from_cents(700));
        assert!(serde_json::from_str::<Money>("0.001").is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&Money::from_cents(1250)).unwrap();
        assert_eq!(json, "12.5");
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_cents(1250).to_string(), "12.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }
}
