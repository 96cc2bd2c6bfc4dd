use std::{fmt, ops::Add, str::FromStr};

use crate::EngineError;

/// Non-negative money amount typed in by a user.
///
/// The ledger schema stores amounts as `REAL`, so the value is an `f64`; the
/// constructor guarantees it lies in `0..=Amount::MAX`.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10,5".parse::<Amount>().unwrap().value(), 10.5);
/// assert_eq!("+3".parse::<Amount>().unwrap().to_string(), "3.00");
/// assert!("-1".parse::<Amount>().is_err());
/// assert!("abc".parse::<Amount>().is_err());
/// assert!("1e308".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);
    /// Largest amount a single entry may carry.
    pub const MAX: Amount = Amount(1e12);

    /// Wraps `value` if it is within `0..=Amount::MAX`.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=Self::MAX.0).contains(&value)).then_some(Self(value + 0.0))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_money(self.0))
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses user input into an amount.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`.
    /// Rejects empty input, negative values, `NaN`, infinities and anything
    /// above [`Amount::MAX`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(EngineError::InvalidAmount("negative amount".to_string()));
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed).trim_start();
        if unsigned.starts_with(['+', '-']) {
            return Err(EngineError::InvalidAmount("invalid amount".to_string()));
        }

        let value: f64 = unsigned
            .replace(',', ".")
            .parse()
            .map_err(|_| EngineError::InvalidAmount(format!("not a number: {trimmed}")))?;

        Amount::new(value)
            .ok_or_else(|| EngineError::InvalidAmount(format!("out of range: {trimmed}")))
    }
}

/// Rounds to two decimals, half away from zero.
///
/// Values too large to scale by 100 have no fractional part left and are
/// returned unchanged.
#[must_use]
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Formats a (possibly negative) money value with exactly two decimals.
#[must_use]
pub fn format_money(value: f64) -> String {
    let rounded = round2(value);
    // avoid "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Amount>().unwrap().value(), 10.0);
        assert_eq!("10.5".parse::<Amount>().unwrap().value(), 10.5);
        assert_eq!("10,50".parse::<Amount>().unwrap().value(), 10.5);
        assert_eq!("  2.30 ".parse::<Amount>().unwrap().value(), 2.3);
        assert_eq!("0".parse::<Amount>().unwrap(), Amount::ZERO);
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["", "   ", "abc", "-5", "-0", "+-5", "NaN", "inf", "1.2.3", "12 rub"] {
            assert!(raw.parse::<Amount>().is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn parse_caps_at_max() {
        assert_eq!("1e12".parse::<Amount>().unwrap(), Amount::MAX);
        for raw in ["1000000000000.01", "1e13", "1e308", "1e400"] {
            assert!(
                matches!(raw.parse::<Amount>(), Err(EngineError::InvalidAmount(_))),
                "{raw:?} should be rejected"
            );
        }
        assert_eq!(Amount::new(f64::MAX), None);
    }

    #[test]
    fn round2_stays_finite_for_huge_values() {
        assert_eq!(round2(1e308), 1e308);
        assert!(format_money(f64::MAX).ends_with(".00"));
        assert_eq!(round2(2.0 * 1e12), 2e12);
    }

    #[test]
    fn display_rounds_half_away_from_zero() {
        assert_eq!(Amount::new(0.125).unwrap().to_string(), "0.13");
        assert_eq!(Amount::new(1000.0).unwrap().to_string(), "1000.00");
        assert_eq!(format_money(-0.125), "-0.13");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(850.0), "850.00");
    }
}
