//! Window keys and rate-limit categories
//!
//! Binance identifies a rate-limit bucket by an interval count and unit, e.g.
//! `intervalNum = 10, interval = "SECOND"`. Response headers carry the same
//! bucket as a suffix, e.g. `X-MBX-ORDER-COUNT-10S`. Both sides must derive the
//! identical key or remaining-capacity lookups silently miss.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::RateLimitError;
use crate::error::Result;

/// Interval unit of a rate-limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl IntervalUnit {
    /// Single uppercase letter used in window keys
    pub fn letter(self) -> char {
        match self {
            IntervalUnit::Second => 'S',
            IntervalUnit::Minute => 'M',
            IntervalUnit::Hour => 'H',
            IntervalUnit::Day => 'D',
        }
    }

    /// Reverse of [`IntervalUnit::letter`]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'S' => Some(IntervalUnit::Second),
            'M' => Some(IntervalUnit::Minute),
            'H' => Some(IntervalUnit::Hour),
            'D' => Some(IntervalUnit::Day),
            _ => None,
        }
    }

    /// Length of a single unit
    pub fn duration(self) -> Duration {
        match self {
            IntervalUnit::Second => Duration::from_secs(1),
            IntervalUnit::Minute => Duration::from_secs(60),
            IntervalUnit::Hour => Duration::from_secs(3600),
            IntervalUnit::Day => Duration::from_secs(86_400),
        }
    }
}

impl FromStr for IntervalUnit {
    type Err = RateLimitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SECOND" => Ok(IntervalUnit::Second),
            "MINUTE" => Ok(IntervalUnit::Minute),
            "HOUR" => Ok(IntervalUnit::Hour),
            "DAY" => Ok(IntervalUnit::Day),
            other => Err(RateLimitError::UnknownInterval(other.to_string())),
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntervalUnit::Second => "SECOND",
            IntervalUnit::Minute => "MINUTE",
            IntervalUnit::Hour => "HOUR",
            IntervalUnit::Day => "DAY",
        };
        f.write_str(name)
    }
}

/// Category a ceiling or usage counter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitCategory {
    /// `REQUEST_WEIGHT`: shared cost of every call
    Weight,
    /// `ORDERS`: consumed by order placement only
    Orders,
}

impl LimitCategory {
    /// Map an exchange `rateLimitType` tag, `None` for anything unrecognised
    /// (e.g. `RAW_REQUESTS`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "REQUEST_WEIGHT" => Some(LimitCategory::Weight),
            "ORDERS" => Some(LimitCategory::Orders),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            LimitCategory::Weight => "REQUEST_WEIGHT",
            LimitCategory::Orders => "ORDERS",
        }
    }
}

/// Derive the window key for `count` units, e.g. `(1, Minute)` -> `"1M"`
pub fn window_key(count: u32, unit: IntervalUnit) -> String {
    format!("{count}{}", unit.letter())
}

/// Split a window key such as `"10S"` back into count and unit
pub fn parse_window_key(key: &str) -> Result<(u32, IntervalUnit)> {
    let invalid = || RateLimitError::InvalidWindowKey(key.to_string());

    let mut chars = key.chars();
    let letter = chars.next_back().ok_or_else(invalid)?;
    let unit = IntervalUnit::from_letter(letter).ok_or_else(invalid)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let count: u32 = digits.parse().map_err(|_| invalid())?;

    if count == 0 {
        return Err(invalid());
    }

    Ok((count, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_key_derivation() {
        assert_eq!(window_key(1, IntervalUnit::Minute), "1M");
        assert_eq!(window_key(10, IntervalUnit::Second), "10S");
        assert_eq!(window_key(1, IntervalUnit::Day), "1D");
    }

    #[test]
    fn test_unit_from_exchange_tag() {
        assert_eq!("MINUTE".parse::<IntervalUnit>().unwrap(), IntervalUnit::Minute);
        assert_eq!("SECOND".parse::<IntervalUnit>().unwrap(), IntervalUnit::Second);
        assert!(matches!("WEEK".parse::<IntervalUnit>(), Err(RateLimitError::UnknownInterval(_))));
    }

    #[test]
    fn test_parse_window_key() {
        assert_eq!(parse_window_key("1M").unwrap(), (1, IntervalUnit::Minute));
        assert_eq!(parse_window_key("10S").unwrap(), (10, IntervalUnit::Second));

        assert!(parse_window_key("").is_err());
        assert!(parse_window_key("M").is_err());
        assert!(parse_window_key("0M").is_err());
        assert!(parse_window_key("1m").is_err());
        assert!(parse_window_key("1X").is_err());
    }

    #[test]
    fn test_parse_window_key_requires_plain_digits() {
        assert!(matches!(parse_window_key("+5M"), Err(RateLimitError::InvalidWindowKey(_))));
        assert!(parse_window_key("-5M").is_err());
        assert!(parse_window_key(" 5M").is_err());
        assert!(parse_window_key("5_0S").is_err());
        assert_eq!(parse_window_key("05M").unwrap(), (5, IntervalUnit::Minute));
    }

    #[test]
    fn test_window_key_round_trips_through_display() {
        let unit: IntervalUnit = IntervalUnit::Hour.to_string().parse().unwrap();
        assert_eq!(window_key(2, unit), "2H");
        assert_eq!(IntervalUnit::Minute.duration() * 5, Duration::from_secs(300));
    }

    #[test]
    fn test_category_tags() {
        assert_eq!(LimitCategory::from_tag("REQUEST_WEIGHT"), Some(LimitCategory::Weight));
        assert_eq!(LimitCategory::from_tag("ORDERS"), Some(LimitCategory::Orders));
        assert_eq!(LimitCategory::from_tag("RAW_REQUESTS"), None);
        assert_eq!(LimitCategory::Orders.tag(), "ORDERS");
    }
}
