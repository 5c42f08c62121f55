//! Decoding of Binance decimal strings into fixed-point integers
//!
//! Prices and quantities arrive as JSON strings such as `"42250.15"`. They are
//! parsed straight into `i64` scaled by [`FIXED_POINT_MULTIPLIER`] without going
//! through `f64`.

use serde::Deserialize;
use serde::Deserializer;

pub const FIXED_POINT_MULTIPLIER: i64 = 100_000_000;
pub const DECIMAL_PLACES: usize = 8;

/// Parse a decimal string into fixed-point, truncating beyond 8 places
pub fn parse_fixed_point(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let int_value: i64 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };

    let frac = &frac_part[..frac_part.len().min(DECIMAL_PLACES)];
    let frac_value: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    let frac_scaled = frac_value * 10i64.pow((DECIMAL_PLACES - frac.len()) as u32);

    let value = int_value.checked_mul(FIXED_POINT_MULTIPLIER)?.checked_add(frac_scaled)?;
    Some(if negative { -value } else { value })
}

#[inline(always)]
pub fn from_fixed_point(value: i64) -> f64 {
    value as f64 / FIXED_POINT_MULTIPLIER as f64
}

pub(crate) fn parse_field<E: serde::de::Error>(s: &str) -> Result<i64, E> {
    parse_fixed_point(s).ok_or_else(|| E::custom(format!("invalid decimal string: {s:?}")))
}

/// Deserialize a JSON string field directly to i64 fixed-point
pub fn deserialize_fixed_point_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: &str = Deserialize::deserialize(deserializer)?;
    parse_field(s)
}

/// Same as [`deserialize_fixed_point_string`] for fields that may be `""` or absent
pub fn deserialize_optional_fixed_point<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<&str> = Deserialize::deserialize(deserializer)?;
    match s {
        None | Some("") => Ok(None),
        Some(s) => parse_field(s).map(Some),
    }
}

/// Deserialize `[["price", "qty"], ...]` depth levels to fixed-point pairs
pub fn deserialize_price_levels<'de, D>(deserializer: D) -> Result<Vec<(i64, i64)>, D::Error>
where
    D: Deserializer<'de>,
{
    let levels: Vec<(&str, &str)> = Deserialize::deserialize(deserializer)?;

    levels.into_iter().map(|(price, qty)| Ok((parse_field::<D::Error>(price)?, parse_field::<D::Error>(qty)?))).collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[test]
    fn test_parse_fixed_point() {
        assert_eq!(parse_fixed_point("42250.15"), Some(4_225_015_000_000));
        assert_eq!(parse_fixed_point("0.00000123"), Some(123));
        assert_eq!(parse_fixed_point("-0.00010000"), Some(-10_000));
        assert_eq!(parse_fixed_point("7"), Some(700_000_000));
        assert_eq!(parse_fixed_point(".5"), Some(50_000_000));
        assert_eq!(parse_fixed_point("1.123456789"), Some(112_345_678));
    }

    #[test]
    fn test_parse_fixed_point_rejects_garbage() {
        assert_eq!(parse_fixed_point(""), None);
        assert_eq!(parse_fixed_point("."), None);
        assert_eq!(parse_fixed_point("1e5"), None);
        assert_eq!(parse_fixed_point("1.2.3"), None);
        assert_eq!(parse_fixed_point("99999999999999"), None);
    }

    #[test]
    fn test_deserialize_fixed_point_string() {
        #[derive(Deserialize)]
        struct TestStruct {
            #[serde(deserialize_with = "deserialize_fixed_point_string")]
            price: i64,
        }

        let result: TestStruct = serde_json::from_str(r#"{"price":"42250.15"}"#).unwrap();
        assert_eq!(result.price, 4_225_015_000_000);
        assert!((from_fixed_point(result.price) - 42250.15).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_optional_fixed_point() {
        #[derive(Deserialize)]
        struct TestStruct {
            #[serde(default, deserialize_with = "deserialize_optional_fixed_point")]
            rate: Option<i64>,
        }

        let empty: TestStruct = serde_json::from_str(r#"{"rate":""}"#).unwrap();
        assert_eq!(empty.rate, None);

        let missing: TestStruct = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(missing.rate, None);

        let set: TestStruct = serde_json::from_str(r#"{"rate":"0.0001"}"#).unwrap();
        assert_eq!(set.rate, Some(10_000));
    }

    #[test]
    fn test_deserialize_price_levels() {
        #[derive(Deserialize)]
        struct TestStruct {
            #[serde(deserialize_with = "deserialize_price_levels")]
            bids: Vec<(i64, i64)>,
        }

        let json = r#"{"bids":[["42250.15","1.5"],["42250.10","2.0"]]}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();

        assert_eq!(result.bids, vec![(4_225_015_000_000, 150_000_000), (4_225_010_000_000, 200_000_000)]);
    }
}
