use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

const NUMBER_ESCAPE_CHAR: &[char] = &[',', ' ', '"', '\n', '\r', '\t'];

/// 交易所以此表示當日無成交價
const NO_VALUE: &str = "--";

/// Parses a decimal value from a given string.
///
/// Thousands separators and the characters in `NUMBER_ESCAPE_CHAR` are
/// removed before parsing, together with any extra `escape_chars`.
///
/// ```
/// let s = "1,234.56";
/// let decimal_value = parse_decimal(s, None).unwrap();
/// ```
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Same as `parse_decimal`, but `--` or a blank cell yields `None`.
pub fn parse_optional_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Option<Decimal>> {
    let cleaned = clean_escape_chars(s, escape_chars);
    if cleaned.is_empty() || cleaned == NO_VALUE {
        return Ok(None);
    }

    parse_decimal(&cleaned, None).map(Some)
}

/// Parses an `i64` value from a given string that may include commas as
/// thousands separators.
///
/// ```
/// let s = "6,016,227";
/// let i64_value = parse_i64(s, None).unwrap();
/// ```
pub fn parse_i64(s: &str, escape_chars: Option<Vec<char>>) -> Result<i64> {
    let cleaned = clean_escape_chars(s, escape_chars);
    i64::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as i64 because: {:?}", cleaned, why))
}

/// Removes a set of escape characters from a given string.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1,234.56", None).unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal(" 164.70", None).unwrap().to_string(), "164.70");
        assert_eq!(parse_decimal("+0.45", Some(vec!['+'])).unwrap(), dec!(0.45));
        assert_eq!(parse_decimal("X0.00", Some(vec!['X'])).unwrap(), dec!(0));
        assert!(parse_decimal("abc", None).is_err());
    }

    #[test]
    fn test_parse_optional_decimal() {
        assert_eq!(parse_optional_decimal("--", None).unwrap(), None);
        assert_eq!(parse_optional_decimal(" ", None).unwrap(), None);
        assert_eq!(
            parse_optional_decimal("-1.20", None).unwrap(),
            Some(dec!(-1.20))
        );
        assert!(parse_optional_decimal("1.2.3", None).is_err());
    }

    #[test]
    fn test_parse_i64() {
        assert_eq!(parse_i64("6,016,227", None).unwrap(), 6_016_227);
        assert_eq!(parse_i64("989,015,000", None).unwrap(), 989_015_000);
        assert!(parse_i64("1.5", None).is_err());
    }

    #[test]
    fn test_clean_escape_chars() {
        let result = clean_escape_chars("X+1,234 ", Some(vec!['X', '+']));
        assert_eq!(result, "1234");
    }
}
