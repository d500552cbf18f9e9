use chrono::{Local, NaiveDate};

use crate::declare::YearMonth;

/// Convert ROC year to Gregorian year.
pub fn to_gregorian_year(year: i32) -> i32 {
    year + 1911
}

/// Parse a date string in the format of ROC calendar (e.g. `113/05/02`)
/// and return it as a NaiveDate in the Gregorian calendar.
pub fn parse_taiwan_date(date_str: &str) -> Option<NaiveDate> {
    let split_date: Vec<&str> = date_str.trim().split(['/', '-']).collect();
    if split_date.len() != 3 {
        return None;
    }

    let year = to_gregorian_year(parse_date_part::<i32>(split_date[0])?);
    let month = parse_date_part::<u32>(split_date[1])?;
    let day = parse_date_part::<u32>(split_date[2])?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Try to parse a string as a date part and return it as an Option.
fn parse_date_part<T: std::str::FromStr>(date_part_str: &str) -> Option<T> {
    date_part_str.trim().parse::<T>().ok()
}

/// 本地時間的當月
pub fn current_month() -> YearMonth {
    YearMonth::of(&Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_taiwan_date() {
        assert_eq!(
            parse_taiwan_date("113/05/02"),
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );
        assert_eq!(
            parse_taiwan_date("92/01/02"),
            NaiveDate::from_ymd_opt(2003, 1, 2)
        );
        assert_eq!(
            parse_taiwan_date(" 101-08-31 "),
            NaiveDate::from_ymd_opt(2012, 8, 31)
        );
    }

    #[test]
    fn test_parse_taiwan_date_invalid() {
        assert_eq!(parse_taiwan_date("113/02/30"), None);
        assert_eq!(parse_taiwan_date("2024-05"), None);
        assert_eq!(parse_taiwan_date("abc/05/02"), None);
    }
}
