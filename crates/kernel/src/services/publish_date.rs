//! Publish-date parsing for the news feed.
//!
//! News rows store the publication date as a display string in mixed
//! Indonesian/English locales ("Kamis, 09 Okt 2025 13:40 WIB", "21 Aug
//! 2022"). The feed needs two things recovered from it: the calendar month
//! for the `month` filter, and a sortable datetime for the feed rank.
//! Strings that cannot be parsed simply yield `None` — they are filterable
//! by nothing and sort past the end of the descending feed.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Day-first date with month token: "09 Okt 2025", "9 October 2025".
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+([[:alpha:]\.]+|\d{1,2})\s+(20\d{2})(?:\s+(\d{1,2}):(\d{2}))?")
        .expect("valid regex literal")
});

/// Map a month token (Indonesian or English, full or abbreviated) to 1-12.
fn month_from_token(token: &str) -> Option<u32> {
    let token = token.trim_end_matches('.').to_lowercase();
    let month = match token.as_str() {
        "jan" | "januari" | "january" => 1,
        "feb" | "februari" | "february" => 2,
        "mar" | "maret" | "march" => 3,
        "apr" | "april" => 4,
        "mei" | "may" => 5,
        "jun" | "juni" | "june" => 6,
        "jul" | "juli" | "july" => 7,
        "agu" | "agustus" | "aug" | "august" => 8,
        "sep" | "september" => 9,
        "okt" | "oct" | "oktober" | "october" => 10,
        "nov" | "november" => 11,
        "des" | "dec" | "desember" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Extract the calendar month (1-12) from a display date string.
///
/// Requires a day-first "DD <month> YYYY" shape; a bare "July 2025" is not
/// enough to anchor the match and yields `None`.
pub fn extract_month(raw: &str) -> Option<u32> {
    let caps = DAY_MONTH_YEAR.captures(raw)?;
    let token = caps.get(2)?.as_str();
    if let Some(month) = month_from_token(token) {
        return Some(month);
    }
    token.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

/// Parse a display date string into a sortable datetime.
///
/// Accepts an optional leading day name ("Kamis, "), day-first date with a
/// named or numeric month, and an optional HH:MM time. Returns `None` for
/// impossible dates ("Sept 31 2025") and unrecognized shapes.
pub fn parse_for_sort(raw: &str) -> Option<NaiveDateTime> {
    let caps = DAY_MONTH_YEAR.captures(raw)?;

    let day: u32 = caps.get(1)?.as_str().parse().ok()?;
    let token = caps.get(2)?.as_str();
    let month = month_from_token(token)
        .or_else(|| token.parse::<u32>().ok().filter(|m| (1..=12).contains(m)))?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;

    let hour: u32 = caps.get(4).map_or(Some(0), |h| h.as_str().parse().ok())?;
    let minute: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn extract_month_various_locales() {
        assert_eq!(extract_month("Kamis, 09 Okt 2025 13:40 WIB"), Some(10));
        assert_eq!(extract_month("9 October 2025"), Some(10));
        assert_eq!(extract_month("12 Desember 2024"), Some(12));
        assert_eq!(extract_month("1 Mei 2023"), Some(5));
        assert_eq!(extract_month("21 Aug 2022"), Some(8));
        assert_eq!(extract_month("July 2025"), None);
    }

    #[test]
    fn extract_month_handles_empty_or_weird() {
        assert_eq!(extract_month(""), None);
        assert_eq!(extract_month("no date here"), None);
    }

    #[test]
    fn parse_accepts_dayname_and_24h_time() {
        assert_eq!(
            parse_for_sort("Kamis, 09 Okt 2025 13:40 WIB"),
            Some(dt(2025, 10, 9, 13, 40))
        );
    }

    #[test]
    fn parse_accepts_without_dayname_and_time() {
        assert_eq!(parse_for_sort("09 Okt 2025"), Some(dt(2025, 10, 9, 0, 0)));
    }

    #[test]
    fn parse_accepts_numeric_month() {
        assert_eq!(
            parse_for_sort("09 10 2025 08:05"),
            Some(dt(2025, 10, 9, 8, 5))
        );
    }

    #[test]
    fn parse_invalid_returns_none() {
        assert_eq!(parse_for_sort("Sept 31 2025"), None);
        assert_eq!(parse_for_sort("foo bar"), None);
        assert_eq!(parse_for_sort(""), None);
    }
}
