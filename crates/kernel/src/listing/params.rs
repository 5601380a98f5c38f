//! Parse-or-default normalization for request parameters.
//!
//! Query-string values arrive as optional strings and malformed input is
//! never a hard error: it falls back to the field's default. Fields that are
//! non-negative by domain rule (price, stock, caps) clamp negative input to
//! zero.

/// Largest page size a feed caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Parse an integer, falling back to `default` on missing or malformed input.
pub fn parse_i64_or(raw: Option<&str>, default: i64) -> i64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(default)
}

/// Parse a non-negative integer. Malformed input falls back to `default`;
/// negative values clamp to zero.
pub fn parse_nonneg_or(raw: Option<&str>, default: i64) -> i64 {
    parse_i64_or(raw, default).max(0)
}

/// Parse an optional non-negative integer. Missing, malformed, or negative
/// input yields `None`.
pub fn parse_opt_nonneg(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|v| *v >= 0)
}

/// Effective page number: defaults to 1, anything below 1 is 1.
pub fn page_from(raw: Option<&str>) -> i64 {
    parse_i64_or(raw, 1).max(1)
}

/// Effective page size for feed listings: defaults to `default`, clamped to
/// `[1, MAX_PAGE_SIZE]`.
pub fn page_size_from(raw: Option<&str>, default: i64) -> i64 {
    parse_i64_or(raw, default).clamp(1, MAX_PAGE_SIZE)
}

/// Month filter: only values 1 through 12 survive.
pub fn month_from(raw: Option<&str>) -> Option<i16> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i16>().ok())
        .filter(|m| (1..=12).contains(m))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(page_from(None), 1);
        assert_eq!(page_from(Some("")), 1);
        assert_eq!(page_from(Some("abc")), 1);
        assert_eq!(page_from(Some("0")), 1);
        assert_eq!(page_from(Some("-3")), 1);
        assert_eq!(page_from(Some("7")), 7);
        assert_eq!(page_from(Some(" 2 ")), 2);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(page_size_from(None, 20), 20);
        assert_eq!(page_size_from(Some("2"), 20), 2);
        assert_eq!(page_size_from(Some("500"), 20), 100);
        assert_eq!(page_size_from(Some("0"), 20), 1);
        assert_eq!(page_size_from(Some("junk"), 20), 20);
    }

    #[test]
    fn nonneg_clamps_negative_to_zero() {
        assert_eq!(parse_nonneg_or(Some("-5"), 3), 0);
        assert_eq!(parse_nonneg_or(Some("5"), 3), 5);
        assert_eq!(parse_nonneg_or(Some("x"), 3), 3);
        assert_eq!(parse_nonneg_or(None, 3), 3);
    }

    #[test]
    fn opt_nonneg_rejects_negatives_and_junk() {
        assert_eq!(parse_opt_nonneg(Some("185")), Some(185));
        assert_eq!(parse_opt_nonneg(Some("-1")), None);
        assert_eq!(parse_opt_nonneg(Some("tall")), None);
        assert_eq!(parse_opt_nonneg(None), None);
    }

    #[test]
    fn month_only_accepts_calendar_months() {
        assert_eq!(month_from(Some("10")), Some(10));
        assert_eq!(month_from(Some("1")), Some(1));
        assert_eq!(month_from(Some("12")), Some(12));
        assert_eq!(month_from(Some("0")), None);
        assert_eq!(month_from(Some("13")), None);
        assert_eq!(month_from(Some("Okt")), None);
        assert_eq!(month_from(None), None);
    }
}
