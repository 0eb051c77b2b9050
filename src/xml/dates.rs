use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive formats accepted after the offset-carrying standards fail.
/// Naive timestamps are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

/// Best-effort parse of a feed timestamp, normalized to UTC.
///
/// Feeds in the wild carry RFC 3339 (sitemaps, Atom), RFC 2822 (RSS), and a
/// long tail of naive local-looking strings. A value that matches none of
/// the accepted shapes yields `None` — date parse failure is the one
/// tolerated, non-fatal failure in the whole pipeline, so this function
/// deliberately has no error type.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    // Date-only values (common in sitemap <lastmod>) become midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rfc3339_utc() {
        let parsed = parse_date("2024-01-02T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_offset_normalized_to_utc() {
        let parsed = parse_date("2024-01-02T05:30:00+05:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc2822() {
        let parsed = parse_date("Tue, 02 Jan 2024 00:00:00 +0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_date_only() {
        let parsed = parse_date("2024-01-02").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_yields_none() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
    }
}
