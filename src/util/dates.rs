use chrono::{DateTime, NaiveDate, Utc};

/// Accepts RFC 3339 timestamps (`created_at`) and plain `YYYY-MM-DD` dates.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `YYYY-MM-DD`, or an empty string for unparseable input.
pub(crate) fn format_iso_date(s: &str) -> String {
    parse_date(s)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `Mar 5`, or an empty string for unparseable input.
pub(crate) fn format_short(s: &str) -> String {
    parse_date(s)
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_default()
}

/// Whole days from `a` to `b` (negative if `b` is earlier).
pub(crate) fn days_between(a: &str, b: &str) -> Option<i64> {
    let a = parse_date(a)?;
    let b = parse_date(b)?;
    Some((b - a).num_days())
}

/// Calendar date (UTC) for a millisecond timestamp.
fn iso_date_from_ms(now_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(now_ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Days remaining until `end` (inclusive of today), never negative.
pub(crate) fn days_left(end: &str, now_ms: i64) -> Option<i64> {
    days_between(&iso_date_from_ms(now_ms), end).map(|d| d.max(0))
}

/// Feed timestamps: "Just now", "5h ago", then the calendar date.
pub(crate) fn relative_time(created_at: &str, now_ms: i64) -> String {
    let Ok(created) = DateTime::parse_from_rfc3339(created_at.trim()) else {
        return format_iso_date(created_at);
    };
    let created_ms = created.timestamp_millis();
    let hours = (now_ms - created_ms).div_euclid(3_600_000);

    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        created.with_timezone(&Utc).format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_left_clamps_past_dates() {
        // 2024-05-01T12:00:00Z
        let now = 1_714_564_800_000;
        assert_eq!(iso_date_from_ms(now), "2024-05-01");
        assert_eq!(days_left("2024-05-11", now), Some(10));
        assert_eq!(days_left("2024-04-01", now), Some(0));
        assert_eq!(days_left("soon", now), None);
    }

    #[test]
    fn test_format_iso_date_accepts_timestamp_and_date() {
        assert_eq!(format_iso_date("2024-03-05T22:10:00Z"), "2024-03-05");
        assert_eq!(format_iso_date("2024-03-05"), "2024-03-05");
        assert_eq!(format_iso_date("yesterday"), "");
    }

    #[test]
    fn test_format_short() {
        assert_eq!(format_short("2024-03-05"), "Mar 5");
        assert_eq!(format_short(""), "");
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between("2024-02-27", "2024-03-02"), Some(4));
        assert_eq!(days_between("2024-03-02", "2024-02-27"), Some(-4));
        assert_eq!(days_between("nope", "2024-03-02"), None);
    }

    #[test]
    fn test_relative_time_buckets() {
        let created = "2024-05-01T10:00:00Z";
        let base = DateTime::parse_from_rfc3339(created)
            .unwrap()
            .timestamp_millis();

        assert_eq!(relative_time(created, base + 30 * 60_000), "Just now");
        assert_eq!(relative_time(created, base + 5 * 3_600_000), "5h ago");
        assert_eq!(relative_time(created, base + 30 * 3_600_000), "2024-05-01");
    }
}
