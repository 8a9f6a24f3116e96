use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Layouts accepted for timestamps without an explicit offset (read as UTC).
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a content timestamp into UTC.
///
/// Accepted forms, tried in order:
///
/// - RFC 3339 (`2024-01-02T03:04:05+01:00`)
/// - Offset-less ISO (`2024-01-02T03:04:05`, `2024-01-02 03:04:05.250`), taken as UTC
/// - Date only (`2024-01-02`), at midnight UTC
/// - Compact wiki form (`20240102030405` or `20240102030405250` with milliseconds)
///
/// Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    parse_compact(value)
}

fn parse_compact(value: &str) -> Option<DateTime<Utc>> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (seconds, millis) = match value.len() {
        14 => (value, 0),
        17 => (&value[..14], value[14..].parse::<i64>().ok()?),
        _ => return None,
    };
    let naive = NaiveDateTime::parse_from_str(seconds, "%Y%m%d%H%M%S").ok()?;
    Some((naive + Duration::milliseconds(millis)).and_utc())
}

/// Formats a timestamp the way Atom `<updated>` elements expect it.
///
/// Second precision, always UTC with a `Z` suffix.
pub fn to_iso_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// [`to_iso_date`] for optional timestamps; absent values become `""`.
pub fn format_updated(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(to_iso_date).unwrap_or_default()
}
