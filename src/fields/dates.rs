//! Calendar value parsing and formatting

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};

/// Textual format of `date` values
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Textual format of `datetime` values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a calendar value, interpreting naive values in `timezone`
///
/// Accepts RFC 3339, `Y-m-d H:i:s` and `Y-m-d`.
pub fn parse(text: &str, timezone: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(timezone));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return timezone.from_local_datetime(&naive).single();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return timezone.from_local_datetime(&naive).single();
    }
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    timezone
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()
}

pub fn format_date(value: &DateTime<FixedOffset>, timezone: &FixedOffset) -> String {
    value.with_timezone(timezone).format(DATE_FORMAT).to_string()
}

pub fn format_datetime(value: &DateTime<FixedOffset>, timezone: &FixedOffset) -> String {
    value.with_timezone(timezone).format(DATETIME_FORMAT).to_string()
}

/// Wire representation used in API payloads
pub fn to_wire(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, false)
}
