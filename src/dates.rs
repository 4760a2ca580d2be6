use serde::Serializer;
use time::{Date, OffsetDateTime};

/// The format of dates on the wire, e.g. `31.12.1999`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Parses a `DD.MM.YYYY` date. Anything else, including short years or
/// trailing text, is rejected.
///
/// ```
/// use music_library::dates::parse_date;
/// assert!(parse_date("01.02.2003").is_some());
/// assert!(parse_date("2003-02-01").is_none());
/// assert!(parse_date("01.02.2003 ").is_none());
/// ```
pub fn parse_date(raw: impl AsRef<str>) -> Option<Date> {
    let raw = raw.as_ref();

    if !has_date_shape(raw) {
        return None;
    }

    Date::parse(raw, DATE_FORMAT).ok()
}

// `Date::parse` stops reading once the format is consumed and takes
// years of any width
fn has_date_shape(raw: &str) -> bool {
    raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            2 | 5 => b == b'.',
            _ => b.is_ascii_digit(),
        })
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
}

/// Whether the start of `date` (UTC) lies strictly before `now`.
pub fn is_in_past(date: Date, now: OffsetDateTime) -> bool {
    date.midnight().assume_utc() < now
}

/// Serializes an optional date in the wire format.
pub fn serialize_option<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where S: Serializer {
    match date {
        Some(date) => serializer.serialize_str(&format_date(*date)),
        None => serializer.serialize_none(),
    }
}
