use chrono::{DateTime, NaiveDate, NaiveDateTime};

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Characters exports use in place of a plain space, including the bytes
/// left behind when a narrow no-break space is decoded with the wrong charset.
fn is_odd_space(c: char) -> bool {
    matches!(
        c,
        '\u{202f}' | '\u{00a0}' | '\u{2009}' | '\u{200b}' | '\u{feff}'
    )
}

/// Parses a timestamp as found in warehouse exports, best effort.
///
/// Invisible separators are normalized first. If the string still does not
/// parse, a repair pass drops garbage between the clock and the AM/PM marker
/// (`3:50:â¯PM`, `3:50: PM`) and tries again.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let normalized = normalize_spaces(raw);
    if normalized.is_empty() {
        return None;
    }
    parse_known(&normalized).or_else(|| repair_meridiem(&normalized).and_then(|s| parse_known(&s)))
}

/// Formats a timestamp the way cleaned exports store it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(OUTPUT_FORMAT).to_string()
}

fn normalize_spaces(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || is_odd_space(c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_known(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn repair_meridiem(s: &str) -> Option<String> {
    let upper = s.to_uppercase();
    let meridiem = if upper.ends_with("AM") {
        "AM"
    } else if upper.ends_with("PM") {
        "PM"
    } else {
        return None;
    };
    let head = s.get(..s.len() - 2)?;
    let clock = head.trim_end_matches(|c: char| !c.is_ascii_digit());
    if clock.is_empty() {
        return None;
    }
    Some(format!("{clock} {meridiem}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2025-07-10 15:50:36", "2025-07-10 15:50:36")]
    #[case("2025-07-10T15:50:36.250", "2025-07-10 15:50:36")]
    #[case("2025-07-10T15:50:36Z", "2025-07-10 15:50:36")]
    #[case("7/10/2025 3:50:36 PM", "2025-07-10 15:50:36")]
    #[case("7/10/2025 3:50:36\u{202f}PM", "2025-07-10 15:50:36")]
    #[case("7/10/2025 3:50:36\u{e2}\u{80}\u{af}PM", "2025-07-10 15:50:36")]
    #[case("7/10/2025 3:50: PM", "2025-07-10 15:50:00")]
    #[case("7/10/2025 3:50:\u{a0}AM", "2025-07-10 03:50:00")]
    #[case("07/10/2025 15:50", "2025-07-10 15:50:00")]
    #[case("2025-07-10", "2025-07-10 00:00:00")]
    fn parses_export_timestamps(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_timestamp(raw).map(|ts| format_timestamp(&ts));
        assert_eq!(parsed.as_deref(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not a date")]
    #[case("PM")]
    fn rejects_garbage(#[case] raw: &str) {
        assert_eq!(parse_timestamp(raw), None);
    }
}
