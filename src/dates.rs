//! Due-date normalization.
//!
//! The portal renders deadlines in several Korean locale formats. Everything
//! funnels into one canonical `YYYY-MM-DD HH:MM:SS` string so downstream
//! comparison and sorting never touch raw page text.
//!
//! Parsing is an ordered table of pure functions, first match wins. Each
//! parser produces structured [`DateParts`]; zero-padding and calendar
//! validation happen exactly once, at the formatting boundary.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// The institution's local zone. Korea has no DST, so a fixed offset is exact.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

/// A parsed wall-clock timestamp, not yet validated against the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

/// One entry in the ordered pattern table. Takes the raw text and the
/// reference year for patterns that omit the year.
pub type DateParser = fn(&str, i32) -> Option<DateParts>;

/// The pattern table, in priority order. The first parser returning `Some`
/// wins and no later entry is consulted.
pub const PARSERS: &[(&str, DateParser)] = &[
    ("korean-full", parse_korean_full),
    ("dotted", parse_dotted),
    ("month-day", parse_month_day),
    ("korean-meridiem", parse_korean_meridiem),
];

static CANONICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}(:\d{2})?$").unwrap());

static KOREAN_FULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일\s*(\d{1,2})시\s*(\d{1,2})분").unwrap()
});

static DOTTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})\.(\d{1,2})\.(\d{1,2})\s*(\d{1,2}):(\d{1,2})").unwrap());

static MONTH_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})월\s*(\d{1,2})일.*?(\d{1,2}):(\d{2})").unwrap());

static MERIDIEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})\s+오[전후]\s*(\d{1,2}):(\d{2})").unwrap());

/// Normalizes raw date text to canonical `YYYY-MM-DD HH:MM:SS`.
///
/// Already-canonical input is returned as-is, with `:00` seconds appended
/// when absent. Otherwise the pattern table is consulted in order. `None`
/// means "no due date" to every caller; assignments are then dropped,
/// lectures kept without a deadline.
#[must_use]
pub fn normalize(raw: &str, reference_year: i32) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if CANONICAL_RE.is_match(trimmed) {
        return Some(if trimmed.len() == 16 {
            format!("{trimmed}:00")
        } else {
            trimmed.to_string()
        });
    }

    for (name, parser) in PARSERS {
        if let Some(parts) = parser(trimmed, reference_year) {
            let Some(canonical) = format_canonical(parts) else {
                debug!(pattern = name, raw = trimmed, "date matched but is not a real calendar day");
                return None;
            };
            return Some(canonical);
        }
    }

    debug!(raw = trimmed, "unparseable due date");
    None
}

/// `2025년 9월 25일 0시 0분`
fn parse_korean_full(raw: &str, _reference_year: i32) -> Option<DateParts> {
    let caps = KOREAN_FULL_RE.captures(raw)?;
    Some(DateParts {
        year: caps[1].parse().ok()?,
        month: caps[2].parse().ok()?,
        day: caps[3].parse().ok()?,
        hour: caps[4].parse().ok()?,
        minute: caps[5].parse().ok()?,
    })
}

/// `2025.9.25 0:00`
fn parse_dotted(raw: &str, _reference_year: i32) -> Option<DateParts> {
    let caps = DOTTED_RE.captures(raw)?;
    Some(DateParts {
        year: caps[1].parse().ok()?,
        month: caps[2].parse().ok()?,
        day: caps[3].parse().ok()?,
        hour: caps[4].parse().ok()?,
        minute: caps[5].parse().ok()?,
    })
}

/// `9월 25일 (목) 23:59`. The portal omits the year on near-term dates, so
/// the crawl's reference year fills it in.
fn parse_month_day(raw: &str, reference_year: i32) -> Option<DateParts> {
    let caps = MONTH_DAY_RE.captures(raw)?;
    Some(DateParts {
        year: reference_year,
        month: caps[1].parse().ok()?,
        day: caps[2].parse().ok()?,
        hour: caps[3].parse().ok()?,
        minute: caps[4].parse().ok()?,
    })
}

/// `2025-09-25 오후 3:00`, recognized but deliberately unsupported. Shipped
/// clients have never converted meridiem dates, and starting to would
/// silently change which assignments survive aggregation. Inputs in this
/// shape always normalize to `None`.
fn parse_korean_meridiem(raw: &str, _reference_year: i32) -> Option<DateParts> {
    if MERIDIEM_RE.is_match(raw) {
        debug!(raw, "meridiem (오전/오후) dates are not supported, dropping");
    }
    None
}

/// The single place zero-padding and calendar validation happen.
fn format_canonical(parts: DateParts) -> Option<String> {
    NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)?
        .and_hms_opt(parts.hour, parts.minute, 0)?;
    Some(format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:00",
        parts.year, parts.month, parts.day, parts.hour, parts.minute
    ))
}

/// Seconds from `now` until a canonical due timestamp in the institution
/// zone. `None` when the deadline has passed or the input is not canonical.
#[must_use]
pub fn remaining_seconds(due: &str, now: DateTime<Utc>) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(due, "%Y-%m-%d %H:%M:%S").ok()?;
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)?;
    let due_at = kst.from_local_datetime(&naive).single()?;
    let remaining = (due_at.with_timezone(&Utc) - now).num_seconds();
    (remaining > 0).then_some(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const YEAR: i32 = 2025;

    #[test]
    fn canonical_passes_through_with_seconds_defaulted() {
        assert_eq!(
            normalize("2025-09-25 00:00", YEAR).as_deref(),
            Some("2025-09-25 00:00:00")
        );
        assert_eq!(
            normalize("2025-09-25 00:00:30", YEAR).as_deref(),
            Some("2025-09-25 00:00:30")
        );
    }

    #[test]
    fn korean_full_pattern() {
        assert_eq!(
            normalize("2025년 9월 25일 0시 0분", YEAR).as_deref(),
            Some("2025-09-25 00:00:00")
        );
    }

    #[test]
    fn dotted_pattern() {
        assert_eq!(
            normalize("2025.9.28 23:59", YEAR).as_deref(),
            Some("2025-09-28 23:59:00")
        );
    }

    #[test]
    fn month_day_pattern_uses_reference_year() {
        assert_eq!(
            normalize("9월 25일 (목) 23:59", YEAR).as_deref(),
            Some("2025-09-25 23:59:00")
        );
        assert_eq!(
            normalize("9월 25일 (목) 23:59", 2026).as_deref(),
            Some("2026-09-25 23:59:00")
        );
    }

    #[test]
    fn meridiem_dates_are_a_known_gap() {
        assert_eq!(normalize("2025-09-25 오후 3:00", YEAR), None);
        assert_eq!(normalize("2025-09-25 오전 11:30", YEAR), None);
    }

    #[test]
    fn first_pattern_wins() {
        // Matches both the korean-full and (embedded) dotted shapes; the
        // table order makes korean-full authoritative.
        let mixed = "2025년 9월 25일 10시 5분 (2025.9.26 11:00)";
        assert_eq!(normalize(mixed, YEAR).as_deref(), Some("2025-09-25 10:05:00"));
    }

    #[test]
    fn impossible_calendar_days_are_rejected() {
        assert_eq!(normalize("2025.13.40 10:00", YEAR), None);
        assert_eq!(normalize("2025.2.30 10:00", YEAR), None);
    }

    #[test]
    fn junk_is_none() {
        assert_eq!(normalize("", YEAR), None);
        assert_eq!(normalize("   ", YEAR), None);
        assert_eq!(normalize("next Tuesday-ish", YEAR), None);
    }

    #[test]
    fn normalize_is_idempotent_on_its_own_output() {
        for raw in ["2025.9.1 09:00", "2025년 9월 25일 0시 0분", "9월 3일 10:00"] {
            let once = normalize(raw, YEAR).unwrap();
            assert_eq!(normalize(&once, YEAR).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn remaining_seconds_is_positive_or_none() {
        // 2025-09-28 23:59:00 KST == 14:59:00 UTC.
        let before = Utc.with_ymd_and_hms(2025, 9, 28, 14, 58, 0).unwrap();
        assert_eq!(remaining_seconds("2025-09-28 23:59:00", before), Some(60));

        let after = Utc.with_ymd_and_hms(2025, 9, 28, 15, 0, 0).unwrap();
        assert_eq!(remaining_seconds("2025-09-28 23:59:00", after), None);

        assert_eq!(remaining_seconds("not a date", before), None);
    }
}
