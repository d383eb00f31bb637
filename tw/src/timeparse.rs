//! Time phrase normalization
//!
//! Converts vague or explicit time phrases ("3pm", "around noon",
//! "morning", "18:00") into a canonical local clock time plus a UTC
//! instant for a given date and IANA timezone. Never fails: unparsable
//! input anchors at the midday default.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::debug;

use crate::domain::NormalizedTime;

/// Fallback anchor for missing or unparsable time phrases
pub const DEFAULT_HOUR: u32 = 12;

static AM_PM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("valid am/pm regex"));

static HH_MM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid HH:MM regex"));

static BARE_HOUR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})\s*$").expect("valid hour regex"));

/// Named day periods map to fixed clock anchors
fn named_anchor(phrase: &str) -> Option<(u32, u32)> {
    match phrase {
        "morning" => Some((9, 0)),
        "afternoon" => Some((14, 0)),
        "evening" => Some((18, 0)),
        "night" | "tonight" => Some((21, 0)),
        "noon" | "midday" => Some((12, 0)),
        _ => None,
    }
}

/// Parse a time phrase into (hour, minute), if any signal is present
fn parse_phrase(phrase: &str) -> Option<(u32, u32)> {
    let cleaned = phrase
        .trim()
        .to_lowercase()
        .trim_start_matches('~')
        .trim_start_matches("around ")
        .trim_start_matches("about ")
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return None;
    }

    if let Some(anchor) = named_anchor(&cleaned) {
        debug!(%phrase, "parse_phrase: named anchor");
        return Some(anchor);
    }

    if let Some(caps) = AM_PM_RE.captures(&cleaned) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        if hour > 12 || minute > 59 {
            return None;
        }
        let hour = match (&caps[3].to_lowercase()[..], hour) {
            ("am", 12) => 0,
            ("am", h) => h,
            ("pm", 12) => 12,
            ("pm", h) => h + 12,
            _ => return None,
        };
        debug!(%phrase, hour, minute, "parse_phrase: am/pm match");
        return Some((hour, minute));
    }

    if let Some(caps) = HH_MM_RE.captures(&cleaned) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if hour <= 23 && minute <= 59 {
            debug!(%phrase, hour, minute, "parse_phrase: 24h match");
            return Some((hour, minute));
        }
        return None;
    }

    if let Some(caps) = BARE_HOUR_RE.captures(&cleaned) {
        let hour: u32 = caps[1].parse().ok()?;
        if hour <= 23 {
            debug!(%phrase, hour, "parse_phrase: bare hour");
            return Some((hour, 0));
        }
    }

    None
}

/// Resolve a local wall-clock time to a UTC instant
///
/// DST gap times shift forward one hour; ambiguous times take the
/// earlier offset.
fn local_to_utc(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    match tz.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, minute, 0) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _later) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            // Spring-forward gap: the hour does not exist locally
            let shifted = (hour + 1) % 24;
            match tz.with_ymd_and_hms(date.year(), date.month(), date.day(), shifted, minute, 0) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
                LocalResult::None => Utc::now(),
            }
        }
    }
}

/// Normalize a time phrase against a date and timezone
///
/// Always returns a valid time; missing or unparsable phrases anchor at
/// 12:00 local.
pub fn normalize(phrase: &str, date: NaiveDate, tz: Tz) -> NormalizedTime {
    debug!(%phrase, %date, %tz, "normalize: called");
    let (hour, minute) = parse_phrase(phrase).unwrap_or((DEFAULT_HOUR, 0));

    let instant = local_to_utc(tz, date, hour, minute);
    let display = format_12h(hour, minute);

    NormalizedTime {
        canonical: format!("{hour:02}:{minute:02}"),
        instant,
        display,
    }
}

/// Format an (hour, minute) pair as "3:00 PM"
fn format_12h(hour: u32, minute: u32) -> String {
    let (h12, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{h12}:{minute:02} {suffix}")
}
