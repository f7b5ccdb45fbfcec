//! Time utilities and the natural-language time grammar.
//!
//! Grammar (case-insensitive):
//! - duration: `<n>[.<n>] h|hr|hrs|hour|hours` or `<n> m|min|mins|minute|minutes`;
//!   a compound like `1h30m` or `1h 30m` sums, otherwise hours win when both appear
//! - time of day: `H[:MM] am|pm` or `H:MM`; a bare integer is never a time
//! - window: `H[:MM][am|pm] - H[:MM][am|pm]` with `-`, `–` or `—`, where at
//!   least one side carries `:MM` or a meridiem ("3-4 chapters" is text); a meridiem
//!   given only on the end is shared with the start when that keeps start < end;
//!   an end at or before the start rolls over to the next day
//! - day: `today`, `tomorrow`/`tmr`, weekday names (next occurrence on or after
//!   today), ISO `YYYY-MM-DD`
//! - deadline: `due ...` up to the next `;`, `,` or `.`
//!
//! Anything naming a day but no time resolves at [`DEFAULT_HOUR`].

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::error::InputError;

/// Hour used when a day is named without a time.
pub const DEFAULT_HOUR: u32 = 17;

/// Current wall-clock time in an IANA timezone like "America/Chicago".
pub fn local_now(tz: &str) -> Result<NaiveDateTime, InputError> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| InputError::InvalidTimezone(tz.to_string()))?;
    Ok(Utc::now().with_timezone(&tz).naive_local())
}

/// Parse a `YYYY-MM-DD` day string.
pub fn parse_day(s: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| InputError::MalformedDay(s.to_string()))
}

pub fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or_default())
}

/// Snap down to the `step`-minute grid, dropping seconds.
pub fn snap_down(dt: NaiveDateTime, step: u32) -> NaiveDateTime {
    let step = step.max(1);
    let mins = dt.hour() * 60 + dt.minute();
    let snapped = mins - mins % step;
    dt.date()
        .and_hms_opt(snapped / 60, snapped % 60, 0)
        .unwrap_or(dt)
}

/// Snap up to the `step`-minute grid; on-grid values are unchanged.
pub fn snap_up(dt: NaiveDateTime, step: u32) -> NaiveDateTime {
    let down = snap_down(dt, step);
    if down == dt {
        dt
    } else {
        down + Duration::minutes(i64::from(step.max(1)))
    }
}

// Compile-once regex patterns via OnceLock.
fn re_hours() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b(\d+(?:\.\d+)?)\s*(?:hours|hour|hrs|hr|h)",
            r"(?:\s*(\d+)\s*(?:minutes|minute|mins|min|m))?\b",
        ))
        .expect("hours regex")
    })
}

fn re_minutes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d+)\s*(?:minutes|minute|mins|min|m)\b").expect("minutes regex")
    })
}

fn re_window() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b(?P<h1>\d{1,2})(?::(?P<m1>\d{2}))?\s*(?P<ap1>am|pm)?",
            r"\s*[-–—]\s*",
            r"(?P<h2>\d{1,2})(?::(?P<m2>\d{2}))?\s*(?P<ap2>am|pm)?\b",
        ))
        .expect("window regex")
    })
}

fn re_time() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<ap>am|pm)?\b")
            .expect("time regex")
    })
}

fn re_due() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bdue\b([^;,.]*)").expect("due regex"))
}

fn re_weekday() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu",
            r"|friday|fri|saturday|sat|sunday|sun)\b",
        ))
        .expect("weekday regex")
    })
}

fn re_iso_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date regex"))
}

fn re_relative_day() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(today|tomorrow|tmr)\b").expect("relative day regex"))
}

fn re_start_words() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(at|start|from)\b").expect("start words regex"))
}

/// Estimated minutes mentioned in the text, if any.
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    if let Some(c) = re_hours().captures(text) {
        let hours: f64 = c[1].parse().ok()?;
        let extra = match c.get(2) {
            Some(m) => m.as_str().parse::<u32>().ok()?,
            None => 0,
        };
        return Some((hours * 60.0).round() as u32 + extra);
    }
    re_minutes()
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
}

pub fn is_duration_only(segment: &str) -> bool {
    let rest = re_minutes().replace_all(&re_hours().replace_all(segment, ""), "").to_string();
    rest.trim_matches(|c: char| c.is_whitespace() || c == '~' || c == '≈').is_empty()
        && !segment.trim().is_empty()
}

fn to_24h(h: u32, meridiem: Option<&str>) -> Option<u32> {
    match meridiem.map(|m| m.to_ascii_lowercase()) {
        None => (h <= 23).then_some(h),
        Some(m) if (1..=12).contains(&h) => Some(match (m.as_str(), h) {
            ("am", 12) => 0,
            ("am", h) => h,
            (_, 12) => 12,
            (_, h) => h + 12,
        }),
        Some(_) => None,
    }
}

fn minute_of(c: &Captures<'_>, name: &str) -> Option<u32> {
    match c.name(name) {
        Some(m) => m.as_str().parse::<u32>().ok().filter(|m| *m < 60),
        None => Some(0),
    }
}

/// First explicit time of day. Bare integers ("3 tasks") are skipped.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    re_time().captures_iter(text).find_map(|c| {
        let ap = c.name("ap").map(|m| m.as_str());
        if c.name("m").is_none() && ap.is_none() {
            return None;
        }
        let h = to_24h(c["h"].parse().ok()?, ap)?;
        NaiveTime::from_hms_opt(h, minute_of(&c, "m")?, 0)
    })
}

// "3-4 chapters" is a range, not a window.
fn is_explicit_window(c: &Captures<'_>) -> bool {
    ["m1", "ap1", "m2", "ap2"].iter().any(|n| c.name(n).is_some())
}

fn window_captures(text: &str) -> Option<Captures<'_>> {
    re_window().captures_iter(text).find(is_explicit_window)
}

pub fn has_time_window(text: &str) -> bool {
    window_captures(text).is_some()
}

/// Explicit `start - end` window on `base`.
pub fn parse_time_window(text: &str, base: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let c = window_captures(text)?;
    let ap1 = c.name("ap1").map(|m| m.as_str());
    let ap2 = c.name("ap2").map(|m| m.as_str());
    let raw_h1: u32 = c["h1"].parse().ok()?;
    let h2 = to_24h(c["h2"].parse().ok()?, ap2)?;
    let m1 = minute_of(&c, "m1")?;
    let m2 = minute_of(&c, "m2")?;

    let h1 = match (ap1, ap2) {
        (None, Some(shared)) => match to_24h(raw_h1, Some(shared)) {
            Some(h) if (h, m1) < (h2, m2) => h,
            _ => to_24h(raw_h1, None)?,
        },
        _ => to_24h(raw_h1, ap1)?,
    };

    let start = base.and_time(NaiveTime::from_hms_opt(h1, m1, 0)?);
    let mut end = base.and_time(NaiveTime::from_hms_opt(h2, m2, 0)?);
    if end <= start {
        end += Duration::days(1);
    }
    Some((start, end))
}

/// Location and body of a `due ...` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueFragment {
    pub start: usize,
    pub end: usize,
    pub body: String,
}

pub fn find_due(text: &str) -> Option<DueFragment> {
    let c = re_due().captures(text)?;
    let whole = c.get(0)?;
    Some(DueFragment {
        start: whole.start(),
        end: whole.end(),
        body: c[1].trim().to_string(),
    })
}

/// Text with any `due ...` fragment, durations and ISO dates blanked out, so
/// the remaining digits can only be read as start times or windows.
pub fn scrub_for_time_mentions(text: &str) -> String {
    let mut out = text.to_string();
    if let Some(d) = find_due(&out) {
        out.replace_range(d.start..d.end, " ");
    }
    let out = re_hours().replace_all(&out, " ");
    let out = re_minutes().replace_all(&out, " ");
    re_iso_date().replace_all(&out, " ").to_string()
}

pub fn has_start_words(text: &str) -> bool {
    re_start_words().is_match(text)
}

/// Text with every token this grammar understands removed: due fragments,
/// durations, windows, times, day words, ISO dates and start words.
pub fn strip_scheduling_tokens(text: &str) -> String {
    let mut out = text.to_string();
    if let Some(d) = find_due(&out) {
        out.replace_range(d.start..d.end, " ");
    }
    let out = re_window().replace_all(&out, |c: &Captures<'_>| {
        if is_explicit_window(c) {
            " ".to_string()
        } else {
            c[0].to_string()
        }
    });
    let out = re_hours().replace_all(&out, " ");
    let out = re_minutes().replace_all(&out, " ");
    let out = re_time().replace_all(&out, |c: &Captures<'_>| {
        if c.name("m").is_some() || c.name("ap").is_some() {
            " ".to_string()
        } else {
            c[0].to_string()
        }
    });
    let out = re_iso_date().replace_all(&out, " ");
    let out = re_relative_day().replace_all(&out, " ");
    let out = re_weekday().replace_all(&out, " ");
    re_start_words().replace_all(&out, " ").to_string()
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let c = re_iso_date().captures(text)?;
    NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
}

fn weekday_from(word: &str) -> Option<Weekday> {
    let w = word.to_ascii_lowercase();
    Some(match w.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    })
}

/// Next occurrence of `weekday` on or after `from`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from + Duration::days(ahead)
}

/// Day explicitly named in the text, relative to `today`.
pub fn named_day(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(d) = parse_iso_date(text) {
        return Some(d);
    }
    if let Some(c) = re_relative_day().captures(text) {
        return Some(match c[1].to_ascii_lowercase().as_str() {
            "today" => today,
            _ => today + Duration::days(1),
        });
    }
    re_weekday()
        .captures(text)
        .and_then(|c| weekday_from(&c[1]))
        .map(|wd| next_weekday(today, wd))
}

/// Day a line of text is about: an ISO date it names, tomorrow when it says
/// "tomorrow"/"tmr", otherwise today. Weekday names only apply inside `due`.
pub fn infer_base_day(text: &str, today: NaiveDate) -> NaiveDate {
    if let Some(d) = parse_iso_date(text) {
        return d;
    }
    match re_relative_day().captures(text) {
        Some(c) if c[1].to_ascii_lowercase() != "today" => today + Duration::days(1),
        _ => today,
    }
}

/// Resolve a phrase such as "Fri 5pm", "tomorrow", "4:30pm" or "2026-03-06".
///
/// A phrase with a time but no day lands on `base`; a phrase with a day but no
/// time lands on [`DEFAULT_HOUR`]; a phrase with neither yields `None`.
pub fn resolve_phrase(text: &str, today: NaiveDate, base: NaiveDate) -> Option<NaiveDateTime> {
    let day = named_day(text, today);
    let time = parse_time_of_day(text);
    match (day, time) {
        (Some(d), Some(t)) => Some(d.and_time(t)),
        (Some(d), None) => Some(at_hour(d, DEFAULT_HOUR)),
        (None, Some(t)) => Some(base.and_time(t)),
        (None, None) => None,
    }
}

/// Deadline named by a `due ...` fragment.
pub fn resolve_due(text: &str, today: NaiveDate, base: NaiveDate) -> Option<NaiveDateTime> {
    let due = find_due(text)?;
    resolve_phrase(&due.body, today, base)
}

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Resolve a timestamp string from an extraction draft.
///
/// Accepts bare relative words (at `time_hint`, else [`DEFAULT_HOUR`]), ISO
/// datetimes, RFC 3339 with an offset (kept as wall-clock), bare ISO dates and
/// finally any phrase [`resolve_phrase`] understands.
pub fn resolve_timestamp(
    s: &str,
    today: NaiveDate,
    base: NaiveDate,
    time_hint: Option<NaiveTime>,
) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let relative = match s.to_ascii_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" | "tmr" => Some(today + Duration::days(1)),
        _ => None,
    };
    if let Some(d) = relative {
        return Some(match time_hint {
            Some(t) => d.and_time(t),
            None => at_hour(d, DEFAULT_HOUR),
        });
    }

    let iso = s.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&iso) {
        return Some(dt.naive_local());
    }
    for fmt in ISO_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(at_hour(d, DEFAULT_HOUR));
    }
    resolve_phrase(s, today, base)
}
