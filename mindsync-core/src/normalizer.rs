//! Task normalizer: one line of free text -> a structured [`Task`].
//!
//! Strategy:
//! 1) optional extraction service, lenient pass then (only if the lenient draft
//!    cannot be resolved) a strict ISO-only pass
//! 2) deterministic fallback built on [`crate::time`]
//!
//! Both strategies go through [`finalize_draft`], so the resolution rules
//! (default hour, `due` is always a deadline, bare deadlines never become
//! fixed windows) hold regardless of where the draft came from.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::collaborators::{ExtractionMode, Extractor, TaskDraft};
use crate::task::{DEFAULT_EST_MINUTES, Task};
use crate::time;

pub const UNTITLED: &str = "Untitled task";

/// Why a draft could not be turned into a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("draft has a blank title")]
    BlankTitle,

    #[error("cannot resolve {field} '{value}' to a timestamp")]
    Unresolvable { field: &'static str, value: String },
}

fn re_hashtag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([\w-]+)").expect("hashtag regex"))
}

fn re_segment_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[;\n]").expect("segment regex"))
}

pub struct Normalizer {
    today: NaiveDate,
    extractor: Option<Box<dyn Extractor>>,
}

impl Normalizer {
    /// `now` anchors relative words ("today", "tomorrow", weekday names).
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            today: now.date(),
            extractor: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Best-effort task for one line of text. Never fails.
    pub fn normalize(&self, raw_text: &str) -> Task {
        if let Some(task) = self.try_extractor(raw_text) {
            return task;
        }

        let draft = fallback_draft(raw_text);
        finalize_draft(raw_text, &draft, self.today).unwrap_or_else(|e| {
            debug!(error = %e, "fallback draft rejected; using bare title");
            Task::new(draft_title_or_untitled(&draft.title))
                .with_estimate(draft.est_minutes.unwrap_or(DEFAULT_EST_MINUTES))
        })
    }

    pub fn normalize_all<'a, I>(&self, lines: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().map(|l| self.normalize(l)).collect()
    }

    fn try_extractor(&self, raw_text: &str) -> Option<Task> {
        let extractor = self.extractor.as_ref()?;

        for mode in [ExtractionMode::Lenient, ExtractionMode::Strict] {
            let draft = match extractor.extract(raw_text, mode) {
                Ok(d) => d,
                Err(e) => {
                    warn!(error = %e, ?mode, "extraction service failed; using fallback parser");
                    return None;
                }
            };
            match finalize_draft(raw_text, &draft, self.today) {
                Ok(task) => return Some(task),
                Err(e) => debug!(error = %e, ?mode, "extraction draft unresolvable"),
            }
        }
        None
    }
}

fn draft_title_or_untitled(title: &str) -> String {
    let t = title.trim();
    if t.is_empty() {
        UNTITLED.to_string()
    } else {
        t.to_string()
    }
}

/// `#tags` in order of first appearance, lowercased.
pub fn hashtags(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in re_hashtag().captures_iter(text) {
        push_tag(&mut out, &c[1]);
    }
    out
}

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim().trim_start_matches('#').to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn is_metadata_segment(segment: &str) -> bool {
    let stripped = time::strip_scheduling_tokens(segment);
    let stripped = re_hashtag().replace_all(&stripped, " ");
    !stripped.chars().any(char::is_alphanumeric)
}

/// Draft produced without any external help.
///
/// The first non-empty `;`/newline segment is the title; later segments that
/// carry more than scheduling tokens become notes.
pub fn fallback_draft(raw_text: &str) -> TaskDraft {
    let segments: Vec<&str> = re_segment_split()
        .split(raw_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let first = segments.first().copied().unwrap_or(raw_text.trim());
    let title = re_hashtag().replace_all(first, "").trim().to_string();
    let title = if title.is_empty() {
        first.to_string()
    } else {
        title
    };

    let notes: Vec<&str> = segments
        .iter()
        .skip(1)
        .copied()
        .filter(|s| !is_metadata_segment(s))
        .collect();

    TaskDraft {
        title,
        est_minutes: time::parse_duration_minutes(raw_text),
        deadline: None,
        tags: Vec::new(),
        notes: (!notes.is_empty()).then(|| notes.join("; ")),
        fixed_start: None,
        fixed_end: None,
    }
}

fn resolve_field(
    field: &'static str,
    value: Option<&str>,
    today: NaiveDate,
    base: NaiveDate,
    hint: Option<NaiveTime>,
) -> Result<Option<NaiveDateTime>, DraftError> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match time::resolve_timestamp(v, today, base, hint) {
        Some(dt) => Ok(Some(dt)),
        None => Err(DraftError::Unresolvable {
            field,
            value: v.to_string(),
        }),
    }
}

/// Resolve a draft into a task against the raw text it came from.
pub fn finalize_draft(
    raw_text: &str,
    draft: &TaskDraft,
    today: NaiveDate,
) -> Result<Task, DraftError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(DraftError::BlankTitle);
    }
    let est = draft
        .est_minutes
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_EST_MINUTES);

    let base = time::infer_base_day(raw_text, today);
    // Time mentions outside of `due` and durations.
    let scrubbed = time::scrub_for_time_mentions(raw_text);
    let start_hint = time::parse_time_of_day(&scrubbed);

    let mut fixed_start = resolve_field("fixed_start", draft.fixed_start.as_deref(), today, base, start_hint)?;
    let mut fixed_end = resolve_field("fixed_end", draft.fixed_end.as_deref(), today, base, None)?;

    if fixed_start.is_none() && fixed_end.is_none() {
        if let Some((s, e)) = time::parse_time_window(&scrubbed, base) {
            fixed_start = Some(s);
            fixed_end = Some(e);
        } else if let Some(t) = start_hint {
            fixed_start = Some(base.and_time(t));
        }
    }
    let est_span = Duration::minutes(i64::from(est));
    match (fixed_start, fixed_end) {
        (Some(s), None) => fixed_end = Some(s + est_span),
        (None, Some(e)) => fixed_start = Some(e - est_span),
        _ => {}
    }

    let due_hint = time::find_due(raw_text).and_then(|d| time::parse_time_of_day(&d.body));
    let mut deadline = resolve_field("deadline", draft.deadline.as_deref(), today, base, due_hint)?;
    if let Some(due) = time::resolve_due(raw_text, today, base) {
        deadline = Some(match deadline {
            Some(d) if d < due => d,
            _ => due,
        });
    }

    let mut task = Task::new(title).with_estimate(est);
    task.deadline = deadline;
    task.notes = draft
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    for t in draft.tags.iter().map(String::as_str).chain(hashtags(raw_text).iter().map(String::as_str)) {
        push_tag(&mut task.tags, t);
    }
    if let (Some(s), Some(e)) = (fixed_start, fixed_end) {
        task = task.with_fixed_window(s, e);
    }

    let anchors_a_start = start_hint.is_some()
        || time::has_time_window(&scrubbed)
        || time::has_start_words(&scrubbed);
    if task.deadline.is_some() && !anchors_a_start && task.is_fixed() {
        debug!(title = %task.title, "bare deadline; discarding guessed fixed window");
        task.clear_fixed_window();
    }

    Ok(task)
}
