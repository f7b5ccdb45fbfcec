//! LLM-backed implementations of the planner's optional collaborators.
//!
//! Every call is bounded by the client's timeout and every failure is mapped
//! to a `CollaboratorError`; the core decides what to fall back to.

use chrono::NaiveDate;
use mindsync_core::{
    AdvisorRequest, CollaboratorError, EffortSignal, ExtractionMode, Extractor, PlanAdvice,
    PlanAdvisor, TaskDraft,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::llm::LlmClient;

const DRAFT_RULES: &str = "\
Rules:
- A 'due ...' phrase is always the deadline, never fixed_start or fixed_end.
- Only set fixed_start/fixed_end when the text names a start time or a time range.
- est_minutes is the effort in minutes; omit it if the text gives none.
- Return only the JSON object.";

const LENIENT_PROMPT: &str = "\
Extract a single task as JSON with fields: title (string), est_minutes (int|null), \
deadline (string|null), tags (list of strings), notes (string|null), \
fixed_start (string|null), fixed_end (string|null). \
Date fields may use natural phrases like 'Fri 5pm' or 'tomorrow'.";

const STRICT_PROMPT: &str = "\
Extract a single task as JSON with fields: title (string), est_minutes (int|null), \
deadline (ISO 8601 string|null), tags (list of strings), notes (string|null), \
fixed_start (ISO 8601 string|null), fixed_end (ISO 8601 string|null). \
Never output words like 'today' or 'tomorrow'; convert every date to full ISO 8601 \
such as 2026-03-15T14:30:00. A day without a time means 17:00.";

const EFFORT_PROMPT: &str = "\
Classify how much focused mental effort a task needs. \
Answer with exactly one word: low, medium, or high.";

const ADVISOR_PROMPT: &str = "\
You are a planning assistant. Given tasks and an hourly energy profile, propose \
(1) a priority order of task titles, (2) optional chunk minutes per title, and \
(3) titles to defer when the day is too full.
Rules:
- Tasks with same-day deadlines come earlier.
- High-effort work belongs in high-energy hours; low-effort work is fine in dips.
- Use only the titles given, spelled exactly.
- Return only a JSON object with fields: order, chunk_minutes, defer, note.";

/// Body of a fenced code block if present, otherwise the trimmed text.
pub fn strip_code_fences(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    // drop an info string such as `json`
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, CollaboratorError> {
    serde_json::from_str(strip_code_fences(text))
        .map_err(|e| CollaboratorError::Malformed(e.to_string()))
}

fn to_collaborator_error(err: anyhow::Error) -> CollaboratorError {
    let timed_out = err
        .chain()
        .filter_map(|e| e.downcast_ref::<reqwest::Error>())
        .any(|e| e.is_timeout());
    if timed_out {
        CollaboratorError::Timeout
    } else {
        CollaboratorError::Transport(format!("{err:#}"))
    }
}

pub struct LlmExtractor {
    client: Arc<LlmClient>,
    today: NaiveDate,
}

impl LlmExtractor {
    pub fn new(client: Arc<LlmClient>, today: NaiveDate) -> Self {
        Self { client, today }
    }
}

impl Extractor for LlmExtractor {
    fn extract(&self, raw_text: &str, mode: ExtractionMode) -> Result<TaskDraft, CollaboratorError> {
        let prompt = match mode {
            ExtractionMode::Lenient => LENIENT_PROMPT,
            ExtractionMode::Strict => STRICT_PROMPT,
        };
        let system = format!("{prompt}\nToday is {}.\n{DRAFT_RULES}", self.today.format("%Y-%m-%d (%A)"));
        let out = self
            .client
            .complete(&system, raw_text)
            .map_err(to_collaborator_error)?;
        let draft: TaskDraft = parse_json(&out)?;
        if draft.title.trim().is_empty() {
            return Err(CollaboratorError::Rejected("empty title".into()));
        }
        Ok(draft)
    }
}

pub struct LlmEffortSignal {
    client: Arc<LlmClient>,
}

impl LlmEffortSignal {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

impl EffortSignal for LlmEffortSignal {
    fn effort_hint(&self, title: &str, notes: Option<&str>) -> Result<String, CollaboratorError> {
        let user = match notes {
            Some(n) => format!("Task: {title}\nNotes: {n}"),
            None => format!("Task: {title}"),
        };
        self.client
            .complete(EFFORT_PROMPT, &user)
            .map_err(to_collaborator_error)
    }
}

pub struct LlmAdvisor {
    client: Arc<LlmClient>,
}

impl LlmAdvisor {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

/// User message for the advisor.
pub fn advisor_message(request: &AdvisorRequest) -> String {
    format!(
        "Day: {}\nWork hours: {:02}:00-{:02}:00\nEnergy hourly avg (HH:score%): {}\n\
         Tasks (title | est_minutes | effort | deadline):\n{}",
        request.day,
        request.work_start_hour,
        request.work_end_hour,
        request.energy_summary,
        request.task_table()
    )
}

impl PlanAdvisor for LlmAdvisor {
    fn advise(&self, request: &AdvisorRequest) -> Result<PlanAdvice, CollaboratorError> {
        let out = self
            .client
            .complete(ADVISOR_PROMPT, &advisor_message(request))
            .map_err(to_collaborator_error)?;
        parse_json(&out)
    }
}
