//! Capability traits for the optional external collaborators.
//!
//! Every collaborator is fail-soft: callers log the error and carry on with a
//! deterministic default. Implementations own their own timeouts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CollaboratorError;
use crate::plan::Block;
use crate::task::Effort;

/// Chunk override bounds accepted from an advisor, in minutes.
pub const MIN_CHUNK_MINUTES: u32 = 15;
pub const MAX_CHUNK_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Natural date phrases ("Fri 5pm", "tomorrow") are fine.
    Lenient,
    /// Timestamps must be ISO 8601; relative words are not allowed.
    Strict,
}

/// Pre-resolution task fields. Timestamps are still strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub est_minutes: Option<u32>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub fixed_start: Option<String>,
    #[serde(default)]
    pub fixed_end: Option<String>,
}

/// Natural-language extraction: raw line -> draft.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw_text: &str, mode: ExtractionMode) -> Result<TaskDraft, CollaboratorError>;
}

/// Effort classification: `(title, notes)` -> free-text tier hint.
pub trait EffortSignal: Send + Sync {
    fn effort_hint(&self, title: &str, notes: Option<&str>) -> Result<String, CollaboratorError>;
}

/// One row of the task table shown to the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorTask {
    pub title: String,
    pub est_minutes: u32,
    pub effort: Effort,
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorRequest {
    pub day: NaiveDate,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    /// Hourly average energy as a percentage, see `EnergyCurve::hourly_summary`.
    pub energy_summary: String,
    pub tasks: Vec<AdvisorTask>,
}

impl AdvisorRequest {
    /// `title | est_minutes | effort | deadline` rows.
    pub fn task_table(&self) -> String {
        self.tasks
            .iter()
            .map(|t| {
                format!(
                    "- {} | {} | {} | {}",
                    t.title,
                    t.est_minutes,
                    t.effort,
                    t.deadline.as_deref().unwrap_or("-")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ordering, chunking and deferral hints. Unknown titles are ignored by the
/// scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAdvice {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub chunk_minutes: BTreeMap<String, u32>,
    #[serde(default)]
    pub defer: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl PlanAdvice {
    /// Clamp chunk overrides into [`MIN_CHUNK_MINUTES`, `MAX_CHUNK_MINUTES`].
    pub fn clamped(mut self) -> Self {
        for v in self.chunk_minutes.values_mut() {
            *v = (*v).clamp(MIN_CHUNK_MINUTES, MAX_CHUNK_MINUTES);
        }
        self
    }
}

pub trait PlanAdvisor: Send + Sync {
    fn advise(&self, request: &AdvisorRequest) -> Result<PlanAdvice, CollaboratorError>;
}

/// Metrics and block table handed to an advice rewriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub date: NaiveDate,
    pub profile: Option<String>,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub energy_alignment: f64,
    pub flow_minutes: i64,
    pub blocks: Vec<Block>,
    pub baseline: Vec<String>,
}

impl RewriteRequest {
    /// `HH:MM-HH:MM | title | Nm` rows, or `- (no blocks)`.
    pub fn block_table(&self) -> String {
        if self.blocks.is_empty() {
            return "- (no blocks)".to_string();
        }
        self.blocks
            .iter()
            .map(|b| {
                format!(
                    "- {}-{} | {} | {}m",
                    b.start.format("%H:%M"),
                    b.end.format("%H:%M"),
                    b.task_title,
                    b.minutes()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rephrases or replaces summary suggestions.
pub trait AdviceRewriter: Send + Sync {
    fn rewrite(&self, request: &RewriteRequest) -> Result<Vec<String>, CollaboratorError>;
}
