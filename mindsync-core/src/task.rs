//! Task model: one user intention, produced by the normalizer and refined by
//! the classifier and scheduler within a single planning request.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

pub const DEFAULT_EST_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    /// Placement rank: high-effort work is packed first on deadline ties.
    pub fn rank(self) -> u8 {
        match self {
            Effort::High => 0,
            Effort::Medium => 1,
            Effort::Low => 2,
        }
    }

    /// Default chunk size in minutes.
    pub fn chunk_minutes(self) -> u32 {
        match self {
            Effort::High => 60,
            Effort::Medium => 45,
            Effort::Low => 30,
        }
    }

    /// Map a free-text answer to a tier by substring, `high` winning over `low`
    /// and `low` over `medium`.
    pub fn from_hint(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        if t.contains("high") {
            Some(Effort::High)
        } else if t.contains("low") {
            Some(Effort::Low)
        } else if t.contains("medium") {
            Some(Effort::Medium)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effort {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Effort::Low),
            "medium" => Ok(Effort::Medium),
            "high" => Ok(Effort::High),
            other => Err(InputError::UnknownEffort(other.to_string())),
        }
    }
}

/// Core task type.
///
/// `fixed_start`/`fixed_end` are both-or-neither once the normalizer has
/// finalized the task, and `fixed_end > fixed_start` whenever both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,

    /// Minutes, always positive.
    pub est_minutes: u32,

    pub deadline: Option<NaiveDateTime>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub notes: Option<String>,

    /// Populated by the classifier.
    pub effort: Option<Effort>,
    pub confidence: Option<f64>,

    pub fixed_start: Option<NaiveDateTime>,
    pub fixed_end: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            est_minutes: DEFAULT_EST_MINUTES,
            deadline: None,
            tags: Vec::new(),
            notes: None,
            effort: None,
            confidence: None,
            fixed_start: None,
            fixed_end: None,
        }
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.est_minutes = if minutes == 0 { DEFAULT_EST_MINUTES } else { minutes };
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Pin the task to a window. Ignored unless `end > start`.
    pub fn with_fixed_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end > start {
            self.fixed_start = Some(start);
            self.fixed_end = Some(end);
        }
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_start.is_some() || self.fixed_end.is_some()
    }

    pub fn clear_fixed_window(&mut self) {
        self.fixed_start = None;
        self.fixed_end = None;
    }

    /// Effort with the medium default applied.
    pub fn effort_or_default(&self) -> Effort {
        self.effort.unwrap_or(Effort::Medium)
    }
}
