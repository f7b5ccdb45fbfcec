//! Effort classifier.
//!
//! Deterministic keyword rules always run last and have the final say; an
//! external signal can only seed the starting tier.

use tracing::warn;

use crate::collaborators::EffortSignal;
use crate::task::{Effort, Task};

pub const BASELINE: (Effort, f64) = (Effort::Medium, 0.6);

pub const HIGH_EFFORT_KEYWORDS: &[&str] =
    &["report", "analysis", "prototype", "research", "design", "study"];
pub const LOW_EFFORT_KEYWORDS: &[&str] =
    &["email", "call", "text", "schedule", "calendar", "meeting"];

const HIGH_RULE_CONFIDENCE: f64 = 0.85;
const LOW_RULE_CONFIDENCE: f64 = 0.75;

fn signal_confidence(effort: Effort) -> f64 {
    match effort {
        Effort::High => 0.8,
        Effort::Low | Effort::Medium => 0.7,
    }
}

#[derive(Default)]
pub struct Classifier {
    signal: Option<Box<dyn EffortSignal>>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signal(mut self, signal: Box<dyn EffortSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Set `effort` and `confidence` on the task.
    pub fn classify(&self, mut task: Task) -> Task {
        let (effort, confidence) = apply_keyword_rules(&task, self.seed(&task));
        task.effort = Some(effort);
        task.confidence = Some(confidence);
        task
    }

    fn seed(&self, task: &Task) -> (Effort, f64) {
        let Some(signal) = &self.signal else {
            return BASELINE;
        };
        match signal.effort_hint(&task.title, task.notes.as_deref()) {
            Ok(hint) => match Effort::from_hint(&hint) {
                Some(e) => (e, signal_confidence(e)),
                None => BASELINE,
            },
            Err(e) => {
                warn!(error = %e, title = %task.title, "effort signal failed; using baseline");
                BASELINE
            }
        }
    }
}

/// Keyword override over title + notes (substring match, case-insensitive).
///
/// High-effort keywords force high; otherwise low-effort keywords force low
/// unless the seed is already high. Confidence only ever rises.
pub fn apply_keyword_rules(task: &Task, seed: (Effort, f64)) -> (Effort, f64) {
    let (effort, conf) = seed;
    let text = format!("{} {}", task.title, task.notes.as_deref().unwrap_or("")).to_lowercase();

    if HIGH_EFFORT_KEYWORDS.iter().any(|k| text.contains(k)) {
        (Effort::High, conf.max(HIGH_RULE_CONFIDENCE))
    } else if effort != Effort::High && LOW_EFFORT_KEYWORDS.iter().any(|k| text.contains(k)) {
        (Effort::Low, conf.max(LOW_RULE_CONFIDENCE))
    } else {
        (effort, conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;

    struct FixedHint(Result<&'static str, CollaboratorError>);

    impl EffortSignal for FixedHint {
        fn effort_hint(&self, _title: &str, _notes: Option<&str>) -> Result<String, CollaboratorError> {
            self.0.clone().map(str::to_string)
        }
    }

    fn classify_with(hint: Result<&'static str, CollaboratorError>, task: Task) -> Task {
        Classifier::new().with_signal(Box::new(FixedHint(hint))).classify(task)
    }

    #[test]
    fn test_baseline_without_signal() {
        let t = Classifier::new().classify(Task::new("Water plants"));
        assert_eq!(t.effort, Some(Effort::Medium));
        assert_eq!(t.confidence, Some(0.6));
    }

    #[test]
    fn test_high_keyword_wins() {
        let t = Classifier::new().classify(Task::new("Finish report"));
        assert_eq!(t.effort, Some(Effort::High));
        assert_eq!(t.confidence, Some(0.85));
    }

    #[test]
    fn test_low_keyword_from_notes() {
        let t = Classifier::new().classify(Task::new("Ping Sam").with_notes("quick email"));
        assert_eq!(t.effort, Some(Effort::Low));
        assert_eq!(t.confidence, Some(0.75));
    }

    #[test]
    fn test_high_keyword_beats_low_keyword() {
        let t = Classifier::new().classify(Task::new("Email the research summary"));
        assert_eq!(t.effort, Some(Effort::High));
    }

    #[test]
    fn test_signal_seeds_tier() {
        let t = classify_with(Ok("I'd say LOW effort"), Task::new("Water plants"));
        assert_eq!(t.effort, Some(Effort::Low));
        assert_eq!(t.confidence, Some(0.7));

        let t = classify_with(Ok("high"), Task::new("Water plants"));
        assert_eq!(t.effort, Some(Effort::High));
        assert_eq!(t.confidence, Some(0.8));
    }

    #[test]
    fn test_high_signal_blocks_low_keyword() {
        let t = classify_with(Ok("high"), Task::new("Schedule migration"));
        assert_eq!(t.effort, Some(Effort::High));
        assert_eq!(t.confidence, Some(0.8));
    }

    #[test]
    fn test_rules_override_signal() {
        let t = classify_with(Ok("low"), Task::new("Design onboarding flow"));
        assert_eq!(t.effort, Some(Effort::High));
        assert_eq!(t.confidence, Some(0.85));
    }

    #[test]
    fn test_failed_or_vague_signal_keeps_baseline() {
        let t = classify_with(Err(CollaboratorError::Timeout), Task::new("Water plants"));
        assert_eq!(t.effort, Some(Effort::Medium));
        assert_eq!(t.confidence, Some(0.6));

        let t = classify_with(Ok("hard to say"), Task::new("Water plants"));
        assert_eq!(t.effort, Some(Effort::Medium));
        assert_eq!(t.confidence, Some(0.6));
    }
}
