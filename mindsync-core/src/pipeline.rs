//! normalize -> classify -> schedule -> summarize.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::collaborators::{AdviceRewriter, EffortSignal, Extractor, PlanAdvisor};
use crate::energy::{default_busy, energy_curve_for, fallback_curve, EnergyProfile};
use crate::normalizer::Normalizer;
use crate::plan::{DailySummary, DayPlan};
use crate::request::ValidPlanRequest;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::summary::{SummaryContext, SummaryEngine};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub step_minutes: u32,
    /// Use the built-in busy intervals when a request brings none.
    pub use_default_busy: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            step_minutes: SchedulerConfig::default().step_minutes,
            use_default_busy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub tasks: Vec<Task>,
    pub plan: DayPlan,
    pub summary: DailySummary,
    pub profile: Option<EnergyProfile>,
}

impl PlanOutcome {
    /// Tasks that received fewer minutes than their estimate.
    ///
    /// Blocks only carry a title, so minutes placed under a shared title are
    /// handed to those tasks in order, each taking up to its estimate.
    pub fn unscheduled(&self) -> impl Iterator<Item = (&Task, i64)> + '_ {
        let mut pool: HashMap<&str, i64> = HashMap::new();
        for b in &self.plan.blocks {
            *pool.entry(b.task_title.as_str()).or_default() += b.minutes();
        }
        let missing: Vec<(&Task, i64)> = self
            .tasks
            .iter()
            .filter_map(|t| {
                let est = i64::from(t.est_minutes);
                let left = pool.entry(t.title.as_str()).or_default();
                let placed = (*left).min(est);
                *left -= placed;
                (placed < est).then_some((t, est - placed))
            })
            .collect();
        missing.into_iter()
    }
}

pub struct Pipeline {
    normalizer: Normalizer,
    classifier: Classifier,
    scheduler: Scheduler,
    summary: SummaryEngine,
    options: PipelineOptions,
}

impl Pipeline {
    /// `now` anchors relative dates in task text.
    pub fn new(now: NaiveDateTime, options: PipelineOptions) -> Self {
        let config = SchedulerConfig {
            step_minutes: options.step_minutes,
            ..SchedulerConfig::default()
        };
        Self {
            normalizer: Normalizer::new(now),
            classifier: Classifier::new(),
            scheduler: Scheduler::new(config),
            summary: SummaryEngine::new(),
            options,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.normalizer = self.normalizer.with_extractor(extractor);
        self
    }

    pub fn with_effort_signal(mut self, signal: Box<dyn EffortSignal>) -> Self {
        self.classifier = self.classifier.with_signal(signal);
        self
    }

    pub fn with_advisor(mut self, advisor: Box<dyn PlanAdvisor>) -> Self {
        self.scheduler = self.scheduler.with_advisor(advisor);
        self
    }

    pub fn with_rewriter(mut self, rewriter: Box<dyn AdviceRewriter>) -> Self {
        self.summary = self.summary.with_rewriter(rewriter);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn run(&self, request: &ValidPlanRequest) -> PlanOutcome {
        let day = request.day;

        let mut tasks: Vec<Task> = self
            .normalizer
            .normalize_all(request.tasks.iter().map(String::as_str))
            .into_iter()
            .map(|t| self.classifier.classify(t))
            .collect();

        let curve = match request.profile {
            Some(p) => energy_curve_for(day, p),
            None => fallback_curve(day),
        };
        let busy = if request.busy.is_empty() && self.options.use_default_busy {
            default_busy(day)
        } else {
            request.busy.clone()
        };
        debug!(busy = busy.len(), profile = ?request.profile, "scheduling inputs ready");

        let plan = self
            .scheduler
            .schedule_in(&mut tasks, day, &curve, &busy, request.work_hours);

        let ctx = SummaryContext {
            profile: request.profile,
            work_hours: request.work_hours,
        };
        let summary = self
            .summary
            .summarize(&plan, &request.completed, ctx, Some(&curve));

        info!(
            %day,
            tasks = tasks.len(),
            blocks = plan.blocks.len(),
            alignment = summary.energy_alignment,
            "plan built"
        );

        PlanOutcome {
            tasks,
            plan,
            summary,
            profile: request.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{AdvisorRequest, ExtractionMode, PlanAdvice, RewriteRequest, TaskDraft};
    use crate::error::CollaboratorError;
    use crate::request::PlanRequest;
    use crate::task::Effort;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    fn request(lines: &[&str]) -> ValidPlanRequest {
        PlanRequest::new(lines.iter().map(|s| s.to_string()).collect(), "2026-03-02")
            .validate()
            .unwrap()
    }

    struct Down;

    impl Extractor for Down {
        fn extract(&self, _raw: &str, _mode: ExtractionMode) -> Result<TaskDraft, CollaboratorError> {
            Err(CollaboratorError::Unavailable)
        }
    }

    impl EffortSignal for Down {
        fn effort_hint(&self, _title: &str, _notes: Option<&str>) -> Result<String, CollaboratorError> {
            Err(CollaboratorError::Timeout)
        }
    }

    impl PlanAdvisor for Down {
        fn advise(&self, _request: &AdvisorRequest) -> Result<PlanAdvice, CollaboratorError> {
            Err(CollaboratorError::Transport("connection refused".into()))
        }
    }

    impl AdviceRewriter for Down {
        fn rewrite(&self, _request: &RewriteRequest) -> Result<Vec<String>, CollaboratorError> {
            Err(CollaboratorError::Malformed("not json".into()))
        }
    }

    #[test]
    fn test_runs_all_four_stages() {
        let out = Pipeline::new(now(), PipelineOptions::default())
            .run(&request(&["Finish report; 2h", "Reply to email; 30m"]));

        assert_eq!(out.tasks.len(), 2);
        assert_eq!(out.tasks[0].effort, Some(Effort::High));
        assert_eq!(out.tasks[1].effort, Some(Effort::Low));
        assert_eq!(out.plan.minutes_for("Finish report"), 120);
        assert_eq!(out.plan.minutes_for("Reply to email"), 30);
        assert!(!out.summary.suggestions.is_empty());
        assert_eq!(out.unscheduled().count(), 0);
    }

    #[test]
    fn test_failing_collaborators_change_nothing() {
        let lines = ["Finish report; 2h; due today 3pm", "Call plumber", "Study chapter 4; 90m"];
        let plain = Pipeline::new(now(), PipelineOptions::default()).run(&request(&lines));
        let degraded = Pipeline::new(now(), PipelineOptions::default())
            .with_extractor(Box::new(Down))
            .with_effort_signal(Box::new(Down))
            .with_advisor(Box::new(Down))
            .with_rewriter(Box::new(Down))
            .run(&request(&lines));
        assert_eq!(plain, degraded);
    }

    #[test]
    fn test_profile_curve_drives_alignment() {
        let mut req = request(&["Research notes; 1h"]);
        req.profile = Some(EnergyProfile::MorningLark);
        let out = Pipeline::new(now(), PipelineOptions::default()).run(&req);
        assert_eq!(out.profile, Some(EnergyProfile::MorningLark));
        // lark peak covers 09:00-10:00
        assert_eq!(out.summary.energy_alignment, 1.0);
    }

    #[test]
    fn test_unplaceable_work_is_reported() {
        let mut req = request(&["Giant refactor; 10h"]);
        req.work_hours = crate::scheduler::WorkHours::new(9, 11);
        let out = Pipeline::new(now(), PipelineOptions { use_default_busy: false, ..PipelineOptions::default() })
            .run(&req);
        // two 45m chunks fit; the 30m left over cannot hold another chunk
        let missing: Vec<_> = out.unscheduled().map(|(t, m)| (t.title.clone(), m)).collect();
        assert_eq!(missing, vec![("Giant refactor".to_string(), 510)]);
    }

    #[test]
    fn test_shared_titles_split_placed_minutes() {
        let mut req = request(&["Review; 1h", "Review; 1h"]);
        req.work_hours = crate::scheduler::WorkHours::new(9, 10);
        let out = Pipeline::new(now(), PipelineOptions { use_default_busy: false, ..PipelineOptions::default() })
            .run(&req);
        let placed = out.plan.minutes_for("Review");
        assert!(placed > 0 && placed <= 60);

        let missing: Vec<i64> = out.unscheduled().map(|(_, m)| m).collect();
        assert_eq!(missing.len(), 2);
        assert_eq!(missing.iter().sum::<i64>(), 120 - placed);
        assert_eq!(missing[1], 60);
    }
}
