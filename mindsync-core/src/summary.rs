//! End-of-day metrics and suggestions over a `DayPlan`.

use chrono::{Duration, Timelike};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::collaborators::{AdviceRewriter, RewriteRequest};
use crate::energy::{EnergyCurve, EnergyProfile, HIGH_ENERGY};
use crate::plan::{DailySummary, DayPlan};
use crate::scheduler::WorkHours;

/// Blocks at least this long count towards flow time.
pub const FLOW_BLOCK_MINUTES: i64 = 45;
/// Blocks shorter than this count as fragments.
pub const SHORT_BLOCK_MINUTES: i64 = 30;
/// Blocks ending at or after this hour trigger the wind-down tip.
pub const WIND_DOWN_HOUR: u32 = 17;
pub const MAX_BASELINE_SUGGESTIONS: usize = 2;
pub const MAX_REWRITTEN_SUGGESTIONS: usize = 3;

const ALIGNMENT_STEP_MINUTES: i64 = 15;

/// Planning context the rewriter is shown alongside the metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryContext {
    pub profile: Option<EnergyProfile>,
    pub work_hours: WorkHours,
}

#[derive(Default)]
pub struct SummaryEngine {
    rewriter: Option<Box<dyn AdviceRewriter>>,
}

impl SummaryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rewriter(mut self, rewriter: Box<dyn AdviceRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn summarize(
        &self,
        plan: &DayPlan,
        completed: &[String],
        ctx: SummaryContext,
        curve: Option<&EnergyCurve>,
    ) -> DailySummary {
        let energy_alignment = energy_alignment(plan, curve);
        let flow_minutes = flow_minutes(plan);
        let baseline = baseline_suggestions(energy_alignment, plan);

        let suggestions = match self.rewrite(plan, ctx, energy_alignment, flow_minutes, &baseline) {
            Some(rewritten) => rewritten,
            None => baseline,
        };

        DailySummary {
            date: plan.date,
            completion_rate: completion_rate(plan, completed),
            energy_alignment,
            flow_minutes,
            suggestions,
        }
    }

    fn rewrite(
        &self,
        plan: &DayPlan,
        ctx: SummaryContext,
        energy_alignment: f64,
        flow_minutes: i64,
        baseline: &[String],
    ) -> Option<Vec<String>> {
        let rewriter = self.rewriter.as_ref()?;
        let request = RewriteRequest {
            date: plan.date,
            profile: ctx.profile.map(|p| p.as_str().to_string()),
            work_start_hour: ctx.work_hours.start_hour,
            work_end_hour: ctx.work_hours.end_hour,
            energy_alignment,
            flow_minutes,
            blocks: plan.blocks.clone(),
            baseline: baseline.to_vec(),
        };
        match rewriter.rewrite(&request) {
            Ok(lines) => {
                let cleaned: Vec<String> = lines
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .take(MAX_REWRITTEN_SUGGESTIONS)
                    .map(str::to_string)
                    .collect();
                if cleaned.is_empty() {
                    debug!("rewriter returned nothing usable; keeping baseline suggestions");
                    None
                } else {
                    Some(cleaned)
                }
            }
            Err(e) => {
                warn!(error = %e, "advice rewrite failed; keeping baseline suggestions");
                None
            }
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Share of distinct scheduled titles that appear in `completed`. 0 for an
/// empty plan.
pub fn completion_rate(plan: &DayPlan, completed: &[String]) -> f64 {
    let planned: HashSet<&str> = plan.blocks.iter().map(|b| b.task_title.as_str()).collect();
    let done: HashSet<&str> = completed.iter().map(String::as_str).collect();
    let hits = planned.iter().filter(|t| done.contains(*t)).count();
    round2(hits as f64 / planned.len().max(1) as f64)
}

/// Fraction of scheduled 15-minute steps whose curve value is at least
/// [`HIGH_ENERGY`]. Steps the curve does not cover count as low.
pub fn energy_alignment(plan: &DayPlan, curve: Option<&EnergyCurve>) -> f64 {
    let Some(curve) = curve else {
        return 0.0;
    };
    let mut high = 0u32;
    let mut total = 0u32;
    for b in &plan.blocks {
        let mut t = b.start.with_second(0).unwrap_or(b.start).with_nanosecond(0).unwrap_or(b.start);
        while t < b.end {
            total += 1;
            if curve.energy_at(t).unwrap_or(0.0) >= HIGH_ENERGY {
                high += 1;
            }
            t += Duration::minutes(ALIGNMENT_STEP_MINUTES);
        }
    }
    if total == 0 {
        0.0
    } else {
        round2(f64::from(high) / f64::from(total))
    }
}

pub fn flow_minutes(plan: &DayPlan) -> i64 {
    plan.blocks
        .iter()
        .map(|b| b.minutes())
        .filter(|&m| m >= FLOW_BLOCK_MINUTES)
        .sum()
}

pub fn baseline_suggestions(energy_alignment: f64, plan: &DayPlan) -> Vec<String> {
    let mut out = Vec::new();
    if energy_alignment >= 0.75 {
        out.push("Keep anchoring deep work in your peak hours; it's working.");
    } else if energy_alignment >= 0.55 {
        out.push("Nudge deep work earlier by ~30-45 minutes to better hit your peak.");
    } else {
        out.push("Protect one 60-90 minute block in your peak window; move admin out of it.");
    }

    let short = plan
        .blocks
        .iter()
        .filter(|b| b.minutes() < SHORT_BLOCK_MINUTES)
        .count();
    if short >= 2 {
        out.push("Use 30-45 minute focus blocks with 10-minute buffers; group tiny items.");
    }
    if plan.blocks.iter().any(|b| b.end.hour() >= WIND_DOWN_HOUR) {
        out.push("Trim late-day work; reserve the last 15 minutes for shutdown and tomorrow's setup.");
    }

    out.truncate(MAX_BASELINE_SUGGESTIONS);
    out.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::fallback_curve;
    use crate::error::CollaboratorError;
    use crate::plan::Block;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn plan(blocks: Vec<Block>) -> DayPlan {
        let mut p = DayPlan::new(day());
        p.blocks = blocks;
        p
    }

    struct Rewrites(Result<Vec<&'static str>, CollaboratorError>);

    impl AdviceRewriter for Rewrites {
        fn rewrite(&self, _request: &RewriteRequest) -> Result<Vec<String>, CollaboratorError> {
            self.0
                .clone()
                .map(|v| v.into_iter().map(str::to_string).collect())
        }
    }

    #[test]
    fn test_empty_plan() {
        let s = SummaryEngine::new().summarize(&plan(vec![]), &[], SummaryContext::default(), None);
        assert_eq!(s.completion_rate, 0.0);
        assert_eq!(s.energy_alignment, 0.0);
        assert_eq!(s.flow_minutes, 0);
        assert_eq!(s.suggestions.len(), 1);
        assert!(s.suggestions[0].starts_with("Protect one 60-90 minute block"));
    }

    #[test]
    fn test_completion_counts_distinct_titles() {
        let p = plan(vec![
            Block::new("A", at(9, 0), at(10, 0)),
            Block::new("A", at(11, 0), at(12, 0)),
            Block::new("B", at(13, 0), at(13, 30)),
            Block::new("C", at(15, 0), at(15, 30)),
        ]);
        let done = vec!["A".to_string(), "A".to_string(), "Z".to_string()];
        assert_eq!(completion_rate(&p, &done), 0.33);
    }

    #[test]
    fn test_alignment_against_curve() {
        let curve = fallback_curve(day());
        // 09:00-10:00 is all high energy; 11:15-12:15 is all baseline
        let p = plan(vec![
            Block::new("A", at(9, 0), at(10, 0)),
            Block::new("B", at(11, 15), at(12, 15)),
        ]);
        assert_eq!(energy_alignment(&p, Some(&curve)), 0.5);
        assert_eq!(energy_alignment(&p, None), 0.0);
    }

    #[test]
    fn test_flow_minutes_counts_long_blocks() {
        let p = plan(vec![
            Block::new("A", at(9, 0), at(10, 0)),
            Block::new("B", at(10, 0), at(10, 30)),
            Block::new("C", at(11, 0), at(11, 45)),
        ]);
        assert_eq!(flow_minutes(&p), 105);
    }

    #[test]
    fn test_baseline_tiers_and_cap() {
        let fragmented_late = plan(vec![
            Block::new("A", at(9, 0), at(9, 15)),
            Block::new("B", at(9, 15), at(9, 30)),
            Block::new("C", at(17, 0), at(17, 30)),
        ]);
        let tips = baseline_suggestions(0.8, &fragmented_late);
        assert_eq!(tips.len(), 2);
        assert!(tips[0].starts_with("Keep anchoring"));
        assert!(tips[1].starts_with("Use 30-45 minute focus blocks"));

        let late = plan(vec![Block::new("A", at(16, 30), at(17, 30))]);
        let tips = baseline_suggestions(0.6, &late);
        assert!(tips[0].starts_with("Nudge deep work earlier"));
        assert!(tips[1].starts_with("Trim late-day work"));
    }

    #[test]
    fn test_rewriter_output_is_trimmed_and_capped() {
        let engine = SummaryEngine::new().with_rewriter(Box::new(Rewrites(Ok(vec![
            "  one ", "", "two", "   ", "three", "four",
        ]))));
        let p = plan(vec![Block::new("A", at(9, 0), at(10, 0))]);
        let s = engine.summarize(&p, &[], SummaryContext::default(), None);
        assert_eq!(s.suggestions, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_rewriter_failure_or_blank_keeps_baseline() {
        let p = plan(vec![Block::new("A", at(9, 0), at(10, 0))]);
        let baseline = SummaryEngine::new().summarize(&p, &[], SummaryContext::default(), None);

        for rewriter in [
            Rewrites(Err(CollaboratorError::Unavailable)),
            Rewrites(Ok(vec!["", "  "])),
        ] {
            let s = SummaryEngine::new()
                .with_rewriter(Box::new(rewriter))
                .summarize(&p, &[], SummaryContext::default(), None);
            assert_eq!(s.suggestions, baseline.suggestions);
        }
    }
}
