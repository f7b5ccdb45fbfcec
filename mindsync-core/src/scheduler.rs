//! Greedy day scheduler.
//!
//! Packs tasks into one day's work hours at slot granularity:
//! - fixed-window reservations (demoted to flexible when they would break a
//!   same-day deadline)
//! - busy intervals removed from the free pool
//! - optional advisor hints (order / chunk size / deferral)
//! - energy-aware slot scoring per effort tier
//! - contiguous chunk packing, then merge of adjacent same-task blocks
//!
//! Scheduling never fails: minutes that cannot be placed are left unscheduled.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::collaborators::{AdvisorRequest, AdvisorTask, PlanAdvice, PlanAdvisor};
use crate::energy::EnergyCurve;
use crate::plan::{Block, DayPlan, Interval};
use crate::task::{Effort, Task};
use crate::time::{at_hour, snap_down, snap_up};

pub const DEFAULT_STEP_MINUTES: u32 = 15;
/// Shortest run placed while at least this much of a task remains.
pub const MIN_RUN_MINUTES: u32 = 30;
/// Energy assumed for slots the curve does not cover.
pub const UNKNOWN_SLOT_ENERGY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 18,
        }
    }
}

impl WorkHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn bounds(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (at_hour(day, self.start_hour), at_hour(day, self.end_hour))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub work_hours: WorkHours,
    pub step_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            work_hours: WorkHours::default(),
            step_minutes: DEFAULT_STEP_MINUTES,
        }
    }
}

/// Preference of a task of the given effort for a slot. Higher is better.
///
/// High effort follows energy; low effort prefers dips but avoids the first
/// working hour (and anything before 09:00); medium is a softened blend.
pub fn slot_score(effort: Effort, energy: f64, slot_hour: u32, work_start_hour: u32) -> f64 {
    match effort {
        Effort::High => energy,
        Effort::Low => {
            let early_penalty = if slot_hour < (work_start_hour + 1).max(9) {
                0.2
            } else {
                0.0
            };
            (1.0 - energy) - early_penalty
        }
        Effort::Medium => 0.5 + 0.5 * energy,
    }
}

fn round_up_to(minutes: u32, step: u32) -> u32 {
    minutes.div_ceil(step) * step
}

fn round_down_to(minutes: u32, step: u32) -> u32 {
    (minutes / step) * step
}

/// The day's work-hour slots and which of them are still open.
struct SlotGrid {
    start: NaiveDateTime,
    step: u32,
    /// Not blocked by a busy interval.
    free: Vec<bool>,
    /// Already reserved by a block.
    used: Vec<bool>,
}

impl SlotGrid {
    fn new(day: NaiveDate, hours: WorkHours, step: u32, busy: &[Interval]) -> Self {
        let (start, end) = hours.bounds(day);
        let n = if end > start {
            ((end - start).num_minutes() / i64::from(step)) as usize
        } else {
            0
        };
        let mut grid = Self {
            start,
            step,
            free: vec![true; n],
            used: vec![false; n],
        };
        for k in 0..n {
            let slot = grid.slot(k);
            grid.free[k] = !busy.iter().any(|b| b.overlaps(&slot));
        }
        grid
    }

    fn len(&self) -> usize {
        self.free.len()
    }

    fn slot(&self, k: usize) -> Interval {
        let s = self.start + Duration::minutes(i64::from(self.step) * k as i64);
        Interval::new(s, s + Duration::minutes(i64::from(self.step)))
    }

    fn open(&self, k: usize) -> bool {
        self.free[k] && !self.used[k]
    }

    fn open_count(&self) -> usize {
        (0..self.len()).filter(|&k| self.open(k)).count()
    }

    fn covering(&self, span: &Interval) -> Vec<usize> {
        (0..self.len())
            .filter(|&k| self.slot(k).overlaps(span))
            .collect()
    }

    /// `count` contiguous open slots starting at `k`.
    fn open_run(&self, k: usize, count: usize) -> bool {
        k + count <= self.len() && (k..k + count).all(|i| self.open(i))
    }

    fn reserve(&mut self, slots: impl IntoIterator<Item = usize>) {
        for k in slots {
            self.used[k] = true;
        }
    }
}

pub struct Scheduler {
    config: SchedulerConfig,
    advisor: Option<Box<dyn PlanAdvisor>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            advisor: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Box<dyn PlanAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Build the day's plan within the configured work hours.
    pub fn schedule(
        &self,
        tasks: &mut [Task],
        day: NaiveDate,
        curve: &EnergyCurve,
        busy: &[Interval],
    ) -> DayPlan {
        self.schedule_in(tasks, day, curve, busy, self.config.work_hours)
    }

    /// Build the day's plan within `hours`.
    ///
    /// Fixed tasks whose window would end after a same-day deadline have their
    /// fixed bounds cleared in `tasks` and are placed as flexible tasks.
    pub fn schedule_in(
        &self,
        tasks: &mut [Task],
        day: NaiveDate,
        curve: &EnergyCurve,
        busy: &[Interval],
        hours: WorkHours,
    ) -> DayPlan {
        let step = self.config.step_minutes.max(1);
        let (work_start, work_end) = hours.bounds(day);

        let mut grid = SlotGrid::new(day, hours, step, busy);
        let mut plan = DayPlan::new(day);

        let mut flexible: Vec<usize> = Vec::new();
        for (i, task) in tasks.iter_mut().enumerate() {
            if !task.is_fixed() {
                flexible.push(i);
                continue;
            }
            let (fs, fe) = match (task.fixed_start, task.fixed_end) {
                (Some(s), Some(e)) => (s, e),
                (Some(s), None) => (s, s + Duration::minutes(i64::from(task.est_minutes.max(step)))),
                _ => {
                    task.clear_fixed_window();
                    flexible.push(i);
                    continue;
                }
            };
            let fs = snap_down(fs, step);
            let fe = snap_up(fe, step);

            if let Some(dl) = task.deadline {
                if dl.date() == day && fe > dl {
                    debug!(title = %task.title, %dl, "fixed window ends after deadline; demoting");
                    task.clear_fixed_window();
                    flexible.push(i);
                    continue;
                }
            }
            task.fixed_start = Some(fs);
            task.fixed_end = Some(fe);

            if fs.date() != day {
                debug!(title = %task.title, "fixed window is not on the planned day; skipping");
                continue;
            }
            let s = fs.min(work_end).max(work_start);
            let e = fe.min(work_end).max(work_start);
            if e <= s {
                debug!(title = %task.title, "fixed window outside work hours; dropping");
                continue;
            }

            let span = Interval::new(s, e);
            let covering = grid.covering(&span);
            if covering.iter().any(|&k| grid.used[k]) {
                debug!(title = %task.title, "fixed window collides with another reservation; placing flexibly");
                flexible.push(i);
                continue;
            }
            grid.reserve(covering);
            plan.blocks.push(Block::new(task.title.clone(), s, e));
        }

        let advice = if flexible.is_empty() || grid.open_count() == 0 {
            None
        } else {
            self.consult_advisor(tasks, &flexible, day, hours, curve)
        };

        let mut chunk_override: BTreeMap<String, u32> = BTreeMap::new();
        if let Some(advice) = &advice {
            let known: HashSet<&str> = flexible.iter().map(|&i| tasks[i].title.as_str()).collect();
            let deferred: HashSet<&str> = advice
                .defer
                .iter()
                .map(String::as_str)
                .filter(|t| known.contains(t))
                .collect();
            if !deferred.is_empty() {
                debug!(?deferred, "advisor deferred tasks");
                flexible.retain(|&i| !deferred.contains(tasks[i].title.as_str()));
            }
            for (title, minutes) in &advice.chunk_minutes {
                if known.contains(title.as_str()) {
                    chunk_override.insert(title.clone(), *minutes);
                }
            }
        }

        let order = placement_order(tasks, &flexible, day, advice.as_ref());

        for i in order {
            let task = &tasks[i];
            let effort = task.effort_or_default();
            let mut remaining = round_up_to(task.est_minutes.max(step), step);
            let chunk = chunk_override
                .get(&task.title)
                .copied()
                .unwrap_or_else(|| effort.chunk_minutes());
            let chunk = round_down_to(chunk, step).max(step);
            let min_run = round_up_to(MIN_RUN_MINUTES, step);

            let latest_end = task.deadline.filter(|dl| dl.date() == day);

            let mut candidates: Vec<(usize, f64)> = (0..grid.len())
                .filter(|&k| grid.open(k))
                .map(|k| {
                    let slot = grid.slot(k);
                    let energy = curve.energy_at(slot.start).unwrap_or(UNKNOWN_SLOT_ENERGY);
                    (k, slot_score(effort, energy, slot.start.hour(), hours.start_hour))
                })
                .collect();
            // stable: equal scores keep earliest-first order
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

            while remaining > 0 {
                let mut minutes = chunk.min(remaining);
                if minutes < min_run && remaining >= min_run {
                    minutes = min_run;
                }
                let count = (minutes / step) as usize;

                let found = candidates.iter().map(|&(k, _)| k).find(|&k| {
                    if !grid.open_run(k, count) {
                        return false;
                    }
                    let end = grid.slot(k).start + Duration::minutes(i64::from(minutes));
                    latest_end.is_none_or(|dl| end <= dl)
                });

                let Some(k) = found else {
                    debug!(title = %task.title, remaining, "no room left; leaving minutes unscheduled");
                    break;
                };
                let start = grid.slot(k).start;
                let end = start + Duration::minutes(i64::from(minutes));
                grid.reserve(k..k + count);
                plan.blocks.push(Block::new(task.title.clone(), start, end));
                remaining -= minutes;
            }
        }

        plan.merge_adjacent();
        plan
    }

    fn consult_advisor(
        &self,
        tasks: &[Task],
        flexible: &[usize],
        day: NaiveDate,
        hours: WorkHours,
        curve: &EnergyCurve,
    ) -> Option<PlanAdvice> {
        let advisor = self.advisor.as_ref()?;
        let request = AdvisorRequest {
            day,
            work_start_hour: hours.start_hour,
            work_end_hour: hours.end_hour,
            energy_summary: curve.hourly_summary(),
            tasks: flexible
                .iter()
                .map(|&i| {
                    let t = &tasks[i];
                    AdvisorTask {
                        title: t.title.clone(),
                        est_minutes: t.est_minutes,
                        effort: t.effort_or_default(),
                        deadline: t.deadline.map(|d| d.format("%Y-%m-%dT%H:%M").to_string()),
                    }
                })
                .collect(),
        };
        match advisor.advise(&request) {
            Ok(advice) => {
                if let Some(note) = &advice.note {
                    debug!(note = %note, "advisor note");
                }
                Some(advice.clamped())
            }
            Err(e) => {
                warn!(error = %e, "planning advisor failed; scheduling without advice");
                None
            }
        }
    }
}

/// Default order: earliest deadline (end of day when none), then effort
/// high -> medium -> low. Advisor titles go first when given.
fn placement_order(
    tasks: &[Task],
    flexible: &[usize],
    day: NaiveDate,
    advice: Option<&PlanAdvice>,
) -> Vec<usize> {
    let end_of_day = at_hour(day, 23) + Duration::minutes(59);
    let mut default_order = flexible.to_vec();
    default_order.sort_by_key(|&i| {
        let t = &tasks[i];
        (t.deadline.unwrap_or(end_of_day), t.effort_or_default().rank())
    });

    let Some(advice) = advice.filter(|a| !a.order.is_empty()) else {
        return default_order;
    };

    let mut ordered: Vec<usize> = Vec::with_capacity(default_order.len());
    let mut seen_titles: HashSet<&str> = HashSet::new();
    for title in &advice.order {
        if !seen_titles.insert(title.as_str()) {
            continue;
        }
        ordered.extend(
            default_order
                .iter()
                .copied()
                .filter(|&i| tasks[i].title == *title),
        );
    }
    for i in default_order {
        if !ordered.contains(&i) {
            ordered.push(i);
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::{default_busy, energy_curve_for, fallback_curve, EnergyProfile};
    use crate::error::CollaboratorError;
    use std::sync::{Arc, Mutex};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(SchedulerConfig::default())
    }

    fn assert_no_overlap(plan: &DayPlan) {
        for (i, a) in plan.blocks.iter().enumerate() {
            for b in plan.blocks.iter().skip(i + 1) {
                assert!(
                    !a.interval().overlaps(&b.interval()),
                    "{a:?} overlaps {b:?}"
                );
            }
        }
    }

    struct CannedAdvisor {
        advice: Result<PlanAdvice, CollaboratorError>,
        seen: Mutex<Option<AdvisorRequest>>,
    }

    impl CannedAdvisor {
        fn new(advice: Result<PlanAdvice, CollaboratorError>) -> Self {
            Self {
                advice,
                seen: Mutex::new(None),
            }
        }
    }

    impl PlanAdvisor for CannedAdvisor {
        fn advise(&self, request: &AdvisorRequest) -> Result<PlanAdvice, CollaboratorError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            self.advice.clone()
        }
    }

    impl PlanAdvisor for Arc<CannedAdvisor> {
        fn advise(&self, request: &AdvisorRequest) -> Result<PlanAdvice, CollaboratorError> {
            self.as_ref().advise(request)
        }
    }

    #[test]
    fn test_high_effort_task_avoids_busy_and_fills_peak() {
        let mut tasks = vec![Task::new("Deep work").with_estimate(120).with_effort(Effort::High)];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &default_busy(day()));

        assert_eq!(plan.minutes_for("Deep work"), 120);
        assert!(plan.blocks.len() >= 2);
        for b in &plan.blocks {
            for busy in default_busy(day()) {
                assert!(!b.interval().overlaps(&busy));
            }
        }
        assert_eq!(plan.blocks[0], Block::new("Deep work", at(9, 0), at(10, 0)));
        assert_eq!(plan.blocks[1], Block::new("Deep work", at(11, 0), at(12, 0)));
    }

    #[test]
    fn test_fixed_window_round_trips() {
        let mut tasks = vec![Task::new("Dentist").with_fixed_window(at(14, 0), at(15, 0))];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert_eq!(plan.blocks, vec![Block::new("Dentist", at(14, 0), at(15, 0))]);
    }

    #[test]
    fn test_fixed_window_is_snapped_and_clamped() {
        let mut tasks = vec![Task::new("Early call").with_fixed_window(at(8, 10), at(9, 20))];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert_eq!(plan.blocks, vec![Block::new("Early call", at(9, 0), at(9, 30))]);
        assert_eq!(tasks[0].fixed_start, Some(at(8, 0)));
        assert_eq!(tasks[0].fixed_end, Some(at(9, 30)));
    }

    #[test]
    fn test_fixed_window_outside_hours_is_dropped() {
        let mut tasks = vec![Task::new("Late gig").with_fixed_window(at(19, 0), at(21, 0))];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert!(plan.blocks.is_empty());
    }

    #[test]
    fn test_fixed_window_on_other_day_is_skipped() {
        let next = at(14, 0) + Duration::days(1);
        let mut tasks = vec![Task::new("Tomorrow thing").with_fixed_window(next, next + Duration::hours(1))];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert!(plan.blocks.is_empty());
    }

    #[test]
    fn test_fixed_window_after_deadline_is_demoted() {
        let mut tasks = vec![
            Task::new("Submit draft")
                .with_estimate(60)
                .with_deadline(at(12, 0))
                .with_fixed_window(at(11, 30), at(12, 30)),
        ];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &default_busy(day()));

        assert!(!tasks[0].is_fixed());
        assert_eq!(plan.minutes_for("Submit draft"), 60);
        assert!(plan.blocks.iter().all(|b| b.end <= at(12, 0)));
    }

    #[test]
    fn test_infeasible_deadline_leaves_task_unscheduled() {
        let mut tasks = vec![
            Task::new("Impossible")
                .with_estimate(60)
                .with_effort(Effort::High)
                .with_deadline(at(9, 30)),
        ];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert!(plan.blocks.is_empty());
    }

    #[test]
    fn test_colliding_fixed_windows_never_overlap() {
        let mut tasks = vec![
            Task::new("Standup").with_fixed_window(at(9, 0), at(9, 30)),
            Task::new("Interview").with_estimate(30).with_fixed_window(at(9, 15), at(9, 45)),
        ];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert_no_overlap(&plan);
        assert_eq!(plan.minutes_for("Standup"), 30);
        assert_eq!(plan.minutes_for("Interview"), 30);
    }

    #[test]
    fn test_low_effort_prefers_dips() {
        let mut tasks = vec![Task::new("Inbox zero").with_estimate(30).with_effort(Effort::Low)];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &default_busy(day()));
        // 13:00 has the lowest energy (0.2) of the open slots
        assert_eq!(plan.blocks, vec![Block::new("Inbox zero", at(13, 0), at(13, 30))]);
    }

    #[test]
    fn test_ties_go_to_earliest_slot() {
        let mut tasks = vec![Task::new("Flat").with_estimate(30).with_effort(Effort::High)];
        let flat = EnergyCurve::from_points(vec![]);
        let plan = scheduler().schedule(&mut tasks, day(), &flat, &[]);
        assert_eq!(plan.blocks, vec![Block::new("Flat", at(9, 0), at(9, 30))]);
    }

    #[test]
    fn test_deadline_orders_before_effort() {
        let mut tasks = vec![
            Task::new("Later").with_estimate(60).with_effort(Effort::High),
            Task::new("Urgent").with_estimate(60).with_effort(Effort::High).with_deadline(at(17, 0)),
        ];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &default_busy(day()));
        let urgent = plan.blocks_for("Urgent").next().unwrap();
        assert_eq!(urgent.start, at(9, 0));
    }

    #[test]
    fn test_estimate_is_quantized_to_whole_slots() {
        let mut tasks = vec![
            Task::new("Odd").with_estimate(20).with_effort(Effort::High),
            Task::new("Next").with_estimate(15).with_effort(Effort::High),
        ];
        let plan = scheduler().schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert_no_overlap(&plan);
        assert_eq!(plan.minutes_for("Odd"), 30);
        assert_eq!(plan.minutes_for("Next"), 15);
    }

    #[test]
    fn test_advisor_order_defer_and_chunks() {
        let mut advice = PlanAdvice {
            order: vec!["Second".into(), "Ghost".into(), "Second".into()],
            defer: vec!["Skip me".into()],
            ..PlanAdvice::default()
        };
        advice.chunk_minutes.insert("Second".into(), 500);
        let advisor = CannedAdvisor::new(Ok(advice));

        let mut tasks = vec![
            Task::new("First").with_estimate(60).with_effort(Effort::High).with_deadline(at(12, 0)),
            Task::new("Second").with_estimate(120).with_effort(Effort::High),
            Task::new("Skip me").with_estimate(30).with_effort(Effort::Low),
        ];
        let s = scheduler().with_advisor(Box::new(advisor));
        let plan = s.schedule(&mut tasks, day(), &fallback_curve(day()), &[]);

        assert_eq!(plan.minutes_for("Skip me"), 0);
        // advisor order puts Second first; its clamped 120m chunk takes the peak
        assert_eq!(plan.blocks_for("Second").next().unwrap().start, at(9, 0));
        assert_eq!(plan.minutes_for("Second"), 120);
        assert_eq!(plan.minutes_for("First"), 60);
        assert!(plan.blocks_for("First").all(|b| b.end <= at(12, 0)));
    }

    #[test]
    fn test_advisor_sees_only_flexible_tasks() {
        let advisor = Arc::new(CannedAdvisor::new(Ok(PlanAdvice::default())));
        let mut tasks = vec![
            Task::new("Fixed").with_fixed_window(at(9, 0), at(10, 0)),
            Task::new("Flex").with_estimate(45).with_deadline(at(16, 0)),
        ];
        let curve = energy_curve_for(day(), EnergyProfile::Balanced);
        let s = scheduler().with_advisor(Box::new(advisor.clone()));
        s.schedule(&mut tasks, day(), &curve, &[]);

        let seen = advisor.seen.lock().unwrap().clone().expect("advisor consulted");
        assert_eq!(seen.energy_summary, curve.hourly_summary());
        assert_eq!(seen.task_table(), "- Flex | 45 | medium | 2026-03-02T16:00");
    }

    #[test]
    fn test_advisor_skipped_without_flexible_tasks() {
        let advisor = Arc::new(CannedAdvisor::new(Ok(PlanAdvice::default())));
        let mut tasks = vec![Task::new("Fixed").with_fixed_window(at(9, 0), at(10, 0))];
        let s = scheduler().with_advisor(Box::new(advisor.clone()));
        s.schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert!(advisor.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_failed_advisor_matches_no_advisor() {
        let build = || {
            vec![
                Task::new("Finish report").with_estimate(90).with_effort(Effort::High),
                Task::new("Emails").with_estimate(30).with_effort(Effort::Low),
            ]
        };
        let curve = fallback_curve(day());
        let busy = default_busy(day());

        let mut a = build();
        let plain = scheduler().schedule(&mut a, day(), &curve, &busy);

        let mut b = build();
        let failing = scheduler().with_advisor(Box::new(CannedAdvisor::new(Err(CollaboratorError::Timeout))));
        let with_failure = failing.schedule(&mut b, day(), &curve, &busy);

        assert_eq!(plain, with_failure);
    }

    #[test]
    fn test_empty_work_day_yields_empty_plan() {
        let cfg = SchedulerConfig {
            work_hours: WorkHours::new(12, 12),
            ..SchedulerConfig::default()
        };
        let mut tasks = vec![
            Task::new("a").with_estimate(30),
            Task::new("b").with_fixed_window(at(12, 0), at(13, 0)),
        ];
        let plan = Scheduler::new(cfg).schedule(&mut tasks, day(), &fallback_curve(day()), &[]);
        assert!(plan.blocks.is_empty());
    }

    #[test]
    fn test_slot_score_tiers() {
        assert_eq!(slot_score(Effort::High, 0.9, 10, 9), 0.9);
        assert!((slot_score(Effort::Low, 0.2, 13, 9) - 0.8).abs() < 1e-9);
        assert!((slot_score(Effort::Low, 0.2, 9, 9) - 0.6).abs() < 1e-9);
        assert!((slot_score(Effort::Medium, 0.5, 10, 9) - 0.75).abs() < 1e-9);
    }
}
