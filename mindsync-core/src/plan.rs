//! Plan artifacts: intervals, blocks, the day plan and its summary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A scheduled occupation of time for exactly one task (matched by title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub task_title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Block {
    pub fn new(task_title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            task_title: task_title.into(),
            start,
            end,
        }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl DayPlan {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            blocks: Vec::new(),
        }
    }

    /// Sort by start and fuse time-adjacent blocks of the same task.
    ///
    /// Idempotent: merging an already merged plan changes nothing.
    pub fn merge_adjacent(&mut self) {
        let mut blocks = std::mem::take(&mut self.blocks);
        blocks.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.task_title.cmp(&b.task_title))
        });

        let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
        for b in blocks {
            match merged.last_mut() {
                Some(last) if last.task_title == b.task_title && last.end == b.start => {
                    last.end = b.end;
                }
                _ => merged.push(b),
            }
        }
        self.blocks = merged;
    }

    /// Total scheduled minutes for one task title.
    pub fn minutes_for(&self, title: &str) -> i64 {
        self.blocks
            .iter()
            .filter(|b| b.task_title == title)
            .map(Block::minutes)
            .sum()
    }

    pub fn blocks_for<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.task_title == title)
    }
}

/// Post-hoc report over a finished plan. Computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub completion_rate: f64,
    pub energy_alignment: f64,
    pub flow_minutes: i64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn merge_fuses_only_adjacent_same_task() {
        let mut plan = DayPlan::new(day());
        plan.blocks = vec![
            Block::new("report", at(10, 0), at(11, 0)),
            Block::new("report", at(9, 0), at(10, 0)),
            Block::new("email", at(11, 0), at(11, 30)),
            Block::new("report", at(11, 30), at(12, 0)),
        ];
        plan.merge_adjacent();

        assert_eq!(
            plan.blocks,
            vec![
                Block::new("report", at(9, 0), at(11, 0)),
                Block::new("email", at(11, 0), at(11, 30)),
                Block::new("report", at(11, 30), at(12, 0)),
            ]
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let mut plan = DayPlan::new(day());
        plan.blocks = vec![
            Block::new("a", at(9, 0), at(9, 15)),
            Block::new("a", at(9, 15), at(9, 45)),
            Block::new("b", at(13, 0), at(14, 0)),
        ];
        plan.merge_adjacent();
        let once = plan.clone();
        plan.merge_adjacent();
        assert_eq!(plan, once);
    }

    #[test]
    fn interval_overlap_is_half_open() {
        let a = Interval::new(at(9, 0), at(10, 0));
        let b = Interval::new(at(10, 0), at(11, 0));
        let c = Interval::new(at(9, 45), at(10, 15));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }
}
