//! Planning request boundary. All input validation happens here; the pipeline
//! behind it only sees a `ValidPlanRequest`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::energy::EnergyProfile;
use crate::error::InputError;
use crate::plan::Interval;
use crate::scheduler::WorkHours;
use crate::time::parse_day;

fn default_start_hour() -> u32 {
    WorkHours::default().start_hour
}

fn default_end_hour() -> u32 {
    WorkHours::default().end_hour
}

/// Raw request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// One raw task line each.
    pub tasks: Vec<String>,
    /// `YYYY-MM-DD`.
    pub day: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default = "default_start_hour")]
    pub work_start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub work_end_hour: u32,
    /// Titles already done, for the completion rate.
    #[serde(default)]
    pub completed: Vec<String>,
    /// Calendar commitments. When empty the pipeline may substitute defaults.
    #[serde(default)]
    pub busy: Vec<Interval>,
}

impl PlanRequest {
    pub fn new(tasks: Vec<String>, day: impl Into<String>) -> Self {
        Self {
            tasks,
            day: day.into(),
            profile: None,
            work_start_hour: default_start_hour(),
            work_end_hour: default_end_hour(),
            completed: Vec::new(),
            busy: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<ValidPlanRequest, InputError> {
        let tasks: Vec<String> = self
            .tasks
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tasks.is_empty() {
            return Err(InputError::EmptyTasks);
        }

        let day = parse_day(&self.day)?;

        for h in [self.work_start_hour, self.work_end_hour] {
            if h > 23 {
                return Err(InputError::HourOutOfRange(h));
            }
        }
        if self.work_end_hour <= self.work_start_hour {
            return Err(InputError::EmptyWorkDay {
                start: self.work_start_hour,
                end: self.work_end_hour,
            });
        }

        let profile = self
            .profile
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::parse::<EnergyProfile>)
            .transpose()?;

        Ok(ValidPlanRequest {
            tasks,
            day,
            profile,
            work_hours: WorkHours::new(self.work_start_hour, self.work_end_hour),
            completed: self.completed.clone(),
            busy: self.busy.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPlanRequest {
    pub tasks: Vec<String>,
    pub day: NaiveDate,
    pub profile: Option<EnergyProfile>,
    pub work_hours: WorkHours,
    pub completed: Vec<String>,
    pub busy: Vec<Interval>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> PlanRequest {
        PlanRequest::new(vec!["Finish report; 2h".into()], "2026-03-02")
    }

    #[test]
    fn test_valid_request() {
        let mut r = req();
        r.profile = Some("night-owl".into());
        let v = r.validate().unwrap();
        assert_eq!(v.day, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(v.profile, Some(EnergyProfile::NightOwl));
        assert_eq!(v.work_hours, WorkHours::new(9, 18));
    }

    #[test]
    fn test_empty_and_blank_tasks_rejected() {
        let mut r = req();
        r.tasks = vec![];
        assert_eq!(r.validate(), Err(InputError::EmptyTasks));
        r.tasks = vec!["  ".into(), "\n".into()];
        assert_eq!(r.validate(), Err(InputError::EmptyTasks));
    }

    #[test]
    fn test_malformed_day_rejected() {
        let mut r = req();
        r.day = "03/02/2026".into();
        assert!(matches!(r.validate(), Err(InputError::MalformedDay(_))));
    }

    #[test]
    fn test_bad_hours_rejected() {
        let mut r = req();
        r.work_end_hour = 24;
        assert_eq!(r.validate(), Err(InputError::HourOutOfRange(24)));

        let mut r = req();
        r.work_start_hour = 18;
        r.work_end_hour = 9;
        assert_eq!(r.validate(), Err(InputError::EmptyWorkDay { start: 18, end: 9 }));
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let mut r = req();
        r.profile = Some("vampire".into());
        assert!(matches!(r.validate(), Err(InputError::UnknownProfile(_))));
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let r: PlanRequest =
            serde_json::from_str(r#"{"tasks":["a"],"day":"2026-03-02"}"#).unwrap();
        assert_eq!(r.work_start_hour, 9);
        assert_eq!(r.work_end_hour, 18);
        assert!(r.busy.is_empty());
    }
}
