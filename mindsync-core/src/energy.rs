//! Energy curves: predicted alertness over a day at 15-minute resolution.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::plan::Interval;

/// Curve points per day.
pub const CURVE_POINTS: usize = 96;
pub const CURVE_STEP_MINUTES: i64 = 15;
/// Curves start at 06:00 and run 24 hours.
pub const CURVE_START_HOUR: u32 = 6;
pub const BASELINE_ENERGY: f64 = 0.3;
/// Post-lunch dip ceiling, applied 13:00-14:00 for every profile.
pub const DIP_CEILING: f64 = 0.25;
/// Energy at or above this counts as a high-energy slot.
pub const HIGH_ENERGY: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyProfile {
    MorningLark,
    #[default]
    Balanced,
    NightOwl,
}

impl EnergyProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            EnergyProfile::MorningLark => "morning_lark",
            EnergyProfile::Balanced => "balanced",
            EnergyProfile::NightOwl => "night_owl",
        }
    }

    /// `(start_hour, end_hour, peak)` windows, start inclusive, end exclusive.
    fn peaks(self) -> &'static [(f64, f64, f64)] {
        match self {
            EnergyProfile::MorningLark => &[(8.0, 11.0, 0.95), (16.0, 18.0, 0.8)],
            EnergyProfile::Balanced => &[(9.0, 11.0, 0.85), (16.0, 18.0, 0.8)],
            EnergyProfile::NightOwl => &[(10.0, 12.0, 0.6), (17.0, 21.0, 0.95)],
        }
    }
}

impl fmt::Display for EnergyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyProfile {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "morning_lark" | "lark" => Ok(EnergyProfile::MorningLark),
            "balanced" => Ok(EnergyProfile::Balanced),
            "night_owl" | "owl" => Ok(EnergyProfile::NightOwl),
            _ => Err(InputError::UnknownProfile(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPoint {
    pub at: NaiveDateTime,
    pub energy: f64,
}

/// Ordered energy samples. Lookups are by exact slot start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EnergyPoint>", into = "Vec<EnergyPoint>")]
pub struct EnergyCurve {
    points: Vec<EnergyPoint>,
    index: HashMap<NaiveDateTime, f64>,
}

impl From<Vec<EnergyPoint>> for EnergyCurve {
    fn from(points: Vec<EnergyPoint>) -> Self {
        Self::from_points(points)
    }
}

impl From<EnergyCurve> for Vec<EnergyPoint> {
    fn from(curve: EnergyCurve) -> Self {
        curve.points
    }
}

impl EnergyCurve {
    pub fn from_points(mut points: Vec<EnergyPoint>) -> Self {
        points.sort_by_key(|p| p.at);
        let index = points.iter().map(|p| (p.at, p.energy)).collect();
        Self { points, index }
    }

    pub fn points(&self) -> &[EnergyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn energy_at(&self, at: NaiveDateTime) -> Option<f64> {
        self.index.get(&at).copied()
    }

    /// Hourly average energy as a percentage, e.g. `"06:30 07:30 08:30 09:85"`.
    pub fn hourly_summary(&self) -> String {
        let mut buckets: BTreeMap<u32, (f64, u32)> = BTreeMap::new();
        for p in &self.points {
            let b = buckets.entry(p.at.hour()).or_insert((0.0, 0));
            b.0 += p.energy;
            b.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(h, (sum, n))| {
                let avg = sum / f64::from(n.max(1));
                format!("{:02}:{:02}", h, (avg * 100.0).round() as i64)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn curve_start(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(CURVE_START_HOUR, 0, 0).unwrap_or_default())
}

fn fractional_hour(t: NaiveDateTime) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn build_curve(day: NaiveDate, energy_for_hour: impl Fn(f64) -> f64) -> EnergyCurve {
    let start = curve_start(day);
    let points = (0..CURVE_POINTS as i64)
        .map(|i| {
            let at = start + Duration::minutes(CURVE_STEP_MINUTES * i);
            EnergyPoint {
                at,
                energy: round3(energy_for_hour(fractional_hour(at))),
            }
        })
        .collect();
    EnergyCurve::from_points(points)
}

/// Energy curve for a chronotype profile.
///
/// Peaks are layered over [`BASELINE_ENERGY`] by taking the maximum
/// overlapping peak; 13:00-14:00 is capped at [`DIP_CEILING`].
pub fn energy_curve_for(day: NaiveDate, profile: EnergyProfile) -> EnergyCurve {
    let peaks = profile.peaks();
    build_curve(day, |h| {
        let mut e = BASELINE_ENERGY;
        for &(hs, he, val) in peaks {
            if hs <= h && h < he {
                e = e.max(val);
            }
        }
        if (13.0..14.0).contains(&h) {
            e = e.min(DIP_CEILING);
        }
        e
    })
}

/// Profile-agnostic curve used when no profile or curve is supplied:
/// 09:00-11:00 high, 16:00-18:00 medium-high, 13:00-14:00 dip (bounds inclusive).
pub fn fallback_curve(day: NaiveDate) -> EnergyCurve {
    build_curve(day, |h| {
        let mut e = BASELINE_ENERGY;
        if (9.0..=11.0).contains(&h) {
            e = 0.9;
        }
        if (16.0..=18.0).contains(&h) {
            e = e.max(0.8);
        }
        if (13.0..=14.0).contains(&h) {
            e = 0.2;
        }
        e
    })
}

/// Default meeting collisions that pair with [`fallback_curve`]:
/// 10:30-11:00 and 14:00-15:00.
pub fn default_busy(day: NaiveDate) -> Vec<Interval> {
    let at = |h: u32, m: u32| {
        day.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default())
    };
    vec![
        Interval::new(at(10, 30), at(11, 0)),
        Interval::new(at(14, 0), at(15, 0)),
    ]
}
