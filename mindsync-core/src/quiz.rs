//! Five-question chronotype quiz.

use serde::{Deserialize, Serialize};

use crate::energy::EnergyProfile;

pub const DEFAULT_WAKE_HOUR: u32 = 7;
pub const DEFAULT_PEAK_HOUR: u32 = 10;
pub const DEFAULT_MEETING_HOUR: u32 = 15;
pub const DEFAULT_RATING: u8 = 2;

/// Ratings are 0-5. Hours accept `"7"` or `"7:30"`; unreadable hours fall back
/// to the defaults above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAnswers {
    pub wake_time: String,
    pub peak_block_start: u32,
    /// How alert you feel late in the evening.
    pub night_alert: u8,
    /// How hard the post-lunch slump hits.
    pub post_lunch_slump: u8,
    #[serde(default)]
    pub ideal_meeting_time: Option<String>,
}

impl Default for QuizAnswers {
    fn default() -> Self {
        Self {
            wake_time: DEFAULT_WAKE_HOUR.to_string(),
            peak_block_start: DEFAULT_PEAK_HOUR,
            night_alert: DEFAULT_RATING,
            post_lunch_slump: DEFAULT_RATING,
            ideal_meeting_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileGuess {
    pub profile: EnergyProfile,
    pub confidence: f64,
    pub rationale: String,
}

fn hour_of(s: &str) -> Option<u32> {
    let h = s.trim().split(':').next()?.trim();
    h.parse::<i64>().ok().map(|h| h.clamp(0, 23) as u32)
}

/// Score morning vs night signals; a lead of two or more picks that side.
pub fn infer_profile(answers: &QuizAnswers) -> ProfileGuess {
    let wake = hour_of(&answers.wake_time).unwrap_or(DEFAULT_WAKE_HOUR);
    let peak = answers.peak_block_start.min(23);
    let meet = answers
        .ideal_meeting_time
        .as_deref()
        .and_then(hour_of)
        .unwrap_or(DEFAULT_MEETING_HOUR);
    let night_alert = answers.night_alert;
    let slump = answers.post_lunch_slump;

    let mut morning = 0i32;
    let mut night = 0i32;

    if (5..=7).contains(&wake) {
        morning += 1;
    }
    if (9..=11).contains(&wake) {
        night += 1;
    }
    if (8..=10).contains(&peak) {
        morning += 1;
    }
    if (16..=20).contains(&peak) {
        night += 1;
    }
    match night_alert {
        4.. => night += 1,
        0..=1 => morning += 1,
        _ => {}
    }
    match slump {
        4.. => morning += 1,
        0..=1 => night += 1,
        _ => {}
    }
    if (10..=12).contains(&meet) {
        morning += 1;
    }
    if (15..=17).contains(&meet) {
        night += 1;
    }

    let profile = if morning - night >= 2 {
        EnergyProfile::MorningLark
    } else if night - morning >= 2 {
        EnergyProfile::NightOwl
    } else {
        EnergyProfile::Balanced
    };
    let margin = (morning - night).abs();
    let confidence = (0.5 + 0.1 * f64::from(margin)).min(1.0);

    ProfileGuess {
        profile,
        confidence: (confidence * 100.0).round() / 100.0,
        rationale: format!(
            "wake={wake}, peak={peak}, night_alert={night_alert}, slump={slump}, \
             ideal_meeting={meet} -> scores: morning={morning}, night={night}"
        ),
    }
}
