use anyhow::{Context, Result};
use mindsync_core::{EnergyProfile, PipelineOptions, WorkHours};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_mindsync_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub planner: PlannerSection,
    pub llm: LlmSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub step_minutes: u32,
    /// morning_lark | balanced | night_owl
    pub profile: String,
    /// IANA name, used to decide what "today" is.
    pub timezone: String,
    pub use_default_busy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub enabled: bool,
    /// openai | anthropic
    pub provider: String,
    pub model: String,
    /// Defaults to the provider's public endpoint.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for PlannerSection {
    fn default() -> Self {
        let hours = WorkHours::default();
        Self {
            work_start_hour: hours.start_hour,
            work_end_hour: hours.end_hour,
            step_minutes: PipelineOptions::default().step_minutes,
            profile: EnergyProfile::default().to_string(),
            timezone: "UTC".to_string(),
            use_default_busy: true,
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            temperature: 0.2,
            timeout_secs: 20,
            api_key: None,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl PlannerSection {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            step_minutes: self.step_minutes,
            use_default_busy: self.use_default_busy,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_mindsync_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
