use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mindsync_core::time::{local_now, parse_day};
use mindsync_core::{
    energy_curve_for, fallback_curve, infer_profile, Classifier, EnergyProfile, Normalizer,
    Pipeline, PlanOutcome, PlanRequest, QuizAnswers, Task,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

mod collaborators;
mod config;
mod llm;
mod state;
mod telemetry;

use collaborators::{LlmAdvisor, LlmEffortSignal, LlmExtractor};
use config::Config;
use llm::LlmClient;

const API_KEY_ENV: &str = "MINDSYNC_API_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "mindsync",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MINDSYNC_BUILD_SHA"), ")"),
    about = "Energy-aware day planner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a day from raw task lines
    Plan {
        /// Task lines, e.g. "Finish report; ~2h; due Fri 5pm"
        tasks: Vec<String>,

        /// Read more task lines from a file (one per line)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Day to plan, YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,

        /// morning_lark | balanced | night_owl (default: from config)
        #[arg(long)]
        profile: Option<String>,

        /// Work start hour (default: from config)
        #[arg(long)]
        start: Option<u32>,

        /// Work end hour (default: from config)
        #[arg(long)]
        end: Option<u32>,

        /// Titles already completed (repeatable)
        #[arg(long = "done")]
        completed: Vec<String>,

        /// Plan without the built-in meeting placeholders
        #[arg(long)]
        no_default_busy: bool,

        #[arg(long)]
        json: bool,
    },

    /// Normalize one task line and print the result
    Parse {
        text: String,

        #[arg(long)]
        json: bool,
    },

    /// Normalize and classify one task line
    Classify {
        text: String,

        #[arg(long)]
        json: bool,
    },

    /// Print the energy curve for a day
    Energy {
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        day: Option<String>,

        /// Omit for the profile-agnostic fallback curve
        #[arg(long)]
        profile: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Infer your energy profile from five questions
    Quiz {
        /// Usual wake time, e.g. 7 or 6:30
        #[arg(long, default_value = "7")]
        wake: String,

        /// Hour you'd start your best deep-work block
        #[arg(long, default_value_t = 10)]
        peak: u32,

        /// Evening alertness, 0-5
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=5))]
        night_alert: u8,

        /// Post-lunch slump, 0-5
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=5))]
        slump: u8,

        /// Ideal meeting hour
        #[arg(long)]
        meeting: Option<String>,

        /// Store the inferred profile in config.toml
        #[arg(long)]
        save: bool,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.mindsync/config.toml with defaults
    Init,

    /// Print the effective config (api key hidden)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config()?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            cfg.llm.api_key = Some(key);
        }
    }
    telemetry::init_logging(&cfg.log.level);

    match cli.command {
        Command::Plan {
            tasks,
            file,
            day,
            profile,
            start,
            end,
            completed,
            no_default_busy,
            json,
        } => {
            let mut lines = tasks;
            if let Some(path) = file {
                let s = fs::read_to_string(&path)
                    .with_context(|| format!("read {}", path.display()))?;
                lines.extend(s.lines().map(str::to_string));
            }
            ensure_nonempty(&lines)?;
            if no_default_busy {
                cfg.planner.use_default_busy = false;
            }

            let today = local_now(&cfg.planner.timezone)?;
            let mut request = PlanRequest::new(
                lines,
                day.unwrap_or_else(|| today.date().format("%Y-%m-%d").to_string()),
            );
            request.profile = Some(profile.unwrap_or_else(|| cfg.planner.profile.clone()));
            request.work_start_hour = start.unwrap_or(cfg.planner.work_start_hour);
            request.work_end_hour = end.unwrap_or(cfg.planner.work_end_hour);
            request.completed = completed;
            let request = request.validate().context("invalid plan request")?;

            let pipeline = build_pipeline(&cfg, today)?;
            let outcome = pipeline.run(&request);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }

        Command::Parse { text, json } => {
            let task = build_normalizer(&cfg)?.normalize(&text);
            print_task(&task, json)?;
        }

        Command::Classify { text, json } => {
            let normalizer = build_normalizer(&cfg)?;
            let classifier = match llm_client(&cfg)? {
                Some(client) => Classifier::new().with_signal(Box::new(LlmEffortSignal::new(client))),
                None => Classifier::new(),
            };
            let task = classifier.classify(normalizer.normalize(&text));
            print_task(&task, json)?;
        }

        Command::Energy { day, profile, json } => {
            let day = resolve_day(&cfg, day.as_deref())?;
            let curve = match profile {
                Some(p) => energy_curve_for(day, p.parse::<EnergyProfile>()?),
                None => fallback_curve(day),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&curve)?);
            } else {
                println!("# Energy for {day}\n");
                for part in curve.hourly_summary().split(' ') {
                    let Some((hour, pct)) = part.split_once(':') else {
                        continue;
                    };
                    let pct: usize = pct.parse().unwrap_or(0);
                    println!("{hour}:00  {:>3}%  {}", pct, "#".repeat(pct / 5));
                }
            }
        }

        Command::Quiz {
            wake,
            peak,
            night_alert,
            slump,
            meeting,
            save,
        } => {
            let guess = infer_profile(&QuizAnswers {
                wake_time: wake,
                peak_block_start: peak,
                night_alert,
                post_lunch_slump: slump,
                ideal_meeting_time: meeting,
            });
            println!("Profile: {} (confidence {:.2})", guess.profile, guess.confidence);
            println!("{}", guess.rationale);

            if save {
                let mut stored = config::load_config()?;
                stored.planner.profile = guess.profile.to_string();
                config::save_config(&stored)?;
                println!("Saved profile to {}", config::config_path()?.display());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                config::init_config()?;
            }
            ConfigCommand::Show => {
                let mut shown = cfg.clone();
                if shown.llm.api_key.is_some() {
                    shown.llm.api_key = Some("********".to_string());
                }
                print!("{}", toml::to_string_pretty(&shown).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn ensure_nonempty(lines: &[String]) -> Result<()> {
    if lines.iter().all(|l| l.trim().is_empty()) {
        bail!("no tasks given (pass task lines or --file <path>)");
    }
    Ok(())
}

fn llm_client(cfg: &Config) -> Result<Option<Arc<LlmClient>>> {
    Ok(LlmClient::from_config(&cfg.llm)?.map(Arc::new))
}

fn build_normalizer(cfg: &Config) -> Result<Normalizer> {
    let now = local_now(&cfg.planner.timezone)?;
    let normalizer = Normalizer::new(now);
    Ok(match llm_client(cfg)? {
        Some(client) => normalizer.with_extractor(Box::new(LlmExtractor::new(client, now.date()))),
        None => normalizer,
    })
}

fn build_pipeline(cfg: &Config, now: chrono::NaiveDateTime) -> Result<Pipeline> {
    let pipeline = Pipeline::new(now, cfg.planner.pipeline_options());
    let Some(client) = llm_client(cfg)? else {
        return Ok(pipeline);
    };
    debug!(provider = ?client.provider(), "llm collaborators enabled");
    Ok(pipeline
        .with_extractor(Box::new(LlmExtractor::new(client.clone(), now.date())))
        .with_effort_signal(Box::new(LlmEffortSignal::new(client.clone())))
        .with_advisor(Box::new(LlmAdvisor::new(client))))
}

fn resolve_day(cfg: &Config, day: Option<&str>) -> Result<NaiveDate> {
    match day {
        Some(d) => Ok(parse_day(d)?),
        None => Ok(local_now(&cfg.planner.timezone)?.date()),
    }
}

fn print_task(task: &Task, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
        return Ok(());
    }
    let fmt = |dt: Option<chrono::NaiveDateTime>| {
        dt.map(|d| d.format("%a %Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("title:      {}", task.title);
    println!("estimate:   {}m", task.est_minutes);
    println!("deadline:   {}", fmt(task.deadline));
    if task.is_fixed() {
        println!("fixed:      {} -> {}", fmt(task.fixed_start), fmt(task.fixed_end));
    }
    if !task.tags.is_empty() {
        println!("tags:       {}", task.tags.join(", "));
    }
    if let Some(n) = &task.notes {
        println!("notes:      {n}");
    }
    if let (Some(effort), Some(conf)) = (task.effort, task.confidence) {
        println!("effort:     {effort} ({conf:.2})");
    }
    Ok(())
}

fn print_outcome(outcome: &PlanOutcome) {
    let plan = &outcome.plan;
    match outcome.profile {
        Some(p) => println!("# Plan for {} ({p})\n", plan.date),
        None => println!("# Plan for {}\n", plan.date),
    }

    if plan.blocks.is_empty() {
        println!("(nothing scheduled)");
    }
    for b in &plan.blocks {
        println!(
            "{}-{}  {:>4}m  {}",
            b.start.format("%H:%M"),
            b.end.format("%H:%M"),
            b.minutes(),
            b.task_title
        );
    }

    let missing: Vec<_> = outcome.unscheduled().collect();
    if !missing.is_empty() {
        println!("\n## Unscheduled\n");
        for (task, minutes) in missing {
            println!("- {} ({minutes}m left)", task.title);
        }
    }

    let s = &outcome.summary;
    println!("\n## Summary\n");
    println!(
        "completion {:.0}% | energy alignment {:.0}% | flow {}m",
        s.completion_rate * 100.0,
        s.energy_alignment * 100.0,
        s.flow_minutes
    );
    for tip in &s.suggestions {
        println!("- {tip}");
    }
}
