//! mindsync-core: energy-aware day planning.
//!
//! Raw task lines are normalized into tasks, classified by effort, packed into
//! the day's work hours against an energy curve, and summarized.

pub mod classifier;
pub mod collaborators;
pub mod energy;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod plan;
pub mod quiz;
pub mod request;
pub mod scheduler;
pub mod summary;
pub mod task;
pub mod time;

pub use classifier::{apply_keyword_rules, Classifier};
pub use collaborators::{
    AdviceRewriter, AdvisorRequest, AdvisorTask, EffortSignal, ExtractionMode, Extractor,
    PlanAdvice, PlanAdvisor, RewriteRequest, TaskDraft,
};
pub use energy::{
    default_busy, energy_curve_for, fallback_curve, EnergyCurve, EnergyPoint, EnergyProfile,
};
pub use error::{CollaboratorError, InputError};
pub use normalizer::{finalize_draft, Normalizer};
pub use pipeline::{Pipeline, PipelineOptions, PlanOutcome};
pub use plan::{Block, DailySummary, DayPlan, Interval};
pub use quiz::{infer_profile, ProfileGuess, QuizAnswers};
pub use request::{PlanRequest, ValidPlanRequest};
pub use scheduler::{Scheduler, SchedulerConfig, WorkHours};
pub use summary::{SummaryContext, SummaryEngine};
pub use task::{Effort, Task};
