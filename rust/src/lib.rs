//! Recipe step scheduler.
//!
//! Turns the parsed steps of a recipe into a minute-by-minute timeline using
//! the critical path method: earliest and latest start times, slack, the
//! critical path, total time and hands-on ("active") time.
//!
//! The engine is a library first. The `recipe-timeline` binary and the
//! optional Python bindings (`python` feature) are thin wrappers over
//! [`TimelineScheduler`].

pub mod active_time;
pub mod analysis;
pub mod backward_pass;
pub mod config;
pub mod cycles;
pub mod error;
pub mod forward_pass;
pub mod graph;
pub mod ingest;
pub mod interner;
pub mod logging;
pub mod models;
pub mod overlap;
pub mod scheduler;

#[cfg(feature = "python")]
mod python;

pub use analysis::BatchSummary;
pub use config::ScheduleConfig;
pub use error::{ConfigError, IngestError};
pub use ingest::ingest_recipe;
pub use models::{
    Minutes, RecipeRecord, ScheduleDiagnostics, ScheduledRecipe, ScheduledStep, Step, StepKind,
    StepTiming, StepWarning, MAX_DURATION_MINUTES,
};
pub use scheduler::{StepSchedule, TimelineScheduler};
