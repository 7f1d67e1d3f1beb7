//! Error types.
//!
//! The scheduling passes themselves are total; only envelope ingestion and
//! configuration loading can fail.

use thiserror::Error;

/// Errors that stop a recipe record from being ingested.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("recipe record is not a JSON object")]
    NotAnObject,
    #[error("recipe 'steps' field is not a list")]
    StepsNotAList,
}

/// Errors loading a [`ScheduleConfig`](crate::ScheduleConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
