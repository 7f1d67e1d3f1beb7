//! Core data types for recipe scheduling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Minutes relative to the start of the recipe (t=0).
pub type Minutes = i64;

/// Largest accepted step duration. Keeps sums over any step list far from
/// overflow.
pub const MAX_DURATION_MINUTES: Minutes = i32::MAX as Minutes;

/// Envelope keys the scheduler computes; they are never passed through from input.
pub const COMPUTED_KEYS: [&str; 5] = [
    "steps",
    "total_time_min",
    "active_time_min",
    "critical_path",
    "diagnostics",
];

/// Broad classification of a step's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    Prep,
    Cook,
    Finish,
    /// Free text or `unknown`.
    Other,
}

impl StepKind {
    pub fn from_type(step_type: &str) -> Self {
        match step_type.trim().to_ascii_lowercase().as_str() {
            "prep" => Self::Prep,
            "cook" => Self::Cook,
            "finish" => Self::Finish,
            _ => Self::Other,
        }
    }
}

/// One atomic cooking action, normalized at ingestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub raw_text: String,
    pub label: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub estimated_duration_minutes: Minutes,
    /// Step IDs that must finish first, in declaration order, without duplicates.
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub can_overlap_with: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub temperature_c: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

impl Step {
    /// Create a step with the given ID and duration; everything else empty.
    pub fn new(id: impl Into<String>, duration: Minutes) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            raw_text: String::new(),
            step_type: "unknown".to_string(),
            estimated_duration_minutes: duration.clamp(0, MAX_DURATION_MINUTES),
            requires: Vec::new(),
            can_overlap_with: Vec::new(),
            equipment: Vec::new(),
            temperature_c: None,
            notes: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_type(mut self, step_type: impl Into<String>) -> Self {
        self.step_type = step_type.into();
        self
    }

    pub fn requiring<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn overlapping<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.can_overlap_with.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> StepKind {
        StepKind::from_type(&self.step_type)
    }

    /// Duration in minutes, within `0..=MAX_DURATION_MINUTES`.
    #[inline]
    pub fn duration(&self) -> Minutes {
        self.estimated_duration_minutes.clamp(0, MAX_DURATION_MINUTES)
    }
}

/// A data-quality problem attached to one step.
///
/// Rendered to strings in [`ScheduledStep::warnings`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepWarning {
    /// A `requires` entry names a step that does not exist in the recipe.
    MissingDependency(String),
    /// A `can_overlap_with` entry names a step that does not exist in the recipe.
    MissingOverlapPartner(String),
    /// A dependency was not yet scheduled when this step was (cycle fallback).
    UnresolvedDependency(String),
    /// The step lies on a dependency cycle (IDs in execution order).
    InCycle(Vec<String>),
    /// The step was placed in input order because the graph has a cycle.
    FallbackOrdering,
    /// The duration was negative and clamped to zero.
    NegativeDuration(i64),
    /// The duration was absent or not a number.
    MissingDuration,
    /// The step had no ID; a placeholder was assigned.
    MissingId(String),
    /// The step had no label; one was derived.
    MissingLabel,
    /// Another step already used this ID.
    DuplicateId { original: String, renamed: String },
    /// An earlier step has the same ID; references resolve to that step.
    ShadowedId(String),
    /// The step was not an object or string; an empty placeholder took its place.
    MalformedStep(&'static str),
}

impl fmt::Display for StepWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDependency(id) => write!(f, "requires unknown step '{}'", id),
            Self::MissingOverlapPartner(id) => {
                write!(f, "can_overlap_with unknown step '{}'", id)
            }
            Self::UnresolvedDependency(id) => {
                write!(f, "dependency '{}' was not scheduled before this step", id)
            }
            Self::InCycle(ids) => write!(f, "part of dependency cycle: {}", ids.join(" -> ")),
            Self::FallbackOrdering => {
                write!(f, "scheduled in input order because of a dependency cycle")
            }
            Self::NegativeDuration(value) => {
                write!(f, "negative duration {} clamped to 0", value)
            }
            Self::MissingDuration => write!(f, "missing duration, defaulted to 0"),
            Self::MissingId(id) => write!(f, "missing id, assigned '{}'", id),
            Self::MissingLabel => write!(f, "missing label, derived from step text"),
            Self::DuplicateId { original, renamed } => {
                write!(f, "duplicate id '{}' renamed to '{}'", original, renamed)
            }
            Self::ShadowedId(id) => write!(
                f,
                "id '{}' is already used by an earlier step; references resolve to that step",
                id
            ),
            Self::MalformedStep(kind) => {
                write!(f, "step was a JSON {}, replaced by an empty placeholder", kind)
            }
        }
    }
}

/// Timing of one step across the forward and backward passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepTiming {
    /// Earliest start (forward pass, after overlap relaxation).
    pub start: Minutes,
    /// `start + duration`.
    pub end: Minutes,
    /// Latest allowable start (backward pass).
    pub latest_start: Minutes,
    /// Latest allowable end (backward pass).
    pub latest_end: Minutes,
    /// `max(0, latest_start - start)`.
    pub slack: Minutes,
}

impl StepTiming {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

/// A step with its computed timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStep {
    #[serde(flatten)]
    pub step: Step,
    pub duration_min: Minutes,
    pub start_min: Minutes,
    pub end_min: Minutes,
    pub latest_start_min: Minutes,
    pub latest_end_min: Minutes,
    pub slack_min: Minutes,
    pub is_critical: bool,
    pub dependencies_met: bool,
    pub warnings: Vec<String>,
}

/// Structured record of what went wrong (or degraded) while scheduling a recipe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDiagnostics {
    /// Dependency cycles, each as step IDs in execution order.
    pub cycles: Vec<Vec<String>>,
    /// True when some steps were placed in input order instead of topological order.
    pub fallback_ordering: bool,
    /// Number of `requires`/`can_overlap_with` entries naming unknown steps.
    pub unresolved_references: usize,
    /// Number of steps whose start was pulled earlier by an overlap partner.
    pub relaxed_steps: usize,
    /// Set when the recipe could not be scheduled at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A recipe with its scheduled steps.
///
/// `envelope` carries the input record's identity and metadata fields
/// (`id`, `title`, `source_url`, ...) through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledRecipe {
    #[serde(flatten)]
    pub envelope: Map<String, Value>,
    pub steps: Vec<ScheduledStep>,
    pub total_time_min: Minutes,
    pub active_time_min: Minutes,
    #[serde(default)]
    pub critical_path: Vec<String>,
    #[serde(default)]
    pub diagnostics: ScheduleDiagnostics,
}

impl ScheduledRecipe {
    /// A record with no steps and zero totals, used when scheduling failed.
    pub fn empty(envelope: Map<String, Value>, error: Option<String>) -> Self {
        Self {
            envelope,
            steps: Vec::new(),
            total_time_min: 0,
            active_time_min: 0,
            critical_path: Vec::new(),
            diagnostics: ScheduleDiagnostics {
                error,
                ..Default::default()
            },
        }
    }

    /// Title for log messages, falling back to the recipe ID.
    pub fn display_name(&self) -> String {
        envelope_name(&self.envelope)
    }
}

/// An ingested recipe: normalized steps plus the pass-through envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeRecord {
    pub envelope: Map<String, Value>,
    pub steps: Vec<Step>,
    /// Warnings raised while normalizing each step, aligned with `steps`.
    pub notices: Vec<Vec<StepWarning>>,
}

impl RecipeRecord {
    pub fn display_name(&self) -> String {
        envelope_name(&self.envelope)
    }
}

pub(crate) fn envelope_name(envelope: &Map<String, Value>) -> String {
    ["title", "id"]
        .iter()
        .filter_map(|key| envelope.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "<untitled>".to_string())
}
