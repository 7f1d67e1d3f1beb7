//! Normalization of raw recipe records into [`RecipeRecord`]s.
//!
//! The step lists come from an upstream language-model parser and are loosely
//! typed. All defaulting happens here, once; later passes trust the schema.

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

use crate::config::ScheduleConfig;
use crate::error::IngestError;
use crate::models::{RecipeRecord, Step, StepWarning, COMPUTED_KEYS, MAX_DURATION_MINUTES};

/// Copy a record's pass-through fields, dropping keys the scheduler computes.
///
/// Non-object records yield an empty envelope.
pub fn envelope_of(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| !COMPUTED_KEYS.contains(&key.as_str()))
            .map(|(key, v)| (key.clone(), v.clone()))
            .collect(),
        _ => Map::new(),
    }
}

/// Ingest one recipe record.
///
/// A missing or null `steps` field is an empty recipe. Individual step fields
/// are defaulted with a warning rather than rejected.
pub fn ingest_recipe(value: &Value, config: &ScheduleConfig) -> Result<RecipeRecord, IngestError> {
    let Value::Object(map) = value else {
        return Err(IngestError::NotAnObject);
    };

    let raw_steps: &[Value] = match map.get("steps") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(_) => return Err(IngestError::StepsNotAList),
    };

    let mut steps = Vec::with_capacity(raw_steps.len());
    let mut notices = Vec::with_capacity(raw_steps.len());
    for (position, raw) in raw_steps.iter().enumerate() {
        let (step, warnings) = ingest_step(raw, position, config);
        steps.push(step);
        notices.push(warnings);
    }

    rename_duplicate_ids(&mut steps, &mut notices);

    Ok(RecipeRecord {
        envelope: envelope_of(value),
        steps,
        notices,
    })
}

/// Normalize one step. `position` is zero-based.
///
/// A bare string is accepted as the step's raw text. Any other non-object
/// value becomes a zero-length placeholder step so its neighbours still
/// schedule.
pub fn ingest_step(
    raw: &Value,
    position: usize,
    config: &ScheduleConfig,
) -> (Step, Vec<StepWarning>) {
    let empty = Map::new();
    let (fields, bare_text) = match raw {
        Value::Object(map) => (map, None),
        Value::String(text) => (&empty, Some(text.trim().to_string())),
        _ => {
            let step = Step::new(format!("step-{}", position + 1), 0)
                .with_label(format!("Step {}", position + 1));
            return (step, vec![StepWarning::MalformedStep(value_kind(raw))]);
        }
    };
    let mut warnings = Vec::new();

    let id = match fields.get("id").and_then(scalar_text) {
        Some(id) => id,
        None => {
            let placeholder = format!("step-{}", position + 1);
            warnings.push(StepWarning::MissingId(placeholder.clone()));
            placeholder
        }
    };

    let raw_text = bare_text
        .or_else(|| fields.get("raw_text").and_then(scalar_text))
        .unwrap_or_default();

    let label = match fields.get("label").and_then(scalar_text) {
        Some(label) => label,
        None => {
            warnings.push(StepWarning::MissingLabel);
            derive_label(&raw_text, position, config.label_max_chars)
        }
    };

    let step_type = fields
        .get("type")
        .and_then(scalar_text)
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());

    let estimated_duration_minutes = match fields
        .get("estimated_duration_minutes")
        .and_then(number_value)
    {
        Some(minutes) if minutes < 0 => {
            warnings.push(StepWarning::NegativeDuration(minutes));
            0
        }
        Some(minutes) => minutes.min(MAX_DURATION_MINUTES),
        None => {
            warnings.push(StepWarning::MissingDuration);
            0
        }
    };

    let step = Step {
        id,
        raw_text,
        label,
        step_type,
        estimated_duration_minutes,
        requires: id_list(fields.get("requires")),
        can_overlap_with: id_list(fields.get("can_overlap_with")),
        equipment: text_list(fields.get("equipment")),
        temperature_c: fields.get("temperature_c").and_then(number_value),
        notes: fields
            .get("notes")
            .and_then(scalar_text)
            .unwrap_or_default(),
    };
    (step, warnings)
}

/// Rename later occurrences of an already-used ID to `<id>~<n>`.
///
/// References keep pointing at the first occurrence.
fn rename_duplicate_ids(steps: &mut [Step], notices: &mut [Vec<StepWarning>]) {
    let mut taken: FxHashSet<String> = steps.iter().map(|s| s.id.clone()).collect();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for (step, warnings) in steps.iter_mut().zip(notices.iter_mut()) {
        if seen.insert(step.id.clone()) {
            continue;
        }
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}~{}", step.id, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(renamed.clone());
        seen.insert(renamed.clone());
        warnings.push(StepWarning::DuplicateId {
            original: std::mem::replace(&mut step.id, renamed.clone()),
            renamed,
        });
    }
}

fn derive_label(raw_text: &str, position: usize, max_chars: usize) -> String {
    let text = raw_text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return format!("Step {}", position + 1);
    }
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut label: String = text.chars().take(max_chars).collect();
    label = label.trim_end().to_string();
    label.push_str("...");
    label
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Non-empty trimmed text from a string or number.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Integer from a number (rounded) or numeric string.
fn number_value(value: &Value) -> Option<i64> {
    let float = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    float
        .is_finite()
        .then(|| float.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

/// Ordered, de-duplicated ID list. A single scalar counts as a one-item list.
fn id_list(value: Option<&Value>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in text_list(value) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(scalar) => scalar_text(scalar).into_iter().collect(),
        None => Vec::new(),
    }
}
