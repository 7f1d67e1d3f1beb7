//! Python bindings.
//!
//! Recipes cross the boundary as JSON text so the Python side can hand over
//! parser output as-is and get the scheduled records back in the same shape.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde_json::Value;

use crate::analysis::BatchSummary;
use crate::config::ScheduleConfig;
use crate::scheduler::TimelineScheduler;

fn load_config(config_json: Option<&str>) -> PyResult<ScheduleConfig> {
    match config_json {
        Some(text) => {
            ScheduleConfig::from_json_str(text).map_err(|e| PyValueError::new_err(e.to_string()))
        }
        None => Ok(ScheduleConfig::default()),
    }
}

fn parse_json(text: &str) -> PyResult<Value> {
    serde_json::from_str(text).map_err(|e| PyValueError::new_err(format!("invalid JSON: {}", e)))
}

fn parse_batch(text: &str) -> PyResult<Vec<Value>> {
    match parse_json(text)? {
        Value::Array(recipes) => Ok(recipes),
        _ => Err(PyValueError::new_err("expected a JSON array of recipes")),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Schedule one recipe record.
///
/// # Arguments
/// * `recipe_json` - The recipe record as a JSON object
/// * `config_json` - Optional JSON config; missing keys take their defaults
///
/// # Returns
/// * The scheduled recipe as a JSON object
///
/// # Raises
/// * ValueError if either argument is not valid JSON
#[pyfunction]
#[pyo3(signature = (recipe_json, config_json=None))]
fn schedule_recipe_json(
    py: Python<'_>,
    recipe_json: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let config = load_config(config_json)?;
    let recipe = parse_json(recipe_json)?;
    let scheduled = py.allow_threads(|| TimelineScheduler::new(config).schedule_recipe(&recipe));
    to_json(&scheduled)
}

/// Schedule a batch of recipe records, one output per input in order.
///
/// # Raises
/// * ValueError if `recipes_json` is not a JSON array or the config is invalid
#[pyfunction]
#[pyo3(signature = (recipes_json, config_json=None))]
fn schedule_recipes_json(
    py: Python<'_>,
    recipes_json: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let config = load_config(config_json)?;
    let recipes = parse_batch(recipes_json)?;
    let scheduled = py.allow_threads(|| TimelineScheduler::new(config).schedule_batch(&recipes));
    to_json(&scheduled)
}

/// Schedule a batch and return its quality summary as JSON.
#[pyfunction]
#[pyo3(signature = (recipes_json, config_json=None))]
fn analyze_recipes_json(
    py: Python<'_>,
    recipes_json: &str,
    config_json: Option<&str>,
) -> PyResult<String> {
    let config = load_config(config_json)?;
    let recipes = parse_batch(recipes_json)?;
    let summary = py.allow_threads(|| {
        let scheduled = TimelineScheduler::new(config).schedule_batch(&recipes);
        BatchSummary::from_recipes(&scheduled)
    });
    to_json(&summary)
}

/// The recipe_timeline Python module.
#[pymodule]
fn recipe_timeline(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(schedule_recipe_json, m)?)?;
    m.add_function(wrap_pyfunction!(schedule_recipes_json, m)?)?;
    m.add_function(wrap_pyfunction!(analyze_recipes_json, m)?)?;
    Ok(())
}
