//! Recipe scheduling pipeline.
//!
//! Builder → cycle detector → forward pass → overlap relaxation → backward
//! pass → active time. Each recipe runs the passes strictly in sequence; a
//! batch may run recipes in parallel since nothing is shared between them.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use serde_json::Value;

use crate::active_time::active_time;
use crate::backward_pass::{backward_pass, critical_path, horizon};
use crate::config::ScheduleConfig;
use crate::cycles::find_cycles;
use crate::forward_pass::{forward_pass, topological_order};
use crate::graph::DependencyGraph;
use crate::ingest::{envelope_of, ingest_recipe};
use crate::interner::StepIdx;
use crate::models::{
    Minutes, RecipeRecord, ScheduleDiagnostics, ScheduledRecipe, ScheduledStep, Step, StepWarning,
};
use crate::overlap::relax_overlaps;
use crate::{log_changes, log_checks};

/// Timeline computed for one step list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepSchedule {
    pub steps: Vec<ScheduledStep>,
    pub total_time_min: Minutes,
    pub active_time_min: Minutes,
    /// IDs of the critical steps ordered by start time.
    pub critical_path: Vec<String>,
    pub diagnostics: ScheduleDiagnostics,
}

/// Stateless scheduler; one value can serve any number of threads.
#[derive(Clone, Debug, Default)]
pub struct TimelineScheduler {
    config: ScheduleConfig,
}

impl TimelineScheduler {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Schedule an already-normalized step list.
    pub fn schedule_steps(&self, steps: &[Step]) -> StepSchedule {
        self.run_passes(steps, &[])
    }

    /// Schedule an ingested recipe, carrying its envelope through.
    pub fn schedule_record(&self, record: &RecipeRecord) -> ScheduledRecipe {
        let schedule = self.run_passes(&record.steps, &record.notices);
        let recipe = ScheduledRecipe {
            envelope: record.envelope.clone(),
            steps: schedule.steps,
            total_time_min: schedule.total_time_min,
            active_time_min: schedule.active_time_min,
            critical_path: schedule.critical_path,
            diagnostics: schedule.diagnostics,
        };
        log_changes!(
            self.config.verbosity,
            "Scheduled {}: {} min total, {} min active",
            recipe.display_name(),
            recipe.total_time_min,
            recipe.active_time_min
        );
        recipe
    }

    /// Schedule one raw recipe record. Never fails: a record that cannot be
    /// ingested, or a fault while scheduling it, yields an empty schedule with
    /// `diagnostics.error` set.
    pub fn schedule_recipe(&self, recipe: &Value) -> ScheduledRecipe {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            ingest_recipe(recipe, &self.config).map(|record| self.schedule_record(&record))
        }));

        let message = match outcome {
            Ok(Ok(scheduled)) => return scheduled,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        let envelope = envelope_of(recipe);
        let failed = ScheduledRecipe::empty(envelope, Some(message));
        tracing::error!(
            recipe = %failed.display_name(),
            error = failed.diagnostics.error.as_deref().unwrap_or_default(),
            "failed to schedule recipe"
        );
        failed
    }

    /// Schedule a batch, one output per input in the same order.
    pub fn schedule_batch(&self, recipes: &[Value]) -> Vec<ScheduledRecipe> {
        if self.config.parallel_batch {
            recipes.par_iter().map(|r| self.schedule_recipe(r)).collect()
        } else {
            recipes.iter().map(|r| self.schedule_recipe(r)).collect()
        }
    }

    fn run_passes(&self, steps: &[Step], notices: &[Vec<StepWarning>]) -> StepSchedule {
        if steps.is_empty() {
            return StepSchedule::default();
        }
        let verbosity = self.config.verbosity;

        let mut graph = DependencyGraph::build(steps);
        let mut warnings: Vec<Vec<StepWarning>> = (0..steps.len())
            .map(|i| {
                let mut list = notices.get(i).cloned().unwrap_or_default();
                list.append(&mut graph.warnings[i]);
                list
            })
            .collect();
        for (i, list) in warnings.iter().enumerate() {
            for warning in list {
                log_checks!(verbosity, "step {}: {}", graph.id(i as StepIdx), warning);
            }
        }

        let cycles = find_cycles(&graph);
        let cycle_ids: Vec<Vec<String>> = cycles
            .iter()
            .map(|cycle| graph.index.resolve_all(cycle))
            .collect();
        for (cycle, ids) in cycles.iter().zip(&cycle_ids) {
            for &idx in cycle {
                warnings[idx as usize].push(StepWarning::InCycle(ids.clone()));
            }
        }

        let order = topological_order(&graph);
        if order.is_degraded() {
            tracing::warn!(
                steps = order.fallback.len(),
                cycles = ?cycle_ids,
                "dependency cycle: scheduling affected steps in input order"
            );
            for &idx in &order.fallback {
                warnings[idx as usize].push(StepWarning::FallbackOrdering);
            }
        }

        let forward = forward_pass(&graph, &order, &mut warnings);
        let mut timings = forward.timings;

        let relaxed = relax_overlaps(
            &graph,
            &order.order,
            &mut timings,
            self.config.strict_overlap,
            verbosity,
        );

        backward_pass(&graph, &order.order, &mut timings, verbosity);

        let total_time_min = horizon(&timings);
        let active_time_min = active_time(steps, &timings, &self.config);
        let critical_path = graph.index.resolve_all(&critical_path(&timings));

        let scheduled = steps
            .iter()
            .zip(&timings)
            .zip(forward.dependencies_met)
            .zip(warnings)
            .map(|(((step, timing), dependencies_met), warnings)| ScheduledStep {
                step: step.clone(),
                duration_min: timing.end - timing.start,
                start_min: timing.start,
                end_min: timing.end,
                latest_start_min: timing.latest_start,
                latest_end_min: timing.latest_end,
                slack_min: timing.slack,
                is_critical: timing.is_critical(),
                dependencies_met,
                warnings: warnings.iter().map(ToString::to_string).collect(),
            })
            .collect();

        StepSchedule {
            steps: scheduled,
            total_time_min,
            active_time_min,
            critical_path,
            diagnostics: ScheduleDiagnostics {
                cycles: cycle_ids,
                fallback_ordering: order.is_degraded(),
                unresolved_references: graph.unresolved_references,
                relaxed_steps: relaxed,
                error: None,
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("internal error: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("internal error: {}", s)
    } else {
        "internal error".to_string()
    }
}
