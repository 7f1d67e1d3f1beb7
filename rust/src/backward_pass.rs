//! Backward pass: latest times, slack and the critical path.

use crate::graph::DependencyGraph;
use crate::interner::StepIdx;
use crate::log_debug;
use crate::models::{Minutes, StepTiming};

/// Project horizon: the latest end of any step, 0 for an empty recipe.
pub fn horizon(timings: &[StepTiming]) -> Minutes {
    timings.iter().map(|t| t.end).max().unwrap_or(0)
}

/// Compute latest start/end and slack for every step.
///
/// Terminal steps (no dependents) get `latest_end = end`: no slack is invented
/// at a sink. Every other step starts at the horizon and, in reverse `order`,
/// takes the minimum latest start of its dependents, but never less than its
/// own end. A dependent pulled earlier by overlap relaxation can start before
/// its dependency ends; the dependency then simply has no slack.
///
/// `timings` must hold final start/end values (after overlap relaxation).
pub fn backward_pass(
    graph: &DependencyGraph,
    order: &[StepIdx],
    timings: &mut [StepTiming],
    verbosity: u8,
) {
    let horizon = horizon(timings);

    for (i, timing) in timings.iter_mut().enumerate() {
        timing.latest_end = if graph.is_terminal(i as StepIdx) {
            timing.end
        } else {
            horizon
        };
        timing.latest_start = timing.latest_end - graph.durations[i];
    }

    for &idx in order.iter().rev() {
        let i = idx as usize;
        let dependents = &graph.enables[i];
        if dependents.is_empty() {
            continue;
        }

        // Find minimum latest_start of all steps that depend on this one
        let latest_end = dependents
            .iter()
            .map(|&d| timings[d as usize].latest_start)
            .min()
            .unwrap_or(horizon)
            .max(timings[i].end);

        timings[i].latest_end = latest_end;
        timings[i].latest_start = latest_end - graph.durations[i];
    }

    for (i, timing) in timings.iter_mut().enumerate() {
        timing.slack = (timing.latest_start - timing.start).max(0);
        log_debug!(
            verbosity,
            "{}: start={} end={} latest_start={} latest_end={} slack={}",
            graph.id(i as StepIdx),
            timing.start,
            timing.end,
            timing.latest_start,
            timing.latest_end,
            timing.slack
        );
    }
}

/// Critical steps ordered by start time, ties broken by input position.
pub fn critical_path(timings: &[StepTiming]) -> Vec<StepIdx> {
    let mut path: Vec<StepIdx> = (0..timings.len() as StepIdx)
        .filter(|&idx| timings[idx as usize].is_critical())
        .collect();
    path.sort_by_key(|&idx| (timings[idx as usize].start, idx));
    path
}
