//! Parallel-overlap relaxation.
//!
//! A step that declares `can_overlap_with` a partner may start as early as the
//! partner does. Relaxation only ever moves a step earlier and is never applied
//! between two steps joined by a `requires` edge in either direction.

use crate::graph::DependencyGraph;
use crate::interner::StepIdx;
use crate::log_checks;
use crate::models::{Minutes, StepTiming};

/// Pull overlap-compatible steps earlier, visiting steps in `order`.
///
/// A step moves to `min(start, partner.start)`. With `strict` set, the new
/// start is additionally floored at the latest end of the step's own
/// dependencies, except dependencies the step mutually overlaps with; a step
/// whose partner starts before that floor is pulled only as far as the floor.
/// Without `strict`, only the direct edge between the two partners is guarded.
///
/// Returns the number of steps whose start moved.
pub fn relax_overlaps(
    graph: &DependencyGraph,
    order: &[StepIdx],
    timings: &mut [StepTiming],
    strict: bool,
    verbosity: u8,
) -> usize {
    let mut relaxed = 0;

    for &idx in order {
        let i = idx as usize;
        if graph.overlaps[i].is_empty() {
            continue;
        }

        let floor = if strict {
            dependency_floor(graph, idx, timings)
        } else {
            0
        };
        let original_start = timings[i].start;

        for &partner in &graph.overlaps[i] {
            if graph.has_edge_between(idx, partner) {
                log_checks!(
                    verbosity,
                    "overlap {} ~ {} ignored: steps are dependent",
                    graph.id(idx),
                    graph.id(partner)
                );
                continue;
            }
            let candidate = timings[partner as usize].start.max(floor);
            if candidate < timings[i].start {
                timings[i].start = candidate;
                timings[i].end = candidate + graph.durations[i];
            }
        }

        if timings[i].start < original_start {
            relaxed += 1;
            log_checks!(
                verbosity,
                "overlap moved {} from {} to {}",
                graph.id(idx),
                original_start,
                timings[i].start
            );
        }
    }

    relaxed
}

/// Latest end among the step's dependencies, ignoring dependencies it
/// mutually overlaps with.
fn dependency_floor(graph: &DependencyGraph, idx: StepIdx, timings: &[StepTiming]) -> Minutes {
    graph.requires[idx as usize]
        .iter()
        .filter(|&&dep| !graph.mutually_overlapping(idx, dep))
        .map(|&dep| timings[dep as usize].end)
        .max()
        .unwrap_or(0)
}
