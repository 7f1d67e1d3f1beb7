//! Topological ordering and earliest-time computation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::DependencyGraph;
use crate::interner::StepIdx;
use crate::models::{StepTiming, StepWarning};

/// Processing order of the steps of one recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologicalOrder {
    /// Every step exactly once: the topologically sorted prefix followed by
    /// the fallback steps.
    pub order: Vec<StepIdx>,
    /// Steps Kahn's algorithm could not consume (on or behind a cycle),
    /// appended to `order` in input order.
    pub fallback: Vec<StepIdx>,
}

impl TopologicalOrder {
    /// True when the ordering guarantee does not hold for every step.
    pub fn is_degraded(&self) -> bool {
        !self.fallback.is_empty()
    }
}

/// Sort steps with Kahn's algorithm.
///
/// Among steps that are ready at the same time the one with the lowest input
/// position goes first, so identical input always gives identical order.
/// Steps left over because of a cycle are appended in input order.
pub fn topological_order(graph: &DependencyGraph) -> TopologicalOrder {
    let n = graph.len();
    let mut in_degree = graph.in_degree.clone();

    let mut ready: BinaryHeap<Reverse<StepIdx>> = (0..n as StepIdx)
        .filter(|&idx| in_degree[idx as usize] == 0)
        .map(Reverse)
        .collect();

    let mut order: Vec<StepIdx> = Vec::with_capacity(n);
    let mut consumed = vec![false; n];

    while let Some(Reverse(idx)) = ready.pop() {
        order.push(idx);
        consumed[idx as usize] = true;

        for &dependent in &graph.enables[idx as usize] {
            let degree = &mut in_degree[dependent as usize];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    let fallback: Vec<StepIdx> = (0..n as StepIdx)
        .filter(|&idx| !consumed[idx as usize])
        .collect();
    order.extend_from_slice(&fallback);

    TopologicalOrder { order, fallback }
}

/// Result of the forward pass.
#[derive(Debug, Clone, Default)]
pub struct ForwardPass {
    /// Timings indexed by step position; only `start` and `end` are set.
    pub timings: Vec<StepTiming>,
    /// Whether every declared dependency of the step finished before it started.
    pub dependencies_met: Vec<bool>,
}

/// Compute earliest start and end times in topological order.
///
/// `start = max(0, end of every valid dependency already scheduled)`. In
/// fallback order a dependency may not be scheduled yet; it is skipped and an
/// [`StepWarning::UnresolvedDependency`] is recorded. A step with a reference
/// to an unknown step never has its dependencies met.
pub fn forward_pass(
    graph: &DependencyGraph,
    order: &TopologicalOrder,
    warnings: &mut [Vec<StepWarning>],
) -> ForwardPass {
    let n = graph.len();
    let mut timings = vec![StepTiming::default(); n];
    let mut scheduled = vec![false; n];
    let mut dependencies_met = vec![true; n];

    for &idx in &order.order {
        let i = idx as usize;
        let mut start = 0;

        for &dep in &graph.requires[i] {
            if scheduled[dep as usize] {
                start = start.max(timings[dep as usize].end);
            } else {
                dependencies_met[i] = false;
                warnings[i].push(StepWarning::UnresolvedDependency(
                    graph.id(dep).to_string(),
                ));
            }
        }

        if warnings[i]
            .iter()
            .any(|w| matches!(w, StepWarning::MissingDependency(_)))
        {
            dependencies_met[i] = false;
        }

        timings[i].start = start;
        timings[i].end = start + graph.durations[i];
        scheduled[i] = true;
    }

    ForwardPass {
        timings,
        dependencies_met,
    }
}
