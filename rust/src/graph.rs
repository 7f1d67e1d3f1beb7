//! Dependency graph construction.
//!
//! Turns a flat step list into position-indexed adjacency lists. References
//! to unknown steps are dropped here and recorded as warnings, so no later
//! pass ever sees a dangling edge.

use crate::interner::{StepIdx, StepIndex};
use crate::models::{Minutes, Step, StepWarning};

/// Adjacency structure over the steps of one recipe.
///
/// Node `i` is the step at input position `i`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Step ID <-> position mapping.
    pub index: StepIndex,
    /// Valid `requires` edges per step (dependencies), in declaration order.
    pub requires: Vec<Vec<StepIdx>>,
    /// Reverse of `requires`: the steps each step enables (dependents).
    pub enables: Vec<Vec<StepIdx>>,
    /// Number of valid dependencies per step.
    pub in_degree: Vec<usize>,
    /// Valid `can_overlap_with` partners per step.
    pub overlaps: Vec<Vec<StepIdx>>,
    /// Step durations, clamped to zero.
    pub durations: Vec<Minutes>,
    /// Per-step warnings raised while building.
    pub warnings: Vec<Vec<StepWarning>>,
    /// Number of references to unknown steps.
    pub unresolved_references: usize,
}

impl DependencyGraph {
    /// Build the graph for one recipe's steps.
    pub fn build(steps: &[Step]) -> Self {
        let n = steps.len();
        let mut index = StepIndex::with_capacity(n);
        let mut warnings: Vec<Vec<StepWarning>> = vec![Vec::new(); n];

        for (i, step) in steps.iter().enumerate() {
            let (_, fresh) = index.insert(&step.id);
            if !fresh {
                warnings[i].push(StepWarning::ShadowedId(step.id.clone()));
            }
        }

        let mut requires: Vec<Vec<StepIdx>> = vec![Vec::new(); n];
        let mut enables: Vec<Vec<StepIdx>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        let mut overlaps: Vec<Vec<StepIdx>> = vec![Vec::new(); n];
        let mut unresolved_references = 0;

        for (i, step) in steps.iter().enumerate() {
            let idx = i as StepIdx;

            for dep_id in &step.requires {
                match index.get(dep_id) {
                    Some(dep) if !requires[i].contains(&dep) => {
                        requires[i].push(dep);
                        enables[dep as usize].push(idx);
                        in_degree[i] += 1;
                    }
                    Some(_) => {}
                    None => {
                        unresolved_references += 1;
                        warnings[i].push(StepWarning::MissingDependency(dep_id.clone()));
                    }
                }
            }

            for partner_id in &step.can_overlap_with {
                match index.get(partner_id) {
                    Some(partner) if partner != idx && !overlaps[i].contains(&partner) => {
                        overlaps[i].push(partner);
                    }
                    Some(_) => {}
                    None => {
                        unresolved_references += 1;
                        warnings[i].push(StepWarning::MissingOverlapPartner(partner_id.clone()));
                    }
                }
            }
        }

        Self {
            index,
            requires,
            enables,
            in_degree,
            overlaps,
            durations: steps.iter().map(Step::duration).collect(),
            warnings,
            unresolved_references,
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.requires.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
    }

    /// Whether `a` requires `b` or `b` requires `a`.
    pub fn has_edge_between(&self, a: StepIdx, b: StepIdx) -> bool {
        self.requires[a as usize].contains(&b) || self.requires[b as usize].contains(&a)
    }

    /// Whether `a` and `b` each list the other in `can_overlap_with`.
    pub fn mutually_overlapping(&self, a: StepIdx, b: StepIdx) -> bool {
        self.overlaps[a as usize].contains(&b) && self.overlaps[b as usize].contains(&a)
    }

    /// Whether the step has no dependents.
    pub fn is_terminal(&self, idx: StepIdx) -> bool {
        self.enables[idx as usize].is_empty()
    }

    /// ID of the step at a position (empty for out-of-range positions).
    pub fn id(&self, idx: StepIdx) -> &str {
        self.index.resolve(idx).unwrap_or_default()
    }
}
