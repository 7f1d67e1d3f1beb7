//! Quality summary over a batch of scheduled recipes.
//!
//! Surfaces upstream parsing problems: recipes without steps, references to
//! unknown steps, cycles, zero-duration steps, and unusual critical/active
//! ratios.

use serde::Serialize;
use std::fmt;

use crate::forward_pass::topological_order;
use crate::graph::DependencyGraph;
use crate::models::{Minutes, ScheduledRecipe, Step};

/// Dependency chains longer than this many steps are counted as long.
pub const LONG_CHAIN_THRESHOLD: usize = 3;

/// Aggregate statistics for a batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_recipes: usize,
    pub recipes_with_steps: usize,
    pub recipes_without_steps: usize,
    pub failed_recipes: usize,
    pub total_steps: usize,
    pub steps_with_dependencies: usize,
    pub unresolved_references: usize,
    pub recipes_with_cycles: usize,
    pub zero_duration_steps: usize,
    /// Steps whose longest dependency chain exceeds [`LONG_CHAIN_THRESHOLD`].
    pub long_chain_steps: usize,
    pub longest_chain: usize,
    pub average_total_time_min: Option<f64>,
    pub min_nonzero_total_time_min: Option<Minutes>,
    pub max_total_time_min: Option<Minutes>,
    /// Mean share of critical steps per scheduled recipe.
    pub average_critical_ratio: Option<f64>,
    /// Mean of active time / total time over recipes with a non-zero total.
    pub average_active_ratio: Option<f64>,
}

impl BatchSummary {
    pub fn from_recipes(recipes: &[ScheduledRecipe]) -> Self {
        let mut summary = Self {
            total_recipes: recipes.len(),
            ..Default::default()
        };
        let mut totals: Vec<Minutes> = Vec::new();
        let mut critical_ratios: Vec<f64> = Vec::new();
        let mut active_ratios: Vec<f64> = Vec::new();

        for recipe in recipes {
            if recipe.diagnostics.error.is_some() {
                summary.failed_recipes += 1;
            }
            if !recipe.diagnostics.cycles.is_empty() {
                summary.recipes_with_cycles += 1;
            }
            summary.unresolved_references += recipe.diagnostics.unresolved_references;

            if recipe.steps.is_empty() {
                summary.recipes_without_steps += 1;
                continue;
            }
            summary.recipes_with_steps += 1;
            summary.total_steps += recipe.steps.len();
            totals.push(recipe.total_time_min);

            let steps: Vec<Step> = recipe.steps.iter().map(|s| s.step.clone()).collect();
            summary.steps_with_dependencies += steps.iter().filter(|s| !s.requires.is_empty()).count();
            summary.zero_duration_steps += recipe.steps.iter().filter(|s| s.duration_min == 0).count();

            for depth in chain_lengths(&steps) {
                summary.longest_chain = summary.longest_chain.max(depth);
                if depth > LONG_CHAIN_THRESHOLD {
                    summary.long_chain_steps += 1;
                }
            }

            let critical = recipe.steps.iter().filter(|s| s.is_critical).count();
            critical_ratios.push(critical as f64 / recipe.steps.len() as f64);
            if recipe.total_time_min > 0 {
                active_ratios.push(recipe.active_time_min as f64 / recipe.total_time_min as f64);
            }
        }

        summary.average_total_time_min = mean(totals.iter().map(|&t| t as f64));
        summary.min_nonzero_total_time_min = totals.iter().copied().filter(|&t| t > 0).min();
        summary.max_total_time_min = totals.iter().copied().max();
        summary.average_critical_ratio = mean(critical_ratios.into_iter());
        summary.average_active_ratio = mean(active_ratios.into_iter());
        summary
    }

    /// Hints about likely upstream problems.
    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut hints = Vec::new();
        if self.recipes_without_steps > self.recipes_with_steps {
            hints.push("most recipes have no parsed steps - check the step parser");
        }
        if self.unresolved_references > 0 {
            hints.push("some steps reference unknown step ids - validate parser output");
        }
        if self.recipes_with_cycles > 0 {
            hints.push("some recipes contain dependency cycles - their order is degraded");
        }
        if self.zero_duration_steps > 0 {
            hints.push("some steps have zero duration - check duration extraction");
        }
        if self.failed_recipes > 0 {
            hints.push("some recipe records could not be scheduled - see diagnostics.error");
        }
        hints
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total recipes: {}", self.total_recipes)?;
        writeln!(f, "  With steps: {}", self.recipes_with_steps)?;
        writeln!(f, "  Without steps: {}", self.recipes_without_steps)?;
        writeln!(f, "  Failed: {}", self.failed_recipes)?;
        writeln!(f, "Total steps: {}", self.total_steps)?;
        writeln!(f, "Steps with dependencies: {}", self.steps_with_dependencies)?;
        writeln!(f, "Unresolved references: {}", self.unresolved_references)?;
        writeln!(f, "Recipes with cycles: {}", self.recipes_with_cycles)?;
        writeln!(
            f,
            "Longest dependency chain: {} ({} steps longer than {})",
            self.longest_chain, self.long_chain_steps, LONG_CHAIN_THRESHOLD
        )?;
        if let (Some(avg), Some(max)) = (self.average_total_time_min, self.max_total_time_min) {
            writeln!(f, "Timing:")?;
            writeln!(f, "  Average total time: {:.1} min", avg)?;
            writeln!(f, "  Max time: {} min", max)?;
            writeln!(
                f,
                "  Min time (non-zero): {} min",
                self.min_nonzero_total_time_min.unwrap_or(0)
            )?;
        }
        if let Some(ratio) = self.average_critical_ratio {
            writeln!(f, "Average critical path ratio: {:.2}%", ratio * 100.0)?;
        }
        if let Some(ratio) = self.average_active_ratio {
            writeln!(f, "Average active time ratio: {:.2}%", ratio * 100.0)?;
        }
        writeln!(f, "Zero duration steps: {}", self.zero_duration_steps)?;
        for hint in self.recommendations() {
            writeln!(f, "! {}", hint)?;
        }
        Ok(())
    }
}

/// Longest chain of valid dependencies ending at each step, counted in steps.
///
/// Steps on a cycle count only the dependencies already visited in fallback
/// order, so the result is finite.
fn chain_lengths(steps: &[Step]) -> Vec<usize> {
    let graph = DependencyGraph::build(steps);
    let order = topological_order(&graph);
    let mut depth = vec![0usize; graph.len()];
    for &idx in &order.order {
        let i = idx as usize;
        depth[i] = 1 + graph.requires[i]
            .iter()
            .map(|&dep| depth[dep as usize])
            .max()
            .unwrap_or(0);
    }
    depth
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::scheduler::TimelineScheduler;
    use serde_json::json;

    fn schedule(recipes: serde_json::Value) -> Vec<ScheduledRecipe> {
        let recipes = recipes.as_array().cloned().unwrap_or_default();
        TimelineScheduler::new(ScheduleConfig::default()).schedule_batch(&recipes)
    }

    #[test]
    fn test_chain_lengths() {
        let steps = vec![
            Step::new("a", 1),
            Step::new("b", 1).requiring(["a"]),
            Step::new("c", 1).requiring(["b"]),
            Step::new("d", 1).requiring(["c", "a"]),
            Step::new("e", 1),
        ];
        assert_eq!(chain_lengths(&steps), vec![1, 2, 3, 4, 1]);
    }

    #[test]
    fn test_chain_lengths_with_cycle_terminate() {
        let steps = vec![
            Step::new("a", 1).requiring(["b"]),
            Step::new("b", 1).requiring(["a"]),
        ];
        assert_eq!(chain_lengths(&steps), vec![1, 2]);
    }

    #[test]
    fn test_summary() {
        let recipes = schedule(json!([
            {"id": "r1", "steps": [
                {"id": "a", "label": "Chop", "type": "prep", "estimated_duration_minutes": 10},
                {"id": "b", "label": "Bake", "type": "cook", "estimated_duration_minutes": 30, "requires": ["a", "zzz"]}
            ]},
            {"id": "r2", "steps": []},
            {"id": "r3", "steps": [
                {"id": "x", "label": "Serve", "type": "finish", "estimated_duration_minutes": 0}
            ]},
            "not a recipe"
        ]));
        let summary = BatchSummary::from_recipes(&recipes);

        assert_eq!(summary.total_recipes, 4);
        assert_eq!(summary.recipes_with_steps, 2);
        assert_eq!(summary.recipes_without_steps, 2);
        assert_eq!(summary.failed_recipes, 1);
        assert_eq!(summary.total_steps, 3);
        assert_eq!(summary.steps_with_dependencies, 1);
        assert_eq!(summary.unresolved_references, 1);
        assert_eq!(summary.zero_duration_steps, 1);
        assert_eq!(summary.longest_chain, 2);
        assert_eq!(summary.max_total_time_min, Some(40));
        assert_eq!(summary.min_nonzero_total_time_min, Some(40));
        assert_eq!(summary.average_total_time_min, Some(20.0));
        assert_eq!(summary.average_critical_ratio, Some(1.0));
        // r1: 10 active of 40
        assert_eq!(summary.average_active_ratio, Some(0.25));

        let hints = summary.recommendations();
        assert!(hints.iter().any(|h| h.contains("unknown step ids")));
        assert!(hints.iter().any(|h| h.contains("zero duration")));
        assert!(summary.to_string().contains("Total recipes: 4"));
    }

    #[test]
    fn test_empty_batch() {
        let summary = BatchSummary::from_recipes(&[]);
        assert_eq!(summary.average_total_time_min, None);
        assert!(summary.recommendations().is_empty());
    }
}
