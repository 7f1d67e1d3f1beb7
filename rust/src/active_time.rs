//! Hands-on ("active") time aggregation.
//!
//! Active steps running side by side count once: their intervals are merged
//! before summing.

use crate::config::ScheduleConfig;
use crate::models::{Minutes, Step, StepKind, StepTiming};

/// Whether a step needs the cook's hands.
///
/// `prep` and `finish` are always active. `cook` is active unless its label
/// names a wait-like activity. Any other type is passive.
pub fn is_active(step: &Step, config: &ScheduleConfig) -> bool {
    match step.kind() {
        StepKind::Prep | StepKind::Finish => true,
        StepKind::Cook => !config.is_passive_label(&step.label),
        StepKind::Other => false,
    }
}

/// Merge `[start, end)` intervals. An interval starting at or before the
/// current merged end extends it. Empty intervals are dropped.
pub fn merge_intervals(mut intervals: Vec<(Minutes, Minutes)>) -> Vec<(Minutes, Minutes)> {
    intervals.retain(|&(start, end)| end > start);
    intervals.sort_unstable();

    let mut merged: Vec<(Minutes, Minutes)> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(current) if start <= current.1 => current.1 = current.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Sum of merged active intervals.
///
/// `timings` is indexed like `steps`.
pub fn active_time(steps: &[Step], timings: &[StepTiming], config: &ScheduleConfig) -> Minutes {
    let intervals = steps
        .iter()
        .zip(timings)
        .filter(|(step, _)| is_active(step, config))
        .map(|(_, timing)| (timing.start, timing.end))
        .collect();

    merge_intervals(intervals)
        .iter()
        .map(|(start, end)| end - start)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_step(label: &str, step_type: &str) -> Step {
        Step::new(label, 1).with_label(label).with_type(step_type)
    }

    fn timing(start: Minutes, end: Minutes) -> StepTiming {
        StepTiming {
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn test_classification() {
        let config = ScheduleConfig::default();
        assert!(is_active(&make_step("Dice onions", "prep"), &config));
        assert!(is_active(&make_step("Plate and serve", "finish"), &config));
        assert!(is_active(&make_step("Sear the steak", "cook"), &config));
        assert!(!is_active(&make_step("Let the meat REST", "cook"), &config));
        assert!(!is_active(&make_step("Simmer sauce", "cook"), &config));
        assert!(!is_active(&make_step("Bake until golden", "cook"), &config));
        assert!(!is_active(&make_step("Mystery", "unknown"), &config));
    }

    #[test]
    fn test_wait_terms_only_affect_cook_steps() {
        let config = ScheduleConfig::default();
        assert!(is_active(&make_step("Marinate: mix the marinade", "prep"), &config));
    }

    #[test]
    fn test_merge_overlapping_and_adjacent() {
        let merged = merge_intervals(vec![(5, 10), (0, 3), (3, 4), (8, 12), (20, 20)]);
        assert_eq!(merged, vec![(0, 4), (5, 12)]);
    }

    #[test]
    fn test_contained_interval() {
        assert_eq!(merge_intervals(vec![(0, 10), (2, 5)]), vec![(0, 10)]);
    }

    #[test]
    fn test_parallel_active_steps_count_once() {
        let config = ScheduleConfig::default();
        let steps = vec![
            make_step("Chop carrots", "prep"),
            make_step("Chop celery", "prep"),
            make_step("Braise", "cook"),
            make_step("Bake", "cook"),
        ];
        let timings = vec![timing(0, 10), timing(5, 12), timing(12, 20), timing(20, 60)];
        assert_eq!(active_time(&steps, &timings, &config), 20);
    }

    #[test]
    fn test_no_steps() {
        assert_eq!(active_time(&[], &[], &ScheduleConfig::default()), 0);
    }
}
