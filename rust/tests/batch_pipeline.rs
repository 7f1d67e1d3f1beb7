use recipe_timeline::{BatchSummary, ScheduleConfig, ScheduledRecipe, TimelineScheduler};
use serde_json::{json, Value};

fn pasta_recipe() -> Value {
    json!({
        "id": "r-101",
        "title": "Weeknight Tomato Pasta",
        "source_url": "https://example.org/pasta",
        "week_label": "2024-W18",
        "category": "dinner",
        "ingredients": ["spaghetti", "onion", "tomatoes"],
        "nutrition": {"kcal": 640},
        "total_time_min": 999,
        "steps": [
            {"id": "s1", "label": "Bring water to a boil", "type": "cook",
             "estimated_duration_minutes": 10, "equipment": ["large pot"]},
            {"id": "s2", "label": "Dice the onion", "type": "prep",
             "estimated_duration_minutes": 5},
            {"id": "s3", "label": "Saute the onion", "type": "cook",
             "estimated_duration_minutes": 6, "requires": ["s2"], "can_overlap_with": ["s1"]},
            {"id": "s4", "label": "Simmer the sauce", "type": "cook",
             "estimated_duration_minutes": 15, "requires": ["s3"], "temperature_c": 95},
            {"id": "s5", "label": "Cook pasta until al dente", "type": "cook",
             "estimated_duration_minutes": 10, "requires": ["s1"]},
            {"id": "s6", "label": "Toss and serve", "type": "finish",
             "estimated_duration_minutes": 2, "requires": ["s4", "s5"]}
        ]
    })
}

fn scheduler() -> TimelineScheduler {
    TimelineScheduler::new(ScheduleConfig::default())
}

#[test]
fn test_full_recipe_timeline() {
    let recipe = scheduler().schedule_recipe(&pasta_recipe());

    let spans: Vec<(i64, i64, i64)> = recipe
        .steps
        .iter()
        .map(|s| (s.start_min, s.end_min, s.slack_min))
        .collect();
    assert_eq!(
        spans,
        vec![(0, 10, 6), (0, 5, 0), (5, 11, 0), (11, 26, 0), (10, 20, 6), (26, 28, 0)]
    );
    assert_eq!(recipe.total_time_min, 28);
    // Simmering is hands-off; the rest merges to [0, 20) and [26, 28).
    assert_eq!(recipe.active_time_min, 22);
    assert_eq!(recipe.critical_path, vec!["s2", "s3", "s4", "s6"]);
    assert!(recipe.steps.iter().all(|s| s.dependencies_met));
    assert!(recipe.steps.iter().all(|s| s.warnings.is_empty()));
    assert!(!recipe.diagnostics.fallback_ordering);
}

#[test]
fn test_output_json_contract() {
    let recipe = scheduler().schedule_recipe(&pasta_recipe());
    let value = serde_json::to_value(&recipe).unwrap();

    for key in ["id", "title", "source_url", "week_label", "category"] {
        assert_eq!(value[key], pasta_recipe()[key], "envelope field {}", key);
    }
    assert_eq!(value["ingredients"], json!(["spaghetti", "onion", "tomatoes"]));
    assert_eq!(value["nutrition"], json!({"kcal": 640}));
    // Stale computed fields in the input are replaced.
    assert_eq!(value["total_time_min"], json!(28));
    assert_eq!(value["active_time_min"], json!(22));

    let step = &value["steps"][3];
    assert_eq!(step["id"], json!("s4"));
    assert_eq!(step["type"], json!("cook"));
    assert_eq!(step["temperature_c"], json!(95));
    assert_eq!(step["requires"], json!(["s3"]));
    assert_eq!(step["duration_min"], json!(15));
    assert_eq!(step["start_min"], json!(11));
    assert_eq!(step["end_min"], json!(26));
    assert_eq!(step["latest_start_min"], json!(11));
    assert_eq!(step["latest_end_min"], json!(26));
    assert_eq!(step["slack_min"], json!(0));
    assert_eq!(step["is_critical"], json!(true));
    assert_eq!(step["dependencies_met"], json!(true));
    assert_eq!(step["warnings"], json!([]));
    assert_eq!(value["steps"][0]["equipment"], json!(["large pot"]));

    assert_eq!(value["diagnostics"]["fallback_ordering"], json!(false));
    assert!(value["diagnostics"].get("error").is_none());

    let back: ScheduledRecipe = serde_json::from_value(value).unwrap();
    assert_eq!(back, recipe);
}

#[test]
fn test_loosely_typed_steps_are_defaulted() {
    let recipe = scheduler().schedule_recipe(&json!({
        "id": 7,
        "steps": [
            {"raw_text": "Let the dough rest for about an hour before shaping it into rolls", "type": "COOK"},
            {"id": "shape", "label": "Shape rolls", "type": "prep",
             "estimated_duration_minutes": "12.6", "requires": "step-1"},
            "Brush with egg wash"
        ]
    }));

    let first = &recipe.steps[0];
    assert_eq!(first.step.id, "step-1");
    assert_eq!(first.step.step_type, "cook");
    assert!(first.step.label.starts_with("Let the dough rest"));
    assert!(first.step.label.ends_with("..."));
    assert_eq!(first.duration_min, 0);
    assert!(first.warnings.iter().any(|w| w.contains("missing duration")));

    let second = &recipe.steps[1];
    assert_eq!(second.duration_min, 13);
    assert_eq!(second.step.requires, vec!["step-1"]);
    assert!(second.dependencies_met);

    let third = &recipe.steps[2];
    assert_eq!(third.step.id, "step-3");
    assert_eq!(third.step.raw_text, "Brush with egg wash");
    assert_eq!(third.step.label, "Brush with egg wash");
    assert_eq!(third.step.step_type, "unknown");

    assert_eq!(recipe.envelope["id"], json!(7));
}

#[test]
fn test_duplicate_ids_are_renamed() {
    let recipe = scheduler().schedule_recipe(&json!({
        "id": "dup",
        "steps": [
            {"id": "s1", "label": "Chop", "type": "prep", "estimated_duration_minutes": 4},
            {"id": "s1", "label": "Chop again", "type": "prep", "estimated_duration_minutes": 6},
            {"id": "s2", "label": "Fry", "type": "cook", "estimated_duration_minutes": 3, "requires": ["s1"]}
        ]
    }));

    assert_eq!(recipe.steps[1].step.id, "s1~2");
    assert!(recipe.steps[1].warnings[0].contains("renamed to 's1~2'"));
    // References resolve to the first occurrence.
    assert_eq!(recipe.steps[2].start_min, 4);
}

#[test]
fn test_cycle_is_reported_not_fatal() {
    let recipe = scheduler().schedule_recipe(&json!({
        "id": "loop",
        "steps": [
            {"id": "a", "label": "Whisk", "type": "prep", "estimated_duration_minutes": 5, "requires": ["b"]},
            {"id": "b", "label": "Fold", "type": "prep", "estimated_duration_minutes": 3, "requires": ["a"]},
            {"id": "c", "label": "Serve", "type": "finish", "estimated_duration_minutes": 1, "requires": ["b"]}
        ]
    }));

    assert_eq!(recipe.steps.len(), 3);
    assert!(recipe.diagnostics.fallback_ordering);
    assert_eq!(recipe.diagnostics.cycles, vec![vec!["a", "b"]]);
    for step in &recipe.steps {
        assert!(step.start_min >= 0);
        assert_eq!(step.end_min - step.start_min, step.duration_min);
        assert!(step.slack_min >= 0);
    }
    assert!(recipe.steps[0].warnings.iter().any(|w| w.contains("cycle")));
    assert_eq!(
        recipe.total_time_min,
        recipe.steps.iter().map(|s| s.end_min).max().unwrap()
    );
}

#[test]
fn test_batch_one_output_per_input() {
    let batch = vec![
        pasta_recipe(),
        json!({"id": "empty", "title": "No steps", "steps": []}),
        json!({"id": "missing"}),
        json!(["not", "a", "record"]),
        json!({"id": "bad-steps", "steps": {"id": "s1"}}),
        json!({"id": "bad-step", "steps": [
            {"id": "a", "label": "Whisk eggs", "type": "prep", "estimated_duration_minutes": 3},
            42
        ]}),
    ];
    let out = scheduler().schedule_batch(&batch);

    assert_eq!(out.len(), batch.len());
    assert_eq!(out[0].total_time_min, 28);
    for recipe in &out[1..5] {
        assert!(recipe.steps.is_empty());
        assert_eq!(recipe.total_time_min, 0);
        assert_eq!(recipe.active_time_min, 0);
    }
    assert_eq!(out[1].envelope["title"], json!("No steps"));
    assert!(out[1].diagnostics.error.is_none());
    assert!(out[2].diagnostics.error.is_none());
    assert!(out[3].diagnostics.error.is_some());
    assert!(out[3].envelope.is_empty());
    assert_eq!(out[4].envelope["id"], json!("bad-steps"));
    assert!(out[4]
        .diagnostics
        .error
        .as_deref()
        .is_some_and(|e| e.contains("not a list")));

    // A malformed step is replaced; the rest of the recipe still schedules.
    assert!(out[5].diagnostics.error.is_none());
    assert_eq!(out[5].steps.len(), 2);
    assert_eq!(out[5].total_time_min, 3);
    assert_eq!(out[5].steps[1].step.id, "step-2");
    assert_eq!(out[5].steps[1].duration_min, 0);
    assert!(out[5].steps[1].warnings[0].contains("placeholder"));
}

#[test]
fn test_parallel_and_sequential_batches_agree() {
    let batch: Vec<Value> = (0..40)
        .map(|i| {
            let mut recipe = pasta_recipe();
            recipe["id"] = json!(format!("r-{}", i));
            recipe["steps"][1]["estimated_duration_minutes"] = json!(i);
            recipe
        })
        .collect();

    let parallel = TimelineScheduler::new(ScheduleConfig::default()).schedule_batch(&batch);
    let sequential = TimelineScheduler::new(ScheduleConfig {
        parallel_batch: false,
        ..Default::default()
    })
    .schedule_batch(&batch);

    assert_eq!(parallel, sequential);
    assert_eq!(parallel[39].envelope["id"], json!("r-39"));
}

#[test]
fn test_custom_passive_keywords() {
    let config =
        ScheduleConfig::from_json_str(r#"{"passive_keywords": ["BOIL"], "parallel_batch": false}"#)
            .unwrap();
    let recipe = TimelineScheduler::new(config).schedule_recipe(&pasta_recipe());
    // Boiling is now passive and simmering active; the rest merges to [0, 28).
    assert_eq!(recipe.active_time_min, 28);
}

#[test]
fn test_batch_summary() {
    let batch = vec![
        pasta_recipe(),
        json!({"id": "empty", "steps": []}),
        json!({"id": "ghost", "steps": [
            {"id": "a", "label": "Mix", "type": "prep", "estimated_duration_minutes": 3, "requires": ["zzz"]}
        ]}),
    ];
    let out = scheduler().schedule_batch(&batch);
    let summary = BatchSummary::from_recipes(&out);

    assert_eq!(summary.total_recipes, 3);
    assert_eq!(summary.recipes_with_steps, 2);
    assert_eq!(summary.total_steps, 7);
    assert_eq!(summary.unresolved_references, 1);
    assert_eq!(summary.longest_chain, 4);
    assert_eq!(summary.max_total_time_min, Some(28));
    assert_eq!(summary.min_nonzero_total_time_min, Some(3));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total_steps"], json!(7));
}
