use std::fs;
use tally_core::{FeedbackStore, Field, ScoringConfig, ScoringEngine, SharedEngine};
use tally_store::JsonFileStore;

/// Full cycle: score, record feedback, persist, reload in a "new process", and
/// check the suggestion moved.
#[test]
fn test_history_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("feedback.json"));

    let shared = SharedEngine::load(ScoringConfig::default(), &store).unwrap();
    assert_eq!(shared.suggest_confidence(Field::Category, "餐饮"), 0.6);

    for i in 0..10 {
        shared.record_feedback(Field::Category, "餐饮", None, i < 8, 0.6);
    }
    shared.persist(&store).unwrap();

    let reloaded = SharedEngine::load(ScoringConfig::default(), &store).unwrap();
    assert_eq!(reloaded.event_count(Field::Category), 10);
    let s = reloaded.suggest_confidence(Field::Category, "餐饮");
    assert!((s - 0.6 * (0.5 + 0.8 * 0.5)).abs() < 1e-9);
}

#[test]
fn test_unknown_keys_in_saved_file_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.json");
    fs::write(
        &path,
        r#"{
  "date": [
    {"original_value": "2026-02-18", "corrected_value": null, "was_correct": true,
     "original_confidence": 0.9, "recorded_at": "2026-02-18T09:30:00Z"}
  ],
  "merchant": [
    {"original_value": "Luckin", "was_correct": false,
     "original_confidence": 0.5, "recorded_at": "2026-02-18T09:30:00Z"}
  ]
}"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);
    let engine = ScoringEngine::with_snapshot(ScoringConfig::default(), store.load().unwrap());
    assert_eq!(engine.total_events(), 1);
    assert_eq!(engine.accuracy_rate(Field::Date), 1.0);

    // saving rewrites the whole document without the unknown key
    store.save(&engine.snapshot()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("merchant"));
    assert!(text.contains("\"date\""));
}

#[test]
fn test_clear_then_persist_empties_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("feedback.json"));
    let shared = SharedEngine::default();
    shared.record_feedback(Field::Amount, "12", None, false, 0.9);
    shared.persist(&store).unwrap();

    shared.clear_history();
    shared.persist(&store).unwrap();
    assert!(store.load().unwrap().is_empty());
}
