use std::fs;

use procscribe_state::{Aspect, InterviewState, StateError};
use tempfile::TempDir;

/// Helper: a state part-way through an interview about fixing a door.
fn sample_state() -> InterviewState {
    let mut state = InterviewState::new();
    state.set_topic("Fixing a squeaky door").unwrap();
    state.add_interaction(
        "What is the process you would like to describe?",
        "Fixing a squeaky door",
    );
    state.add_interaction("What is the purpose of fixing it?", "Stop the noise");
    state.add_interaction("Which tools do you use?", "Screwdriver, oil can");
    state.record_validation_error();
    state
}

// ============================================================
// Persistence tests
// ============================================================

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interview_state.json");

    let mut state = sample_state();
    state.mark_complete();
    state.save(&path).unwrap();

    let loaded = InterviewState::load(&path).unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.topic(), Some("Fixing a squeaky door"));
    assert_eq!(loaded.transcript().len(), 3);
    assert_eq!(loaded.transcript()[2].answer, "Screwdriver, oil can");
    assert!(loaded.covered_aspects().contains(&Aspect::Tools));
    assert!(loaded.is_complete());
    assert_eq!(loaded.validation_error_count(), 1);
    assert_eq!(loaded.start_time(), state.start_time());
}

#[test]
fn test_snapshot_field_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("state.json");

    sample_state().save(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for field in [
        "topic",
        "transcript",
        "is_complete",
        "covered_aspects",
        "start_time",
        "validation_error_count",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(value["covered_aspects"], serde_json::json!(["purpose", "tools"]));
    assert_eq!(value["transcript"][1]["question"], "What is the purpose of fixing it?");
}

#[test]
fn test_restore_from_missing_file_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut state = sample_state();
    let before = state.clone();

    let err = state
        .restore_from(&dir.path().join("does_not_exist.json"))
        .unwrap_err();

    assert!(matches!(err, StateError::Read { .. }));
    assert_eq!(state, before);
}

#[test]
fn test_restore_from_corrupt_file_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interview_state.json");
    fs::write(&path, r#"{"topic": "half a file", "transcript": ["#).unwrap();

    let mut state = sample_state();
    let before = state.clone();

    let err = state.restore_from(&path).unwrap_err();

    assert!(matches!(err, StateError::Parse { .. }));
    assert_eq!(state, before);
}

#[test]
fn test_restore_from_file_with_missing_fields_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interview_state.json");
    fs::write(&path, r#"{"topic": "Baking", "transcript": []}"#).unwrap();

    let mut state = InterviewState::new();
    assert!(state.restore_from(&path).is_err());
    assert!(state.topic().is_none());
}

#[test]
fn test_restore_replaces_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("interview_state.json");
    let saved = sample_state();
    saved.save(&path).unwrap();

    let mut state = InterviewState::new();
    state.restore_from(&path).unwrap();
    assert_eq!(state, saved);
}

// ============================================================
// Coverage tests
// ============================================================

#[test]
fn test_add_interaction_is_monotonic() {
    let mut state = InterviewState::new();
    let questions = [
        "Why is this done?",
        "Tell me more about that.",
        "What equipment is needed?",
        "What is the purpose again?",
        "Which step comes first?",
        "Anything else?",
    ];

    for question in questions {
        let before = state.covered_aspects().clone();
        state.add_interaction(question, "some answer");
        assert!(state.covered_aspects().is_superset(&before));
    }

    assert_eq!(state.covered_aspects().len(), 3);
    assert_eq!(state.transcript().len(), questions.len());
}

/// Coverage is inferred from the question wording, not from the answer.
/// An off-topic answer to a keyword-bearing question still covers the aspect.
#[test]
fn test_aspect_coverage_follows_question_wording_not_answer_content() {
    let mut state = InterviewState::new();
    state.add_interaction("What tools do you need?", "I like turtles");
    assert!(state.covered_aspects().contains(&Aspect::Tools));

    state.add_interaction("Tell me more.", "You need a hammer and nails (tools)");
    assert_eq!(state.covered_aspects().len(), 1);
}
