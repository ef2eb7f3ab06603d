//! Integration tests for tab chord recognition
//!
//! Tests the full pipeline from tab text to chord names against the bundled
//! reference database and small synthetic ones.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tabchord::{
    parse, recognize, recognize_document, ChordDatabase, ChordIndex, ChordRecord, MatchOptions,
    MatchOutcome, Signature, TabError,
};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

fn names(recognition: &tabchord::Recognition) -> Vec<String> {
    recognition
        .results
        .iter()
        .map(|r| match &r.outcome {
            MatchOutcome::Unrecognized => "?".to_string(),
            MatchOutcome::Chord(name) => name.clone(),
            MatchOutcome::Ambiguous(names) => names.iter().cloned().collect::<Vec<_>>().join("|"),
        })
        .collect()
}

#[test]
fn test_reference_database_loads_cleanly() {
    let db = ChordDatabase::load(data_path("chords.yaml")).unwrap();
    assert!(db.rejected().is_empty(), "rejected: {:?}", db.rejected());
    assert!(db.len() > 40);
    assert!(db.chord_names().any(|n| n == "Am"));
}

#[test]
fn test_sample_progression() {
    let db = ChordDatabase::load(data_path("chords.yaml")).unwrap();
    let sample = std::fs::read_to_string(data_path("sample.txt")).unwrap();

    let recognitions = recognize_document(&sample, &db, &MatchOptions::default()).unwrap();
    assert_eq!(recognitions.len(), 1);

    let recognition = &recognitions[0];
    assert_eq!(recognition.first_line, 3);
    assert_eq!(names(recognition), vec!["C", "Am", "G", "Fmaj7", "?"]);
    assert_eq!(recognition.skipped_columns, vec![20]);

    let g = &recognition.results[2];
    let expected: Vec<Signature> = vec![
        "3,3,0,0,2,3".parse().unwrap(),
        "3,3,4,5,5,3".parse().unwrap(),
    ];
    assert_eq!(g.alternates["G"], expected);
}

#[test]
fn test_ambiguous_voicing_in_reference_database() {
    let db = ChordDatabase::load(data_path("chords.yaml")).unwrap();
    let tab = "e|-0-\nB|-1-\nG|-0-\nD|-2-\nA|-0-\nE|---";

    let recognition = recognize(tab, &db, &MatchOptions::default()).unwrap();
    assert_eq!(
        recognition.results[0].matched_chord_names(),
        BTreeSet::from(["Am7", "C6"])
    );
    // Each name carries its own alternates
    assert!(recognition.results[0].alternates.contains_key("Am7"));
    assert_eq!(recognition.results[0].alternates["C6"].len(), 1);
}

#[test]
fn test_round_trip_scenario() {
    let db = ChordDatabase::from_yaml_str(&fixture("round_trip_db.yaml")).unwrap();
    let recognition = recognize(&fixture("round_trip.txt"), &db, &MatchOptions::default()).unwrap();

    assert_eq!(names(&recognition), vec!["Am", "G", "C"]);
    assert!(recognition.results.iter().all(|r| r.is_recognized()));
    assert!(recognition.skipped_columns.is_empty());
}

#[test]
fn test_five_lines_never_partially_parse() {
    let db = ChordDatabase::default();
    let err = recognize(&fixture("five_lines.txt"), &db, &MatchOptions::default()).unwrap_err();
    match err {
        TabError::MalformedTab { line, message } => {
            assert_eq!(line, 6);
            assert!(message.contains("expected 6 tab lines, found 5"));
        }
        e => panic!("Expected MalformedTab, got {:?}", e),
    }
}

#[test]
fn test_rejected_records_do_not_block_matching() {
    let db = ChordDatabase::from_yaml_str(&fixture("broken_db.yaml")).unwrap();
    assert_eq!(db.rejected().len(), 2);

    let tab = "e|-3-\nB|-0-\nG|-0-\nD|-0-\nA|-2-\nE|-3-";
    let recognition = recognize(tab, &db, &MatchOptions::default()).unwrap();
    assert_eq!(names(&recognition), vec!["G"]);
}

#[test]
fn test_single_load_shared_across_calls() {
    let db = Arc::new(ChordDatabase::load(data_path("chords.yaml")).unwrap());
    let tabs = [
        "e|-0-\nB|-1-\nG|-0-\nD|-2-\nA|-3-\nE|---",
        "e|-3-\nB|-0-\nG|-0-\nD|-0-\nA|-2-\nE|-3-",
    ];

    let handles: Vec<_> = tabs
        .iter()
        .map(|tab| {
            let db = Arc::clone(&db);
            let tab = tab.to_string();
            std::thread::spawn(move || {
                let recognition = recognize(&tab, &db, &MatchOptions::default()).unwrap();
                names(&recognition)
            })
        })
        .collect();

    let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![vec!["C".to_string()], vec!["G".to_string()]]);
}

#[test]
fn test_custom_index_double() {
    /// Recognizes every shape as "X"
    struct Everything;

    impl ChordIndex for Everything {
        fn lookup(&self, _: &Signature) -> BTreeSet<String> {
            BTreeSet::from(["X".to_string()])
        }

        fn voicings_of(&self, _: &str) -> Vec<Signature> {
            vec![]
        }
    }

    let tab = parse(&fixture("round_trip.txt")).unwrap();
    let results =
        tabchord::match_chords(&tab.tuning, &tab.notes, &Everything, &MatchOptions::default());
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.outcome == MatchOutcome::Chord("X".to_string())));
}

#[test]
fn test_document_and_single_block_agree_across_blank_line() {
    let db = ChordDatabase::reference().unwrap();
    let tab = "e|-3-\nB|-0-\n\nG|-0-\nD|-0-\nA|-2-\nE|-3-";

    let single = recognize(tab, &db, &MatchOptions::default()).unwrap();
    let document = recognize_document(tab, &db, &MatchOptions::default()).unwrap();
    assert_eq!(document, vec![single]);
    assert_eq!(names(&document[0]), vec!["G"]);
}

#[test]
fn test_records_built_in_code() {
    let db = ChordDatabase::from_records(vec![
        ChordRecord::new("D", "2,3,2,0,x,x"),
        ChordRecord::new("Dsus4", "3,3,2,0,x,x"),
    ]);
    let tab = "e|-2-3-2-\nB|-3-3-3-\nG|-2-2-2-\nD|-0-0-0-\nA|-------\nE|-------";
    let recognition = recognize(tab, &db, &MatchOptions::default()).unwrap();
    assert_eq!(names(&recognition), vec!["D", "Dsus4", "D"]);
}
