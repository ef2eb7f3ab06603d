//! # Chord Matcher
//!
//! Groups parsed notes into chord shapes and identifies them against a
//! [`ChordIndex`].
//!
//! ## Pipeline
//! 1. **Grouping** - notes sharing a column form one [`ChordShape`]
//! 2. **Threshold** - shapes on fewer than [`MatchOptions::min_strings`]
//!    strings are not chords and produce no result
//! 3. **Signature** - every string gets its fret or `Muted`, in the tuning's
//!    declared order
//! 4. **Lookup** - the signature's chord names, plus each name's other
//!    voicings as alternates
//!
//! ## Outcomes
//! Lookup never picks a winner. A shape with no entry is
//! [`MatchOutcome::Unrecognized`], one name is [`MatchOutcome::Chord`], and
//! several names are [`MatchOutcome::Ambiguous`]. None of these are errors;
//! matching cannot fail.
//!
//! ## Example
//! ```rust
//! use tabchord::{match_chords, parse, ChordDatabase, ChordRecord, MatchOptions};
//!
//! let db = ChordDatabase::from_records(vec![ChordRecord::new("E5", "x,x,x,2,2,0")]);
//! let tab = parse("e|----\nB|----\nG|----\nD|--2-\nA|--2-\nE|--0-").unwrap();
//!
//! let results = match_chords(&tab.tuning, &tab.notes, &db, &MatchOptions::default());
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].column, 4);
//! assert!(results[0].matched_chord_names().contains("E5"));
//! ```

use crate::database::ChordIndex;
use crate::signature::{Signature, Slot};
use crate::tab::{Note, Tuning};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Default number of strings a shape needs to count as a chord
pub const DEFAULT_MIN_STRINGS: usize = 2;

/// Matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Minimum number of played strings for a column to be a chord.
    /// Values below 1 behave as 1.
    pub min_strings: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_strings: DEFAULT_MIN_STRINGS,
        }
    }
}

impl MatchOptions {
    pub fn with_min_strings(min_strings: usize) -> Self {
        Self { min_strings }
    }

    fn threshold(&self) -> usize {
        self.min_strings.max(1)
    }
}

/// Notes played in the same column
#[derive(Debug, Clone, PartialEq)]
pub struct ChordShape {
    pub column: usize,
    /// One note per string, ascending string index
    pub notes: Vec<Note>,
}

impl ChordShape {
    pub fn string_count(&self) -> usize {
        self.notes.len()
    }

    /// Six-slot signature in the tuning's string order
    pub fn signature(&self, tuning: &Tuning) -> Signature {
        self.notes
            .iter()
            .filter(|note| note.string_index < tuning.len())
            .fold(Signature::muted(), |sig, note| {
                sig.with_slot(note.string_index, Slot::Fret(note.fret))
            })
    }
}

/// Result of looking up one signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "names", rename_all = "kebab-case")]
pub enum MatchOutcome {
    Unrecognized,
    Chord(String),
    Ambiguous(BTreeSet<String>),
}

impl MatchOutcome {
    fn from_names(mut names: BTreeSet<String>) -> Self {
        match names.len() {
            0 => MatchOutcome::Unrecognized,
            1 => match names.pop_first() {
                Some(name) => MatchOutcome::Chord(name),
                None => MatchOutcome::Unrecognized,
            },
            _ => MatchOutcome::Ambiguous(names),
        }
    }
}

/// One chord-bearing column and what it matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub column: usize,
    pub signature: Signature,
    pub outcome: MatchOutcome,
    /// Other voicings of every matched name, sorted by signature
    pub alternates: BTreeMap<String, Vec<Signature>>,
}

impl MatchResult {
    pub fn is_recognized(&self) -> bool {
        !matches!(self.outcome, MatchOutcome::Unrecognized)
    }

    /// Every chord name the signature matched; empty when unrecognized
    pub fn matched_chord_names(&self) -> BTreeSet<&str> {
        match &self.outcome {
            MatchOutcome::Unrecognized => BTreeSet::new(),
            MatchOutcome::Chord(name) => BTreeSet::from([name.as_str()]),
            MatchOutcome::Ambiguous(names) => names.iter().map(|n| n.as_str()).collect(),
        }
    }
}

/// Partition notes by column, ascending.
///
/// Notes do not need to be sorted. Every column that holds a note yields
/// exactly one shape.
pub fn group_by_column(notes: &[Note]) -> Vec<ChordShape> {
    let mut columns: BTreeMap<usize, Vec<Note>> = BTreeMap::new();
    for note in notes {
        columns.entry(note.column).or_default().push(*note);
    }

    columns
        .into_iter()
        .map(|(column, mut notes)| {
            notes.sort_by_key(|n| n.string_index);
            notes.dedup_by_key(|n| n.string_index);
            ChordShape { column, notes }
        })
        .collect()
}

/// Columns that hold notes but too few strings to be a chord
pub fn skipped_columns(notes: &[Note], options: &MatchOptions) -> Vec<usize> {
    group_by_column(notes)
        .into_iter()
        .filter(|shape| shape.string_count() < options.threshold())
        .map(|shape| shape.column)
        .collect()
}

/// Identify every chord shape in `notes`, in column order.
pub fn match_chords(
    tuning: &Tuning,
    notes: &[Note],
    db: &impl ChordIndex,
    options: &MatchOptions,
) -> Vec<MatchResult> {
    let threshold = options.threshold();
    let mut results = Vec::new();

    for shape in group_by_column(notes) {
        if shape.string_count() < threshold {
            debug!(
                column = shape.column,
                strings = shape.string_count(),
                "skipping column below chord threshold"
            );
            continue;
        }

        let signature = shape.signature(tuning);
        results.push(match_signature(shape.column, signature, db));
    }

    results
}

fn match_signature(column: usize, signature: Signature, db: &impl ChordIndex) -> MatchResult {
    let outcome = MatchOutcome::from_names(db.lookup(&signature));

    let mut alternates = BTreeMap::new();
    let names: Vec<String> = match &outcome {
        MatchOutcome::Unrecognized => vec![],
        MatchOutcome::Chord(name) => vec![name.clone()],
        MatchOutcome::Ambiguous(names) => names.iter().cloned().collect(),
    };
    for name in names {
        let mut voicings: Vec<Signature> = db
            .voicings_of(&name)
            .into_iter()
            .filter(|v| *v != signature)
            .collect();
        voicings.sort();
        voicings.dedup();
        alternates.insert(name, voicings);
    }

    debug!(column, %signature, ?outcome, "matched chord shape");
    MatchResult {
        column,
        signature,
        outcome,
        alternates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ChordDatabase, ChordRecord};
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    const ROUND_TRIP: &str = "\
e|--0--2--3--|
B|--0--3--3--|
G|--1--2--0--|
D|--2--0--0--|
A|--2---x-2--|
E|--0-----3--|
";

    /// Index with no entries at all
    struct EmptyIndex;

    impl ChordIndex for EmptyIndex {
        fn lookup(&self, _: &Signature) -> BTreeSet<String> {
            BTreeSet::new()
        }

        fn voicings_of(&self, _: &str) -> Vec<Signature> {
            vec![]
        }
    }

    fn sig(s: &str) -> Signature {
        s.parse().unwrap()
    }

    fn note(string_index: usize, fret: u8, column: usize) -> Note {
        Note {
            string_index,
            fret,
            column,
        }
    }

    #[test]
    fn test_group_by_column() {
        let notes = vec![note(2, 5, 9), note(0, 3, 4), note(1, 1, 4)];
        let shapes = group_by_column(&notes);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].column, 4);
        assert_eq!(shapes[0].notes, vec![note(0, 3, 4), note(1, 1, 4)]);
        assert_eq!(shapes[1].string_count(), 1);
    }

    #[test]
    fn test_signature_fills_muted_slots() {
        let shape = ChordShape {
            column: 0,
            notes: vec![note(1, 3, 0), note(4, 12, 0)],
        };
        assert_eq!(shape.signature(&Tuning::standard()), sig("x,3,x,x,12,x"));
    }

    #[test]
    fn test_single_note_column_is_not_a_chord() {
        let tab = parse("e|--3--0--\nB|-----1--\nG|--------\nD|--------\nA|--------\nE|--------")
            .unwrap();
        let options = MatchOptions::default();
        let results = match_chords(&tab.tuning, &tab.notes, &EmptyIndex, &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].column, 7);
        assert_eq!(skipped_columns(&tab.notes, &options), vec![4]);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let tab = parse("e|--3--0--\nB|-----1--\nG|-----0--\nD|--------\nA|--------\nE|--------")
            .unwrap();
        let with_min = |min_strings| {
            match_chords(
                &tab.tuning,
                &tab.notes,
                &EmptyIndex,
                &MatchOptions::with_min_strings(min_strings),
            )
        };

        assert_eq!(with_min(1).len(), 2);

        let triads = with_min(3);
        assert_eq!(triads.len(), 1);
        assert_eq!(triads[0].column, 7);

        // Zero behaves as one
        assert_eq!(with_min(0).len(), 2);
    }

    #[test]
    fn test_empty_index_is_unrecognized() {
        let tab = parse(ROUND_TRIP).unwrap();
        let results = match_chords(&tab.tuning, &tab.notes, &EmptyIndex, &MatchOptions::default());
        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.outcome, MatchOutcome::Unrecognized);
            assert!(!result.is_recognized());
            assert!(result.matched_chord_names().is_empty());
            assert!(result.alternates.is_empty());
        }
    }

    #[test]
    fn test_ambiguous_shape_reports_every_name() {
        let db = ChordDatabase::from_records(vec![
            ChordRecord::new("C", "0,2,2,1,0,0"),
            ChordRecord::new("Cadd9-partial", "0,2,2,1,0,0"),
        ]);
        let notes: Vec<Note> = [0, 2, 2, 1, 0, 0]
            .iter()
            .enumerate()
            .map(|(string_index, &fret)| note(string_index, fret, 5))
            .collect();

        let results = match_chords(&Tuning::standard(), &notes, &db, &MatchOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].matched_chord_names(),
            BTreeSet::from(["C", "Cadd9-partial"])
        );
        assert!(matches!(results[0].outcome, MatchOutcome::Ambiguous(_)));
    }

    #[test]
    fn test_round_trip_scenario() {
        let tab = parse(ROUND_TRIP).unwrap();
        let db = ChordDatabase::from_records(vec![
            ChordRecord::new("Am", "0,0,1,2,2,0"),
            ChordRecord::new("Am", "5,5,5,7,7,5"),
            ChordRecord::new("G", "2,3,2,0,x,x"),
            ChordRecord::new("C", "3,3,0,0,2,3"),
            ChordRecord::new("C", "x,x,x,x,x,8"),
            ChordRecord::new("C", "0,1,0,2,3,x"),
        ]);

        let results = match_chords(&tab.tuning, &tab.notes, &db, &MatchOptions::default());
        let names: Vec<&str> = results
            .iter()
            .flat_map(|r| r.matched_chord_names())
            .collect();
        assert_eq!(names, vec!["Am", "G", "C"]);
        assert!(results.iter().all(|r| r.is_recognized()));
        assert_eq!(
            results.iter().map(|r| r.column).collect::<Vec<_>>(),
            vec![4, 7, 10]
        );

        // Alternates exclude the matched voicing and are sorted
        assert_eq!(results[0].alternates["Am"], vec![sig("5,5,5,7,7,5")]);
        assert!(results[1].alternates["G"].is_empty());
        assert_eq!(
            results[2].alternates["C"],
            vec![sig("x,x,x,x,x,8"), sig("0,1,0,2,3,x")]
        );
    }

    #[test]
    fn test_string_order_is_not_reversed() {
        let db = ChordDatabase::from_records(vec![ChordRecord::new("reversed", "0,2,2,1,0,0")]);
        let tab = parse(ROUND_TRIP).unwrap();
        let results = match_chords(&tab.tuning, &tab.notes, &db, &MatchOptions::default());
        assert!(!results[0].is_recognized());
    }

    #[test]
    fn test_serialized_outcome() {
        let json = serde_json::to_value(MatchOutcome::Chord("G".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "chord", "names": "G"}));
        let json = serde_json::to_value(MatchOutcome::Unrecognized).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "unrecognized"}));
    }
}
