//! # Tab Data Model
//!
//! Types produced by the tab parser and consumed by the chord matcher.
//!
//! ## Type Hierarchy
//! ```text
//! ParsedTab
//!   ├── Tuning ([StringLabel; 6], input order)
//!   │     └── StringLabel (letter A-G + optional # / b)
//!   ├── Vec<Note>           (string_index, fret, column)
//!   ├── Vec<TechniqueMark>  (string_index, column, Technique)
//!   └── width               (widest line, in columns)
//! ```
//!
//! ## Column Coordinates
//! A column is a character offset from the tuning letter of its line. All six
//! lines of one block share the same coordinate system, so notes from
//! different strings with equal columns are played together. Columns from
//! different blocks are not comparable.
//!
//! ## String Order
//! `string_index` is the position of the line in the input (0 = first line),
//! never a pitch-sorted order. In conventional tab the first line is the
//! thinnest (high e) string.

use serde::Serialize;
use std::fmt;

/// Number of strings (lines) in one tab block
pub const STRING_COUNT: usize = 6;

/// Natural note letter used as a string's tuning label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NoteLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteLetter {
    /// Parse from a single character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(NoteLetter::A),
            'B' => Some(NoteLetter::B),
            'C' => Some(NoteLetter::C),
            'D' => Some(NoteLetter::D),
            'E' => Some(NoteLetter::E),
            'F' => Some(NoteLetter::F),
            'G' => Some(NoteLetter::G),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            NoteLetter::A => 'A',
            NoteLetter::B => 'B',
            NoteLetter::C => 'C',
            NoteLetter::D => 'D',
            NoteLetter::E => 'E',
            NoteLetter::F => 'F',
            NoteLetter::G => 'G',
        }
    }
}

/// Accidental attached to a tuning label (`Eb|`, `F#|`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Accidental::Sharp),
            'b' => Some(Accidental::Flat),
            _ => None,
        }
    }
}

/// Pitch label of one string, read from the line header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StringLabel {
    pub letter: NoteLetter,
    pub accidental: Option<Accidental>,
}

impl StringLabel {
    pub fn natural(letter: NoteLetter) -> Self {
        Self {
            letter,
            accidental: None,
        }
    }
}

impl fmt::Display for StringLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        match self.accidental {
            Some(Accidental::Sharp) => write!(f, "#"),
            Some(Accidental::Flat) => write!(f, "b"),
            None => Ok(()),
        }
    }
}

/// The six string labels of a tab block, in input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tuning {
    pub strings: [StringLabel; STRING_COUNT],
}

impl Tuning {
    pub fn new(strings: [StringLabel; STRING_COUNT]) -> Self {
        Self { strings }
    }

    /// Standard tuning as written in tab: high e first
    pub fn standard() -> Self {
        use NoteLetter::*;
        Self::new([E, B, G, D, A, E].map(StringLabel::natural))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, string_index: usize) -> Option<&StringLabel> {
        self.strings.get(string_index)
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.strings.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", labels.join(" "))
    }
}

/// A fretted position on one string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Note {
    pub string_index: usize,
    pub fret: u8,
    pub column: usize,
}

impl Note {
    /// Ordering key: column first, then string
    pub fn sort_key(&self) -> (usize, usize) {
        (self.column, self.string_index)
    }
}

/// Playing technique written between frets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    HammerOn,  // h
    PullOff,   // p
    SlideUp,   // /
    SlideDown, // \
    Bend,      // b
    Release,   // r
    Vibrato,   // ~
    DeadNote,  // x
    Tap,       // t
}

impl Technique {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'h' | 'H' => Some(Technique::HammerOn),
            'p' | 'P' => Some(Technique::PullOff),
            '/' => Some(Technique::SlideUp),
            '\\' => Some(Technique::SlideDown),
            'b' => Some(Technique::Bend),
            'r' => Some(Technique::Release),
            '~' => Some(Technique::Vibrato),
            'x' | 'X' => Some(Technique::DeadNote),
            't' => Some(Technique::Tap),
            _ => None,
        }
    }
}

/// A non-fret event on one string; never carries a fret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TechniqueMark {
    pub string_index: usize,
    pub column: usize,
    pub technique: Technique,
}

/// Result of parsing one six-line tab block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTab {
    pub tuning: Tuning,
    /// Sorted by column, then string index
    pub notes: Vec<Note>,
    /// Sorted by column, then string index
    pub marks: Vec<TechniqueMark>,
    /// Width of the widest line, in columns
    pub width: usize,
    /// 1-based line number of the block's first line in the source text
    pub first_line: usize,
}

impl ParsedTab {
    /// Distinct columns that hold at least one note, ascending
    pub fn note_columns(&self) -> Vec<usize> {
        let mut columns: Vec<usize> = self.notes.iter().map(|n| n.column).collect();
        columns.dedup();
        columns
    }
}
