pub mod config;
pub mod database;
pub mod error;
pub mod lexer;
pub mod matcher;
pub mod parser;
pub mod signature;
pub mod tab;

pub use config::Config;
pub use database::{ChordDatabase, ChordIndex, ChordRecord};
pub use error::*;
pub use matcher::{
    group_by_column, match_chords, skipped_columns, ChordShape, MatchOptions, MatchOutcome,
    MatchResult,
};
pub use parser::{parse, parse_document};
pub use signature::{Signature, Slot};
pub use tab::*;

use serde::Serialize;

/// Chords found in one tab block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub tuning: Tuning,
    /// 1-based source line of the block's first string
    pub first_line: usize,
    pub results: Vec<MatchResult>,
    /// Columns with notes on too few strings to be chords
    pub skipped_columns: Vec<usize>,
}

impl Recognition {
    fn from_tab(tab: &ParsedTab, db: &impl ChordIndex, options: &MatchOptions) -> Self {
        Self {
            tuning: tab.tuning,
            first_line: tab.first_line,
            results: match_chords(&tab.tuning, &tab.notes, db, options),
            skipped_columns: skipped_columns(&tab.notes, options),
        }
    }
}

/// Parse a six-line tab block and identify its chords.
/// This is the main entry point for the library.
pub fn recognize(
    source: &str,
    db: &impl ChordIndex,
    options: &MatchOptions,
) -> Result<Recognition, TabError> {
    let tab = parse(source)?;
    Ok(Recognition::from_tab(&tab, db, options))
}

/// Recognize chords in every tab block of a document
pub fn recognize_document(
    source: &str,
    db: &impl ChordIndex,
    options: &MatchOptions,
) -> Result<Vec<Recognition>, TabError> {
    let blocks = parse_document(source)?;
    Ok(blocks
        .iter()
        .map(|tab| Recognition::from_tab(tab, db, options))
        .collect())
}
