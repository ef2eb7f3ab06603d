//! # Tab Parser
//!
//! Converts raw tab text into a [`ParsedTab`]: the tuning read from the line
//! headers plus every fretted note with its string and column.
//!
//! ## Input Contract
//! A block is exactly six non-empty lines (after trimming). Each line starts
//! with a tuning letter, optionally followed by an accidental and a separator:
//! ```text
//! e|--0--2--3--|
//! B|--0--3--3--|
//! G|--1--2--0--|
//! D|--2--0--0--|
//! A|--2---x-2--|
//! E|--0-----3--|
//! ```
//! Any other shape is a [`TabError::MalformedTab`]; nothing is partially
//! parsed.
//!
//! ## Column Alignment
//! All six lines are scanned in one coordinate system (see `lexer`). Digit
//! runs become one note anchored at their first column, so `12` is fret 12,
//! never frets 1 and 2.
//!
//! ## Entry Points
//! - [`parse()`] - exactly one six-line block
//! - [`parse_document()`] - a whole tab file with any number of blocks mixed
//!   with titles, lyrics and blank lines
//!
//! ## Example
//! ```rust
//! use tabchord::parse;
//!
//! let tab = parse("e|-0-\nB|-1-\nG|-0-\nD|-2-\nA|-3-\nE|---").unwrap();
//! assert_eq!(tab.tuning.to_string(), "E B G D A E");
//! assert_eq!(tab.notes.len(), 5);
//! assert!(tab.notes.iter().all(|n| n.column == 3));
//! ```

use crate::error::TabError;
use crate::lexer::{Lexer, Token};
use crate::tab::{
    Note, NoteLetter, ParsedTab, StringLabel, Technique, TechniqueMark, Tuning, STRING_COUNT,
};
use tracing::debug;

/// A trimmed, non-empty source line with its 1-based line number
#[derive(Debug, Clone, Copy)]
struct SourceLine<'a> {
    number: usize,
    text: &'a str,
}

/// Parse exactly one six-line tab block.
///
/// Blank lines are ignored; every other line counts toward the six.
///
/// # Errors
/// [`TabError::MalformedTab`] when there are not exactly six lines, when a
/// line does not start with a tuning letter, or when a fret number is out of
/// range. The `line` field is the source line at fault; for missing lines it
/// is the line where the next string was expected.
pub fn parse(source: &str) -> Result<ParsedTab, TabError> {
    let lines: Vec<SourceLine> = non_empty_lines(source).collect();

    if lines.len() > STRING_COUNT {
        return Err(TabError::MalformedTab {
            line: lines[STRING_COUNT].number,
            message: format!(
                "expected {} tab lines, found {}",
                STRING_COUNT,
                lines.len()
            ),
        });
    }
    if lines.len() < STRING_COUNT {
        return Err(missing_lines(&lines, source));
    }

    parse_block(&lines)
}

/// Parse every tab block in a document.
///
/// Tab lines start with a tuning letter (and optional accidental) followed by
/// a `|` or `:` separator. Without a separator the rest of the line must be
/// tab text only (dashes, digits, bars, technique marks), so prose such as
/// `G-C-D` is never taken for a string.
///
/// Consecutive tab lines form a run; a run is split into six-line blocks.
/// Blank lines do not end a run, matching [`parse()`]. Any other text (titles,
/// lyrics, chord names) ends the run and is otherwise ignored.
///
/// # Errors
/// [`TabError::MalformedTab`] when the document has no tab lines, or when a
/// run's line count is not a multiple of six.
pub fn parse_document(source: &str) -> Result<Vec<ParsedTab>, TabError> {
    let mut runs: Vec<Vec<SourceLine>> = Vec::new();
    let mut current: Vec<SourceLine> = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        if is_tab_line(text) {
            current.push(SourceLine {
                number: index + 1,
                text,
            });
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if runs.is_empty() {
        return Err(TabError::MalformedTab {
            line: 1,
            message: "no tab lines found".to_string(),
        });
    }

    let mut blocks = Vec::new();
    for run in &runs {
        for chunk in run.chunks(STRING_COUNT) {
            if chunk.len() < STRING_COUNT {
                return Err(missing_lines(chunk, source));
            }
            blocks.push(parse_block(chunk)?);
        }
    }

    debug!(blocks = blocks.len(), "parsed tab document");
    Ok(blocks)
}

fn non_empty_lines(source: &str) -> impl Iterator<Item = SourceLine<'_>> {
    source
        .lines()
        .enumerate()
        .map(|(index, raw)| SourceLine {
            number: index + 1,
            text: raw.trim(),
        })
        .filter(|line| !line.text.is_empty())
}

fn missing_lines(found: &[SourceLine], source: &str) -> TabError {
    let line = match found.last() {
        Some(last) => last.number + 1,
        None => source.lines().count().max(1),
    };
    TabError::MalformedTab {
        line,
        message: format!(
            "expected {} tab lines, found {} (missing string line {})",
            STRING_COUNT,
            found.len(),
            found.len() + 1
        ),
    }
}

fn is_tab_line(text: &str) -> bool {
    let mut chars = text.chars();
    if !chars.next().is_some_and(|c| NoteLetter::from_char(c).is_some()) {
        return false;
    }
    let rest = chars.as_str();
    let rest = match rest.strip_prefix(['#', 'b']) {
        Some(after) if after.starts_with(['|', ':']) => after,
        _ => rest,
    };
    if rest.starts_with(['|', ':']) {
        return true;
    }

    rest.starts_with(|c: char| c == '-' || c.is_ascii_digit())
        && rest.chars().all(is_tab_char)
}

fn is_tab_char(c: char) -> bool {
    matches!(c, '-' | '|' | ':')
        || c.is_ascii_digit()
        || c.is_whitespace()
        || Technique::from_char(c).is_some()
}

/// Scan six lines in a shared column grid and collect notes and marks
fn parse_block(lines: &[SourceLine]) -> Result<ParsedTab, TabError> {
    let mut labels: Vec<StringLabel> = Vec::with_capacity(STRING_COUNT);
    let mut notes = Vec::new();
    let mut marks = Vec::new();
    let mut width = 0;

    for (string_index, line) in lines.iter().enumerate() {
        let mut lexer = Lexer::new(line.text, line.number);
        for located in lexer.tokenize()? {
            match located.token {
                Token::Label(label) => labels.push(label),
                Token::Fret(fret) => notes.push(Note {
                    string_index,
                    fret,
                    column: located.column,
                }),
                Token::Technique(technique) => marks.push(TechniqueMark {
                    string_index,
                    column: located.column,
                    technique,
                }),
            }
        }
        width = width.max(lexer.width());
    }

    let first_line = lines.first().map(|l| l.number).unwrap_or(1);
    let strings: [StringLabel; STRING_COUNT] =
        labels.try_into().map_err(|found: Vec<StringLabel>| TabError::MalformedTab {
            line: first_line,
            message: format!(
                "expected {} tuning labels, found {}",
                STRING_COUNT,
                found.len()
            ),
        })?;

    notes.sort_by_key(Note::sort_key);
    marks.sort_by_key(|m| (m.column, m.string_index));

    Ok(ParsedTab {
        tuning: Tuning::new(strings),
        notes,
        marks,
        width,
        first_line,
    })
}
