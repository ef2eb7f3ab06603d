//! # Error Types
//!
//! This module defines the error types for tab parsing and chord lookup.
//!
//! Parse errors carry the 1-based line number of the offending tab line so the
//! user can find it in the source text.
//!
//! ## Error Types
//! - `MalformedTab` - The text does not form six tab lines with tuning letters
//! - `InvalidSignature` - A voicing string could not be read as six slots
//! - `Database` - The chord database file could not be read or decoded
//! - `Config` - The configuration file could not be read or decoded
//!
//! Per-record database problems are [`RecordError`]s. They are collected while
//! the database is built and never abort the build.
//!
//! ## Usage
//! ```rust
//! use tabchord::{parse, TabError};
//!
//! match parse("e|--0--|") {
//!     Ok(tab) => println!("{} notes", tab.notes.len()),
//!     Err(TabError::MalformedTab { line, message }) => {
//!         eprintln!("Bad tab at line {}: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabError {
    /// Structural violation of the six-line tab layout.
    ///
    /// # Example
    /// ```
    /// # use tabchord::TabError;
    /// let err = TabError::MalformedTab {
    ///     line: 6,
    ///     message: "expected 6 tab lines, found 5".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed tab at line 6: expected 6 tab lines, found 5");
    /// ```
    #[error("Malformed tab at line {line}: {message}")]
    MalformedTab { line: usize, message: String },

    /// A voicing or signature string that is not six valid slots.
    ///
    /// # Example
    /// ```
    /// # use tabchord::TabError;
    /// let err = TabError::InvalidSignature("expected 6 slots, found 4".to_string());
    /// assert_eq!(err.to_string(), "Invalid signature: expected 6 slots, found 4");
    /// ```
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Chord database error: {0}")]
    Database(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A malformed entry inside an otherwise usable chord database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rejected database record #{record} ({name:?}): {reason}")]
pub struct RecordError {
    /// Zero-based position of the record in the source list
    pub record: usize,
    pub name: String,
    pub reason: String,
}
