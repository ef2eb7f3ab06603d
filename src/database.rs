//! # Chord Database
//!
//! Read-only index of known chord voicings.
//!
//! ## Lookups
//! - signature → set of chord names (several names may share one shape)
//! - chord name → its voicings (alternate fingerings)
//!
//! The matcher only sees the [`ChordIndex`] trait, so tests can hand it a
//! synthetic index. [`ChordDatabase`] is the production implementation.
//!
//! ## Lifecycle
//! A database is built once (from records or a YAML file) and never mutated
//! afterwards. Share it between callers with `Arc`; to pick up new data, build
//! a fresh database and swap the handle.
//!
//! ## File Format
//! A YAML list of records. Voicings use the signature text form in tab order
//! (first tab line first):
//! ```yaml
//! - name: C
//!   voicing: "0,1,0,2,3,x"
//! - name: Am
//!   voicing: "012200"   # compact form
//! ```
//! Records that cannot be decoded or whose voicing is invalid are rejected one
//! by one; the rest of the file still loads.

use crate::error::{RecordError, TabError};
use crate::signature::Signature;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Reference database shipped with the crate (`data/chords.yaml`)
const REFERENCE_YAML: &str = include_str!("../data/chords.yaml");

/// Lookup contract consumed by the chord matcher
pub trait ChordIndex {
    /// Names of every chord whose voicings include `signature`
    fn lookup(&self, signature: &Signature) -> BTreeSet<String>;

    /// Voicings of `name` in stable order; empty for unknown names
    fn voicings_of(&self, name: &str) -> Vec<Signature>;
}

impl<T: ChordIndex + ?Sized> ChordIndex for Arc<T> {
    fn lookup(&self, signature: &Signature) -> BTreeSet<String> {
        (**self).lookup(signature)
    }

    fn voicings_of(&self, name: &str) -> Vec<Signature> {
        (**self).voicings_of(name)
    }
}

/// One (name, voicing) entry of the database source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChordRecord {
    pub name: String,
    pub voicing: String,
}

impl ChordRecord {
    pub fn new(name: impl Into<String>, voicing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voicing: voicing.into(),
        }
    }
}

/// In-memory chord database
#[derive(Debug, Clone, Default)]
pub struct ChordDatabase {
    by_signature: HashMap<Signature, BTreeSet<String>>,
    by_name: BTreeMap<String, BTreeSet<Signature>>,
    rejected: Vec<RecordError>,
}

impl ChordDatabase {
    /// Build the database from records.
    ///
    /// Invalid records are logged, kept in [`rejected`](Self::rejected) and
    /// skipped. Duplicate (name, voicing) pairs are stored once.
    pub fn from_records(records: impl IntoIterator<Item = ChordRecord>) -> Self {
        let mut db = Self::default();
        for (index, record) in records.into_iter().enumerate() {
            if let Err(e) = db.insert(index, &record) {
                warn!("{}", e);
                db.rejected.push(e);
            }
        }
        db
    }

    /// Parse a YAML list of records.
    ///
    /// # Errors
    /// [`TabError::Database`] when the text is not a YAML list. Individual
    /// entries that do not decode as records are rejected, not fatal.
    pub fn from_yaml_str(text: &str) -> Result<Self, TabError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let values: Vec<serde_yaml::Value> = serde_yaml::from_str(text)
            .map_err(|e| TabError::Database(format!("expected a list of chord records: {}", e)))?;

        let mut decoded = Vec::with_capacity(values.len());
        let mut undecodable = Vec::new();
        for (index, value) in values.into_iter().enumerate() {
            let name = value
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string();
            match serde_yaml::from_value::<ChordRecord>(value) {
                Ok(record) => decoded.push((index, record)),
                Err(e) => undecodable.push(RecordError {
                    record: index,
                    name,
                    reason: e.to_string(),
                }),
            }
        }

        let mut db = Self::default();
        for (index, record) in decoded {
            if let Err(e) = db.insert(index, &record) {
                db.rejected.push(e);
            }
        }
        db.rejected.extend(undecodable);
        db.rejected.sort_by_key(|e| e.record);
        for e in &db.rejected {
            warn!("{}", e);
        }
        Ok(db)
    }

    /// Load a YAML database file. This is the one-time cost of a session;
    /// keep the result and pass it to every match call.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TabError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TabError::Database(format!("failed to read {}: {}", path.display(), e))
        })?;
        let db = Self::from_yaml_str(&text).map_err(|e| match e {
            TabError::Database(message) => {
                TabError::Database(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;
        info!(
            path = %path.display(),
            voicings = db.len(),
            chords = db.by_name.len(),
            rejected = db.rejected.len(),
            "loaded chord database"
        );
        Ok(db)
    }

    /// The built-in reference database of common open and barre voicings.
    /// It does not depend on the working directory.
    pub fn reference() -> Result<Self, TabError> {
        let db = Self::from_yaml_str(REFERENCE_YAML)?;
        info!(
            voicings = db.len(),
            chords = db.by_name.len(),
            "loaded built-in chord database"
        );
        Ok(db)
    }

    fn insert(&mut self, index: usize, record: &ChordRecord) -> Result<(), RecordError> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(RecordError {
                record: index,
                name: record.name.clone(),
                reason: "empty chord name".to_string(),
            });
        }

        let signature: Signature = record.voicing.parse().map_err(|e: TabError| RecordError {
            record: index,
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        if signature.played_strings() == 0 {
            return Err(RecordError {
                record: index,
                name: name.to_string(),
                reason: "voicing has no played strings".to_string(),
            });
        }

        self.by_signature
            .entry(signature)
            .or_default()
            .insert(name.to_string());
        self.by_name
            .entry(name.to_string())
            .or_default()
            .insert(signature);
        Ok(())
    }

    /// Records that were skipped while building
    pub fn rejected(&self) -> &[RecordError] {
        &self.rejected
    }

    /// Number of distinct (name, voicing) entries
    pub fn len(&self) -> usize {
        self.by_name.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Chord names in sorted order
    pub fn chord_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|k| k.as_str())
    }
}

impl ChordIndex for ChordDatabase {
    fn lookup(&self, signature: &Signature) -> BTreeSet<String> {
        self.by_signature.get(signature).cloned().unwrap_or_default()
    }

    fn voicings_of(&self, name: &str) -> Vec<Signature> {
        self.by_name
            .get(name)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
