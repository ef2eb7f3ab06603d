//! # Chord Signatures
//!
//! A [`Signature`] is the six-slot lookup key of a chord shape: one [`Slot`]
//! per string, in the order the strings were declared in the tab. Two shapes
//! are the same chord for lookup purposes exactly when their signatures are
//! equal.
//!
//! ## Text Form
//! - Canonical: comma separated, `x` for a muted string: `x,3,2,0,1,0`
//! - Compact (input only): six characters, single-digit frets: `x32010`
//!
//! ```rust
//! use tabchord::{Signature, Slot};
//!
//! let sig: Signature = "0,1,0,2,3,x".parse().unwrap();
//! assert_eq!(sig.slots()[5], Slot::Muted);
//! assert_eq!(sig, "01023x".parse::<Signature>().unwrap());
//! assert_eq!(sig.to_string(), "0,1,0,2,3,x");
//! ```

use crate::error::TabError;
use crate::tab::STRING_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One string's part in a chord shape
///
/// `Muted` sorts before every fret so open-position voicings list first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Muted,
    Fret(u8),
}

impl Slot {
    pub fn fret(&self) -> Option<u8> {
        match self {
            Slot::Fret(f) => Some(*f),
            Slot::Muted => None,
        }
    }

    pub fn is_muted(&self) -> bool {
        matches!(self, Slot::Muted)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Muted => write!(f, "x"),
            Slot::Fret(fret) => write!(f, "{}", fret),
        }
    }
}

impl FromStr for Slot {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" | "-" => Ok(Slot::Muted),
            digits => digits
                .parse::<u8>()
                .map(Slot::Fret)
                .map_err(|_| TabError::InvalidSignature(format!("invalid slot '{}'", digits))),
        }
    }
}

/// Canonical six-slot encoding of a chord shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature([Slot; STRING_COUNT]);

impl Signature {
    pub fn new(slots: [Slot; STRING_COUNT]) -> Self {
        Self(slots)
    }

    /// Every string muted
    pub fn muted() -> Self {
        Self([Slot::Muted; STRING_COUNT])
    }

    pub fn slots(&self) -> &[Slot; STRING_COUNT] {
        &self.0
    }

    /// Returns a copy with one string's slot replaced
    pub fn with_slot(mut self, string_index: usize, slot: Slot) -> Self {
        if let Some(s) = self.0.get_mut(string_index) {
            *s = slot;
        }
        self
    }

    /// Number of strings that are played
    pub fn played_strings(&self) -> usize {
        self.0.iter().filter(|s| !s.is_muted()).count()
    }

    fn parse_compact(s: &str) -> Result<Self, TabError> {
        let slots: Vec<Slot> = s
            .chars()
            .map(|c| match c {
                'x' | 'X' | '-' => Ok(Slot::Muted),
                d => d
                    .to_digit(10)
                    .map(|v| Slot::Fret(v as u8))
                    .ok_or_else(|| TabError::InvalidSignature(format!("invalid slot '{}'", d))),
            })
            .collect::<Result<_, _>>()?;
        Self::from_slots(slots)
    }

    fn from_slots(slots: Vec<Slot>) -> Result<Self, TabError> {
        let found = slots.len();
        let slots: [Slot; STRING_COUNT] = slots.try_into().map_err(|_| {
            TabError::InvalidSignature(format!("expected {} slots, found {}", STRING_COUNT, found))
        })?;
        Ok(Self(slots))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

impl FromStr for Signature {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains(',') {
            let slots = s.split(',').map(Slot::from_str).collect::<Result<Vec<_>, _>>()?;
            Self::from_slots(slots)
        } else {
            Self::parse_compact(s)
        }
    }
}

impl TryFrom<String> for Signature {
    type Error = TabError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let sig: Signature = "0,2,2,1,0,0".parse().unwrap();
        assert_eq!(sig.to_string(), "0,2,2,1,0,0");
        assert_eq!(sig.played_strings(), 6);
    }

    #[test]
    fn test_muted_and_multi_digit() {
        let sig: Signature = "x, 12, 14 ,14,13,x".parse().unwrap();
        assert_eq!(
            sig.slots(),
            &[
                Slot::Muted,
                Slot::Fret(12),
                Slot::Fret(14),
                Slot::Fret(14),
                Slot::Fret(13),
                Slot::Muted,
            ]
        );
        assert_eq!(sig.to_string(), "x,12,14,14,13,x");
        assert_eq!(sig.played_strings(), 4);
    }

    #[test]
    fn test_compact_form() {
        let compact: Signature = "x32010".parse().unwrap();
        let canonical: Signature = "x,3,2,0,1,0".parse().unwrap();
        assert_eq!(compact, canonical);
    }

    #[test]
    fn test_wrong_length() {
        let err = "0,2,2,1".parse::<Signature>().unwrap_err();
        assert_eq!(
            err,
            TabError::InvalidSignature("expected 6 slots, found 4".to_string())
        );
        assert!("x3201".parse::<Signature>().is_err());
    }

    #[test]
    fn test_bad_slot() {
        assert!("0,2,2,q,0,0".parse::<Signature>().is_err());
        assert!("0,2,2,,0,0".parse::<Signature>().is_err());
        assert!("0,2,2,300,0,0".parse::<Signature>().is_err());
    }

    #[test]
    fn test_muted_sorts_first() {
        let a: Signature = "x,0,2,2,1,0".parse().unwrap();
        let b: Signature = "0,0,2,2,1,0".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_with_slot() {
        let sig = Signature::muted().with_slot(1, Slot::Fret(3)).with_slot(9, Slot::Fret(1));
        assert_eq!(sig.to_string(), "x,3,x,x,x,x");
    }

    #[test]
    fn test_serde_as_string() {
        let sig: Signature = "3,0,0,0,2,3".parse().unwrap();
        assert_eq!(serde_json::to_string(&sig).unwrap(), "\"3,0,0,0,2,3\"");
        let back: Signature = serde_json::from_str("\"x02210\"").unwrap();
        assert_eq!(back.to_string(), "x,0,2,2,1,0");
    }
}
