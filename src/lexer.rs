//! # Tab Line Lexer
//!
//! Tokenizes a single tab line into a tuning label, fret numbers and technique
//! marks, each located at a column.
//!
//! Columns count characters from the tuning letter (column 0). Every line of a
//! block is scanned with the same rule, so equal columns on different lines
//! mean "played together". Filler (`-`, `|`, spaces, anything unrecognized)
//! produces no token but still advances the column.

use crate::error::TabError;
use crate::tab::{Accidental, NoteLetter, StringLabel, Technique};

/// Token types for a tab line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Tuning label at the start of the line (`e`, `Eb`, `F#`)
    Label(StringLabel),
    /// A maximal run of digits
    Fret(u8),
    Technique(Technique),
}

/// A token with its position in the line
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub column: usize,
    /// Number of columns the token occupies
    pub width: usize,
}

/// Lexer for one line of tab
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// `input` must already be trimmed; `line` is the 1-based source line
    /// number used in error messages.
    pub fn new(input: &'a str, line: usize) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            line,
            column: 0,
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn error(&self, message: String) -> TabError {
        TabError::MalformedTab {
            line: self.line,
            message,
        }
    }

    /// True when the remaining input is an accidental followed by a separator
    fn check_label_accidental(&self) -> bool {
        let mut rest = self.input[self.position..].chars();
        matches!(
            (rest.next(), rest.next()),
            (Some('#' | 'b'), Some('|' | ':'))
        )
    }

    fn lex_label(&mut self) -> Result<LocatedToken, TabError> {
        let first = match self.advance() {
            Some(c) => c,
            None => return Err(self.error("empty tab line".to_string())),
        };
        let letter = NoteLetter::from_char(first).ok_or_else(|| {
            self.error(format!(
                "line must start with a tuning letter (A-G), found '{}'",
                first
            ))
        })?;

        let accidental = if self.check_label_accidental() {
            self.advance().and_then(Accidental::from_char)
        } else {
            None
        };

        Ok(LocatedToken {
            token: Token::Label(StringLabel { letter, accidental }),
            column: 0,
            width: self.column,
        })
    }

    fn lex_fret(&mut self) -> Result<LocatedToken, TabError> {
        let column = self.column;
        let mut digits = String::new();
        while let Some(&c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.advance();
        }

        let fret = digits.parse::<u8>().map_err(|_| {
            self.error(format!(
                "fret number '{}' at column {} is out of range",
                digits, column
            ))
        })?;

        Ok(LocatedToken {
            token: Token::Fret(fret),
            column,
            width: digits.len(),
        })
    }

    pub fn tokenize(&mut self) -> Result<Vec<LocatedToken>, TabError> {
        let mut tokens = vec![self.lex_label()?];

        while let Some(&c) = self.peek() {
            if c.is_ascii_digit() {
                tokens.push(self.lex_fret()?);
                continue;
            }

            let column = self.column;
            self.advance();
            if let Some(technique) = Technique::from_char(c) {
                tokens.push(LocatedToken {
                    token: Token::Technique(technique),
                    column,
                    width: 1,
                });
            }
        }

        Ok(tokens)
    }

    /// Columns consumed so far
    pub fn width(&self) -> usize {
        self.column
    }
}
