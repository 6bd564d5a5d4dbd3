//! Positional masks for deriving names from identifiers and paths.
//!
//! A mask is walked against its input one character at a time:
//!
//! | mask char | effect                                   |
//! |-----------|------------------------------------------|
//! | `%`       | copy the input character to the output   |
//! | `?`       | consume the input character, emit nothing |
//! | `*`       | stop; the rest of both strings is ignored |
//! | other     | input character must be identical        |
//!
//! A mask starting with `*` is walked from the tail of both strings. The
//! output is built in walk order, so a tail walk emits the copied characters
//! last-to-first (`*%%%` on `abcdef` gives `fed`). A mask that both starts and
//! ends with `*` passes the input through untouched.
//!
//! ```
//! use htkprep_core::mask::apply;
//!
//! assert_eq!(apply("%%%%%%*", "SPEAKER01_utt001").unwrap(), "SPEAKE");
//! assert_eq!(apply("*", "anything").unwrap(), "anything");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("{input} does not match mask {mask}")]
    Mismatch { mask: String, input: String },

    #[error("mask {mask} reaches past the end of {input}")]
    Bounds { mask: String, input: String },
}

pub type MaskResult<T> = Result<T, MaskError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Heads aligned, walk left to right.
    Forward,
    /// Tails aligned, walk right to left.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Copy,
    Drop,
    Stop,
    Literal(char),
}

impl Rule {
    fn of(c: char) -> Self {
        match c {
            '%' => Rule::Copy,
            '?' => Rule::Drop,
            '*' => Rule::Stop,
            other => Rule::Literal(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mask(String);

impl Mask {
    pub fn new(pattern: impl Into<String>) -> Self {
        Mask(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn direction(&self) -> Direction {
        if self.0.starts_with('*') {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// `true` for `*`, `*...*`: the input comes back unchanged.
    pub fn is_passthrough(&self) -> bool {
        self.0.starts_with('*') && self.0.ends_with('*')
    }

    pub fn apply(&self, input: &str) -> MaskResult<String> {
        if self.is_passthrough() {
            return Ok(input.to_owned());
        }
        match self.direction() {
            Direction::Forward => self.walk(self.0.chars(), input.chars(), input),
            Direction::Reverse => self.walk(self.0.chars().rev(), input.chars().rev(), input),
        }
    }

    fn walk<M, S>(&self, mask: M, mut source: S, input: &str) -> MaskResult<String>
    where
        M: Iterator<Item = char>,
        S: Iterator<Item = char>,
    {
        let mut out = String::new();
        for m in mask {
            let rule = Rule::of(m);
            if rule == Rule::Stop {
                break;
            }
            let Some(c) = source.next() else {
                return Err(MaskError::Bounds {
                    mask: self.0.clone(),
                    input: input.to_owned(),
                });
            };
            match rule {
                Rule::Copy => out.push(c),
                Rule::Literal(expected) if expected != c => {
                    return Err(MaskError::Mismatch {
                        mask: self.0.clone(),
                        input: input.to_owned(),
                    });
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mask {
    fn from(pattern: &str) -> Self {
        Mask::new(pattern)
    }
}

/// One-shot form of [`Mask::apply`].
pub fn apply(mask: &str, input: &str) -> MaskResult<String> {
    Mask::new(mask).apply(input)
}
