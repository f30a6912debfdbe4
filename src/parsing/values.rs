//! Typed value extraction from tokens.
//!
//! Each extractor accepts only the token kinds it understands and reports any
//! other kind as [`ValueError::InvalidKind`]. Numeric overflow is reported as
//! [`ValueError::Overflow`] so validators can turn it into a diagnostic.

use crate::parsing::token::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// Errors raised while reading a typed value out of a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The token kind cannot produce the requested value.
    #[error("cannot read {expected} from {actual} token")]
    InvalidKind {
        expected: &'static str,
        actual: TokenKind,
    },
    /// The literal does not fit the target type.
    #[error("value {text} is out of range")]
    Overflow { text: String },
    /// The token is missing a capture group it should always have.
    #[error("malformed {kind} token {text:?}")]
    Malformed { kind: TokenKind, text: String },
}

/// Inclusive range of pin indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinRange {
    pub start: usize,
    pub end: usize,
}

impl PinRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    /// Number of pins covered. Zero when `end < start`.
    pub fn count(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for PinRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".p{}..p{}", self.start, self.end)
    }
}

fn group<'a>(token: &'a Token, index: usize) -> Result<&'a str, ValueError> {
    token.group(index).ok_or_else(|| ValueError::Malformed {
        kind: token.kind(),
        text: token.value().to_string(),
    })
}

fn parse_index(text: &str) -> Result<usize, ValueError> {
    text.parse::<usize>().map_err(|_| ValueError::Overflow {
        text: text.to_string(),
    })
}

/// Name captured by a label, label argument, register or instruction token.
pub fn name(token: &Token) -> Result<&str, ValueError> {
    match token.kind() {
        TokenKind::Label | TokenKind::LabelArg | TokenKind::Register | TokenKind::Instruction => {
            group(token, 1)
        }
        other => Err(ValueError::InvalidKind {
            expected: "name",
            actual: other,
        }),
    }
}

/// 16-bit value of a binary, hex or decimal literal.
pub fn constant(token: &Token) -> Result<u16, ValueError> {
    let digits = match token.kind() {
        TokenKind::Binary | TokenKind::Hex | TokenKind::Integer => group(token, 1)?,
        other => {
            return Err(ValueError::InvalidKind {
                expected: "constant",
                actual: other,
            });
        }
    };
    let parsed = match token.kind() {
        TokenKind::Binary => u16::from_str_radix(&digits.replace('_', ""), 2),
        TokenKind::Hex => u16::from_str_radix(digits, 16),
        _ => digits.parse::<u16>(),
    };
    parsed.map_err(|_| ValueError::Overflow {
        text: token.value().to_string(),
    })
}

/// Largest literal, written in the base of `kind`.
pub fn constant_max_text(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Hex => "FFFF",
        TokenKind::Binary => "1111111111111111",
        _ => "65535",
    }
}

/// Index of a single-pin token.
pub fn pin_index(token: &Token) -> Result<usize, ValueError> {
    match token.kind() {
        TokenKind::Pin => parse_index(group(token, 1)?),
        other => Err(ValueError::InvalidKind {
            expected: "pin index",
            actual: other,
        }),
    }
}

/// Pin range of any pin-kind token. A single pin yields a one-pin range.
///
/// The range is not checked for `end < start`; that is a validation concern.
pub fn pin_range(token: &Token) -> Result<PinRange, ValueError> {
    match token.kind() {
        TokenKind::Pin => Ok(PinRange::single(pin_index(token)?)),
        TokenKind::PinRange => {
            let start = parse_index(group(token, 1)?)?;
            let end = parse_index(group(token, 2)?)?;
            Ok(PinRange::new(start, end))
        }
        TokenKind::PinRangeLength => {
            let start = parse_index(group(token, 1)?)?;
            let length = parse_index(group(token, 2)?)?;
            let end = start
                .checked_add(length)
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| ValueError::Overflow {
                    text: token.value().to_string(),
                })?;
            Ok(PinRange::new(start, end))
        }
        other => Err(ValueError::InvalidKind {
            expected: "pin range",
            actual: other,
        }),
    }
}
