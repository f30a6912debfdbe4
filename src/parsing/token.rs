//! Token, token kinds and source positions.

use std::fmt;
use std::ops::Range;

/// Lexical category of a token.
///
/// Declaration order is match priority: the lexer tries rules top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// `:name`, only as the first token of a line.
    Label,
    /// Bare alphabetic name, only as the first token of a line.
    Instruction,
    /// `$name`
    Register,
    /// Label name passed as an argument.
    LabelArg,
    /// `.pA..pB`
    PinRange,
    /// `.pA:N`
    PinRangeLength,
    /// `.pA`
    Pin,
    /// `0b` followed by binary digits, optionally segmented with `_`.
    Binary,
    /// `0x` followed by hex digits.
    Hex,
    /// Decimal digits.
    Integer,
    /// Spaces and tabs. Never emitted.
    Whitespace,
    /// `;` or `#` up to the end of the line.
    Comment,
}

impl TokenKind {
    /// All kinds, in match priority order.
    pub const ALL: [TokenKind; 12] = [
        TokenKind::Label,
        TokenKind::Instruction,
        TokenKind::Register,
        TokenKind::LabelArg,
        TokenKind::PinRange,
        TokenKind::PinRangeLength,
        TokenKind::Pin,
        TokenKind::Binary,
        TokenKind::Hex,
        TokenKind::Integer,
        TokenKind::Whitespace,
        TokenKind::Comment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Label => "LABEL",
            TokenKind::Instruction => "INSTRUCTION",
            TokenKind::Register => "REGISTER",
            TokenKind::LabelArg => "LABEL_ARG",
            TokenKind::PinRange => "PIN_RANGE",
            TokenKind::PinRangeLength => "PIN_RANGE_LENGTH",
            TokenKind::Pin => "PIN",
            TokenKind::Binary => "BINARY",
            TokenKind::Hex => "HEX",
            TokenKind::Integer => "INTEGER",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Comment => "COMMENT",
        }
    }

    pub fn is_constant(self) -> bool {
        matches!(self, TokenKind::Binary | TokenKind::Hex | TokenKind::Integer)
    }

    pub fn is_pin(self) -> bool {
        matches!(
            self,
            TokenKind::Pin | TokenKind::PinRange | TokenKind::PinRangeLength
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a token: 0-based line, 0-based start column, inclusive end column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenPosition {
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

impl TokenPosition {
    pub const fn new(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            line,
            start_column,
            end_column,
        }
    }
}

impl fmt::Display for TokenPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.line, self.start_column, self.end_column)
    }
}

/// A lexed token. Immutable once created.
///
/// Captured sub-groups are stored as byte ranges into [`Token::value`]. Group 1
/// holds the name or the first number, group 2 the second pin number of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    kind: TokenKind,
    position: TokenPosition,
    is_comment: bool,
    groups: Vec<Range<usize>>,
}

impl Token {
    pub(crate) fn new(
        value: impl Into<String>,
        kind: TokenKind,
        position: TokenPosition,
        groups: Vec<Range<usize>>,
    ) -> Self {
        Self {
            value: value.into(),
            kind,
            position,
            is_comment: kind == TokenKind::Comment,
            groups,
        }
    }

    /// Full matched text.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn position(&self) -> TokenPosition {
        self.position
    }

    pub fn is_comment(&self) -> bool {
        self.is_comment
    }

    /// Captured group `index`, counted from 1. Group 0 is the whole value.
    pub fn group(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.value);
        }
        self.groups
            .get(index - 1)
            .and_then(|range| self.value.get(range.clone()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) @ {}", self.kind, self.value, self.position)
    }
}
