//! Tokenized program model.
//!
//! A [`Program`] is immutable once built by the lexer. It keeps every source
//! line (including empty ones, so line indices match the source) and an index of
//! the lines that hold instructions.

use crate::parsing::token::{Token, TokenKind};
use std::collections::HashMap;

/// One source line and its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    index: usize,
    instruction_offset: usize,
    tokens: Vec<Token>,
    unparsed_column: Option<usize>,
}

impl Line {
    pub fn new(
        text: impl Into<String>,
        index: usize,
        instruction_offset: usize,
        tokens: Vec<Token>,
    ) -> Self {
        Self {
            text: text.into(),
            index,
            instruction_offset,
            tokens,
            unparsed_column: None,
        }
    }

    /// Marks the line as lexed only up to `column`.
    pub(crate) fn with_unparsed_column(mut self, column: Option<usize>) -> Self {
        self.unparsed_column = column;
        self
    }

    /// Raw source text, without the line separator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Absolute 0-based line index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of instruction lines strictly before this one.
    pub fn instruction_offset(&self) -> usize {
        self.instruction_offset
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Column where lexing failed, if it did. Tokens past it are missing.
    pub fn unparsed_column(&self) -> Option<usize> {
        self.unparsed_column
    }

    pub fn is_incomplete(&self) -> bool {
        self.unparsed_column.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn first_kind(&self) -> Option<TokenKind> {
        self.tokens.first().map(Token::kind)
    }

    pub fn is_instruction(&self) -> bool {
        self.first_kind() == Some(TokenKind::Instruction)
    }

    pub fn is_label(&self) -> bool {
        self.first_kind() == Some(TokenKind::Label)
    }

    /// True if the only token is a comment.
    pub fn is_comment(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0].is_comment()
    }

    /// Instruction name, when this is an instruction line.
    pub fn instruction_name(&self) -> Option<&str> {
        if self.is_instruction() {
            self.tokens[0].group(1)
        } else {
            None
        }
    }

    /// Declared label name, when this is a label line.
    pub fn label_name(&self) -> Option<&str> {
        if self.is_label() {
            self.tokens[0].group(1)
        } else {
            None
        }
    }

    /// Tokens after the leading instruction or label, without comments.
    pub fn arguments(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .skip(1)
            .filter(|t| !t.is_comment())
            .cloned()
            .collect()
    }

    /// Kinds of all tokens on the line, in order.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(Token::kind).collect()
    }

    /// Inclusive column of the last character, or 0 for an empty line.
    pub fn end_column(&self) -> usize {
        self.text.chars().count().saturating_sub(1)
    }
}

/// A tokenized program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    lines: Vec<Line>,
    instruction_lines: Vec<usize>,
    labels: HashMap<String, usize>,
}

impl Program {
    pub fn new(lines: Vec<Line>) -> Self {
        let instruction_lines = lines
            .iter()
            .filter(|l| l.is_instruction())
            .map(Line::index)
            .collect();

        let mut labels = HashMap::new();
        for line in &lines {
            if let Some(name) = line.label_name() {
                labels.entry(name.to_string()).or_insert(line.index());
            }
        }

        Self {
            lines,
            instruction_lines,
            labels,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Lines whose first token is an instruction, in source order.
    pub fn instruction_lines(&self) -> impl Iterator<Item = &Line> {
        self.instruction_lines.iter().map(|i| &self.lines[*i])
    }

    pub fn instruction_count(&self) -> usize {
        self.instruction_lines.len()
    }

    /// Index of the last instruction line, or `None` if there are no instructions.
    pub fn last_instruction_index(&self) -> Option<usize> {
        self.instruction_lines.last().copied()
    }

    /// Line index of label `name`. The first declaration wins.
    pub fn label_line(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Raw source lines.
    pub fn source_lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(Line::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::utils::tokenize_with_comments;

    #[test]
    fn line_flags() {
        let program = tokenize_with_comments(":top\nadd 1 ; c\n\n; note\n");
        let lines = program.lines();

        assert!(lines[0].is_label());
        assert_eq!(lines[0].label_name(), Some("top"));
        assert!(lines[1].is_instruction());
        assert_eq!(lines[1].instruction_name(), Some("add"));
        assert_eq!(lines[1].arguments().len(), 1);
        assert!(lines[2].is_empty());
        assert!(lines[3].is_comment());
        assert!(!lines[3].is_instruction());
        assert!(lines[4].is_empty());
    }

    #[test]
    fn instruction_index() {
        let program = tokenize_with_comments("; head\nadd 1\n:xx\nsub 1\n");
        let indices: Vec<usize> = program.instruction_lines().map(Line::index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(program.instruction_count(), 2);
        assert_eq!(program.last_instruction_index(), Some(3));
    }

    #[test]
    fn instruction_offset_counts_prior_instructions() {
        let program = tokenize_with_comments("add 1\n:xx\nadd 2\nadd 3");
        for line in program.instruction_lines() {
            let before = program.lines()[..line.index()]
                .iter()
                .filter(|l| l.is_instruction())
                .count();
            assert_eq!(line.instruction_offset(), before);
        }
    }

    #[test]
    fn no_instructions() {
        let program = tokenize_with_comments(":ab\n; nothing");
        assert_eq!(program.last_instruction_index(), None);
    }

    #[test]
    fn first_label_declaration_wins() {
        let program = tokenize_with_comments(":dup\nadd 1\n:dup\nadd 2");
        assert_eq!(program.label_line("dup"), Some(0));
        assert_eq!(program.label_line("missing"), None);
    }

    #[test]
    fn source_lines_round_trip() {
        let program = tokenize_with_comments("add 1\r\nsub 2");
        assert_eq!(program.source_lines().collect::<Vec<_>>(), vec!["add 1", "sub 2"]);
    }
}
