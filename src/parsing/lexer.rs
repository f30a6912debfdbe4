//! Line-oriented tokenizer.
//!
//! Each line is scanned left to right. At every position the token rules are
//! tried in priority order ([`TokenKind::ALL`]) and the first rule that matches
//! a non-empty prefix wins. Rules marked first-only (labels, instruction names)
//! are skipped once a token has been accepted on the line.

use crate::debug;
use crate::diagnostics::Diagnostics;
use crate::parsing::program::{Line, Program};
use crate::parsing::token::{Token, TokenKind, TokenPosition};
use std::ops::Range;

/// Message attached to a position no rule could match.
pub const UNPARSABLE_LINE: &str = "Unable to parse remainder of line";

/// Splits `source` on `\r\n`, `\r` and `\n`, keeping empty lines.
pub fn split_lines(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&source[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&source[start..]);
    lines
}

/// Result of a successful rule match: length and capture groups, both in chars.
struct RuleMatch {
    len: usize,
    groups: Vec<Range<usize>>,
}

impl RuleMatch {
    fn new(len: usize, groups: Vec<Range<usize>>) -> Option<Self> {
        (len > 0).then_some(Self { len, groups })
    }
}

type Matcher = fn(&[char]) -> Option<RuleMatch>;

struct TokenRule {
    kind: TokenKind,
    must_be_first: bool,
    matcher: Matcher,
}

const fn rule(kind: TokenKind, must_be_first: bool, matcher: Matcher) -> TokenRule {
    TokenRule {
        kind,
        must_be_first,
        matcher,
    }
}

/// Token rules in priority order. Must stay aligned with [`TokenKind::ALL`].
static RULES: [TokenRule; 12] = [
    rule(TokenKind::Label, true, match_label),
    rule(TokenKind::Instruction, true, match_instruction),
    rule(TokenKind::Register, false, match_register),
    rule(TokenKind::LabelArg, false, match_label_arg),
    rule(TokenKind::PinRange, false, match_pin_range),
    rule(TokenKind::PinRangeLength, false, match_pin_range_length),
    rule(TokenKind::Pin, false, match_pin),
    rule(TokenKind::Binary, false, match_binary),
    rule(TokenKind::Hex, false, match_hex),
    rule(TokenKind::Integer, false, match_integer),
    rule(TokenKind::Whitespace, false, match_whitespace),
    rule(TokenKind::Comment, false, match_comment),
];

// ==================== Scanning helpers ====================

/// Length of the leading run of chars satisfying `pred`.
fn run_len(input: &[char], pred: impl Fn(char) -> bool) -> usize {
    input.iter().take_while(|c| pred(**c)).count()
}

/// Length of `prefix` if `input` starts with it.
fn literal(input: &[char], prefix: &str) -> Option<usize> {
    let mut n = 0;
    for expected in prefix.chars() {
        if input.get(n) != Some(&expected) {
            return None;
        }
        n += 1;
    }
    Some(n)
}

fn digits(input: &[char]) -> usize {
    run_len(input, |c| c.is_ascii_digit())
}

/// An ASCII letter followed by at least one `[A-Za-z0-9_]`.
fn identifier(input: &[char]) -> usize {
    match input.first() {
        Some(c) if c.is_ascii_alphabetic() => {
            let rest = run_len(&input[1..], |c| c.is_ascii_alphanumeric() || c == '_');
            if rest == 0 { 0 } else { rest + 1 }
        }
        _ => 0,
    }
}

/// `.p` followed by digits. Returns the end of the digits.
fn pin_prefix(input: &[char]) -> Option<usize> {
    let start = literal(input, ".p")?;
    let n = digits(&input[start..]);
    (n > 0).then_some(start + n)
}

// ==================== Rules ====================

fn match_label(input: &[char]) -> Option<RuleMatch> {
    let start = literal(input, ":")?;
    let n = identifier(&input[start..]);
    if n == 0 {
        return None;
    }
    RuleMatch::new(start + n, vec![start..start + n])
}

fn match_instruction(input: &[char]) -> Option<RuleMatch> {
    let n = run_len(input, |c| c.is_ascii_alphabetic());
    RuleMatch::new(n, vec![0..n])
}

fn match_register(input: &[char]) -> Option<RuleMatch> {
    let start = literal(input, "$")?;
    let n = run_len(&input[start..], |c| c.is_ascii_alphanumeric());
    if n == 0 {
        return None;
    }
    RuleMatch::new(start + n, vec![start..start + n])
}

fn match_label_arg(input: &[char]) -> Option<RuleMatch> {
    let n = identifier(input);
    RuleMatch::new(n, vec![0..n])
}

fn match_pin_range(input: &[char]) -> Option<RuleMatch> {
    let first_end = pin_prefix(input)?;
    let sep = literal(&input[first_end..], "..p")?;
    let second_start = first_end + sep;
    let n = digits(&input[second_start..]);
    if n == 0 {
        return None;
    }
    RuleMatch::new(
        second_start + n,
        vec![2..first_end, second_start..second_start + n],
    )
}

fn match_pin_range_length(input: &[char]) -> Option<RuleMatch> {
    let first_end = pin_prefix(input)?;
    let len_start = first_end + literal(&input[first_end..], ":")?;
    match input.get(len_start) {
        Some(c) if ('1'..='9').contains(c) => {
            let n = 1 + digits(&input[len_start + 1..]);
            RuleMatch::new(len_start + n, vec![2..first_end, len_start..len_start + n])
        }
        _ => None,
    }
}

fn match_pin(input: &[char]) -> Option<RuleMatch> {
    let end = pin_prefix(input)?;
    RuleMatch::new(end, vec![2..end])
}

fn match_binary(input: &[char]) -> Option<RuleMatch> {
    let start = literal(input, "0b")?;
    let body = &input[start..];
    if !matches!(body.first(), Some('0' | '1')) {
        return None;
    }
    let mut n = run_len(body, |c| matches!(c, '0' | '1' | '_'));
    while body[n - 1] == '_' {
        n -= 1;
    }
    RuleMatch::new(start + n, vec![start..start + n])
}

fn match_hex(input: &[char]) -> Option<RuleMatch> {
    let start = literal(input, "0x")?;
    let n = run_len(&input[start..], |c| c.is_ascii_hexdigit());
    if n == 0 {
        return None;
    }
    RuleMatch::new(start + n, vec![start..start + n])
}

fn match_integer(input: &[char]) -> Option<RuleMatch> {
    let n = digits(input);
    RuleMatch::new(n, vec![0..n])
}

fn match_whitespace(input: &[char]) -> Option<RuleMatch> {
    RuleMatch::new(run_len(input, |c| c == ' ' || c == '\t'), vec![])
}

fn match_comment(input: &[char]) -> Option<RuleMatch> {
    match input.first() {
        Some(';' | '#') => RuleMatch::new(input.len(), vec![0..input.len()]),
        _ => None,
    }
}

/// Converts char ranges within `chars` to byte ranges within the collected string.
fn byte_range(chars: &[char], range: &Range<usize>) -> Range<usize> {
    let offset = |end: usize| chars[..end].iter().map(|c| c.len_utf8()).sum::<usize>();
    offset(range.start)..offset(range.end)
}

// ==================== Lexer ====================

/// Tokenizer configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexer {
    include_comments: bool,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit trailing comments as [`TokenKind::Comment`] tokens instead of dropping them.
    pub fn include_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Tokenizes `source` into a [`Program`].
    ///
    /// Lexical problems are appended to `errors`. A line that cannot be fully
    /// matched keeps the tokens found before the failing column.
    pub fn tokenize(&self, source: &str, errors: &mut Diagnostics) -> Program {
        let mut lines = Vec::new();
        let mut instruction_offset = 0;

        for (index, text) in split_lines(source).into_iter().enumerate() {
            let (tokens, unparsed) = self.tokenize_line(text, index, errors);
            let line =
                Line::new(text, index, instruction_offset, tokens).with_unparsed_column(unparsed);
            if line.is_instruction() {
                instruction_offset += 1;
            }
            lines.push(line);
        }

        Program::new(lines)
    }

    /// Tokens of one line, plus the column where matching failed, if any.
    fn tokenize_line(
        &self,
        text: &str,
        line: usize,
        errors: &mut Diagnostics,
    ) -> (Vec<Token>, Option<usize>) {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut column = 0;

        while column < chars.len() {
            let rest = &chars[column..];
            let found = RULES
                .iter()
                .filter(|r| !r.must_be_first || tokens.is_empty())
                .find_map(|r| (r.matcher)(rest).map(|m| (r.kind, m)));

            let Some((kind, m)) = found else {
                debug!("line {line}: no token rule matches at column {column}");
                errors.error(UNPARSABLE_LINE, line, column, chars.len() - 1);
                return (tokens, Some(column));
            };

            match kind {
                TokenKind::Whitespace => {}
                TokenKind::Comment if !self.include_comments => break,
                _ => {
                    let matched = &rest[..m.len];
                    let groups = m.groups.iter().map(|g| byte_range(matched, g)).collect();
                    let position = TokenPosition::new(line, column, column + m.len - 1);
                    tokens.push(Token::new(
                        matched.iter().collect::<String>(),
                        kind,
                        position,
                        groups,
                    ));
                }
            }
            column += m.len;
        }

        (tokens, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(source: &str, lexer: Lexer) -> Vec<Vec<TokenKind>> {
        let mut errors = Diagnostics::new();
        let program = lexer.tokenize(source, &mut errors);
        assert!(errors.is_ok(), "{errors}");
        program.lines().iter().map(|l| l.kinds()).collect()
    }

    #[test]
    fn split_keeps_empty_lines() {
        assert_eq!(split_lines("a\r\n\r\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }

    #[test]
    fn line_separator_invariance() {
        let variants = [
            "mov $reg1 $reg0\r\n\r\nmov $reg0 $reg1",
            "mov $reg1 $reg0\r\rmov $reg0 $reg1",
            "mov $reg1 $reg0\n\nmov $reg0 $reg1",
        ];
        let counts: Vec<usize> = variants
            .iter()
            .map(|src| Lexer::new().tokenize(src, &mut Diagnostics::new()).lines().len())
            .collect();
        assert_eq!(counts, vec![3, 3, 3]);
    }

    #[test]
    fn token_positions() {
        let mut errors = Diagnostics::new();
        let program = Lexer::new().tokenize("mov $reg1 $reg0\r\nmov $reg0 $reg1", &mut errors);
        assert!(errors.is_empty());
        assert_eq!(program.lines().len(), 2);

        for (index, line) in program.lines().iter().enumerate() {
            let positions: Vec<TokenPosition> =
                line.tokens().iter().map(|t| t.position()).collect();
            assert_eq!(
                positions,
                vec![
                    TokenPosition::new(index, 0, 2),
                    TokenPosition::new(index, 4, 8),
                    TokenPosition::new(index, 10, 14),
                ]
            );
        }
    }

    #[test]
    fn token_kind_zoo() {
        let source = ":start\n\nmov $r0 $named\nstp .p0 .p1..p4 .p0:8\njmp start 0xFF 12 0b1010 ; done\n# only a comment";
        let kinds = kinds_of(source, Lexer::new().include_comments(true));
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                vec![Label],
                vec![],
                vec![Instruction, Register, Register],
                vec![Instruction, Pin, PinRange, PinRangeLength],
                vec![Instruction, LabelArg, Hex, Integer, Binary, Comment],
                vec![Comment],
            ]
        );
    }

    #[test]
    fn comments_dropped_by_default() {
        let kinds = kinds_of("add 1 ; trailing\n; alone", Lexer::new());
        assert_eq!(
            kinds,
            vec![vec![TokenKind::Instruction, TokenKind::Integer], vec![]]
        );
    }

    #[test]
    fn comment_token_is_flagged() {
        let program = Lexer::new()
            .include_comments(true)
            .tokenize("add 1 # note", &mut Diagnostics::new());
        let comment = &program.lines()[0].tokens()[2];
        assert!(comment.is_comment());
        assert_eq!(comment.value(), "# note");
        assert_eq!(comment.position(), TokenPosition::new(0, 6, 11));
    }

    #[test]
    fn captures() {
        let program = Lexer::new().tokenize(
            ":loop_1\nldp $acc .p12:4\nstp .p1..p3 0b1_0_\nbeq loop_1 0x1f 7",
            &mut Diagnostics::new(),
        );
        let lines = program.lines();
        assert_eq!(lines[0].tokens()[0].group(1), Some("loop_1"));
        assert_eq!(lines[1].tokens()[0].group(1), Some("ldp"));
        assert_eq!(lines[1].tokens()[1].group(1), Some("acc"));
        assert_eq!(lines[1].tokens()[2].group(1), Some("12"));
        assert_eq!(lines[1].tokens()[2].group(2), Some("4"));
        assert_eq!(lines[2].tokens()[1].group(2), Some("3"));
        assert_eq!(lines[3].tokens()[1].group(1), Some("loop_1"));
        assert_eq!(lines[3].tokens()[2].group(1), Some("1f"));
    }

    #[test]
    fn binary_trailing_underscore_is_not_consumed() {
        let mut errors = Diagnostics::new();
        let program = Lexer::new().tokenize("add 0b10_", &mut errors);
        let binary = &program.lines()[0].tokens()[1];
        assert_eq!(binary.value(), "0b10");
        assert_eq!(binary.group(1), Some("10"));
        // the dangling underscore is not a token
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn instruction_only_first() {
        // a bare name after the first token is a label argument, never an instruction
        let kinds = kinds_of("jmp end", Lexer::new());
        assert_eq!(kinds[0], vec![TokenKind::Instruction, TokenKind::LabelArg]);
    }

    #[test]
    fn unparsable_remainder_keeps_prefix_tokens() {
        let mut errors = Diagnostics::new();
        let program = Lexer::new().tokenize("mov $r0 @@@\nadd 1", &mut errors);

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.message, UNPARSABLE_LINE);
        assert_eq!((error.line, error.start_column, error.end_column), (0, 8, 10));
        assert!(!errors.is_ok());

        assert_eq!(program.lines()[0].tokens().len(), 2);
        assert_eq!(program.lines()[0].unparsed_column(), Some(8));
        // later lines are still tokenized
        assert_eq!(program.lines()[1].tokens().len(), 2);
        assert!(!program.lines()[1].is_incomplete());
    }

    #[test]
    fn single_letter_label_is_rejected() {
        let mut errors = Diagnostics::new();
        let program = Lexer::new().tokenize(":a
:ab", &mut errors);

        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!((error.line, error.start_column), (0, 0));
        assert!(program.lines()[0].is_empty());
        assert!(program.lines()[0].is_incomplete());
        assert_eq!(program.lines()[1].label_name(), Some("ab"));
    }

    #[test]
    fn columns_count_chars() {
        let program = Lexer::new()
            .include_comments(true)
            .tokenize("; é\nadd 1 ;ü x", &mut Diagnostics::new());
        let comment = &program.lines()[1].tokens()[2];
        assert_eq!(comment.position(), TokenPosition::new(1, 6, 9));
        assert_eq!(comment.group(1), Some(";ü x"));
    }

    #[test]
    fn tokenization_is_idempotent() {
        let source = ":top\nadd $r0 3\nbeq top $acc 0x10";
        let first = Lexer::new().tokenize(source, &mut Diagnostics::new());
        let second = Lexer::new().tokenize(source, &mut Diagnostics::new());
        assert_eq!(first, second);
    }

    #[test]
    fn instruction_offsets() {
        let program = Lexer::new().tokenize(":top\nadd 1\n\nsub 2", &mut Diagnostics::new());
        let offsets: Vec<usize> = program.lines().iter().map(|l| l.instruction_offset()).collect();
        assert_eq!(offsets, vec![0, 0, 1, 1]);
    }
}
