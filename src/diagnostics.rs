//! Accumulating diagnostics produced by tokenization, validation and execution.
//!
//! Problems with user input never unwind across the public API. They are
//! appended to a [`Diagnostics`] sink passed in by the caller, who then decides
//! whether to proceed based on [`Diagnostics::is_ok`].

use std::fmt;
use std::fmt::Write;

/// How serious a diagnostic is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single problem located in the source text.
///
/// `line` and both columns are 0-based; `end_column` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        message: impl Into<String>,
        line: usize,
        start_column: usize,
        end_column: usize,
        severity: Severity,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            start_column,
            end_column,
            severity,
        }
    }

    /// Formats this diagnostic against the source it refers to, underlining the span.
    ///
    /// Line and column numbers are printed 1-based.
    pub fn render(&self, file: &str, source: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.severity, self.message);
        let _ = writeln!(
            out,
            " --> {}:{}:{}",
            file,
            self.line + 1,
            self.start_column + 1
        );

        if let Some(raw_line) = source_line(source, self.line) {
            let width = self.end_column.saturating_sub(self.start_column) + 1;
            let _ = writeln!(out, "  |");
            let _ = writeln!(out, "{:>4} | {}", self.line + 1, raw_line);
            let _ = writeln!(
                out,
                "  | {}{}",
                " ".repeat(self.start_column),
                "^".repeat(width)
            );
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}:{}-{}]: {}",
            self.severity, self.line, self.start_column, self.end_column, self.message
        )
    }
}

/// Returns line `index` of `source`, splitting on `\r\n`, `\r` and `\n`.
fn source_line(source: &str, index: usize) -> Option<&str> {
    crate::parsing::lexer::split_lines(source).into_iter().nth(index)
}

/// Append-only collection of [`Diagnostic`]s with a tracked highest severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    highest: Option<Severity>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.highest = self.highest.max(Some(diagnostic.severity));
        self.entries.push(diagnostic);
    }

    /// Appends an [`Severity::Error`] diagnostic.
    pub fn error(
        &mut self,
        message: impl Into<String>,
        line: usize,
        start_column: usize,
        end_column: usize,
    ) {
        self.push(Diagnostic::new(
            message,
            line,
            start_column,
            end_column,
            Severity::Error,
        ));
    }

    /// Appends a [`Severity::Warning`] diagnostic.
    pub fn warning(
        &mut self,
        message: impl Into<String>,
        line: usize,
        start_column: usize,
        end_column: usize,
    ) {
        self.push(Diagnostic::new(
            message,
            line,
            start_column,
            end_column,
            Severity::Warning,
        ));
    }

    /// Appends all entries of `other`, preserving order.
    pub fn extend(&mut self, other: Diagnostics) {
        for diagnostic in other.entries {
            self.push(diagnostic);
        }
    }

    /// Highest severity recorded so far, or `None` when empty.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.highest
    }

    /// True when no [`Severity::Error`] entry has been recorded.
    pub fn is_ok(&self) -> bool {
        self.highest < Some(Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Entries at exactly `severity`.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    /// Renders every entry against `source`, separated by blank lines.
    pub fn render(&self, file: &str, source: &str) -> String {
        self.entries
            .iter()
            .map(|d| d.render(file, source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
