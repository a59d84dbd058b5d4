//! # Diagnostics
//!
//! Fatal-error reporting shared by every stage of the pipeline. A
//! [`Diagnostic`] always carries a [`Span`] pointing back into the original
//! source buffer, and printing one is always followed by `exit(1)` — this
//! compiler does not attempt error recovery.

use std::process;

/// A location in the source buffer, used both to pick tokens apart and to
/// point a caret at the right column in a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, col: usize) -> Self {
        Self { start, end, line, col }
    }
}

/// Kind of fatal error, spanning the lexical/syntactic/semantic/runtime
/// taxonomy from the specification. Carried mainly for tests; the message
/// string is what actually reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Lexical
    UnterminatedString,
    UnterminatedComment,
    UnrecognizedByte,
    // Syntactic
    ExpectedToken,
    ExpectedIdent,
    ExpectedNumber,
    // Semantic
    UndefinedVariable,
    UnknownTag,
    UnknownType,
    NotAnLvalue,
    InvalidDeref,
    InvalidOperands,
    NotAStruct,
    NoSuchMember,
    VoidStmtExpr,
    // Runtime/bounds
    StringTooLarge,
}

/// A fatal diagnostic: source location plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self { kind, message: message.into(), span }
    }

    /// Render this diagnostic against `path`'s source text and abort the
    /// process with status 1. Never returns.
    ///
    /// Format:
    /// ```text
    /// foo.c:3: int a = ;
    ///                  ^ expected an expression
    /// ```
    pub fn fatal(&self, path: &str, source: &str) -> ! {
        eprintln!("{}", self.render(path, source));
        process::exit(1);
    }

    /// Build the two-line rendering without exiting, for testability.
    pub fn render(&self, path: &str, source: &str) -> String {
        let line_text = source.lines().nth(self.span.line.saturating_sub(1)).unwrap_or("");
        let mut out = String::new();
        out.push_str(&format!("{path}:{}: {line_text}\n", self.span.line));
        let pad = " ".repeat(self.span.col.saturating_sub(1));
        out.push_str(&format!("{pad}^ {}", self.message));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_caret_at_column() {
        let span = Span::new(8, 9, 1, 9);
        let diag = Diagnostic::new(ErrorKind::ExpectedToken, "expected ';'", span);
        let rendered = diag.render("foo.c", "int a = 1\n");
        assert_eq!(rendered, "foo.c:1: int a = 1\n        ^ expected ';'");
    }

    #[test]
    fn renders_against_correct_line_in_multiline_source() {
        let span = Span::new(0, 1, 2, 5);
        let diag = Diagnostic::new(ErrorKind::UndefinedVariable, "undefined variable 'x'", span);
        let rendered = diag.render("foo.c", "int main() {\n    x;\n}\n");
        assert_eq!(rendered, "foo.c:2:     x;\n    ^ undefined variable 'x'");
    }
}
