//! Parse errors
//!
//! Every variant is fatal to the file being parsed.

use gradlegraph_core::{Diagnostic, DiagnosticCode, Location, Severity};

/// Why a piece of text does not fit the report grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarIssue {
    #[error("expected 2 or 3 ':'-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("empty group or artifact id")]
    EmptyField,

    #[error("neither a specified nor a resolved version")]
    NoVersion,

    #[error("more than one '->' in version text")]
    AmbiguousArrow,

    #[error("root declaration without a quoted project name")]
    RootName,
}

/// Fatal error while parsing one report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: {issue}: {text:?}")]
    Grammar {
        line: usize,
        text: String,
        issue: GrammarIssue,
    },

    #[error("line {line}: indentation does not reach a '+' or '\\' marker: {text:?}")]
    MalformedIndentation { line: usize, text: String },

    #[error("line {line}: depth {depth} skips a level (deepest open level is {open})")]
    DepthSkipped {
        line: usize,
        depth: usize,
        open: usize,
    },

    #[error("line {line}: dependency before any root project declaration")]
    MissingRoot { line: usize },
}

impl ParseError {
    /// 1-indexed input line the error refers to
    pub fn line(&self) -> usize {
        match self {
            Self::Grammar { line, .. }
            | Self::MalformedIndentation { line, .. }
            | Self::DepthSkipped { line, .. }
            | Self::MissingRoot { line } => *line,
        }
    }

    /// Stable diagnostic code for this error
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Grammar { .. } => DiagnosticCode::GrammarError,
            Self::MalformedIndentation { .. }
            | Self::DepthSkipped { .. }
            | Self::MissingRoot { .. } => DiagnosticCode::MalformedIndentation,
        }
    }

    /// Convert to a diagnostic located in `file`
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let diag = Diagnostic::new(self.code(), Severity::Error, self.to_string())
            .with_location(Location::with_line(file, self.line()));

        match self {
            Self::Grammar { text, .. } | Self::MalformedIndentation { text, .. } => {
                diag.with_snippet(text.clone())
            }
            _ => diag,
        }
    }
}
