//! Error types shared by the reader and the writer.
//!
//! Two classes of failure exist (plus stream I/O): grammar/protocol errors
//! (an invalid token for the current state, exceeded depth, mismatched
//! close) and data-format errors (malformed escapes, unparsable literals,
//! unterminated strings or comments). Both are fatal for the operation that
//! raised them; neither has a retry contract.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A positioned diagnostic attached to grammar and data errors.
///
/// Path and line/position are best-effort diagnostics, not part of the
/// data contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// JSON path (`a.b[2].c`) at the point of failure; may be empty.
    pub path: String,
    /// One-based line and zero-based position within the line, when the
    /// failing side tracks text positions (the reader does, the writer
    /// does not).
    pub position: Option<LinePosition>,
}

/// A line/position pair inside the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePosition {
    /// One-based line number.
    pub line: usize,
    /// Zero-based character offset within the line.
    pub position: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. Path '{}'", self.message, self.path)?;
        if let Some(pos) = self.position {
            write!(f, ", line {}, position {}", pos.line, pos.position)?;
        }
        write!(f, ".")
    }
}

/// The error type for reader and writer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A token was produced or consumed that the grammar state machine
    /// rejects, or a structural limit (depth, mismatched close) was
    /// violated. Never recoverable.
    #[error("{0}")]
    Grammar(Diagnostic),
    /// A literal could not be decoded: malformed escape, unparsable
    /// number or date, bad Base64/GUID, unterminated string or comment.
    #[error("{0}")]
    Data(Diagnostic),
    /// The underlying byte stream failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a grammar/protocol error.
    pub(crate) fn grammar(
        message: impl Into<String>,
        path: impl Into<String>,
        position: Option<LinePosition>,
    ) -> Self {
        Error::Grammar(Diagnostic {
            message: message.into(),
            path: path.into(),
            position,
        })
    }

    /// Builds a data-format error.
    pub(crate) fn data(
        message: impl Into<String>,
        path: impl Into<String>,
        position: Option<LinePosition>,
    ) -> Self {
        Error::Data(Diagnostic {
            message: message.into(),
            path: path.into(),
            position,
        })
    }

    /// The diagnostic carried by grammar and data errors, if any.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Grammar(d) | Error::Data(d) => Some(d),
            Error::Io(_) => None,
        }
    }

    /// Whether this is a grammar/protocol violation as opposed to a
    /// data-format or stream failure.
    #[must_use]
    pub fn is_grammar(&self) -> bool {
        matches!(self, Error::Grammar(_))
    }
}
