//! Error types for frequency table extraction.
//!
//! Errors are split into two tiers:
//!
//! - **`Error`**: Top-level errors that abort an extraction or a storage call
//! - **`ParseError`**: File-level errors recorded on a [`SourceItem`](crate::SourceItem)
//!   that never abort anything on their own
//!
//! Whether recorded parse errors end an extraction is decided by the
//! [`ParsePolicy`](crate::ParsePolicy) of the processor, not by the parser stage.
//!
//! `ParseErrorKind` uses a 4xx/5xx style categorization:
//! - Input problems (the repository's fault): syntax errors
//! - Internal problems (our fault): unreadable files, grammar setup failures

use thiserror::Error;

use crate::processor::Stage;
use crate::retrieval::RetrievalError;
use crate::source::Position;

/// Result type for freqtable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
///
/// Display strings describe what failed without naming pipeline stages; use
/// [`Error::stage`] to find out where an extraction stopped.
#[derive(Debug, Error)]
pub enum Error {
    /// The repository could not be cloned, listed or read.
    #[error("error cloning repository {url}")]
    Retrieval {
        /// Locator of the repository.
        url: String,
        /// What the retrieval collaborator reported.
        #[source]
        source: RetrievalError,
    },

    /// At least one file failed to parse and the parse policy treats that as fatal.
    #[error("failed to parse {} of {total} files in {url}", .errors.len())]
    Parse {
        /// Locator of the repository.
        url: String,
        /// Every recorded parse failure, in collection order.
        errors: Vec<ParseError>,
        /// Number of files that went through parsing.
        total: usize,
    },

    /// The extraction was cancelled by the caller.
    #[error("extraction of {url} was cancelled")]
    Cancelled {
        /// Locator of the repository.
        url: String,
        /// Stage the cancellation was observed in.
        stage: Stage,
    },

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No frequency table exists with the given identifier.
    #[error("frequency table not found: {0}")]
    TableNotFound(i64),

    /// A mandatory field was empty.
    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),

    /// Invalid configuration or arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// A worker panicked or an invariant of the pipeline was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The pipeline stage a failed extraction stopped in.
    ///
    /// Returns `None` for errors that do not come from the extraction pipeline.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Retrieval { .. } => Some(Stage::Retrieving),
            Self::Parse { .. } => Some(Stage::Aggregating),
            Self::Cancelled { stage, .. } => Some(*stage),
            Self::Database(_)
            | Self::TableNotFound(_)
            | Self::MissingField(_)
            | Self::Config(_)
            | Self::Internal(_) => None,
        }
    }
}

/// Error recorded on a single source file.
///
/// These errors are collected during parsing but don't halt the stage.
/// The processor decides afterwards what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Name of the file that failed.
    pub file: String,
    /// Where the problem was found, when it is known.
    pub position: Option<Position>,
    /// Category of the error.
    pub kind: ParseErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{position}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}: {}", self.file, self.kind, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Categorization of per-file errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// Source file is not syntactically valid for the grammar
    Syntax,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// The retrieval collaborator could not provide the file contents
    Unreadable,

    /// The parser could not be set up or gave up without producing a tree
    Parser,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax error"),
            Self::Unreadable => write!(f, "unreadable file"),
            Self::Parser => write!(f, "parser failure"),
        }
    }
}

impl ParseErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Syntax)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Unreadable | Self::Parser)
    }
}

impl ParseError {
    /// Create a new per-file error.
    #[must_use]
    pub fn new(file: impl Into<String>, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            position: None,
            kind,
            message: message.into(),
        }
    }

    /// Create a syntax error located at `position`.
    #[must_use]
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self {
            file: position.file.clone(),
            position: Some(position),
            kind: ParseErrorKind::Syntax,
            message: message.into(),
        }
    }

    /// Create an error for a file the retrieval collaborator could not read.
    #[must_use]
    pub fn unreadable(file: impl Into<String>, error: &RetrievalError) -> Self {
        Self::new(file, ParseErrorKind::Unreadable, error.to_string())
    }
}
