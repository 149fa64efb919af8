//! Error types
//!
//! Tokenization itself never fails; errors only come from loading lexical
//! resources, reading configuration, and the collaborators that feed the
//! tokenizer (tweet sources, annotation alignment, edit files).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TokenizerError>;

/// Everything that can go wrong outside of `tokenize`.
#[derive(Debug, Error)]
pub enum TokenizerError {
    /// A lexical resource file is missing or unreadable. Fatal to tokenizer
    /// construction.
    #[error("failed to load lexical resource {path}: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration was parsed but is not usable.
    #[error("invalid configuration at {path}: {message}")]
    Config { path: String, message: String },

    /// Configuration or annotation JSON could not be parsed.
    #[error("malformed JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A tweet id has no text and the annotation does not mark it deleted.
    #[error("tweet not found :: t_id {id}")]
    TweetNotFound { id: String },

    /// The first characters of an aligned token pair differ.
    #[error(
        "annotation mismatch :: t_id {id} :: token {position}: \
         annotated {expected:?}, tokenized {found:?}"
    )]
    AnnotationMismatch {
        id: String,
        position: usize,
        expected: String,
        found: String,
    },

    /// The fresh token stream ran out of alphabetic tokens before the
    /// annotation did.
    #[error("annotation mismatch :: t_id {id} :: tokenized text has too few words")]
    AlignmentExhausted { id: String },

    #[error("malformed edit on line {line}: {message}")]
    MalformedEdit { line: usize, message: String },
}

impl TokenizerError {
    /// Whether the error only affects one record and processing may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TweetNotFound { .. }
                | Self::AnnotationMismatch { .. }
                | Self::AlignmentExhausted { .. }
        )
    }
}
