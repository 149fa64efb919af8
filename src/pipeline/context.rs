//! Per-call pipeline state.
//!
//! A [`PipelineContext`] is created at the start of every `tokenize` call and
//! threaded through all stages. It owns the working text, the mask tables, the
//! occurrence flags and the protected period runs, so nothing about one call is visible to another.

use crate::masking::MaskTables;
use crate::types::Token;

/// Which conditional unmasking passes must run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrenceFlags {
    /// At least one `#` or `@` word was masked
    pub hashtags_or_mentions: bool,
    /// At least one punctuation run was masked
    pub repeated_punctuation: bool,
}

/// Mutable state flowing between stages for a single call.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Working text, rewritten by every stage up to the final split
    pub text: String,
    pub tables: MaskTables,
    pub flags: OccurrenceFlags,
    /// Lengths of the period runs protected by base tokenization, indexed by
    /// marker id
    pub dot_runs: Vec<usize>,
    /// Filled by the final split stage
    pub tokens: Vec<Token>,
}

impl PipelineContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tables: MaskTables::new(),
            flags: OccurrenceFlags::default(),
            dot_runs: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Consume the context, keeping only the output tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}
