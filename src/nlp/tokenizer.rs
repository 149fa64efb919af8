//! Tweet tokenizer
//!
//! [`Tokenizer`] owns the lexical resources and runs the stage pipeline over
//! one text at a time. All per-call bookkeeping lives in a
//! [`PipelineContext`](crate::pipeline::context::PipelineContext), so a single
//! tokenizer can be shared freely between threads.

use std::path::Path;

use rayon::prelude::*;

use crate::config::TokenizerConfig;
use crate::errors::Result;
use crate::nlp::lexicon::LexicalResources;
use crate::pipeline::observer::{NoopObserver, PipelineObserver};
use crate::pipeline::runner::Pipeline;
use crate::types::Token;

/// Twitter-aware tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    resources: LexicalResources,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Tokenizer {
    pub fn new(resources: LexicalResources) -> Self {
        Self { resources }
    }

    /// Load the word lists from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(LexicalResources::from_dir(dir)?))
    }

    /// Use the word lists compiled into the crate.
    pub fn bundled() -> Self {
        Self::new(LexicalResources::bundled())
    }

    /// Resources from `config.resources_dir`, or the bundled lists when unset.
    pub fn from_config(config: &TokenizerConfig) -> Result<Self> {
        match &config.resources_dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::bundled()),
        }
    }

    pub fn resources(&self) -> &LexicalResources {
        &self.resources
    }

    /// Tokenize `text`. Never fails; empty or blank input yields no tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokenize_observed(text, &mut NoopObserver)
    }

    /// Tokenize with observer callbacks at every stage boundary.
    pub fn tokenize_observed(
        &self,
        text: &str,
        observer: &mut impl PipelineObserver,
    ) -> Vec<Token> {
        Pipeline::new(&self.resources).run(text, observer).tokens
    }

    /// Tokenize many texts in parallel. Output order matches input order.
    pub fn tokenize_batch<S>(&self, texts: &[S]) -> Vec<Vec<Token>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.tokenize(text.as_ref()))
            .collect()
    }
}
