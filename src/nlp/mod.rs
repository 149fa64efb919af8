//! Natural Language Processing components
//!
//! This module provides the lexical resources and the tweet tokenizer.

pub mod lexicon;
pub mod tokenizer;
