//! Aligning freshly tokenized tweets with their annotations.
//!
//! Annotation files ship without the tweet words themselves (only
//! placeholders the annotators' tokenizer produced). The words are recovered
//! by tokenizing the crawled text and pairing its alphabetic tokens, in
//! order, with the alphabetic tokens of the annotation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotate::AnnotationRecord;
use crate::errors::{Result, TokenizerError};

/// Letters only (general category L). Combining marks do not count.
static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}+$").unwrap());

/// Non-empty and made of letters throughout.
pub fn is_alpha_token(token: &str) -> bool {
    LETTERS.is_match(token)
}

/// Substitute the fresh tokens into `record.tweet`.
///
/// Every alphabetic annotation token is replaced by the next alphabetic
/// fresh token; other annotation tokens are kept. A pair whose first
/// characters differ is an [`TokenizerError::AnnotationMismatch`]; running
/// out of fresh tokens is [`TokenizerError::AlignmentExhausted`].
pub fn align(id: &str, record: &AnnotationRecord, fresh_tokens: &[String]) -> Result<Vec<String>> {
    let mut fresh = fresh_tokens.iter().filter(|t| is_alpha_token(t));
    let mut aligned = Vec::with_capacity(record.tweet.len());

    for (position, annotated) in record.tweet.iter().enumerate() {
        if !is_alpha_token(annotated) {
            aligned.push(annotated.clone());
            continue;
        }

        let found = fresh.next().ok_or_else(|| TokenizerError::AlignmentExhausted {
            id: id.to_string(),
        })?;
        if found.chars().next() != annotated.chars().next() {
            return Err(TokenizerError::AnnotationMismatch {
                id: id.to_string(),
                position,
                expected: annotated.clone(),
                found: found.clone(),
            });
        }
        aligned.push(found.clone());
    }

    Ok(aligned)
}
