//! Annotation processing
//!
//! Rebuilds a CoNLL-style annotated corpus from tweet ids: crawl the tweets,
//! apply the text edits, tokenize, align the tokens with the stored
//! annotation and write one block per tweet.

pub mod align;
pub mod edits;

use std::fs;
use std::io::Write;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TokenizerError};
use crate::nlp::tokenizer::Tokenizer;

pub use align::align;
pub use edits::Edits;

/// Column placeholder for an empty field.
const EMPTY: &str = "_";

/// Stored annotation of one tweet. All columns are token-parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(default)]
    pub tweet: Vec<String>,
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub norm: Vec<String>,
    #[serde(default)]
    pub pos: Vec<String>,
    #[serde(default)]
    pub cpos: Vec<String>,
    #[serde(default)]
    pub chunk: Vec<String>,
    #[serde(default)]
    pub parent: Vec<String>,
    #[serde(default)]
    pub drel: Vec<String>,
    #[serde(default)]
    pub lid: Vec<String>,
    /// Tweet no longer exists upstream
    #[serde(default)]
    pub deleted: bool,
}

/// Annotation file: a JSON object mapping tweet id to record.
pub type AnnotationMap = FxHashMap<String, AnnotationRecord>;

pub fn load_annotations(path: impl AsRef<Path>) -> Result<AnnotationMap> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Render `record` as tab-separated rows:
/// `id tweet norm pos cpos chunk parent drel lid _`.
///
/// A `_` norm falls back to the tweet token. Rows stop at the shortest
/// column. No trailing newline.
pub fn to_conll(record: &AnnotationRecord) -> String {
    let columns = [
        &record.ids,
        &record.tweet,
        &record.norm,
        &record.pos,
        &record.cpos,
        &record.chunk,
        &record.parent,
        &record.drel,
        &record.lid,
    ];
    let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);

    (0..rows)
        .map(|i| {
            let norm = match record.norm[i].as_str() {
                EMPTY => record.tweet[i].as_str(),
                other => other,
            };
            [
                record.ids[i].as_str(),
                record.tweet[i].as_str(),
                norm,
                record.pos[i].as_str(),
                record.cpos[i].as_str(),
                record.chunk[i].as_str(),
                record.parent[i].as_str(),
                record.drel[i].as_str(),
                record.lid[i].as_str(),
                EMPTY,
            ]
            .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Counts from one [`process_annotations`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Align and write every id in `ids`, in order.
///
/// Records that cannot be rebuilt (tweet missing and not marked deleted,
/// misaligned, or absent from `annotations`) are logged and skipped. A
/// deleted tweet with no text is written from the annotation as stored.
/// Only I/O errors on `out` abort the run.
pub fn process_annotations<W: Write>(
    tokenizer: &Tokenizer,
    ids: &[String],
    tweets: &FxHashMap<String, String>,
    annotations: &AnnotationMap,
    edits: &Edits,
    out: &mut W,
) -> Result<ProcessSummary> {
    let mut summary = ProcessSummary::default();

    for id in ids {
        let Some(record) = annotations.get(id) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(t_id = %id, "no annotation for tweet id");
            summary.skipped += 1;
            continue;
        };

        match rebuild(tokenizer, id, record, tweets.get(id), edits) {
            Ok(rebuilt) => {
                write!(out, "{}\n\n", to_conll(&rebuilt))?;
                summary.written += 1;
            }
            Err(err) if err.is_recoverable() => {
                #[cfg(feature = "tracing")]
                tracing::warn!(t_id = %id, error = %err, "skipping tweet");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        "annotations processed"
    );

    Ok(summary)
}

fn rebuild(
    tokenizer: &Tokenizer,
    id: &str,
    record: &AnnotationRecord,
    text: Option<&String>,
    edits: &Edits,
) -> Result<AnnotationRecord> {
    let Some(text) = text else {
        if record.deleted {
            return Ok(record.clone());
        }
        return Err(TokenizerError::TweetNotFound { id: id.to_string() });
    };

    let tokens = tokenizer.tokenize(&edits.apply(id, text));
    Ok(AnnotationRecord {
        tweet: align(id, record, &tokens)?,
        ..record.clone()
    })
}
