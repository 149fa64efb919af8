//! Per-tweet text corrections.
//!
//! Some tweets changed between annotation and crawl time. An edits file
//! lists literal replacements that bring the crawled text back in line with
//! what was annotated:
//!
//! ```text
//! 123456<TAB>old|new<TAB>old2|new2
//! ```

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::{Result, TokenizerError};

/// Replacement pairs per tweet id, applied in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edits {
    by_id: FxHashMap<String, Vec<(String, String)>>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse edits-file contents. Blank lines are skipped; a field without
    /// `|` is a [`TokenizerError::MalformedEdit`].
    pub fn parse(raw: &str) -> Result<Self> {
        let mut edits = Self::new();

        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let id = fields.next().unwrap_or_default().trim();
            if id.is_empty() {
                return Err(TokenizerError::MalformedEdit {
                    line: idx + 1,
                    message: "missing tweet id".to_string(),
                });
            }

            let pairs = edits.by_id.entry(id.to_string()).or_default();
            for field in fields {
                let (old, new) = field.split_once('|').ok_or_else(|| {
                    TokenizerError::MalformedEdit {
                        line: idx + 1,
                        message: format!("expected old|new, got {field:?}"),
                    }
                })?;
                pairs.push((old.to_string(), new.to_string()));
            }
        }

        Ok(edits)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Apply every replacement registered for `id`, in order.
    pub fn apply(&self, id: &str, text: &str) -> String {
        let Some(pairs) = self.by_id.get(id) else {
            return text.to_string();
        };
        pairs
            .iter()
            .fold(text.to_string(), |acc, (old, new)| acc.replace(old.as_str(), new))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of tweets with at least one edit line.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_apply_in_order() {
        let edits = Edits::parse("1\tcolour|color\tcolor|hue\n2\tx|y\n").unwrap();

        assert_eq!(edits.len(), 2);
        assert_eq!(edits.apply("1", "nice colour"), "nice hue");
        assert_eq!(edits.apply("2", "xx"), "yy");
        assert_eq!(edits.apply("3", "untouched"), "untouched");
    }

    #[test]
    fn test_parse_accumulates_repeated_ids() {
        let edits = Edits::parse("1\ta|b\n\n1\tb|c\r\n").unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits.apply("1", "a"), "c");
    }

    #[test]
    fn test_malformed_field_reports_line() {
        let err = Edits::parse("1\ta|b\n2\tnopipe\n").unwrap_err();
        match err {
            TokenizerError::MalformedEdit { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("nopipe"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_id_without_edits_is_noop() {
        let edits = Edits::parse("5\n").unwrap();
        assert!(edits.contains("5"));
        assert_eq!(edits.apply("5", "same"), "same");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EDITS");
        fs::write(&path, "9\t&|and\n").unwrap();

        let edits = Edits::from_file(&path).unwrap();
        assert_eq!(edits.apply("9", "you & me"), "you and me");
    }
}
