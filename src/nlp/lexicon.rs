//! Lexical resources
//!
//! Three word lists drive the tokenizer's protection rules: known internet
//! domains, known emoticons, and non-breaking prefixes (abbreviations that
//! keep their trailing period). The lists are whitespace-delimited text files
//! named `DOMAINS`, `EMOTICONS` and `NONBREAKING_PREFIXES`. Copies of all
//! three are compiled into the crate and available through
//! [`LexicalResources::bundled`].

use std::fs;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::errors::{Result, TokenizerError};

pub const DOMAINS_FILE: &str = "DOMAINS";
pub const EMOTICONS_FILE: &str = "EMOTICONS";
pub const NONBREAKING_PREFIXES_FILE: &str = "NONBREAKING_PREFIXES";

const BUNDLED_DOMAINS: &str = include_str!("../../data/DOMAINS");
const BUNDLED_EMOTICONS: &str = include_str!("../../data/EMOTICONS");
const BUNDLED_NONBREAKING_PREFIXES: &str = include_str!("../../data/NONBREAKING_PREFIXES");

/// Prefixes that keep their period only in front of a number ("No. 5").
const NUMERIC_NONBREAKING_PREFIXES: [&str; 4] = ["No", "no", "Art", "pp"];

/// Contraction fragments, lowercase. The full list appends the upper-cased
/// forms in the same order, so an entry's index is its placeholder id.
const CONTRACTIONS: [&str; 14] = [
    "'all", "'am", "'clock", "'d", "'ll", "'m", "n't", "'re", "'s", "'sup", "'tis", "'twas",
    "'ve", "'n'",
];

/// Immutable word lists shared by every tokenize call.
#[derive(Debug, Clone)]
pub struct LexicalResources {
    domains: FxHashSet<String>,
    emoticons: FxHashSet<String>,
    nonbreaking_prefixes: FxHashSet<String>,
    numeric_prefixes: FxHashSet<String>,
    /// Emoticons built from single-byte punctuation, longest first
    punctuation_emoticons: Vec<String>,
    contractions: Vec<String>,
}

impl LexicalResources {
    /// Load the three lists from `dir`.
    ///
    /// Fails if any of the files is missing or unreadable.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let domains = read_list(&dir.join(DOMAINS_FILE))?;
        let emoticons = read_list(&dir.join(EMOTICONS_FILE))?;
        let prefixes = read_list(&dir.join(NONBREAKING_PREFIXES_FILE))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(dir = %dir.display(), "loaded lexical resources");

        Ok(Self::from_lists(&domains, &emoticons, &prefixes))
    }

    /// The lists compiled into the crate.
    pub fn bundled() -> Self {
        Self::from_lists(
            BUNDLED_DOMAINS,
            BUNDLED_EMOTICONS,
            BUNDLED_NONBREAKING_PREFIXES,
        )
    }

    /// Build resources from the raw (whitespace-delimited) list contents.
    pub fn from_lists(domains: &str, emoticons: &str, prefixes: &str) -> Self {
        let domains = split_words(domains);
        let emoticons = split_words(emoticons);

        let mut nonbreaking_prefixes = split_words(prefixes);
        // Single letters are initials ("J. Smith")
        nonbreaking_prefixes.extend(('a'..='z').chain('A'..='Z').map(String::from));

        let mut punctuation_emoticons: Vec<String> = emoticons
            .iter()
            .filter(|e| is_punctuation_emoticon(e))
            .cloned()
            .collect();
        punctuation_emoticons.sort_by(|a, b| {
            let (la, lb) = (a.chars().count(), b.chars().count());
            lb.cmp(&la).then_with(|| a.cmp(b))
        });

        let contractions = CONTRACTIONS
            .iter()
            .map(|c| c.to_string())
            .chain(CONTRACTIONS.iter().map(|c| c.to_uppercase()))
            .collect();

        Self {
            domains,
            emoticons,
            nonbreaking_prefixes,
            numeric_prefixes: NUMERIC_NONBREAKING_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            punctuation_emoticons,
            contractions,
        }
    }

    pub fn is_domain(&self, word: &str) -> bool {
        self.domains.contains(word)
    }

    pub fn is_emoticon(&self, word: &str) -> bool {
        self.emoticons.contains(word)
    }

    /// Check if a word (without its trailing period) is an abbreviation
    pub fn is_nonbreaking_prefix(&self, word: &str) -> bool {
        self.nonbreaking_prefixes.contains(word)
    }

    /// Check if a word keeps its period when a number follows
    pub fn is_numeric_nonbreaking_prefix(&self, word: &str) -> bool {
        self.numeric_prefixes.contains(word)
    }

    /// Emoticons used for prefix/suffix splitting, longest first.
    pub fn punctuation_emoticons(&self) -> &[String] {
        &self.punctuation_emoticons
    }

    /// The contraction list. An entry's index is its placeholder id.
    pub fn contractions(&self) -> &[String] {
        &self.contractions
    }

    /// Look up the contraction list index of `word`.
    pub fn contraction_id(&self, word: &str) -> Option<usize> {
        self.contractions.iter().position(|c| c == word)
    }

    pub fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub fn num_emoticons(&self) -> usize {
        self.emoticons.len()
    }
}

fn read_list(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| TokenizerError::ResourceLoad {
        path: path.to_path_buf(),
        source,
    })
}

fn split_words(raw: &str) -> FxHashSet<String> {
    raw.split_whitespace().map(|w| w.to_string()).collect()
}

/// Contains ASCII punctuation and nothing outside Latin-1.
fn is_punctuation_emoticon(emoticon: &str) -> bool {
    emoticon.chars().any(|c| c.is_ascii_punctuation())
        && emoticon.chars().all(|c| (c as u32) < 256)
}
