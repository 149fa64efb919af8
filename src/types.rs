//! Core types shared by the masking engine and the stage pipeline.

use std::fmt;

/// Output unit of the tokenizer.
pub type Token = String;

/// A class of protected content.
///
/// Every category has its own placeholder sentinel and its own numbering
/// space. Sentinels use a mixed-case spelling that organic text is very
/// unlikely to contain, and only ASCII letters so that none of the generic
/// splitting stages touches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Url,
    Emoticon,
    Hashtag,
    Mention,
    RepeatedPunctuation,
    SplitContraction,
}

impl Category {
    /// All categories, in masking order.
    pub const ALL: [Category; 6] = [
        Category::Emoticon,
        Category::Url,
        Category::Hashtag,
        Category::Mention,
        Category::RepeatedPunctuation,
        Category::SplitContraction,
    ];

    /// Reserved spelling used in front of `-<id>` in placeholders.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Url => "sItEuRl",
            Self::Emoticon => "eMoTiCoN",
            Self::Hashtag => "hAsHtAg",
            Self::Mention => "uSeRrEf",
            Self::RepeatedPunctuation => "rEpPuNcT",
            Self::SplitContraction => "cOnTrAcTiOn",
        }
    }

    /// Build the placeholder for sequence id `id`.
    pub fn placeholder(&self, id: usize) -> String {
        format!("{}-{}", self.sentinel(), id)
    }

    /// Parse a placeholder of this category back into its sequence id.
    ///
    /// Returns `None` unless `word` is exactly `<sentinel>-<digits>`.
    pub fn parse_placeholder(&self, word: &str) -> Option<usize> {
        let digits = word.strip_prefix(self.sentinel())?.strip_prefix('-')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Url => "url",
            Self::Emoticon => "emoticon",
            Self::Hashtag => "hashtag",
            Self::Mention => "mention",
            Self::RepeatedPunctuation => "repeated_punctuation",
            Self::SplitContraction => "split_contraction",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_parse() {
        for cat in Category::ALL {
            let ph = cat.placeholder(17);
            assert_eq!(cat.parse_placeholder(&ph), Some(17));
        }
    }

    #[test]
    fn test_parse_rejects_other_categories_and_junk() {
        let ph = Category::Hashtag.placeholder(0);
        assert_eq!(Category::Mention.parse_placeholder(&ph), None);
        assert_eq!(Category::Hashtag.parse_placeholder("hAsHtAg-"), None);
        assert_eq!(Category::Hashtag.parse_placeholder("hAsHtAg-1a"), None);
        assert_eq!(Category::Hashtag.parse_placeholder("hAsHtAg-+1"), None);
        assert_eq!(Category::Hashtag.parse_placeholder("hashtag-1"), None);
    }

    #[test]
    fn test_sentinels_are_distinct_letters() {
        let mut seen = std::collections::HashSet::new();
        for cat in Category::ALL {
            let s = cat.sentinel();
            assert!(s.chars().all(|c| c.is_ascii_alphabetic()));
            assert!(seen.insert(s));
        }
    }
}
