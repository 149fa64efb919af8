//! Masking engine
//!
//! Protected substrings are swapped for placeholders (`<sentinel>-<id>`)
//! before the generic splitting stages run, and swapped back afterwards.
//! Each category keeps an append-only log: the id of a placeholder is the
//! position of its original in the log, so restoring is a direct index.
//!
//! Tables live in the per-call [`PipelineContext`](crate::pipeline::context::PipelineContext)
//! and are dropped when the call returns; numbering restarts at 0 for every
//! call.

use crate::types::Category;

/// Append-only log of masked originals for one category.
#[derive(Debug, Clone)]
pub struct MaskTable {
    category: Category,
    entries: Vec<String>,
}

impl MaskTable {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            entries: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Record `original` and return the placeholder standing in for it.
    pub fn mask(&mut self, original: impl Into<String>) -> String {
        let id = self.entries.len();
        self.entries.push(original.into());
        self.category.placeholder(id)
    }

    /// Original text for a placeholder of this table's category.
    ///
    /// Anything that is not one of this table's placeholders yields `None`.
    pub fn restore(&self, word: &str) -> Option<&str> {
        let id = self.category.parse_placeholder(word)?;
        self.entries.get(id).map(String::as_str)
    }

    /// Original recorded under sequence id `id`.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One table per table-backed category.
///
/// Split contractions are not table-backed: their placeholder id is the
/// index into the fixed contraction list.
#[derive(Debug, Clone)]
pub struct MaskTables {
    pub urls: MaskTable,
    pub emoticons: MaskTable,
    pub hashtags: MaskTable,
    pub mentions: MaskTable,
    pub repeated_punctuation: MaskTable,
}

impl Default for MaskTables {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskTables {
    pub fn new() -> Self {
        Self {
            urls: MaskTable::new(Category::Url),
            emoticons: MaskTable::new(Category::Emoticon),
            hashtags: MaskTable::new(Category::Hashtag),
            mentions: MaskTable::new(Category::Mention),
            repeated_punctuation: MaskTable::new(Category::RepeatedPunctuation),
        }
    }

    /// Total number of masked entries across all categories.
    pub fn total(&self) -> usize {
        self.urls.len()
            + self.emoticons.len()
            + self.hashtags.len()
            + self.mentions.len()
            + self.repeated_punctuation.len()
    }

    /// Table for `category`, if that category is table-backed.
    pub fn table(&self, category: Category) -> Option<&MaskTable> {
        match category {
            Category::Url => Some(&self.urls),
            Category::Emoticon => Some(&self.emoticons),
            Category::Hashtag => Some(&self.hashtags),
            Category::Mention => Some(&self.mentions),
            Category::RepeatedPunctuation => Some(&self.repeated_punctuation),
            Category::SplitContraction => None,
        }
    }

    pub fn table_mut(&mut self, category: Category) -> Option<&mut MaskTable> {
        match category {
            Category::Url => Some(&mut self.urls),
            Category::Emoticon => Some(&mut self.emoticons),
            Category::Hashtag => Some(&mut self.hashtags),
            Category::Mention => Some(&mut self.mentions),
            Category::RepeatedPunctuation => Some(&mut self.repeated_punctuation),
            Category::SplitContraction => None,
        }
    }
}

/// Mask every whitespace-delimited word for which `classify` returns a
/// table-backed category, recording the word in that category's table.
///
/// Words are re-joined with single spaces.
pub fn mask_words<F>(text: &str, tables: &mut MaskTables, mut classify: F) -> String
where
    F: FnMut(&str) -> Option<Category>,
{
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            match classify(word).and_then(|cat| tables.table_mut(cat)) {
                Some(table) => table.mask(word),
                None => word.to_string(),
            }
        })
        .collect();
    words.join(" ")
}

/// Replace every placeholder word of one of `categories` with its original.
/// Words that are not placeholders, or whose id is unknown, are left alone.
pub fn unmask_words(text: &str, tables: &MaskTables, categories: &[Category]) -> String {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|word| {
            categories
                .iter()
                .filter_map(|&cat| tables.table(cat))
                .find_map(|table| table.restore(word))
                .unwrap_or(word)
        })
        .collect();
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_assigns_increasing_ids() {
        let mut table = MaskTable::new(Category::Hashtag);

        assert_eq!(table.mask("#one"), "hAsHtAg-0");
        assert_eq!(table.mask("#two"), "hAsHtAg-1");
        assert_eq!(table.mask("#one"), "hAsHtAg-2");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some("#two"));
    }

    #[test]
    fn test_restore_ignores_foreign_placeholders() {
        let mut tags = MaskTable::new(Category::Hashtag);
        tags.mask("#rust");

        assert_eq!(tags.restore("hAsHtAg-0"), Some("#rust"));
        assert_eq!(tags.restore("hAsHtAg-1"), None);
        assert_eq!(tags.restore("uSeRrEf-0"), None);
        assert_eq!(tags.restore("hello"), None);
    }

    #[test]
    fn test_mask_unmask_round_trip() {
        let mut tables = MaskTables::new();
        let text = "@alice loves #rust and #tokenizers";

        let masked = mask_words(text, &mut tables, |w| {
            w.starts_with('#').then_some(Category::Hashtag)
        });
        assert_eq!(masked, "@alice loves hAsHtAg-0 and hAsHtAg-1");

        let restored = unmask_words(&masked, &tables, &[Category::Hashtag]);
        assert_eq!(restored, text);
    }

    #[test]
    fn test_unmask_multiple_tables() {
        let mut tables = MaskTables::new();
        let a = tables.hashtags.mask("#a");
        let b = tables.mentions.mask("@b");
        let text = format!("{a} and {b}");

        let restored = unmask_words(&text, &tables, &[Category::Hashtag, Category::Mention]);
        assert_eq!(restored, "#a and @b");
        assert_eq!(tables.total(), 2);
    }

    #[test]
    fn test_contractions_have_no_table() {
        let mut tables = MaskTables::new();
        assert!(tables.table(Category::SplitContraction).is_none());

        let masked = mask_words("n't", &mut tables, |_| Some(Category::SplitContraction));
        assert_eq!(masked, "n't");
        assert_eq!(tables.total(), 0);
    }

    #[test]
    fn test_fresh_tables_are_empty() {
        let tables = MaskTables::default();
        assert_eq!(tables.total(), 0);
        assert!(tables.urls.is_empty());
        assert_eq!(tables.urls.category(), Category::Url);
    }
}
