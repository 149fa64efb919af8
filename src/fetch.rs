//! Tweet sources
//!
//! Tweet texts are looked up by id through a [`TweetSource`]. The crate ships
//! [`TsvTweetSource`], which serves tweets from an `id<TAB>text` dump; a
//! network-backed source only has to implement [`TweetSource::lookup`].

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::config::MAX_BATCH_SIZE;
use crate::errors::Result;

/// A tweet as returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub id: String,
    pub text: String,
}

/// Batched tweet lookup by id.
pub trait TweetSource {
    /// Look up `ids`. Ids that do not resolve (deleted, protected, unknown)
    /// are simply absent from the result.
    fn lookup(&self, ids: &[String]) -> Result<Vec<Tweet>>;
}

/// Look up every id in batches of `batch_size` and return id → text, with
/// all whitespace runs in the text collapsed to a single space.
///
/// `batch_size` is clamped to `1..=100`.
pub fn crawl_tweets(
    source: &impl TweetSource,
    ids: &[String],
    batch_size: usize,
) -> Result<FxHashMap<String, String>> {
    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    let mut tweets = FxHashMap::default();

    for batch in ids.chunks(batch_size) {
        let found = source.lookup(batch)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(requested = batch.len(), found = found.len(), "tweet lookup");

        for tweet in found {
            let text = tweet.text.split_whitespace().collect::<Vec<_>>().join(" ");
            tweets.insert(tweet.id, text);
        }
    }

    Ok(tweets)
}

/// Read a whitespace-delimited list of tweet ids.
pub fn read_ids(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw.split_whitespace().map(str::to_string).collect())
}

/// Tweets served from a tab-separated dump, one `id<TAB>text` per line.
#[derive(Debug, Clone, Default)]
pub struct TsvTweetSource {
    tweets: FxHashMap<String, String>,
}

impl TsvTweetSource {
    /// Parse dump contents. Lines without a tab are ignored.
    pub fn parse(raw: &str) -> Self {
        let tweets = raw
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(id, text)| (id.trim().to_string(), text.to_string()))
            .collect();
        Self { tweets }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }
}

impl TweetSource for TsvTweetSource {
    fn lookup(&self, ids: &[String]) -> Result<Vec<Tweet>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.tweets.get(id).map(|text| Tweet {
                    id: id.clone(),
                    text: text.clone(),
                })
            })
            .collect())
    }
}
