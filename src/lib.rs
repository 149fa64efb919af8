//! # rapid-tweet-tokenizer
//!
//! A tokenizer for tweets and other social-media text. Generic punctuation
//! splitting shatters the things that matter most in this kind of text, so
//! URLs, emoticons, hashtags, mentions, contractions, abbreviations and
//! punctuation runs are masked before splitting and restored afterwards.
//!
//! ```rust,ignore
//! use rapid_tweet_tokenizer::Tokenizer;
//!
//! let tokenizer = Tokenizer::bundled();
//! let tokens = tokenizer.tokenize("Dr. Smith loves #rust :) http://t.co/x!");
//! assert_eq!(
//!     tokens,
//!     ["Dr.", "Smith", "loves", "#rust", ":)", "http://t.co/x", "!"]
//! );
//! ```
//!
//! Besides the tokenizer the crate carries the tooling that rebuilds an
//! annotated tweet corpus from ids: tweet sources ([`fetch`]), annotation
//! alignment and edits ([`annotate`]), and configuration ([`config`]).

pub mod annotate;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod masking;
pub mod nlp;
pub mod pipeline;
pub mod types;

pub use config::{FetchConfig, TokenizerConfig};
pub use errors::{Result, TokenizerError};
pub use nlp::lexicon::LexicalResources;
pub use nlp::tokenizer::Tokenizer;
pub use pipeline::observer::{NoopObserver, PipelineObserver, StageTimingObserver};
pub use types::{Category, Token};
