//! Tokenization stages
//!
//! The tokenizer is a fixed sequence of text rewrites. Masking stages replace
//! protected material (emoticons, URLs, hashtags, mentions, punctuation runs,
//! contraction fragments) with placeholders, the generic stages split the
//! remaining text apart on punctuation and script boundaries, and the
//! unmasking stage puts the protected material back in reverse order.
//!
//! Every stage is a function `fn(&mut PipelineContext, &LexicalResources)`.
//! [`Stage::ALL`] is the execution order; changing it changes the output.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::masking::{mask_words, unmask_words};
use crate::nlp::lexicon::LexicalResources;
use crate::pipeline::context::PipelineContext;
use crate::types::Category;

// ============================================================================
// Stage list
// ============================================================================

/// One named step of the tokenization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    UnescapeEntities,
    NormalizePunctuation,
    MaskEmoticonsAndUrls,
    MaskHashtagsAndMentions,
    MaskRepeatedPunctuation,
    MaskContractions,
    SplitScriptBoundaries,
    SplitSupplementaryPlane,
    BaseTokenize,
    SplitCommas,
    SplitApostrophes,
    SplitHyphens,
    MergeNonBreakingPrefixes,
    Unmask,
    FinalSplit,
}

impl Stage {
    /// Execution order.
    pub const ALL: [Stage; 15] = [
        Stage::UnescapeEntities,
        Stage::NormalizePunctuation,
        Stage::MaskEmoticonsAndUrls,
        Stage::MaskHashtagsAndMentions,
        Stage::MaskRepeatedPunctuation,
        Stage::MaskContractions,
        Stage::SplitScriptBoundaries,
        Stage::SplitSupplementaryPlane,
        Stage::BaseTokenize,
        Stage::SplitCommas,
        Stage::SplitApostrophes,
        Stage::SplitHyphens,
        Stage::MergeNonBreakingPrefixes,
        Stage::Unmask,
        Stage::FinalSplit,
    ];

    /// Stable snake_case name, used for tracing spans and observer reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnescapeEntities => "unescape_entities",
            Self::NormalizePunctuation => "normalize_punctuation",
            Self::MaskEmoticonsAndUrls => "mask_emoticons_and_urls",
            Self::MaskHashtagsAndMentions => "mask_hashtags_and_mentions",
            Self::MaskRepeatedPunctuation => "mask_repeated_punctuation",
            Self::MaskContractions => "mask_contractions",
            Self::SplitScriptBoundaries => "split_script_boundaries",
            Self::SplitSupplementaryPlane => "split_supplementary_plane",
            Self::BaseTokenize => "base_tokenize",
            Self::SplitCommas => "split_commas",
            Self::SplitApostrophes => "split_apostrophes",
            Self::SplitHyphens => "split_hyphens",
            Self::MergeNonBreakingPrefixes => "merge_nonbreaking_prefixes",
            Self::Unmask => "unmask",
            Self::FinalSplit => "final_split",
        }
    }

    /// Run this stage on `ctx`.
    pub fn apply(&self, ctx: &mut PipelineContext, res: &LexicalResources) {
        match self {
            Self::UnescapeEntities => ctx.text = unescape_entities(&ctx.text),
            Self::NormalizePunctuation => ctx.text = normalize_punctuation(&ctx.text),
            Self::MaskEmoticonsAndUrls => mask_emoticons_and_urls(ctx, res),
            Self::MaskHashtagsAndMentions => mask_hashtags_and_mentions(ctx),
            Self::MaskRepeatedPunctuation => mask_repeated_punctuation(ctx),
            Self::MaskContractions => ctx.text = mask_contractions(&ctx.text, res),
            Self::SplitScriptBoundaries => ctx.text = split_script_boundaries(&ctx.text),
            Self::SplitSupplementaryPlane => ctx.text = split_supplementary_plane(&ctx.text),
            Self::BaseTokenize => ctx.text = base_tokenize(&ctx.text, &mut ctx.dot_runs),
            Self::SplitCommas => ctx.text = split_commas(&ctx.text),
            Self::SplitApostrophes => ctx.text = split_apostrophes(&ctx.text),
            Self::SplitHyphens => ctx.text = split_hyphens(&ctx.text),
            Self::MergeNonBreakingPrefixes => {
                ctx.text = merge_nonbreaking_prefixes(&ctx.text, res, &ctx.dot_runs)
            }
            Self::Unmask => unmask(ctx, res),
            Self::FinalSplit => {
                ctx.tokens = ctx.text.split_whitespace().map(str::to_string).collect();
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Character classes and patterns
// ============================================================================

/// Characters whose runs of 2+ identical members are kept together.
const RUN_PUNCTUATION: &str = ".,\\!@#$%^&*()_+={[}]|;:<>?~/-";
const QUOTES: &str = "'\"`";
/// Trailing characters stripped from a URL before masking.
const URL_TRAILERS: &str = ",.!?;:'\"";
/// Characters a URL candidate is split on when looking for a known domain.
const URL_SEPARATORS: &str = ".,\\!@#$%^&'*()_+={[}]|\";:<>?`~/";
/// ASCII characters that always stand alone.
const SPECIAL_ASCII: &str = "\\!@#$%^&*()_+={[}]|\";:<>?`~/";

/// Marker for a protected run of periods: `dOtRuN<id>` plus a unit
/// separator. Base tokenization strips control chars from the text before
/// emitting markers, so input can never spell one.
const DOT_RUN_PREFIX: &str = "dOtRuN";
const DOT_RUN_SUFFIX: char = '\u{1f}';

const ENTITIES: [(&str, &str); 10] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#60;", "<"),
    ("&#62;", ">"),
    ("&#38;", "&"),
    ("&#34;", "\""),
    ("&#39;", "'"),
];

static URL_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\W_])(https?://|www\.)").unwrap());
static URL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]{2}\.[a-z]{2}").unwrap());
static QUOTE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"`]{2,}"#).unwrap());

static GLUED_NT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z'])([nN]'[tT])([a-zA-Z' ])").unwrap());
static GLUED_N: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-zA-Z])('[nN]')([a-zA-Z])").unwrap());

static NONLATIN_LATIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\x00-\x{24f}])([\x00-\x{24f}])").unwrap());
static LATIN_NONLATIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\x00-\x{24f}])([^\x00-\x{24f}])").unwrap());
static SUPPLEMENTARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{10000}-\x{10ffff}]+").unwrap());

static MULTI_DOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\.\.+)([^.])").unwrap());
static DOT_RUN_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"dOtRuN([0-9]+)\x1f").unwrap());

static NONDIGIT_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^0-9]),").unwrap());
static COMMA_NONDIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r",([^0-9])").unwrap());

static APOS_BETWEEN_NONLETTERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^a-zA-Z\x{80}-\x{24f}])'([^a-zA-Z\x{80}-\x{24f}])").unwrap()
});
static APOS_BEFORE_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^a-zA-Z0-9\x{80}-\x{24f}])'([a-zA-Z\x{80}-\x{24f}])").unwrap()
});
static APOS_AFTER_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z\x{80}-\x{24f}])'([^a-zA-Z\x{80}-\x{24f}])").unwrap()
});
static LEADING_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r" (\.+)([^0-9])").unwrap());

static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());
static HYPHEN_IN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:-?[0-9]-+[0-9]-?)+").unwrap());
static HYPHEN_BEFORE_NONALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)-([^a-zA-Z0-9])").unwrap());
static HYPHEN_AFTER_NONALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^a-zA-Z0-9])-(.)").unwrap());

static JOINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z]+)\.([A-Za-z][A-Za-z]+)$").unwrap());

/// Surround every char matching `pred` with spaces.
fn pad_chars(text: &str, pred: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        if pred(c) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn is_numeric_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_numeric)
}

// ============================================================================
// 1–2. Surface normalization
// ============================================================================

/// Replace markup escapes until none remain (`&amp;lt;` becomes `<`).
pub fn unescape_entities(text: &str) -> String {
    let mut text = text.to_string();
    while let Some((entity, literal)) = ENTITIES.iter().find(|(e, _)| text.contains(*e)) {
        text = text.replace(*entity, literal);
    }
    text
}

/// Map unicode hyphens and curly quotes to their ASCII forms. Idempotent.
pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2043}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            other => other,
        })
        .collect()
}

// ============================================================================
// 3–6. Masking
// ============================================================================

/// Split a leading and then a trailing punctuation emoticon off `word`.
///
/// Only words longer than two chars containing ASCII punctuation are
/// considered, and known emoticons are never split.
fn split_emoticon_affixes(word: &str, res: &LexicalResources) -> String {
    let has_punct = word.chars().any(|c| c.is_ascii_punctuation());
    if !has_punct || word.chars().count() <= 2 || res.is_emoticon(word) {
        return word.to_string();
    }

    let pemos = res.punctuation_emoticons();
    let mut body = word;
    let mut head = "";
    let mut tail = "";

    if let Some(em) = pemos
        .iter()
        .find(|em| body.len() > em.len() && body.starts_with(em.as_str()))
    {
        head = &body[..em.len()];
        body = &body[em.len()..];
    }
    if let Some(em) = pemos
        .iter()
        .find(|em| body.len() > em.len() && body.ends_with(em.as_str()))
    {
        let cut = body.len() - em.len();
        tail = &body[cut..];
        body = &body[..cut];
    }

    [head, body, tail]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL by scheme prefix, or by `xx.xx` shape with a known domain segment
/// after the first.
fn is_url(word: &str, res: &LexicalResources) -> bool {
    if word.starts_with("http://") || word.starts_with("https://") || word.starts_with("www.") {
        return true;
    }
    URL_SHAPE.is_match(word)
        && word
            .split(|c: char| URL_SEPARATORS.contains(c))
            .skip(1)
            .any(|segment| res.is_domain(segment))
}

/// Strip a trailing `'s` or one trailing punctuation mark from a URL.
///
/// Returns `(body, suffix)`; the suffix may be empty.
fn strip_url_trailer(word: &str) -> (&str, &str) {
    if let Some(body) = word.strip_suffix("'s") {
        return (body, &word[body.len()..]);
    }
    match word.chars().last() {
        Some(c) if URL_TRAILERS.contains(c) => {
            let cut = word.len() - c.len_utf8();
            (&word[..cut], &word[cut..])
        }
        _ => (word, ""),
    }
}

/// Stage 3: mask emoticons and URLs.
///
/// Post: every emoticon word is `eMoTiCoN-n`, every URL word `sItEuRl-n`;
/// a URL's table entry is `"<body> <stripped suffix>"`.
pub fn mask_emoticons_and_urls(ctx: &mut PipelineContext, res: &LexicalResources) {
    let spaced = URL_GAP.replace_all(&ctx.text, "${1} ${2}");

    let words: Vec<String> = spaced
        .split_whitespace()
        .map(|w| split_emoticon_affixes(w, res))
        .collect();
    let words = words.join(" ");

    let tables = &mut ctx.tables;
    let masked: Vec<String> = words
        .split_whitespace()
        .map(|word| {
            if res.is_emoticon(word) {
                tables.emoticons.mask(word)
            } else if is_url(word, res) {
                let (body, suffix) = strip_url_trailer(word);
                tables.urls.mask(format!("{body} {suffix}"))
            } else {
                word.to_string()
            }
        })
        .collect();

    ctx.text = masked.join(" ");
}

/// Stage 4: mask every word starting with `#` or `@`.
pub fn mask_hashtags_and_mentions(ctx: &mut PipelineContext) {
    ctx.text = mask_words(&ctx.text, &mut ctx.tables, |word| match word.chars().next() {
        Some('#') => Some(Category::Hashtag),
        Some('@') => Some(Category::Mention),
        _ => None,
    });
    ctx.flags.hashtags_or_mentions =
        !ctx.tables.hashtags.is_empty() || !ctx.tables.mentions.is_empty();
}

/// Surround every run of 2+ identical [`RUN_PUNCTUATION`] chars with spaces.
fn isolate_punctuation_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut j = i + 1;
        while j < chars.len() && chars[j] == c {
            j += 1;
        }
        let run: String = chars[i..j].iter().collect();
        if j - i >= 2 && RUN_PUNCTUATION.contains(c) {
            out.push(' ');
            out.push_str(&run);
            out.push(' ');
        } else {
            out.push_str(&run);
        }
        i = j;
    }
    out
}

/// Whole word is a punctuation run or a quote run.
fn is_punctuation_run(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if word.chars().count() < 2 {
        return false;
    }
    let identical = RUN_PUNCTUATION.contains(first) && chars.all(|c| c == first);
    identical || word.chars().all(|c| QUOTES.contains(c))
}

/// Stage 5: isolate and mask punctuation and quote runs ("!!!", "...", "''").
pub fn mask_repeated_punctuation(ctx: &mut PipelineContext) {
    let spaced = QUOTE_RUN.replace_all(&ctx.text, " ${0} ");
    let spaced = isolate_punctuation_runs(&spaced);

    ctx.text = mask_words(&spaced, &mut ctx.tables, |word| {
        is_punctuation_run(word).then_some(Category::RepeatedPunctuation)
    });
    ctx.flags.repeated_punctuation = !ctx.tables.repeated_punctuation.is_empty();
}

/// Stage 6: separate glued `n't` and `'n'` fragments, then replace each
/// standalone contraction fragment with `cOnTrAcTiOn-<list index>`.
pub fn mask_contractions(text: &str, res: &LexicalResources) -> String {
    let padded = format!(" {text} ");
    let split = GLUED_NT.replace_all(&padded, "${1} ${2} ${3}");
    let split = GLUED_N.replace_all(&split, "${1} ${2} ${3}");

    let words: Vec<String> = split
        .split_whitespace()
        .map(|word| match res.contraction_id(word) {
            Some(id) => Category::SplitContraction.placeholder(id),
            None => word.to_string(),
        })
        .collect();
    words.join(" ")
}

// ============================================================================
// 7–12. Generic splitting
// ============================================================================

/// Stage 7: space between Latin (U+0000–U+024F) and non-Latin chars.
pub fn split_script_boundaries(text: &str) -> String {
    let text = NONLATIN_LATIN.replace_all(text, "${1} ${2}");
    LATIN_NONLATIN.replace_all(&text, "${1} ${2}").into_owned()
}

/// Stage 8: isolate runs of code points outside the BMP (most emoji).
pub fn split_supplementary_plane(text: &str) -> String {
    SUPPLEMENTARY.replace_all(text, " ${0} ").into_owned()
}

fn is_base_split_char(c: char) -> bool {
    matches!(c,
        '\u{a1}'..='\u{bf}' | '\u{d7}' | '\u{f7}'        // Latin-1 punctuation
        | '\u{2012}'..='\u{2018}' | '\u{201a}'..='\u{206f}' // general punctuation except ’
        | '\u{2200}'..='\u{2211}' | '\u{2213}'..='\u{22ff}' // math operators
        | '\u{2150}'..='\u{2160}'                         // fractions
        | '\u{2070}'..='\u{209f}'                         // super/subscripts
        | '\u{20a0}'..='\u{20cf}'                         // currency
    ) || SPECIAL_ASCII.contains(c)
}

/// Log a run of `count` periods and return its marker word.
fn encode_dot_run(count: usize, runs: &mut Vec<usize>) -> String {
    runs.push(count);
    format!("{DOT_RUN_PREFIX}{}{DOT_RUN_SUFFIX}", runs.len() - 1)
}

/// Replace every marker logged in `runs` with its periods. Unknown ids are
/// left as they are.
fn decode_dot_runs(text: &str, runs: &[usize]) -> String {
    DOT_RUN_MARKER
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|id| runs.get(id))
                .map_or_else(|| caps[0].to_string(), |&count| ".".repeat(count))
        })
        .into_owned()
}

/// Stage 9: drop ASCII control chars and protect period runs, then isolate
/// unicode punctuation, symbols and the ASCII specials.
pub fn base_tokenize(text: &str, dot_runs: &mut Vec<usize>) -> String {
    let cleaned: String = format!(" {text} ")
        .chars()
        .filter(|&c| c > '\u{1f}')
        .collect();
    let protected = MULTI_DOT.replace_all(&cleaned, |caps: &Captures| {
        format!(" {} {}", encode_dot_run(caps[1].len(), dot_runs), &caps[2])
    });
    pad_chars(&protected, is_base_split_char)
}

/// Stage 10: split commas off non-digits; "1,000" stays whole.
pub fn split_commas(text: &str) -> String {
    let text = NONDIGIT_COMMA.replace_all(text, "${1} , ");
    COMMA_NONDIGIT.replace_all(&text, " , ${1}").into_owned()
}

/// Stage 11: apostrophe handling.
///
/// A quote between two non-letters, before a letter after a non-alphanumeric,
/// or after a letter before a non-letter becomes its own token. Between two
/// letters ("O'Brien") and after a digit ("1990's") it stays attached.
/// Doubled quotes become two quote tokens, and leading periods are split
/// off words (" .hello" but not " .5").
pub fn split_apostrophes(text: &str) -> String {
    let text = APOS_BETWEEN_NONLETTERS.replace_all(text, "${1} ' ${2}");
    let text = APOS_BEFORE_LETTER.replace_all(&text, "${1} ' ${2}");
    let text = APOS_AFTER_LETTER.replace_all(&text, "${1} ' ${2}");
    let text = text.replace("''", " ' ' ");
    LEADING_DOTS.replace_all(&text, " ${1} ${2}").into_owned()
}

/// Stage 12: hyphen handling.
///
/// Hyphen runs become spaced single hyphens, hyphens between digits are
/// spaced ("2-1" becomes "2 - 1"), and a hyphen next to a non-alphanumeric
/// char is split off. "well-known" is untouched.
pub fn split_hyphens(text: &str) -> String {
    let text = HYPHEN_RUN.replace_all(text, |caps: &Captures| {
        caps[0].chars().map(String::from).collect::<Vec<_>>().join(" ")
    });
    let text = HYPHEN_IN_NUMBER.replace_all(&text, |caps: &Captures| caps[0].replace('-', " - "));
    let text = HYPHEN_BEFORE_NONALNUM.replace_all(&text, "${1} - ${2}");
    HYPHEN_AFTER_NONALNUM
        .replace_all(&text, "${1} - ${2}")
        .into_owned()
}

// ============================================================================
// 13. Non-breaking prefixes
// ============================================================================

/// Decide whether `word`'s trailing period stays attached.
fn keeps_period(dotless: &str, next: Option<&str>, res: &LexicalResources) -> bool {
    if is_numeric_word(dotless) {
        return false;
    }
    let dotted_initialism =
        dotless.contains('.') && dotless.chars().any(|c| c.is_ascii_alphabetic());
    if dotted_initialism || res.is_nonbreaking_prefix(dotless) {
        return true;
    }
    res.is_numeric_nonbreaking_prefix(dotless)
        && next
            .and_then(|w| w.chars().next())
            .is_some_and(char::is_numeric)
}

/// Stage 13: split sentence-final periods, keep abbreviation periods, break
/// `word.word` joints, then restore protected period runs.
pub fn merge_nonbreaking_prefixes(
    text: &str,
    res: &LexicalResources,
    dot_runs: &[usize],
) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(words.len());

    for (i, &word) in words.iter().enumerate() {
        if let Some(dotless) = word.strip_suffix('.') {
            if keeps_period(dotless, words.get(i + 1).copied(), res) {
                out.push(word.to_string());
            } else {
                out.push(format!("{dotless} ."));
            }
        } else if let Some(caps) = JOINT.captures(word) {
            let (first, second) = (&caps[1], &caps[2]);
            if res.is_nonbreaking_prefix(word) {
                out.push(word.to_string());
            } else if res.is_nonbreaking_prefix(first) {
                out.push(format!("{first}. {second}"));
            } else {
                out.push(format!("{first} . {second}"));
            }
        } else {
            out.push(word.to_string());
        }
    }

    decode_dot_runs(&out.join(" "), dot_runs)
}

// ============================================================================
// 14. Unmasking
// ============================================================================

/// Stage 14: restore masked material in reverse masking order.
///
/// Hashtags/mentions and punctuation runs are only restored when their
/// occurrence flag is set.
pub fn unmask(ctx: &mut PipelineContext, res: &LexicalResources) {
    let text = unmask_words(&ctx.text, &ctx.tables, &[Category::Emoticon, Category::Url]);

    let contractions = res.contractions();
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|word| {
            Category::SplitContraction
                .parse_placeholder(word)
                .and_then(|id| contractions.get(id))
                .map_or(word, String::as_str)
        })
        .collect();
    let mut text = words.join(" ");

    if ctx.flags.hashtags_or_mentions {
        text = unmask_words(&text, &ctx.tables, &[Category::Hashtag, Category::Mention]);
    }
    if ctx.flags.repeated_punctuation {
        text = unmask_words(&text, &ctx.tables, &[Category::RepeatedPunctuation]);
    }
    ctx.text = text;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resources() -> LexicalResources {
        LexicalResources::bundled()
    }

    fn run_until(text: &str, last: Stage) -> PipelineContext {
        let res = resources();
        let mut ctx = PipelineContext::new(text);
        for stage in Stage::ALL {
            stage.apply(&mut ctx, &res);
            if stage == last {
                break;
            }
        }
        ctx
    }

    #[test]
    fn test_stage_order_is_fixed() {
        assert_eq!(Stage::ALL.len(), 15);
        assert_eq!(Stage::ALL[0], Stage::UnescapeEntities);
        assert_eq!(Stage::ALL[13], Stage::Unmask);
        assert_eq!(Stage::ALL[14], Stage::FinalSplit);
        assert_eq!(Stage::BaseTokenize.to_string(), "base_tokenize");
    }

    #[test]
    fn test_unescape_entities_repeats() {
        assert_eq!(unescape_entities("a &lt; b"), "a < b");
        assert_eq!(unescape_entities("&amp;lt;3"), "<3");
        assert_eq!(unescape_entities("&#39;quoted&#34;"), "'quoted\"");
        assert_eq!(unescape_entities("AT&T"), "AT&T");
    }

    #[test]
    fn test_normalize_punctuation_is_idempotent() {
        let text = "\u{201c}it\u{2019}s\u{201d} \u{2010} \u{2018}x\u{2019}";
        let once = normalize_punctuation(text);
        assert_eq!(once, "\"it's\" - 'x'");
        assert_eq!(normalize_punctuation(&once), once);
    }

    #[test]
    fn test_emoticon_affix_split() {
        let res = resources();
        assert_eq!(split_emoticon_affixes("great:)", &res), "great :)");
        assert_eq!(split_emoticon_affixes(":)great", &res), ":) great");
        assert_eq!(split_emoticon_affixes(":-))", &res), ":-))");
        assert_eq!(split_emoticon_affixes("ok", &res), "ok");
    }

    #[test]
    fn test_url_classification() {
        let res = resources();
        assert!(is_url("http://example.com", &res));
        assert!(is_url("www.example.org", &res));
        assert!(is_url("google.com/maps", &res));
        assert!(is_url("bit.ly/abc", &res));
        assert!(!is_url("end.of", &res));
        assert!(!is_url("hello", &res));
    }

    #[test]
    fn test_url_trailer_stripping() {
        assert_eq!(strip_url_trailer("example.com's"), ("example.com", "'s"));
        assert_eq!(strip_url_trailer("example.com!"), ("example.com", "!"));
        assert_eq!(strip_url_trailer("example.com"), ("example.com", ""));
    }

    #[test]
    fn test_mask_emoticons_and_urls() {
        let ctx = run_until("see http://t.co/x, :) ok", Stage::MaskEmoticonsAndUrls);

        assert_eq!(ctx.text, "see sItEuRl-0 eMoTiCoN-0 ok");
        assert_eq!(ctx.tables.urls.get(0), Some("http://t.co/x ,"));
        assert_eq!(ctx.tables.emoticons.get(0), Some(":)"));
    }

    #[test]
    fn test_url_glued_after_punctuation_is_separated() {
        let ctx = run_until("(http://a.com)", Stage::MaskEmoticonsAndUrls);
        assert_eq!(ctx.text, "( sItEuRl-0");
        assert_eq!(ctx.tables.urls.get(0), Some("http://a.com) "));
    }

    #[test]
    fn test_mask_hashtags_sets_flag() {
        let ctx = run_until("#one @two three", Stage::MaskHashtagsAndMentions);
        assert_eq!(ctx.text, "hAsHtAg-0 uSeRrEf-0 three");
        assert!(ctx.flags.hashtags_or_mentions);

        let ctx = run_until("no tags here", Stage::MaskHashtagsAndMentions);
        assert!(!ctx.flags.hashtags_or_mentions);
    }

    #[test]
    fn test_isolate_punctuation_runs() {
        assert_eq!(isolate_punctuation_runs("wow!!!ok"), "wow !!! ok");
        assert_eq!(isolate_punctuation_runs("a?!b"), "a?!b");
        assert_eq!(isolate_punctuation_runs("aa"), "aa");
    }

    #[test]
    fn test_punctuation_run_words() {
        assert!(is_punctuation_run("..."));
        assert!(is_punctuation_run("!!"));
        assert!(is_punctuation_run("''"));
        assert!(is_punctuation_run("\"'`"));
        assert!(!is_punctuation_run("!"));
        assert!(!is_punctuation_run("?!"));
        assert!(!is_punctuation_run("aa"));
    }

    #[test]
    fn test_mask_repeated_punctuation() {
        let ctx = run_until("what?? ok... ''yes''", Stage::MaskRepeatedPunctuation);
        assert_eq!(
            ctx.text,
            "what rEpPuNcT-0 ok rEpPuNcT-1 rEpPuNcT-2 yes rEpPuNcT-3"
        );
        assert!(ctx.flags.repeated_punctuation);
    }

    #[test]
    fn test_mask_contractions_uses_list_index() {
        let res = resources();
        assert_eq!(mask_contractions("don't", &res), "do cOnTrAcTiOn-6");
        assert_eq!(mask_contractions("DON'T", &res), "DO cOnTrAcTiOn-20");
        assert_eq!(
            mask_contractions("rock'n'roll", &res),
            "rock cOnTrAcTiOn-13 roll"
        );
        assert_eq!(mask_contractions("he 's", &res), "he cOnTrAcTiOn-8");
        assert_eq!(mask_contractions("it's", &res), "it's");
    }

    #[test]
    fn test_split_script_boundaries() {
        assert_eq!(split_script_boundaries("abcдом"), "abc дом");
        assert_eq!(split_script_boundaries("дом1"), "дом 1");
    }

    #[test]
    fn test_split_supplementary_plane() {
        assert_eq!(split_supplementary_plane("hi\u{1F600}\u{1F600}there"), "hi \u{1F600}\u{1F600} there");
    }

    #[test]
    fn test_base_tokenize_isolates_specials() {
        let out = base_tokenize("a(b)c\u{1}d", &mut Vec::new());
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), ["a", "(", "b", ")", "cd"]);

        let out = base_tokenize("5\u{20ac} \u{bf}qu\u{e9}?", &mut Vec::new());
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>(),
            ["5", "\u{20ac}", "\u{bf}", "qu\u{e9}", "?"]
        );
    }

    #[test]
    fn test_dot_runs_round_trip() {
        for n in [2, 3, 9, 10, 27] {
            let mut runs = Vec::new();
            let encoded = base_tokenize(&format!("a{}b c..d", ".".repeat(n)), &mut runs);
            assert_eq!(runs, [n, 2]);
            assert!(!encoded.contains('.'));

            let decoded = decode_dot_runs(&encoded, &runs);
            let dots = ".".repeat(n);
            assert_eq!(
                decoded.split_whitespace().collect::<Vec<_>>(),
                ["a", dots.as_str(), "b", "c", "..", "d"]
            );
        }
    }

    #[test]
    fn test_unlogged_dot_run_markers_are_kept() {
        let runs = [3];
        let huge = format!("{DOT_RUN_PREFIX}{}{DOT_RUN_SUFFIX}", usize::MAX);
        let text = format!("dOtRuN0\u{1f} dOtRuN1\u{1f} {huge} dOtRuN0x");

        assert_eq!(
            decode_dot_runs(&text, &runs),
            format!("... dOtRuN1\u{1f} {huge} dOtRuN0x")
        );
    }

    #[test]
    fn test_split_commas_keeps_numbers() {
        let out = split_commas("1,000 dollars, really");
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>(),
            ["1,000", "dollars", ",", "really"]
        );
    }

    #[test]
    fn test_split_apostrophes() {
        let words = |s: &str| {
            split_apostrophes(&format!(" {s} "))
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(words("O'Brien"), ["O'Brien"]);
        assert_eq!(words("1990's"), ["1990's"]);
        assert_eq!(words("dogs' toys"), ["dogs", "'", "toys"]);
        assert_eq!(words("'quoted"), ["'", "quoted"]);
        assert_eq!(words("a '' b"), ["a", "'", "'", "b"]);
        assert_eq!(words(".hello .5"), [".", "hello", ".5"]);
    }

    #[test]
    fn test_split_hyphens() {
        let words = |s: &str| {
            split_hyphens(s)
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(words("well-known"), ["well-known"]);
        assert_eq!(words("2-1"), ["2", "-", "1"]);
        assert_eq!(words("a--b"), ["a", "-", "-", "b"]);
        assert_eq!(words("x -y"), ["x", "-", "y"]);
        assert_eq!(words("sItEuRl-0"), ["sItEuRl-0"]);
    }

    #[test]
    fn test_merge_nonbreaking_prefixes() {
        let res = resources();
        let words = |s: &str| {
            merge_nonbreaking_prefixes(s, &res, &[3])
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(words("Dr. Smith arrived."), ["Dr.", "Smith", "arrived", "."]);
        assert_eq!(words("in 1990."), ["in", "1990", "."]);
        assert_eq!(words("the U.S. team"), ["the", "U.S.", "team"]);
        assert_eq!(words("No. 5"), ["No.", "5"]);
        assert_eq!(words("said no."), ["said", "no", "."]);
        assert_eq!(words("J. Smith"), ["J.", "Smith"]);
        assert_eq!(words("end.Next"), ["end", ".", "Next"]);
        assert_eq!(words("Mr.Smith"), ["Mr.", "Smith"]);
        assert_eq!(words("wait dOtRuN0\u{1f}"), ["wait", "..."]);
        assert_eq!(words("wait dOtRuN3x"), ["wait", "dOtRuN3x"]);
    }

    #[test]
    fn test_unmask_restores_everything() {
        let res = resources();
        let mut ctx = PipelineContext::new("");
        let url = ctx.tables.urls.mask("http://x.com !");
        let tag = ctx.tables.hashtags.mask("#tag");
        let run = ctx.tables.repeated_punctuation.mask("!!");
        ctx.flags.hashtags_or_mentions = true;
        ctx.flags.repeated_punctuation = true;
        ctx.text = format!("{url} {tag} do cOnTrAcTiOn-6 {run}");

        unmask(&mut ctx, &res);
        assert_eq!(ctx.text, "http://x.com ! #tag do n't !!");
    }

    #[test]
    fn test_unmask_skips_unflagged_categories() {
        let res = resources();
        let mut ctx = PipelineContext::new("");
        let tag = ctx.tables.hashtags.mask("#tag");
        ctx.text = tag.clone();

        unmask(&mut ctx, &res);
        assert_eq!(ctx.text, tag);
    }
}
