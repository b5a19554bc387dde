//! Result teasers: a short excerpt of a result body with the query terms emphasized.
//!
//! Every word in the body gets a weight:
//!
//! | Word | Weight |
//! |---|---|
//! | stem starts with a stemmed query term | 40 |
//! | first word of a sentence | 8 |
//! | anything else | 2 |
//!
//! A fixed-size window of words slides over the body and the window with the
//! highest total weight becomes the teaser. Among equal maxima the one that
//! starts last wins. When no word matches a query term the first window is
//! used. Matched words are wrapped in `<em>`.
//!
//! The body is HTML-escaped before any slicing, so byte offsets recorded for
//! each word index directly into the text that ends up in the output.

use std::borrow::Cow;

/// Weight of a word whose stem starts with a stemmed query term.
pub const MATCH_WEIGHT: u32 = 40;
/// Weight of the first word of a sentence.
pub const SENTENCE_START_WEIGHT: u32 = 8;
/// Weight of every other word.
pub const WORD_WEIGHT: u32 = 2;

const SENTENCE_BREAK: &str = ". ";
const EMPHASIS_START: &str = "<em>";
const EMPHASIS_END: &str = "</em>";

/// A word of the escaped body with its weight and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedWord<'a> {
    /// Word text exactly as it appears in the escaped body.
    pub text: &'a str,
    /// One of [`MATCH_WEIGHT`], [`SENTENCE_START_WEIGHT`], [`WORD_WEIGHT`].
    pub weight: u32,
    /// Byte offset of the word in the escaped body.
    pub byte_offset: usize,
}

impl WeightedWord<'_> {
    /// Whether this word matched a query term.
    pub const fn is_match(&self) -> bool {
        self.weight == MATCH_WEIGHT
    }

    const fn end(&self) -> usize {
        self.byte_offset + self.text.len()
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` for safe inclusion in HTML.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Build the teaser for one result body.
///
/// `stem` reduces a lower-cased word to its root form. It is applied to both
/// the query terms and the body words.
pub fn make_teaser<T, S>(body: &str, terms: &[T], teaser_word_count: usize, stem: S) -> String
where
    T: AsRef<str>,
    S: Fn(&str) -> String,
{
    let escaped = escape_html(body);
    let stemmed_terms: Vec<String> = terms
        .iter()
        .map(|term| stem(&term.as_ref().to_lowercase()))
        .filter(|term| !term.is_empty())
        .collect();

    let (words, found) = weigh_words(&escaped, &stemmed_terms, &stem);
    if words.is_empty() {
        return escaped.into_owned();
    }

    let window_size = words.len().min(teaser_word_count.max(1));
    let sums = window_sums(&words, window_size);
    let start = if found { best_window(&sums) } else { 0 };

    emit_window(&escaped, &words[start..start + window_size])
}

/// Split the escaped body into sentences and words and weigh every word.
///
/// Sentences end at `". "`. Words are separated by single ASCII whitespace
/// characters, so runs of whitespace yield empty pieces that are skipped.
///
/// Returns the words in document order and whether any word matched.
pub fn weigh_words<'a, S>(
    escaped: &'a str,
    stemmed_terms: &[String],
    stem: S,
) -> (Vec<WeightedWord<'a>>, bool)
where
    S: Fn(&str) -> String,
{
    let mut words = Vec::new();
    let mut found = false;
    let mut sentence_offset = 0;

    for sentence in escaped.split(SENTENCE_BREAK) {
        let mut weight = SENTENCE_START_WEIGHT;
        let mut word_offset = sentence_offset;

        for word in sentence.split(|c: char| c.is_ascii_whitespace()) {
            if !word.is_empty() {
                let stemmed = stem(&word.to_lowercase());
                if stemmed_terms.iter().any(|term| stemmed.starts_with(term.as_str())) {
                    weight = MATCH_WEIGHT;
                    found = true;
                }
                words.push(WeightedWord {
                    text: word,
                    weight,
                    byte_offset: word_offset,
                });
                weight = WORD_WEIGHT;
            }
            word_offset += word.len() + 1;
        }

        sentence_offset += sentence.len() + SENTENCE_BREAK.len();
    }

    (words, found)
}

/// Sum of weights for every window of `window_size` consecutive words.
///
/// Entry `i` covers `words[i..i + window_size]`.
fn window_sums(words: &[WeightedWord<'_>], window_size: usize) -> Vec<u32> {
    let mut sums = Vec::with_capacity(words.len() - window_size + 1);
    let mut current: u32 = words[..window_size].iter().map(|w| w.weight).sum();
    sums.push(current);

    for i in 0..words.len() - window_size {
        current -= words[i].weight;
        current += words[i + window_size].weight;
        sums.push(current);
    }
    sums
}

/// Index of the heaviest window, preferring the last one among ties.
fn best_window(sums: &[u32]) -> usize {
    let mut best = sums.len() - 1;
    for i in (0..sums.len()).rev() {
        if sums[i] > sums[best] {
            best = i;
        }
    }
    best
}

fn emit_window(escaped: &str, window: &[WeightedWord<'_>]) -> String {
    let mut teaser = String::new();
    let mut cursor = window.first().map_or(0, |w| w.byte_offset);

    for word in window {
        if cursor < word.byte_offset {
            teaser.push_str(&escaped[cursor..word.byte_offset]);
        }
        if word.is_match() {
            teaser.push_str(EMPHASIS_START);
            teaser.push_str(word.text);
            teaser.push_str(EMPHASIS_END);
        } else {
            teaser.push_str(word.text);
        }
        cursor = word.end();
    }
    teaser
}
