//! Locale-aware text primitives: normalization, word boundaries, sentence
//! and word segmentation, and boundary-checked occurrence counting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{language_of, HP};

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?]["'\u{201D}\u{2019})\]]*(?:\s|$)|[\u{3002}\u{FF01}\u{FF1F}]|\n"#).unwrap()
});

static PUNCT_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\w]+|[^\w]+$").unwrap());

/// Characters that delimit words besides whitespace.
const WORD_BOUNDARIES: &[char] = &[
    '.', ',', '\'', '(', ')', '"', '+', '-', ';', '!', '?', ':', '/', '\u{BB}', '\u{AB}',
    '\u{2039}', '\u{203A}', '<', '>', '\u{BF}', '\u{A1}', '\u{2026}', '\u{2013}', '\u{2014}',
];

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn fold_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201B}' | '`' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
        other => other,
    }
}

/// Lowercases and folds typographic quotes to their ASCII counterparts.
pub fn normalize(text: &str) -> String {
    text.chars().map(fold_quote).collect::<String>().to_lowercase()
}

/// Maps a byte offset in `normalize(original)` back to a character count in
/// `original`. Lowercasing can change a character's length (`İ` becomes two
/// characters), so offsets in the two strings differ.
pub fn original_char_offset(original: &str, normalized_offset: usize) -> usize {
    let mut consumed = 0;
    for (index, c) in original.chars().enumerate() {
        if consumed >= normalized_offset {
            return index;
        }
        consumed += fold_quote(c).to_lowercase().map(char::len_utf8).sum::<usize>();
    }
    original.chars().count()
}

/// Replaces HTML tags with a space so adjacent words stay separated.
pub fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, " ").into_owned()
}

pub fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || WORD_BOUNDARIES.contains(&c)
}

/// Whether words in this locale are delimited by whitespace/punctuation.
pub fn has_word_boundaries(locale: &str) -> bool {
    let language = language_of(locale);
    !HP.no_word_boundary_languages.contains(&language.as_str())
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

pub fn split_sentences(text: &str) -> Vec<String> {
    SENTENCE_SPLIT_RE
        .split(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased words with surrounding punctuation stripped. Inner hyphens and
/// apostrophes survive. In locales without word boundaries every
/// alphanumeric character is a word.
pub fn words(text: &str, locale: &str) -> Vec<String> {
    let normalized = normalize(text);
    if !has_word_boundaries(locale) {
        return normalized
            .chars()
            .filter(|c| c.is_alphanumeric())
            .map(String::from)
            .collect();
    }
    normalized
        .split_whitespace()
        .filter_map(|t| {
            let stripped = PUNCT_STRIP_RE.replace_all(t, "");
            if stripped.is_empty() {
                None
            } else {
                Some(stripped.into_owned())
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Occurrence search
// ---------------------------------------------------------------------------

/// Non-overlapping occurrences of `needle` in `haystack`, both already
/// normalized. With `word_boundaries`, an occurrence only counts when it
/// sits between boundary characters or string edges.
pub fn count_occurrences(haystack: &str, needle: &str, word_boundaries: bool) -> usize {
    find_occurrences(haystack, needle, word_boundaries).len()
}

/// Byte offsets of the occurrences counted by [`count_occurrences`]. A
/// candidate rejected by the boundary check does not hide an overlapping
/// candidate that starts inside it.
pub fn find_occurrences(haystack: &str, needle: &str, word_boundaries: bool) -> Vec<usize> {
    let mut starts = Vec::new();
    if needle.is_empty() {
        return starts;
    }
    let mut from = 0;
    while let Some(found) = haystack[from..].find(needle) {
        let start = from + found;
        let end = start + needle.len();
        if !word_boundaries || is_delimited(haystack, start, end) {
            starts.push(start);
            from = end;
        } else {
            from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    starts
}

fn is_delimited(haystack: &str, start: usize, end: usize) -> bool {
    let before_ok = haystack[..start]
        .chars()
        .next_back()
        .map_or(true, is_word_boundary);
    let after_ok = haystack[end..].chars().next().map_or(true, is_word_boundary);
    before_ok && after_ok
}
