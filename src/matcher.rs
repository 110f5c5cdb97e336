//! Matching keyphrase forms against text.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::HP;
use crate::morphology::{KeyphraseForms, WordForms};
use crate::tokenizer::{count_occurrences, find_occurrences, has_word_boundaries, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Forms must be delimited by boundary characters or string edges.
    Strict,
    /// Any substring occurrence counts.
    Loose,
}

/// Which topic produced a [`MatchReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "index")]
pub enum Topic {
    Keyphrase,
    Synonym(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// Word groups with at least one form present.
    pub count: usize,
    /// The first matching form of each matched group.
    pub matches: Vec<String>,
    pub percent_word_matches: f64,
    pub topic: Topic,
}

impl MatchReport {
    fn empty(topic: Topic) -> Self {
        Self {
            count: 0,
            matches: Vec::new(),
            percent_word_matches: 0.0,
            topic,
        }
    }

    pub fn is_full_match(&self) -> bool {
        self.count > 0 && self.percent_word_matches >= HP.percent_max
    }
}

fn effective_boundaries(mode: BoundaryMode, locale: &str) -> bool {
    mode == BoundaryMode::Strict && has_word_boundaries(locale)
}

fn find_groups(
    word_forms: &[WordForms],
    normalized_text: &str,
    boundaries: bool,
    topic: Topic,
) -> MatchReport {
    if word_forms.is_empty() {
        return MatchReport::empty(topic);
    }
    let matches: Vec<String> = word_forms
        .iter()
        .filter_map(|group| {
            group
                .iter()
                .map(|form| normalize(form))
                .find(|form| count_occurrences(normalized_text, form, boundaries) > 0)
        })
        .collect();
    let count = matches.len();
    let percent = (count as f64 / word_forms.len() as f64 * HP.percent_max).clamp(0.0, HP.percent_max);
    MatchReport {
        count,
        matches,
        percent_word_matches: percent,
        topic,
    }
}

/// Matches the keyphrase and, when `use_synonyms` is set and the keyphrase
/// is not fully present, each synonym. The best-scoring topic wins; the
/// keyphrase wins ties.
pub fn find_topic_forms_in_string(
    forms: &KeyphraseForms,
    text: &str,
    mode: BoundaryMode,
    use_synonyms: bool,
    locale: &str,
) -> MatchReport {
    let normalized = normalize(text);
    let boundaries = effective_boundaries(mode, locale);
    let mut best = find_groups(&forms.keyphrase_forms, &normalized, boundaries, Topic::Keyphrase);
    if !use_synonyms || best.is_full_match() {
        return best;
    }
    for (i, synonym) in forms.synonyms_forms.iter().enumerate() {
        let report = find_groups(synonym, &normalized, boundaries, Topic::Synonym(i));
        if report.percent_word_matches > best.percent_word_matches {
            best = report;
        }
        if best.is_full_match() {
            break;
        }
    }
    best
}

/// How many times a topic occurs in full: the smallest occurrence count
/// over its word groups, or zero if any group is missing.
pub fn count_full_occurrences(
    word_forms: &[WordForms],
    text: &str,
    mode: BoundaryMode,
    locale: &str,
) -> usize {
    if word_forms.is_empty() {
        return 0;
    }
    let normalized = normalize(text);
    let boundaries = effective_boundaries(mode, locale);
    word_forms
        .iter()
        .map(|group| {
            // "art" and "art's" start at the same offset; count it once.
            group
                .iter()
                .flat_map(|form| find_occurrences(&normalized, &normalize(form), boundaries))
                .collect::<BTreeSet<usize>>()
                .len()
        })
        .min()
        .unwrap_or(0)
}
