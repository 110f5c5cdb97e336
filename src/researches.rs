//! The research library. Each research reads the paper and, through the
//! researcher, the memoized results it depends on. Degenerate input (empty
//! keyphrase, empty text, missing slug) yields zero results, never errors.

use serde::Serialize;
use tracing::debug;

use crate::config::HP;
use crate::error::ResearchError;
use crate::matcher::{count_full_occurrences, find_topic_forms_in_string, BoundaryMode};
use crate::morphology::{build_forms, content_words, dehyphenate, exact_match_phrase, KeyphraseForms};
use crate::paper::Paper;
use crate::researcher::{Research, ResearchResult, Researcher};
use crate::slug::parse_slug;
use crate::tokenizer::{
    find_occurrences, has_word_boundaries, normalize, original_char_offset, split_sentences,
    strip_html, words,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyphraseInSlug {
    pub keyphrase_length: usize,
    pub percent_word_matches: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyphraseLength {
    pub keyphrase_length: usize,
    pub function_words: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountUnit {
    Word,
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub count: usize,
    pub unit: CountUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyphraseCount {
    pub count: usize,
    /// Sentences containing at least one full occurrence.
    pub markings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeywordDensity {
    pub density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleMatch {
    pub exact_match_found: bool,
    pub all_words_found: bool,
    /// Character offset of the exact match; `None` without one.
    pub position: Option<usize>,
    pub exact_match_keyphrase: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetaDescriptionKeyword {
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceLength {
    pub sentence: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceLengths {
    pub sentences: Vec<SentenceLength>,
    pub average_length: f64,
    pub long_sentence_percentage: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn body_text(paper: &Paper) -> String {
    strip_html(paper.text())
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * HP.percent_max).clamp(0.0, HP.percent_max)
}

/// Full occurrences of the keyphrase, or of a synonym when the keyphrase has
/// none, per sentence.
fn topic_occurrences_per_sentence(
    forms: &KeyphraseForms,
    sentences: &[String],
    locale: &str,
) -> Vec<(String, usize)> {
    sentences
        .iter()
        .map(|sentence| {
            let best = std::iter::once(&forms.keyphrase_forms)
                .chain(forms.synonyms_forms.iter())
                .map(|topic| count_full_occurrences(topic, sentence, BoundaryMode::Strict, locale))
                .max()
                .unwrap_or(0);
            (sentence.clone(), best)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Researches
// ---------------------------------------------------------------------------

pub fn morphology(paper: &Paper, researcher: &Researcher<'_>) -> Result<KeyphraseForms, ResearchError> {
    Ok(build_forms(
        paper.keyword(),
        paper.synonyms(),
        paper.locale(),
        researcher.locale_rules(),
    ))
}

/// How much of the keyphrase appears in the slug. Hyphenated keyphrase words
/// are split first because the slug's hyphens become spaces.
pub fn keyword_count_in_url(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<KeyphraseInSlug, ResearchError> {
    let forms = researcher.morphology()?;
    let topic_forms = dehyphenate(&forms);
    let keyphrase_length = topic_forms.keyphrase_length();

    let slug = paper.effective_slug();
    if slug.trim().is_empty() || keyphrase_length == 0 {
        debug!(keyphrase_length, "no slug or keyphrase to match");
        return Ok(KeyphraseInSlug {
            keyphrase_length,
            percent_word_matches: 0.0,
        });
    }

    let parsed = parse_slug(&slug);
    let report =
        find_topic_forms_in_string(&topic_forms, &parsed, BoundaryMode::Loose, false, paper.locale());
    Ok(KeyphraseInSlug {
        keyphrase_length,
        percent_word_matches: report.percent_word_matches,
    })
}

pub fn keyphrase_length(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<KeyphraseLength, ResearchError> {
    let keyword = paper.keyword();
    if let Some(exact) = exact_match_phrase(keyword) {
        return Ok(KeyphraseLength {
            keyphrase_length: words(&exact, paper.locale()).len(),
            function_words: Vec::new(),
        });
    }
    let rules = researcher.locale_rules();
    let all = words(keyword, paper.locale());
    let content = content_words(keyword, paper.locale(), rules);
    let function_words = match rules {
        Some(rules) => all.into_iter().filter(|w| rules.is_function_word(w)).collect(),
        None => Vec::new(),
    };
    Ok(KeyphraseLength {
        keyphrase_length: content.len(),
        function_words,
    })
}

pub fn word_count_in_text(paper: &Paper, _: &Researcher<'_>) -> Result<WordCount, ResearchError> {
    let unit = if has_word_boundaries(paper.locale()) {
        CountUnit::Word
    } else {
        CountUnit::Character
    };
    Ok(WordCount {
        count: words(&body_text(paper), paper.locale()).len(),
        unit,
    })
}

/// Sum over sentences of the times the full keyphrase occurs in each.
pub fn keyphrase_count(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<KeyphraseCount, ResearchError> {
    let forms = researcher.morphology()?;
    if forms.is_empty() {
        return Ok(KeyphraseCount {
            count: 0,
            markings: Vec::new(),
        });
    }
    let sentences = split_sentences(&body_text(paper));
    let per_sentence = topic_occurrences_per_sentence(&forms, &sentences, paper.locale());

    let count = per_sentence.iter().map(|(_, n)| n).sum();
    let markings = per_sentence
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(sentence, _)| sentence)
        .collect();
    Ok(KeyphraseCount { count, markings })
}

/// Keyphrase occurrences per hundred words.
pub fn keyword_density(
    _: &Paper,
    researcher: &Researcher<'_>,
) -> Result<KeywordDensity, ResearchError> {
    let word_count = researcher.dependency(Research::WordCountInText, ResearchResult::as_word_count)?;
    let keyphrase_count =
        researcher.dependency(Research::KeyphraseCount, ResearchResult::as_keyphrase_count)?;
    if word_count.count == 0 {
        return Ok(KeywordDensity { density: 0.0 });
    }
    Ok(KeywordDensity {
        density: keyphrase_count.count as f64 / word_count.count as f64 * 100.0,
    })
}

/// Whether the SEO title contains the keyphrase verbatim, and where. A match
/// preceded only by function words counts as being at the start.
pub fn find_keyphrase_in_seo_title(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<TitleMatch, ResearchError> {
    let mut result = TitleMatch {
        exact_match_found: false,
        all_words_found: false,
        position: None,
        exact_match_keyphrase: false,
    };
    if !paper.has_keyword() || paper.title().trim().is_empty() {
        return Ok(result);
    }

    let locale = paper.locale();
    let title = normalize(paper.title());
    let exact = exact_match_phrase(paper.keyword());
    result.exact_match_keyphrase = exact.is_some();
    let needle = exact.unwrap_or_else(|| normalize(paper.keyword().trim()));

    let boundaries = has_word_boundaries(locale);
    if let Some(&offset) = find_occurrences(&title, &needle, boundaries).first() {
        result.exact_match_found = true;
        result.all_words_found = true;
        let rules = researcher.locale_rules();
        let leading = words(&title[..offset], locale);
        let only_function_words = rules.is_some_and(|rules| leading.iter().all(|w| rules.is_function_word(w)));
        result.position = Some(if only_function_words {
            0
        } else {
            original_char_offset(paper.title(), offset)
        });
        return Ok(result);
    }
    if result.exact_match_keyphrase {
        return Ok(result);
    }

    let forms = researcher.morphology()?;
    let report = find_topic_forms_in_string(&forms, &title, BoundaryMode::Strict, true, locale);
    result.all_words_found = report.is_full_match();
    Ok(result)
}

/// Full keyphrase (or synonym) occurrences in the meta description.
pub fn meta_description_keyword(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<MetaDescriptionKeyword, ResearchError> {
    let forms = researcher.morphology()?;
    if forms.is_empty() || paper.description().trim().is_empty() {
        return Ok(MetaDescriptionKeyword { count: 0 });
    }
    let sentences = split_sentences(paper.description());
    let count = topic_occurrences_per_sentence(&forms, &sentences, paper.locale())
        .iter()
        .map(|(_, n)| n)
        .sum();
    Ok(MetaDescriptionKeyword { count })
}

pub fn sentence_length_in_text(
    paper: &Paper,
    researcher: &Researcher<'_>,
) -> Result<SentenceLengths, ResearchError> {
    let limit = researcher
        .locale_rules()
        .map_or(HP.sentence_length_limit, |rules| rules.sentence_length_limit());
    let sentences: Vec<SentenceLength> = split_sentences(&body_text(paper))
        .into_iter()
        .map(|sentence| {
            let word_count = words(&sentence, paper.locale()).len();
            SentenceLength {
                sentence,
                word_count,
            }
        })
        .filter(|s| s.word_count > 0)
        .collect();

    let total: usize = sentences.iter().map(|s| s.word_count).sum();
    let long = sentences.iter().filter(|s| s.word_count > limit).count();
    let average_length = if sentences.is_empty() {
        0.0
    } else {
        total as f64 / sentences.len() as f64
    };
    Ok(SentenceLengths {
        long_sentence_percentage: percentage(long, sentences.len()),
        average_length,
        sentences,
    })
}
