//! Keyphrase form generation.
//!
//! A keyphrase becomes one group of surface forms per content word; any form
//! in a group counts as an occurrence of that word. Synonyms get the same
//! treatment, one list of groups per synonym.

use serde::Serialize;

use crate::config::{dedup_preserving_order, LocaleRules};
use crate::tokenizer::{normalize, words};

/// Equivalent surface forms of one keyphrase word.
pub type WordForms = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyphraseForms {
    pub keyphrase_forms: Vec<WordForms>,
    pub synonyms_forms: Vec<Vec<WordForms>>,
}

impl KeyphraseForms {
    /// Number of word groups in the keyphrase.
    pub fn keyphrase_length(&self) -> usize {
        self.keyphrase_forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyphrase_forms.is_empty() && self.synonyms_forms.iter().all(Vec::is_empty)
    }
}

/// Builds forms for a keyphrase and its synonyms. `rules` of `None` means
/// the locale has no morphology: each word is its only form.
pub fn build_forms(
    keyphrase: &str,
    synonyms: &[String],
    locale: &str,
    rules: Option<&LocaleRules>,
) -> KeyphraseForms {
    KeyphraseForms {
        keyphrase_forms: phrase_forms(keyphrase, locale, rules),
        synonyms_forms: synonyms
            .iter()
            .map(|synonym| phrase_forms(synonym, locale, rules))
            .filter(|forms| !forms.is_empty())
            .collect(),
    }
}

/// Inner text of a phrase wrapped in straight or typographic double quotes.
pub fn exact_match_phrase(phrase: &str) -> Option<String> {
    let normalized = normalize(phrase.trim());
    let inner = normalized.strip_prefix('"')?.strip_suffix('"')?.trim();
    if inner.is_empty() {
        return None;
    }
    Some(inner.to_string())
}

/// Content words of a phrase: function words are dropped unless that would
/// leave nothing.
pub fn content_words(phrase: &str, locale: &str, rules: Option<&LocaleRules>) -> Vec<String> {
    let all = words(phrase, locale);
    let Some(rules) = rules else {
        return all;
    };
    if all.len() < 2 {
        return all;
    }
    let content: Vec<String> = all
        .iter()
        .filter(|w| !rules.is_function_word(w))
        .cloned()
        .collect();
    if content.is_empty() {
        all
    } else {
        content
    }
}

fn phrase_forms(phrase: &str, locale: &str, rules: Option<&LocaleRules>) -> Vec<WordForms> {
    if let Some(exact) = exact_match_phrase(phrase) {
        return vec![vec![exact]];
    }
    content_words(phrase, locale, rules)
        .into_iter()
        .map(|word| match rules {
            Some(rules) => rules.forms(&word),
            None => vec![word],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dehyphenation
// ---------------------------------------------------------------------------

/// Splits hyphenated keyphrase groups into one group per compound, for
/// matching against slugs where hyphens separate words.
///
/// A group is split when its first form contains a hyphen. Compound `i` of
/// every form lands in group `i`, so `[pop-art, pop-arts]` becomes
/// `[pop]`, `[art, arts]`. Synonym forms are left alone. Returns a new
/// value; the input is only borrowed.
pub fn dehyphenate(forms: &KeyphraseForms) -> KeyphraseForms {
    let mut keyphrase_forms = Vec::with_capacity(forms.keyphrase_forms.len());
    for group in &forms.keyphrase_forms {
        let hyphenated = group.first().is_some_and(|first| first.contains('-'));
        if !hyphenated {
            keyphrase_forms.push(group.clone());
            continue;
        }
        let mut compounds: Vec<Vec<String>> = Vec::new();
        for form in group {
            let parts = form.split('-').filter(|part| !part.is_empty());
            for (i, part) in parts.enumerate() {
                if compounds.len() <= i {
                    compounds.push(Vec::new());
                }
                compounds[i].push(part.to_string());
            }
        }
        keyphrase_forms.extend(compounds.into_iter().map(dedup_preserving_order));
    }
    KeyphraseForms {
        keyphrase_forms,
        synonyms_forms: forms.synonyms_forms.clone(),
    }
}
