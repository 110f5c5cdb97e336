use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

pub(crate) struct Hyperparameters {
    pub percent_max: f64,
    pub default_locale: &'static str,
    pub sentence_length_limit: usize,
    pub no_word_boundary_languages: &'static [&'static str],
    pub default_min_stem_length: usize,
}

pub(crate) static HP: Hyperparameters = Hyperparameters {
    percent_max: 100.0,
    default_locale: "en_US",
    sentence_length_limit: 20,
    no_word_boundary_languages: &["ja", "zh", "th"],
    default_min_stem_length: 3,
};

// ---------------------------------------------------------------------------
// Locale rules
// ---------------------------------------------------------------------------

/// One reversible suffix rule: `strip` is removed and replaced by `replace`
/// when stemming, and the reverse applies when generating forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub strip: String,
    #[serde(default)]
    pub replace: String,
    /// The stem must end with one of these for the rule to apply. Empty
    /// means unconditional.
    #[serde(default)]
    pub after: Vec<String>,
    /// The rule never applies to a stem ending with one of these.
    #[serde(default)]
    pub not_after: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SuffixRule {
    fn new(strip: &str, replace: &str, after: &[&str]) -> Self {
        Self {
            strip: strip.to_string(),
            replace: replace.to_string(),
            after: owned(after),
            not_after: Vec::new(),
        }
    }

    fn not_after(mut self, endings: &[&str]) -> Self {
        self.not_after = owned(endings);
        self
    }

    fn accepts_stem(&self, stem: &str) -> bool {
        if self.not_after.iter().any(|a| stem.ends_with(a.as_str())) {
            return false;
        }
        self.after.is_empty() || self.after.iter().any(|a| stem.ends_with(a.as_str()))
    }

    /// The stem this rule yields for `word`, if the rule applies.
    fn stem(&self, word: &str, min_stem_length: usize) -> Option<String> {
        let base = word.strip_suffix(self.strip.as_str())?;
        let stem = format!("{base}{}", self.replace);
        if stem.chars().count() < min_stem_length || !self.accepts_stem(&stem) {
            return None;
        }
        Some(stem)
    }

    /// The inflected form this rule produces from `stem`, if the rule applies.
    fn inflect(&self, stem: &str) -> Option<String> {
        if !self.accepts_stem(stem) {
            return None;
        }
        let base = stem.strip_suffix(self.replace.as_str())?;
        Some(format!("{base}{}", self.strip))
    }
}

/// Stemming and tokenization settings for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleRules {
    #[serde(default)]
    pub suffixes: Vec<SuffixRule>,
    #[serde(default)]
    pub function_words: Vec<String>,
    /// Words that look inflected but are not (`news`, `series`). They are
    /// their own only form.
    #[serde(default)]
    pub invariant_words: Vec<String>,
    #[serde(default = "default_min_stem_length")]
    pub min_stem_length: usize,
    #[serde(default)]
    pub sentence_length_limit: Option<usize>,
}

fn default_min_stem_length() -> usize {
    HP.default_min_stem_length
}

impl LocaleRules {
    /// Strips the first applicable suffix rule. Words no rule applies to are
    /// their own stem.
    pub fn stem(&self, word: &str) -> String {
        if self.is_invariant(word) {
            return word.to_string();
        }
        self.suffixes
            .iter()
            .find_map(|rule| rule.stem(word, self.min_stem_length))
            .unwrap_or_else(|| word.to_string())
    }

    /// All surface forms of `word`: the word itself, its stem when a rule
    /// produced one, then the stem re-inflected by every applicable rule.
    /// Order is stable, no duplicates.
    pub fn forms(&self, word: &str) -> Vec<String> {
        if self.is_invariant(word) {
            return vec![word.to_string()];
        }
        let stem = self.stem(word);
        let mut candidates = vec![word.to_string()];
        if stem != word {
            candidates.push(stem.clone());
        }
        candidates.extend(self.suffixes.iter().filter_map(|rule| rule.inflect(&stem)));
        dedup_preserving_order(candidates)
    }

    pub fn is_function_word(&self, word: &str) -> bool {
        self.function_words.iter().any(|w| w == word)
    }

    fn is_invariant(&self, word: &str) -> bool {
        self.invariant_words.iter().any(|w| w == word)
    }

    pub fn sentence_length_limit(&self) -> usize {
        self.sentence_length_limit
            .unwrap_or(HP.sentence_length_limit)
    }

    fn validate(&self, locale: &str) -> Result<(), ResearchError> {
        let malformed = |reason: String| ResearchError::MalformedRules {
            locale: locale.to_string(),
            reason,
        };
        if self.min_stem_length == 0 {
            return Err(malformed("min_stem_length must be at least 1".into()));
        }
        if let Some((i, _)) = self
            .suffixes
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.strip.is_empty())
        {
            return Err(malformed(format!("suffix rule {i} has an empty 'strip'")));
        }
        if self.sentence_length_limit == Some(0) {
            return Err(malformed("sentence_length_limit must be positive".into()));
        }
        if self.function_words.iter().any(|w| w.trim().is_empty()) {
            return Err(malformed("function_words contains an empty entry".into()));
        }
        if self.invariant_words.iter().any(|w| w.trim().is_empty()) {
            return Err(malformed("invariant_words contains an empty entry".into()));
        }
        Ok(())
    }
}

pub(crate) fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }
    unique
}

// ---------------------------------------------------------------------------
// Morphology config
// ---------------------------------------------------------------------------

/// Locale-to-rules table. Keys are lowercased locale tags (`en_us`) or bare
/// languages (`en`). A locale without an entry gets identity morphology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphologyConfig {
    #[serde(default)]
    locales: BTreeMap<String, LocaleRules>,
}

impl MorphologyConfig {
    /// A table with no rules at all: every locale falls back to identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules shipped with the crate.
    pub fn builtin() -> Self {
        let mut locales = BTreeMap::new();
        locales.insert("en".to_string(), english_rules());
        locales.insert("de".to_string(), german_rules());
        Self { locales }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ResearchError> {
        let raw: MorphologyConfig =
            serde_json::from_str(json).map_err(|e| ResearchError::Config(e.to_string()))?;
        let locales = raw
            .locales
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
        let config = Self { locales };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ResearchError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ResearchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Entries from `other` replace entries with the same key.
    pub fn merged_with(mut self, other: MorphologyConfig) -> Self {
        self.locales.extend(other.locales);
        self
    }

    pub fn with_locale(mut self, locale: &str, rules: LocaleRules) -> Result<Self, ResearchError> {
        let key = normalize_key(locale);
        rules.validate(&key)?;
        self.locales.insert(key, rules);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ResearchError> {
        for (locale, rules) in &self.locales {
            rules.validate(locale)?;
        }
        Ok(())
    }

    /// Full locale first, then its language.
    pub fn rules_for(&self, locale: &str) -> Option<&LocaleRules> {
        self.locales
            .get(&normalize_key(locale))
            .or_else(|| self.locales.get(&language_of(locale)))
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

fn normalize_key(locale: &str) -> String {
    locale.trim().replace('-', "_").to_lowercase()
}

/// `en_US` and `en-US` both yield `en`.
pub fn language_of(locale: &str) -> String {
    locale
        .trim()
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn english_rules() -> LocaleRules {
    LocaleRules {
        suffixes: vec![
            SuffixRule::new("'s", "", &[]),
            SuffixRule::new("ies", "y", &[]),
            SuffixRule::new("es", "", &["s", "x", "z", "ch", "sh"]),
            SuffixRule::new("s", "", &[]).not_after(&["s", "u", "i"]),
        ],
        function_words: owned(&[
            "a", "an", "the", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with",
            "by", "from", "is", "are", "was", "were", "be", "it", "this", "that", "how", "what",
            "which", "who", "my", "your", "our", "their", "i", "you", "we", "they",
        ]),
        invariant_words: owned(&[
            "news", "series", "species", "means", "lens", "physics", "mathematics", "economics",
            "politics", "ethics", "always", "perhaps", "towards",
        ]),
        min_stem_length: HP.default_min_stem_length,
        sentence_length_limit: None,
    }
}

fn german_rules() -> LocaleRules {
    LocaleRules {
        suffixes: vec![
            SuffixRule::new("en", "", &[]),
            SuffixRule::new("er", "", &[]),
            SuffixRule::new("e", "", &[]),
            SuffixRule::new("n", "", &[]),
            SuffixRule::new("s", "", &[]),
        ],
        function_words: owned(&[
            "der", "die", "das", "ein", "eine", "und", "oder", "in", "im", "mit", "von", "zu",
            "für", "auf", "ist", "sind",
        ]),
        invariant_words: Vec::new(),
        min_stem_length: HP.default_min_stem_length,
        sentence_length_limit: Some(20),
    }
}
