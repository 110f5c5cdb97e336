//! Research registry and the per-run memoizing researcher.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{LocaleRules, MorphologyConfig};
use crate::error::ResearchError;
use crate::morphology::KeyphraseForms;
use crate::paper::Paper;
use crate::researches::{
    self, KeyphraseCount, KeyphraseInSlug, KeyphraseLength, KeywordDensity, MetaDescriptionKeyword,
    SentenceLengths, TitleMatch, WordCount,
};

// ---------------------------------------------------------------------------
// Research identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Research {
    Morphology,
    KeywordCountInUrl,
    KeyphraseLength,
    WordCountInText,
    KeyphraseCount,
    KeywordDensity,
    FindKeyphraseInSeoTitle,
    MetaDescriptionKeyword,
    SentenceLengthInText,
}

impl Research {
    pub const ALL: [Research; 9] = [
        Research::Morphology,
        Research::KeywordCountInUrl,
        Research::KeyphraseLength,
        Research::WordCountInText,
        Research::KeyphraseCount,
        Research::KeywordDensity,
        Research::FindKeyphraseInSeoTitle,
        Research::MetaDescriptionKeyword,
        Research::SentenceLengthInText,
    ];

    /// The external name used by callers and in serialized reports.
    pub fn name(self) -> &'static str {
        match self {
            Research::Morphology => "morphology",
            Research::KeywordCountInUrl => "keywordCountInUrl",
            Research::KeyphraseLength => "keyphraseLength",
            Research::WordCountInText => "wordCountInText",
            Research::KeyphraseCount => "keyphraseCount",
            Research::KeywordDensity => "getKeywordDensity",
            Research::FindKeyphraseInSeoTitle => "findKeyphraseInSEOTitle",
            Research::MetaDescriptionKeyword => "metaDescriptionKeyword",
            Research::SentenceLengthInText => "sentenceLengthInText",
        }
    }

    /// Researches whose results this one reads.
    pub fn dependencies(self) -> &'static [Research] {
        match self {
            Research::Morphology
            | Research::KeyphraseLength
            | Research::WordCountInText
            | Research::SentenceLengthInText => &[],
            Research::KeywordCountInUrl
            | Research::KeyphraseCount
            | Research::FindKeyphraseInSeoTitle
            | Research::MetaDescriptionKeyword => &[Research::Morphology],
            Research::KeywordDensity => &[Research::KeyphraseCount, Research::WordCountInText],
        }
    }
}

impl fmt::Display for Research {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Research {
    type Err = ResearchError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name == "keywordCountInSlug" {
            return Ok(Research::KeywordCountInUrl);
        }
        Research::ALL
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| ResearchError::UnknownResearch(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResearchResult {
    Morphology(Arc<KeyphraseForms>),
    KeyphraseInSlug(KeyphraseInSlug),
    KeyphraseLength(KeyphraseLength),
    WordCount(WordCount),
    KeyphraseCount(KeyphraseCount),
    KeywordDensity(KeywordDensity),
    TitleMatch(TitleMatch),
    MetaDescriptionKeyword(MetaDescriptionKeyword),
    SentenceLengths(SentenceLengths),
}

macro_rules! accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        pub fn $fn_name(&self) -> Option<&$ty> {
            match self {
                ResearchResult::$variant(value) => Some(value),
                _ => None,
            }
        }
    };
}

impl ResearchResult {
    accessor!(as_morphology, Morphology, Arc<KeyphraseForms>);
    accessor!(as_keyphrase_in_slug, KeyphraseInSlug, KeyphraseInSlug);
    accessor!(as_keyphrase_length, KeyphraseLength, KeyphraseLength);
    accessor!(as_word_count, WordCount, WordCount);
    accessor!(as_keyphrase_count, KeyphraseCount, KeyphraseCount);
    accessor!(as_keyword_density, KeywordDensity, KeywordDensity);
    accessor!(as_title_match, TitleMatch, TitleMatch);
    accessor!(as_meta_description_keyword, MetaDescriptionKeyword, MetaDescriptionKeyword);
    accessor!(as_sentence_lengths, SentenceLengths, SentenceLengths);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub type ResearchFn = fn(&Paper, &Researcher<'_>) -> Result<ResearchResult, ResearchError>;

/// Maps research identifiers to their implementations. Dependencies must be
/// registered before the researches that read them.
#[derive(Clone, Default)]
pub struct ResearchRegistry {
    entries: BTreeMap<Research, ResearchFn>,
}

impl fmt::Debug for ResearchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

impl ResearchRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every research this crate ships.
    pub fn with_defaults() -> Self {
        let defaults: [(Research, ResearchFn); 9] = [
            (Research::Morphology, run_morphology),
            (Research::KeywordCountInUrl, run_keyword_count_in_url),
            (Research::KeyphraseLength, run_keyphrase_length),
            (Research::WordCountInText, run_word_count_in_text),
            (Research::KeyphraseCount, run_keyphrase_count),
            (Research::KeywordDensity, run_keyword_density),
            (Research::FindKeyphraseInSeoTitle, run_find_keyphrase_in_seo_title),
            (Research::MetaDescriptionKeyword, run_meta_description_keyword),
            (Research::SentenceLengthInText, run_sentence_length_in_text),
        ];
        Self {
            entries: defaults.into_iter().collect(),
        }
    }

    pub fn register(&mut self, research: Research, f: ResearchFn) -> Result<(), ResearchError> {
        if self.entries.contains_key(&research) {
            return Err(ResearchError::DuplicateResearch(research.name().to_string()));
        }
        if let Some(missing) = research
            .dependencies()
            .iter()
            .find(|dep| !self.entries.contains_key(*dep))
        {
            return Err(ResearchError::MissingDependency {
                research: research.name().to_string(),
                dependency: missing.name().to_string(),
            });
        }
        self.entries.insert(research, f);
        Ok(())
    }

    pub fn contains(&self, research: Research) -> bool {
        self.entries.contains_key(&research)
    }

    pub fn researches(&self) -> impl Iterator<Item = Research> + '_ {
        self.entries.keys().copied()
    }

    fn get(&self, research: Research) -> Option<ResearchFn> {
        self.entries.get(&research).copied()
    }
}

macro_rules! adapter {
    ($name:ident, $research:path, $variant:ident) => {
        fn $name(paper: &Paper, researcher: &Researcher<'_>) -> Result<ResearchResult, ResearchError> {
            $research(paper, researcher).map(ResearchResult::$variant)
        }
    };
}

fn run_morphology(paper: &Paper, researcher: &Researcher<'_>) -> Result<ResearchResult, ResearchError> {
    researches::morphology(paper, researcher).map(|forms| ResearchResult::Morphology(Arc::new(forms)))
}

adapter!(run_keyword_count_in_url, researches::keyword_count_in_url, KeyphraseInSlug);
adapter!(run_keyphrase_length, researches::keyphrase_length, KeyphraseLength);
adapter!(run_word_count_in_text, researches::word_count_in_text, WordCount);
adapter!(run_keyphrase_count, researches::keyphrase_count, KeyphraseCount);
adapter!(run_keyword_density, researches::keyword_density, KeywordDensity);
adapter!(run_find_keyphrase_in_seo_title, researches::find_keyphrase_in_seo_title, TitleMatch);
adapter!(run_meta_description_keyword, researches::meta_description_keyword, MetaDescriptionKeyword);
adapter!(run_sentence_length_in_text, researches::sentence_length_in_text, SentenceLengths);

// ---------------------------------------------------------------------------
// Researcher
// ---------------------------------------------------------------------------

/// One analysis run over one paper. Results are computed on first request
/// and the same `Arc` is handed out afterwards.
pub struct Researcher<'a> {
    paper: &'a Paper,
    config: &'a MorphologyConfig,
    registry: &'a ResearchRegistry,
    cache: RefCell<HashMap<Research, Arc<ResearchResult>>>,
    in_progress: RefCell<Vec<Research>>,
    locale_warned: Cell<bool>,
}

impl<'a> Researcher<'a> {
    pub fn new(
        paper: &'a Paper,
        config: &'a MorphologyConfig,
        registry: &'a ResearchRegistry,
    ) -> Self {
        Self {
            paper,
            config,
            registry,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(Vec::new()),
            locale_warned: Cell::new(false),
        }
    }

    /// Rules for the paper's locale. A miss is logged once per run and
    /// means identity morphology.
    pub fn locale_rules(&self) -> Option<&LocaleRules> {
        let rules = self.config.rules_for(self.paper.locale());
        if rules.is_none() && !self.locale_warned.replace(true) {
            warn!(
                locale = self.paper.locale(),
                "unsupported locale, falling back to identity morphology"
            );
        }
        rules
    }

    /// Looks a research up by its external name.
    pub fn get_research(&self, name: &str) -> Result<Arc<ResearchResult>, ResearchError> {
        self.research(name.parse()?)
    }

    pub fn research(&self, research: Research) -> Result<Arc<ResearchResult>, ResearchError> {
        if let Some(hit) = self.cache.borrow().get(&research) {
            debug!(research = research.name(), "research cache hit");
            return Ok(Arc::clone(hit));
        }
        let f = self
            .registry
            .get(research)
            .ok_or_else(|| ResearchError::UnknownResearch(research.name().to_string()))?;

        if self.in_progress.borrow().contains(&research) {
            return Err(ResearchError::DependencyCycle(research.name().to_string()));
        }
        self.in_progress.borrow_mut().push(research);
        debug!(research = research.name(), "computing research");
        let outcome = f(self.paper, self);
        self.in_progress.borrow_mut().retain(|r| *r != research);

        let result = Arc::new(outcome?);
        self.cache
            .borrow_mut()
            .insert(research, Arc::clone(&result));
        Ok(result)
    }

    /// The memoized keyphrase forms.
    pub fn morphology(&self) -> Result<Arc<KeyphraseForms>, ResearchError> {
        let result = self.research(Research::Morphology)?;
        result
            .as_morphology()
            .cloned()
            .ok_or_else(|| ResearchError::UnexpectedResult(Research::Morphology.name().to_string()))
    }

    pub(crate) fn dependency<T: Clone>(
        &self,
        research: Research,
        extract: impl FnOnce(&ResearchResult) -> Option<&T>,
    ) -> Result<T, ResearchError> {
        let result = self.research(research)?;
        extract(&*result)
            .cloned()
            .ok_or_else(|| ResearchError::UnexpectedResult(research.name().to_string()))
    }

    /// Runs every registered research and returns results by name.
    pub fn run_all(&self) -> Result<BTreeMap<&'static str, Arc<ResearchResult>>, ResearchError> {
        self.registry
            .researches()
            .map(|research| Ok((research.name(), self.research(research)?)))
            .collect()
    }
}
