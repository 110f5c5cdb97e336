//! Keyphrase morphology, locale-aware matching and SEO/readability
//! researches over a single document.
//!
//! A [`Paper`] is analysed by a [`Researcher`], which computes each
//! [`Research`] on demand and memoizes it for the rest of the run.

pub mod config;
pub mod error;
pub mod matcher;
pub mod morphology;
pub mod paper;
pub mod researcher;
pub mod researches;
pub mod slug;
pub mod tokenizer;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

pub use config::{LocaleRules, MorphologyConfig, SuffixRule};
pub use error::ResearchError;
pub use matcher::{find_topic_forms_in_string, BoundaryMode, MatchReport, Topic};
pub use morphology::{build_forms, dehyphenate, KeyphraseForms, WordForms};
pub use paper::Paper;
pub use researcher::{Research, ResearchFn, ResearchRegistry, ResearchResult, Researcher};
pub use slug::parse_slug;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub locale: String,
    pub results: BTreeMap<&'static str, Arc<ResearchResult>>,
}

/// Runs every default research over `paper`.
pub fn analyze(paper: &Paper, config: &MorphologyConfig) -> Result<AnalysisReport, ResearchError> {
    let registry = ResearchRegistry::with_defaults();
    let researcher = Researcher::new(paper, config, &registry);
    Ok(AnalysisReport {
        locale: paper.locale().to_string(),
        results: researcher.run_all()?,
    })
}

/// Runs only the named researches (and whatever they depend on, which is
/// not reported).
pub fn analyze_selected(
    paper: &Paper,
    config: &MorphologyConfig,
    names: &[String],
) -> Result<AnalysisReport, ResearchError> {
    let registry = ResearchRegistry::with_defaults();
    let researcher = Researcher::new(paper, config, &registry);
    let mut results = BTreeMap::new();
    for name in names {
        let research: Research = name.parse()?;
        results.insert(research.name(), researcher.research(research)?);
    }
    Ok(AnalysisReport {
        locale: paper.locale().to_string(),
        results,
    })
}
