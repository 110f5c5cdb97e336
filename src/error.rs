use thiserror::Error;

/// Wiring and configuration failures. Linguistic edge cases (empty
/// keyphrase, missing slug, unsupported locale) never surface here; they
/// degrade to zero results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResearchError {
    #[error("unknown research: {0}")]
    UnknownResearch(String),

    #[error("research '{0}' is already registered")]
    DuplicateResearch(String),

    #[error("research '{research}' depends on '{dependency}', which is not registered")]
    MissingDependency {
        research: String,
        dependency: String,
    },

    #[error("research '{0}' produced a result of an unexpected kind")]
    UnexpectedResult(String),

    #[error("dependency cycle detected while computing '{0}'")]
    DependencyCycle(String),

    #[error("malformed rules for locale '{locale}': {reason}")]
    MalformedRules { locale: String, reason: String },

    #[error("config error: {0}")]
    Config(String),
}
