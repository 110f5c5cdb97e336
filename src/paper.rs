use serde::{Deserialize, Deserializer, Serialize};

use crate::config::HP;
use crate::slug::slug_from_url;

/// The document under analysis. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paper {
    text: String,
    title: String,
    slug: String,
    url: String,
    locale: String,
    keyword: String,
    #[serde(deserialize_with = "deserialize_synonyms")]
    synonyms: Vec<String>,
    description: String,
}

impl Default for Paper {
    fn default() -> Self {
        Self {
            text: String::new(),
            title: String::new(),
            slug: String::new(),
            url: String::new(),
            locale: HP.default_locale.to_string(),
            keyword: String::new(),
            synonyms: Vec::new(),
            description: String::new(),
        }
    }
}

impl Paper {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.trim().is_empty())
            .collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn has_keyword(&self) -> bool {
        !self.keyword.trim().is_empty()
    }

    /// The explicit slug, or one derived from the URL when the slug is empty.
    pub fn effective_slug(&self) -> String {
        if self.slug().trim().is_empty() {
            slug_from_url(self.url())
        } else {
            self.slug().to_string()
        }
    }
}

/// Accepts `["a", "b"]` or the comma-separated `"a, b"`.
fn deserialize_synonyms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Synonyms {
        List(Vec<String>),
        Joined(String),
    }

    let raw = match Synonyms::deserialize(deserializer)? {
        Synonyms::List(list) => list,
        Synonyms::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
