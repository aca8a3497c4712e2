//! Static weather backgrounds keyed by descriptive phrase.
//!
//! A fixed keyword table with per-process memoization of lookups. Unknown or
//! blank keywords resolve to the [`DEFAULT_KEYWORD`] entry.

use dashmap::DashMap;

/// Keyword used when the caller supplies none or an unknown one.
pub const DEFAULT_KEYWORD: &str = "partly cloudy soft aesthetic sky";

/// Asset returned if the table itself lacks the default keyword.
const LAST_RESORT: &str = "/abc.jpg";

const KEYWORD_TO_IMAGE: &[(&str, &str)] = &[
    ("sunny clear sky minimal design", "/signin-forest.png"),
    ("partly cloudy soft aesthetic sky", "/signin-forest.png"),
    ("overcast soft grey sky minimal", "/abc.jpg"),
    ("foggy mist atmospheric soft", "/abc.jpg"),
    ("light rain atmospheric sky", "/abc.jpg"),
    ("snow soft winter sky", "/abc.jpg"),
    ("storm clouds dramatic sky", "/abc.jpg"),
];

/// Keyword → background lookup with a memo cache.
#[derive(Default)]
pub struct BackgroundCatalog {
    cache: DashMap<String, String>,
}

impl BackgroundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Background asset for `keyword`.
    pub fn lookup(&self, keyword: Option<&str>) -> String {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_KEYWORD);

        if let Some(cached) = self.cache.get(keyword) {
            return cached.value().clone();
        }

        let url = table_lookup(keyword)
            .or_else(|| table_lookup(DEFAULT_KEYWORD))
            .unwrap_or(LAST_RESORT)
            .to_string();
        tracing::debug!(keyword, %url, "Cached weather background");
        self.cache.insert(keyword.to_string(), url.clone());
        url
    }

    /// Number of memoized keywords.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn keywords() -> impl Iterator<Item = &'static str> {
        KEYWORD_TO_IMAGE.iter().map(|(k, _)| *k)
    }
}

fn table_lookup(keyword: &str) -> Option<&'static str> {
    KEYWORD_TO_IMAGE
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, url)| *url)
}
