//! Image sourcing types for Regen.
//!
//! These types model the data shapes flowing through image resolution:
//! the request context, the fallback pool, the exclusion set, the resolved
//! image, and the JSON bodies exchanged over `POST /resolve-image`.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Default number of identifiers retained by an exclusion set.
pub const DEFAULT_EXCLUSION_CAPACITY: usize = 100;

/// Fallback pool shipped with the app's static assets.
pub const DEFAULT_POOL: [&str; 2] = ["/signin-forest.png", "/abc.jpg"];

/// Weather condition assumed when a request does not carry one.
pub const DEFAULT_WEATHER_CONDITION: &str = "partly cloudy";

/// Prefix of identifiers that embed the image payload inline.
const INLINE_PAYLOAD_PREFIX: &str = "data:";

/// Returns `true` when the identifier embeds binary image data (a data URI)
/// rather than pointing at an asset.
pub fn is_inline_payload(identifier: &str) -> bool {
    identifier.starts_with(INLINE_PAYLOAD_PREFIX)
}

/// Where in the app an image is going to be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageContext {
    #[default]
    WeatherBanner,
    CommunityPost,
}

impl fmt::Display for UsageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageContext::WeatherBanner => write!(f, "weather-banner"),
            UsageContext::CommunityPost => write!(f, "community-post"),
        }
    }
}

impl FromStr for UsageContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weather-banner" | "weather" | "banner" => Ok(UsageContext::WeatherBanner),
            "community-post" | "community" | "post" => Ok(UsageContext::CommunityPost),
            other => Err(format!("invalid usage context: '{other}'")),
        }
    }
}

/// Everything a resolver needs to know about a single image request.
///
/// Immutable once built; one per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequestContext {
    pub location: String,
    pub weather_condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub usage: UsageContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_theme: Option<String>,
}

impl ImageRequestContext {
    /// Context for the weather banner at `location`.
    pub fn weather_banner(location: impl Into<String>, weather_condition: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            weather_condition: weather_condition.into(),
            ..Self::default()
        }
    }

    /// Context for a community post thumbnail with the given theme.
    pub fn community_post(location: impl Into<String>, post_theme: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            weather_condition: DEFAULT_WEATHER_CONDITION.to_string(),
            usage: UsageContext::CommunityPost,
            post_theme: Some(post_theme.into()),
            ..Self::default()
        }
    }
}

/// How a resolved image was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Synthesized on demand by the generative model.
    Generated,
    /// Picked from the static fallback pool.
    PoolSelected,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Generated => write!(f, "generated"),
            SourceKind::PoolSelected => write!(f, "pool_selected"),
        }
    }
}

/// The outcome of a resolution. Only `identifier` outlives the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImage {
    pub identifier: String,
    pub source: SourceKind,
}

impl ResolvedImage {
    pub fn generated(identifier: String) -> Self {
        Self {
            identifier,
            source: SourceKind::Generated,
        }
    }

    pub fn pool_selected(identifier: String) -> Self {
        Self {
            identifier,
            source: SourceKind::PoolSelected,
        }
    }
}

/// Ordered, non-empty catalog of fallback image identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePool {
    entries: Vec<String>,
}

impl ImagePool {
    /// Build a pool, trimming entries and dropping blanks and duplicates.
    ///
    /// Fails if nothing usable remains.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty() && seen.insert(e.clone()))
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        Ok(Self { entries })
    }

    /// First pool entry; used when every other fallback is exhausted.
    pub fn primary(&self) -> &str {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: [`ImagePool::new`] rejects an empty pool.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pool members not in `excluded`, in pool order.
    ///
    /// Falls back to the whole pool when every member is excluded, so the
    /// result is never empty.
    pub fn available<S: AsRef<str>>(&self, excluded: &[S]) -> Vec<String> {
        let excluded: HashSet<&str> = excluded
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .collect();

        let available: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !excluded.contains(e.as_str()))
            .cloned()
            .collect();

        if available.is_empty() {
            self.entries.clone()
        } else {
            available
        }
    }
}

impl Default for ImagePool {
    fn default() -> Self {
        Self {
            entries: DEFAULT_POOL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Insertion-ordered set of identifiers the service tries not to repeat.
///
/// Persistable identifiers and inline payloads are each bounded to
/// `capacity`; when one kind is full, its oldest insertion is evicted, so
/// inline payloads never push a persistable identifier out. Re-inserting an
/// identifier that is already present does not move it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    capacity: usize,
    entries: VecDeque<String>,
}

impl ExclusionSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Rebuild a set from stored identifiers (oldest first), keeping the
    /// most recent `capacity` of them.
    pub fn from_entries<I>(capacity: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new(capacity);
        for entry in entries {
            set.insert(entry);
        }
        set
    }

    /// Insert an identifier. Returns `false` if it was already present.
    pub fn insert(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            return false;
        }
        let inline = is_inline_payload(&identifier);
        self.entries.push_back(identifier);
        while self.count_kind(inline) > self.capacity {
            match self.entries.iter().position(|e| is_inline_payload(e) == inline) {
                Some(oldest) => {
                    self.entries.remove(oldest);
                }
                None => break,
            }
        }
        true
    }

    fn count_kind(&self, inline: bool) -> usize {
        self.entries
            .iter()
            .filter(|e| is_inline_payload(e) == inline)
            .count()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|e| e == identifier)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// All identifiers, oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Identifiers eligible for persistence: inline payloads are skipped.
    pub fn persistable(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !is_inline_payload(e))
            .cloned()
            .collect()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSION_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Wire types for POST /resolve-image
// ---------------------------------------------------------------------------

/// JSON body of `POST /resolve-image`.
///
/// Every field is optional on the wire; missing values take the defaults
/// applied by [`ResolveImageRequest::context`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveImageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aqi: Option<f64>,
    /// `"weather-banner"` or `"community-post"`; anything else means weather banner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub exclude_urls: Vec<String>,
}

impl ResolveImageRequest {
    /// Build the request body for `context`, excluding `exclude_urls`.
    pub fn from_context(context: &ImageRequestContext, exclude_urls: Vec<String>) -> Self {
        Self {
            location: Some(context.location.clone()),
            weather_condition: Some(context.weather_condition.clone()),
            temperature: context.temperature,
            aqi: context.aqi,
            context: Some(context.usage.to_string()),
            post_theme: context.post_theme.clone(),
            exclude_urls,
        }
    }

    /// The request context carried by this body, with defaults applied.
    pub fn context(&self) -> ImageRequestContext {
        let usage = self
            .context
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or_default();

        ImageRequestContext {
            location: self.location.clone().unwrap_or_default(),
            weather_condition: self
                .weather_condition
                .clone()
                .unwrap_or_else(|| DEFAULT_WEATHER_CONDITION.to_string()),
            temperature: self.temperature,
            aqi: self.aqi,
            usage,
            post_theme: self.post_theme.clone(),
        }
    }
}

/// JSON body returned by `POST /resolve-image`, always with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveImageResponse {
    pub image_url: String,
    /// Present only when the server fell back after an internal failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accept any JSON for `excludeUrls`: arrays keep their string items, anything
/// else is treated as an empty list.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_payload_detection() {
        assert!(is_inline_payload("data:image/png;base64,AAAA"));
        assert!(!is_inline_payload("/abc.jpg"));
        assert!(!is_inline_payload("https://cdn.example.com/data:x"));
    }

    #[test]
    fn test_usage_context_roundtrip() {
        for usage in [UsageContext::WeatherBanner, UsageContext::CommunityPost] {
            let parsed: UsageContext = usage.to_string().parse().unwrap();
            assert_eq!(parsed, usage);
        }
        assert!("sidebar".parse::<UsageContext>().is_err());
    }

    #[test]
    fn test_pool_rejects_empty() {
        assert_eq!(ImagePool::new(Vec::<String>::new()), Err(ConfigError::EmptyPool));
        assert_eq!(ImagePool::new(["  ", ""]), Err(ConfigError::EmptyPool));
    }

    #[test]
    fn test_pool_trims_and_dedupes() {
        let pool = ImagePool::new([" /a.png ", "/b.png", "/a.png"]).unwrap();
        assert_eq!(pool.entries(), ["/a.png", "/b.png"]);
        assert_eq!(pool.primary(), "/a.png");
    }

    #[test]
    fn test_pool_available_honors_exclusions() {
        let pool = ImagePool::new(["/a.png", "/b.png", "/c.png"]).unwrap();
        assert_eq!(pool.available(&[" /a.png", ""]), ["/b.png", "/c.png"]);
    }

    #[test]
    fn test_pool_available_falls_back_to_full_pool() {
        let pool = ImagePool::new(["/a.png", "/b.png"]).unwrap();
        assert_eq!(pool.available(&["/a.png", "/b.png"]), ["/a.png", "/b.png"]);
    }

    #[test]
    fn test_exclusion_set_evicts_oldest() {
        let mut set = ExclusionSet::new(3);
        for id in ["a", "b", "c", "d"] {
            set.insert(id);
        }
        assert_eq!(set.to_vec(), ["b", "c", "d"]);
        assert!(!set.contains("a"));
    }

    #[test]
    fn test_exclusion_set_reinsert_keeps_position() {
        let mut set = ExclusionSet::new(3);
        set.insert("a");
        set.insert("b");
        assert!(!set.insert("a"));
        set.insert("c");
        set.insert("d");
        // "a" was not refreshed by the second insert, so it is evicted first
        assert_eq!(set.to_vec(), ["b", "c", "d"]);
    }

    #[test]
    fn test_exclusion_set_from_entries_keeps_most_recent() {
        let entries = (0..150).map(|i| format!("/img-{i}.png"));
        let set = ExclusionSet::from_entries(100, entries);
        assert_eq!(set.len(), 100);
        assert!(!set.contains("/img-49.png"));
        assert!(set.contains("/img-50.png"));
        assert!(set.contains("/img-149.png"));
    }

    #[test]
    fn test_exclusion_set_persistable_skips_inline_payloads() {
        let mut set = ExclusionSet::default();
        set.insert("/a.png");
        set.insert("data:image/png;base64,iVBORw0KGgo=");
        set.insert("/b.png");
        assert_eq!(set.len(), 3);
        assert_eq!(set.persistable(), ["/a.png", "/b.png"]);
    }

    #[test]
    fn test_inline_payloads_do_not_evict_persistable_entries() {
        let mut set = ExclusionSet::new(3);
        set.insert("/a.png");
        set.insert("/b.png");
        for i in 0..5 {
            set.insert(format!("data:image/png;base64,AAA{i}"));
        }
        assert_eq!(set.persistable(), ["/a.png", "/b.png"]);
        assert_eq!(set.len(), 5);
        assert!(!set.contains("data:image/png;base64,AAA1"));
        assert!(set.contains("data:image/png;base64,AAA4"));

        set.insert("/c.png");
        set.insert("/d.png");
        assert_eq!(set.persistable(), ["/b.png", "/c.png", "/d.png"]);
    }

    #[test]
    fn test_request_defaults() {
        let request: ResolveImageRequest = serde_json::from_str("{}").unwrap();
        let context = request.context();
        assert_eq!(context.location, "");
        assert_eq!(context.weather_condition, "partly cloudy");
        assert_eq!(context.usage, UsageContext::WeatherBanner);
        assert!(request.exclude_urls.is_empty());
    }

    #[test]
    fn test_request_parses_camel_case_body() {
        let body = r#"{
            "location": "Pune",
            "weatherCondition": "Heavy rain",
            "temperature": 24.5,
            "aqi": 80,
            "context": "community-post",
            "postTheme": "tree-plantation",
            "excludeUrls": ["/a.png", 7, "/b.png"]
        }"#;
        let request: ResolveImageRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.exclude_urls, ["/a.png", "/b.png"]);

        let context = request.context();
        assert_eq!(context.location, "Pune");
        assert_eq!(context.usage, UsageContext::CommunityPost);
        assert_eq!(context.post_theme.as_deref(), Some("tree-plantation"));
        assert_eq!(context.aqi, Some(80.0));
    }

    #[test]
    fn test_request_tolerates_non_array_exclusions_and_unknown_context() {
        let body = r#"{"excludeUrls": "nope", "context": "sidebar"}"#;
        let request: ResolveImageRequest = serde_json::from_str(body).unwrap();
        assert!(request.exclude_urls.is_empty());
        assert_eq!(request.context().usage, UsageContext::WeatherBanner);
    }

    #[test]
    fn test_request_from_context_serializes_camel_case() {
        let context = ImageRequestContext::weather_banner("Oslo", "Snow");
        let request = ResolveImageRequest::from_context(&context, vec!["/a.png".to_string()]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["weatherCondition"], "Snow");
        assert_eq!(json["context"], "weather-banner");
        assert_eq!(json["excludeUrls"][0], "/a.png");
        assert!(json.get("postTheme").is_none());
    }

    #[test]
    fn test_response_omits_absent_error() {
        let response = ResolveImageResponse {
            image_url: "/abc.jpg".to_string(),
            error: None,
        };
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"imageUrl":"/abc.jpg"}"#);
    }
}
