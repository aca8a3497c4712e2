//! Fallback pool selection.
//!
//! Picks exactly one candidate out of a non-empty list, either by asking an
//! optional ranker for an index or, when no ranker is configured or it fails,
//! by a stable hash of the prompt. Without a ranker the choice is a pure
//! function of (prompt, candidates).

use regen_types::error::ImageError;

use crate::provider::ImageRanker;

/// Selects one identifier from a candidate list.
pub struct PoolSelector<R> {
    ranker: Option<R>,
}

impl<R: ImageRanker> PoolSelector<R> {
    pub fn new(ranker: Option<R>) -> Self {
        Self { ranker }
    }

    /// Selector that always uses the hash fallback.
    pub fn deterministic() -> Self {
        Self { ranker: None }
    }

    pub fn has_ranker(&self) -> bool {
        self.ranker.is_some()
    }

    /// Choose one of `candidates` for `prompt`.
    ///
    /// Returns `None` only when `candidates` is empty.
    pub async fn select(&self, prompt: &str, candidates: &[String]) -> Option<String> {
        match candidates.len() {
            0 => return None,
            1 => return Some(candidates[0].clone()),
            _ => {}
        }

        if let Some(ranker) = &self.ranker {
            match self.ranked_index(ranker, prompt, candidates.len()).await {
                Ok(index) => {
                    tracing::debug!(ranker = ranker.name(), index, "Ranker chose pool candidate");
                    return Some(candidates[index].clone());
                }
                Err(e) => {
                    tracing::warn!(
                        ranker = ranker.name(),
                        error = %e,
                        "Ranking failed, using hash selection"
                    );
                }
            }
        }

        Some(candidates[hash_index(prompt, candidates.len())].clone())
    }

    async fn ranked_index(
        &self,
        ranker: &R,
        prompt: &str,
        candidate_count: usize,
    ) -> Result<usize, ImageError> {
        let reply = ranker.choose(prompt, candidate_count).await?;
        Ok(parse_index_reply(&reply, candidate_count))
    }
}

/// Interpret a ranker reply as an index into `candidate_count` candidates.
///
/// Reads a leading integer (whitespace and sign allowed, trailing text
/// ignored). Non-numeric and negative replies map to 0; replies past the
/// end clamp to the last index.
pub fn parse_index_reply(reply: &str, candidate_count: usize) -> usize {
    let last = candidate_count.saturating_sub(1);
    let trimmed = reply.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: Vec<u8> = rest.bytes().take_while(u8::is_ascii_digit).collect();
    if digits.is_empty() || negative {
        return 0;
    }

    let value = digits.iter().fold(0usize, |acc, d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    });
    value.min(last)
}

/// Stable index for `prompt`: wrapping 32-bit sum of its UTF-16 code units,
/// absolute value, modulo `candidate_count`.
pub fn hash_index(prompt: &str, candidate_count: usize) -> usize {
    if candidate_count == 0 {
        return 0;
    }
    let sum = prompt
        .encode_utf16()
        .fold(0i32, |acc, unit| acc.wrapping_add(i32::from(unit)));
    sum.unsigned_abs() as usize % candidate_count
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedRanker {
        reply: String,
        calls: AtomicUsize,
    }

    impl FixedRanker {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ImageRanker for FixedRanker {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn choose(&self, _prompt: &str, _count: usize) -> Result<String, ImageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingRanker;

    impl ImageRanker for FailingRanker {
        fn name(&self) -> &str {
            "failing"
        }

        async fn choose(&self, _prompt: &str, _count: usize) -> Result<String, ImageError> {
            Err(ImageError::Provider {
                message: "connection refused".to_string(),
            })
        }
    }

    fn candidates(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_index_reply() {
        assert_eq!(parse_index_reply("1", 3), 1);
        assert_eq!(parse_index_reply("  2\n", 3), 2);
        assert_eq!(parse_index_reply("1. The second one", 3), 1);
        assert_eq!(parse_index_reply("+1", 3), 1);
        assert_eq!(parse_index_reply("seven", 3), 0);
        assert_eq!(parse_index_reply("", 3), 0);
        assert_eq!(parse_index_reply("-4", 3), 0);
        assert_eq!(parse_index_reply("9", 3), 2);
        assert_eq!(parse_index_reply("99999999999999999999999", 3), 2);
    }

    #[test]
    fn test_hash_index_matches_char_code_sum() {
        // 'a' + 'b' = 97 + 98 = 195
        assert_eq!(hash_index("ab", 2), 1);
        assert_eq!(hash_index("ab", 4), 3);
        assert_eq!(hash_index("", 5), 0);
    }

    #[test]
    fn test_hash_index_always_in_range() {
        for len in 1..8 {
            for prompt in ["", "storm", "soft aesthetic sky in Pune", "日本の雪"] {
                assert!(hash_index(prompt, len) < len);
            }
        }
    }

    #[tokio::test]
    async fn test_select_is_deterministic_without_ranker() {
        let selector = PoolSelector::<FailingRanker>::deterministic();
        let pool = candidates(&["/a.png", "/b.png", "/c.png"]);
        for prompt in ["sunny clear sky", "snow soft winter sky", "x"] {
            let first = selector.select(prompt, &pool).await;
            for _ in 0..5 {
                assert_eq!(selector.select(prompt, &pool).await, first);
            }
        }
    }

    #[tokio::test]
    async fn test_select_uses_ranker_reply() {
        let selector = PoolSelector::new(Some(FixedRanker::new("2")));
        let pool = candidates(&["/a.png", "/b.png", "/c.png"]);
        assert_eq!(selector.select("anything", &pool).await.as_deref(), Some("/c.png"));
    }

    #[tokio::test]
    async fn test_select_clamps_out_of_range_reply() {
        let selector = PoolSelector::new(Some(FixedRanker::new("42")));
        let pool = candidates(&["/a.png", "/b.png"]);
        assert_eq!(selector.select("p", &pool).await.as_deref(), Some("/b.png"));

        let selector = PoolSelector::new(Some(FixedRanker::new("no idea")));
        assert_eq!(selector.select("p", &pool).await.as_deref(), Some("/a.png"));
    }

    #[tokio::test]
    async fn test_select_falls_back_to_hash_on_ranker_error() {
        let pool = candidates(&["/a.png", "/b.png"]);
        let with_failing = PoolSelector::new(Some(FailingRanker));
        let without = PoolSelector::<FailingRanker>::deterministic();
        assert_eq!(
            with_failing.select("ab", &pool).await,
            without.select("ab", &pool).await
        );
        assert_eq!(with_failing.select("ab", &pool).await.as_deref(), Some("/b.png"));
    }

    #[tokio::test]
    async fn test_select_single_candidate_skips_ranker() {
        let ranker = FixedRanker::new("0");
        let selector = PoolSelector::new(Some(ranker));
        let pool = candidates(&["/only.png"]);
        assert_eq!(selector.select("p", &pool).await.as_deref(), Some("/only.png"));
        let calls = selector.ranker.as_ref().map(|r| r.calls.load(Ordering::SeqCst));
        assert_eq!(calls, Some(0));
    }

    #[tokio::test]
    async fn test_select_empty_returns_none() {
        let selector = PoolSelector::<FailingRanker>::deterministic();
        assert!(selector.select("p", &[]).await.is_none());
    }
}
