//! Prompt construction for image resolution.
//!
//! Turns an [`ImageRequestContext`] into the descriptive text handed to the
//! generative model and, on fallback, to the pool selector. Pure and total:
//! every context yields a non-empty prompt.

use regen_types::image::{ImageRequestContext, UsageContext};

/// Location substituted when the context carries none.
const DEFAULT_LOCATION: &str = "nature";

/// Suffix appended to every community post prompt.
const POST_SUFFIX: &str = "suitable for post thumbnail, not stock-like, dreamy aesthetic";

/// Phrase for community themes missing from [`theme_phrase`].
const GENERIC_THEME_PHRASE: &str = "eco community activity nature realistic photography";

/// Closed lookup of community post themes.
fn theme_phrase(theme: &str) -> &'static str {
    match theme {
        "cleanliness-drive" => {
            "environmental cleanliness drive community activity natural photography realistic"
        }
        "tree-plantation" => "tree plantation event eco community real-world aesthetic photo",
        "campaign" => "environmental campaign awareness community activity natural light",
        _ => GENERIC_THEME_PHRASE,
    }
}

/// Build the image prompt for a request context.
///
/// Community posts with a theme use the theme table. Everything else is
/// keyed off the weather condition (case-insensitive substring match,
/// first match wins).
pub fn build_prompt(context: &ImageRequestContext) -> String {
    if context.usage == UsageContext::CommunityPost {
        if let Some(theme) = context.post_theme.as_deref().filter(|t| !t.trim().is_empty()) {
            return format!("{}, {POST_SUFFIX}", theme_phrase(theme));
        }
    }

    let loc = if context.location.trim().is_empty() {
        DEFAULT_LOCATION
    } else {
        context.location.trim()
    };
    let condition = context.weather_condition.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| condition.contains(n));

    if has(&["sunny", "clear"]) {
        format!(
            "sunny clear sky minimal gradient background in {loc}, dreamy minimal UI background, soft aesthetic"
        )
    } else if has(&["cloud", "partly"]) {
        format!("soft aesthetic partly cloudy sky in {loc}, dreamy minimal UI background")
    } else if has(&["rain", "drizzle"]) {
        "light rain atmospheric sky cinematic soft tones, minimal UI friendly".to_string()
    } else if has(&["overcast", "fog"]) {
        format!("overcast soft grey sky minimal dreamy atmosphere in {loc}")
    } else if has(&["snow"]) {
        "snow soft winter sky minimal dreamy aesthetic".to_string()
    } else if has(&["storm", "thunder"]) {
        "storm clouds dramatic sky soft tones minimal UI".to_string()
    } else {
        format!("soft aesthetic sky in {loc}, dreamy minimal UI background")
    }
}
