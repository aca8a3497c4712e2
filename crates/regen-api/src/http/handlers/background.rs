//! Static weather background endpoint.
//!
//! GET /weather-background?keyword=... - Keyword to asset lookup.

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BackgroundQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BackgroundResponse {
    pub url: String,
}

/// GET /weather-background
pub async fn weather_background(
    State(state): State<AppState>,
    Query(query): Query<BackgroundQuery>,
) -> Json<BackgroundResponse> {
    Json(BackgroundResponse {
        url: state.backgrounds.lookup(query.keyword.as_deref()),
    })
}
