//! Image resolution endpoint.
//!
//! POST /resolve-image - Resolve one background image for a request context.
//!
//! Always answers HTTP 200. A body that cannot be read still gets the first
//! pool entry, with the reason in `error`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use regen_types::image::{ResolveImageRequest, ResolveImageResponse};

use crate::state::AppState;

/// POST /resolve-image
pub async fn resolve_image(
    State(state): State<AppState>,
    body: Result<Json<ResolveImageRequest>, JsonRejection>,
) -> Json<ResolveImageResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Unreadable resolve-image body");
            return Json(ResolveImageResponse {
                image_url: state.resolver.pool().primary().to_string(),
                error: Some(rejection.body_text()),
            });
        }
    };

    let resolved = state
        .resolver
        .resolve(&request.context(), &request.exclude_urls)
        .await;

    tracing::debug!(source = ?resolved.source, "Resolved image");
    Json(ResolveImageResponse {
        image_url: resolved.identifier,
        error: None,
    })
}
