use axum::{Json, extract::State, http::HeaderMap};
use chrono::Local;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::ScoutOutcome;

/// `GET /api/scout`
///
/// Cron entry point. When a cron secret is configured the caller must send it as a
/// bearer token.
pub async fn run_scout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScoutOutcome>, ApiError> {
    if let Some(secret) = state.config.security.cron_secret.as_deref() {
        let provided = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if provided != Some(secret) {
            return Err(ApiError::unauthorized("Invalid cron secret"));
        }
    }

    let outcome = state
        .scout
        .run(state.chat.as_ref(), Local::now())
        .await
        .map_err(|e| ApiError::discord_error(format!("{e:#}")))?;

    Ok(Json(outcome))
}
