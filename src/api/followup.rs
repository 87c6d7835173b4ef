use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use tracing::info;

use super::types::{FollowupRequest, FollowupResponse};
use super::{ApiError, AppState};
use crate::services::WorkflowJob;
use crate::services::outline::{KEYCAPS, parse_keycap};

/// Classifies a follow-up reply: a digit picks a topic from the `/blog` menu, a keycap
/// emoji picks one of the generated outlines.
#[must_use]
pub fn followup_job(input: &str) -> Option<WorkflowJob> {
    let input = input.trim();

    if let Ok(n) = input.parse::<usize>()
        && (1..=KEYCAPS.len()).contains(&n)
        && input.len() == 1
    {
        return Some(WorkflowJob::TopicOutlines { index: n - 1 });
    }

    parse_keycap(input).map(|number| WorkflowJob::FinalBlog { number })
}

pub async fn handle_followup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FollowupRequest>, JsonRejection>,
) -> Result<Json<FollowupResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::validation(format!("Invalid follow-up payload: {e}")))?;

    if request.token.trim().is_empty() {
        return Err(ApiError::validation("Missing interaction token"));
    }

    let Some(job) = followup_job(&request.content) else {
        return Ok(Json(FollowupResponse {
            status: "invalid_input",
        }));
    };

    let status = match job {
        WorkflowJob::FinalBlog { .. } => "generating_blog",
        _ => "processing_outlines",
    };
    info!(status, "Accepted follow-up");

    let workflows = state.workflows.clone();
    tokio::spawn(async move {
        workflows.execute(&request.token, job).await;
    });

    Ok(Json(FollowupResponse { status }))
}
