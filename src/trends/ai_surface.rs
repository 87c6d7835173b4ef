//! Optional AI search surfaces. Each lookup yields extra insights and questions, or
//! nothing at all; failures never reach the caller.

use tracing::{debug, warn};

use super::SearchBackend;
use super::fetcher::extend_questions;
use super::truncate_chars;
use crate::clients::serpapi::{AiModeResponse, AiOverviewResponse};
use crate::constants::limits;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiSurfaceData {
    pub insights: Vec<String>,
    pub questions: Vec<String>,
}

impl AiSurfaceData {
    fn into_option(self) -> Option<Self> {
        (!self.insights.is_empty() || !self.questions.is_empty()).then_some(self)
    }
}

#[must_use]
pub fn from_ai_mode(response: &AiModeResponse) -> Option<AiSurfaceData> {
    if response.error.is_some() {
        return None;
    }

    let insights = response
        .text_blocks
        .iter()
        .filter_map(|block| block.snippet.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(limits::MAX_AI_MODE_INSIGHTS)
        .map(str::to_string)
        .collect();

    let mut questions = Vec::new();
    extend_questions(
        &mut questions,
        &response.related_questions,
        limits::MAX_AI_SURFACE_QUESTIONS,
    );

    AiSurfaceData {
        insights,
        questions,
    }
    .into_option()
}

#[must_use]
pub fn from_ai_overview(response: &AiOverviewResponse) -> Option<AiSurfaceData> {
    if response.error.is_some() {
        return None;
    }

    let text = response
        .ai_overview
        .as_ref()
        .map(|overview| {
            overview
                .text_blocks
                .iter()
                .filter_map(|block| block.snippet.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let insights = if text.is_empty() {
        Vec::new()
    } else if text.chars().count() > limits::AI_OVERVIEW_CHARS {
        vec![format!(
            "{}...",
            truncate_chars(&text, limits::AI_OVERVIEW_CHARS).trim_end()
        )]
    } else {
        vec![text]
    };

    let mut questions = Vec::new();
    extend_questions(
        &mut questions,
        &response.related_questions,
        limits::MAX_AI_SURFACE_QUESTIONS,
    );

    AiSurfaceData {
        insights,
        questions,
    }
    .into_option()
}

pub async fn fetch_ai_mode(backend: &dyn SearchBackend, query: &str) -> Option<AiSurfaceData> {
    match backend.ai_mode(query).await {
        Ok(response) => {
            let data = from_ai_mode(&response);
            debug!(query, found = data.is_some(), "AI mode lookup finished");
            metrics::counter!("trend_fetch_total", "surface" => "ai_mode", "outcome" => "ok")
                .increment(1);
            data
        }
        Err(e) => {
            metrics::counter!("trend_fetch_total", "surface" => "ai_mode", "outcome" => "error")
                .increment(1);
            warn!(query, error = %e, "AI mode lookup failed");
            None
        }
    }
}

pub async fn fetch_ai_overview(backend: &dyn SearchBackend, query: &str) -> Option<AiSurfaceData> {
    match backend.ai_overview(query).await {
        Ok(response) => {
            let data = from_ai_overview(&response);
            debug!(query, found = data.is_some(), "AI overview lookup finished");
            metrics::counter!("trend_fetch_total", "surface" => "ai_overview", "outcome" => "ok")
                .increment(1);
            data
        }
        Err(e) => {
            metrics::counter!(
                "trend_fetch_total",
                "surface" => "ai_overview",
                "outcome" => "error"
            )
            .increment(1);
            warn!(query, error = %e, "AI overview lookup failed");
            None
        }
    }
}
