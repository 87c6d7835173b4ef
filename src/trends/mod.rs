//! Trend discovery pipeline.
//!
//! Turns a search query into a [`TopicReport`]: a primary source, a bounded trend
//! score and a list of reader questions, merged from the organic search surface and
//! the two optional AI surfaces.

pub mod aggregator;
pub mod ai_surface;
pub mod fetcher;
pub mod narrative;
pub mod rotation;

pub use aggregator::TrendAggregator;
pub use narrative::organize_questions;
pub use rotation::{DailyQueries, DailyQuery, daily_queries};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::clients::serpapi::{AiModeResponse, AiOverviewResponse, Recency, SearchResponse};

/// Source of raw search data for the pipeline.
///
/// Implemented by the SerpApi client; tests substitute canned responses.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, recency: Recency) -> anyhow::Result<SearchResponse>;

    async fn ai_mode(&self, query: &str) -> anyhow::Result<AiModeResponse>;

    async fn ai_overview(&self, query: &str) -> anyhow::Result<AiOverviewResponse>;
}

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("Query is empty")]
    EmptyQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopicCategory {
    #[serde(rename = "AI-TOOLS")]
    AiTools,
    #[serde(rename = "GEAR")]
    Gear,
    #[serde(rename = "NEWS")]
    News,
    #[serde(rename = "PRODUCTION")]
    Production,
    #[serde(rename = "TRENDING")]
    Trending,
    #[serde(rename = "OTHER")]
    Other,
    #[serde(rename = "ERROR")]
    Error,
}

impl TopicCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AiTools => "AI-TOOLS",
            Self::Gear => "GEAR",
            Self::News => "NEWS",
            Self::Production => "PRODUCTION",
            Self::Trending => "TRENDING",
            Self::Other => "OTHER",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendStatus {
    Steady,
    Trending,
    Viral,
}

impl TrendStatus {
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score > 75 {
            Self::Viral
        } else if score > 60 {
            Self::Trending
        } else {
            Self::Steady
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Steady => "STEADY",
            Self::Trending => "TRENDING",
            Self::Viral => "VIRAL",
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const AI_MARKER: &str = "🤖 AI+";

/// Everything the bot knows about one query on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicReport {
    pub query: String,
    pub category: TopicCategory,
    pub score: i32,
    pub status: TrendStatus,
    pub link: String,
    pub title: String,
    pub snippet: String,
    pub questions: Vec<String>,
    pub total_results: u64,
    pub quality_score: i32,
    pub source: String,
    pub ai_enhanced: bool,
    pub ai_insights: Vec<String>,
}

impl TopicReport {
    /// Status as shown in chat, e.g. `🤖 AI+ VIRAL`.
    #[must_use]
    pub fn status_label(&self) -> String {
        if self.ai_enhanced {
            format!("{AI_MARKER} {}", self.status)
        } else {
            self.status.to_string()
        }
    }
}

/// Truncates to at most `max` characters, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
