use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::trends::SearchBackend;

const SERPAPI_BASE: &str = "https://serpapi.com";

/// Freshness window passed to the search engine as `tbs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    PastDay,
    PastWeek,
}

impl Recency {
    #[must_use]
    pub const fn as_tbs(self) -> &'static str {
        match self {
            Self::PastDay => "qdr:d",
            Self::PastWeek => "qdr:w",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    /// "People also ask" items; each is either a string or an object with `question`.
    #[serde(default)]
    pub related_questions: Vec<Value>,
    #[serde(default)]
    pub related_qa: Vec<Value>,
    #[serde(default)]
    pub inline_questions: Vec<Value>,
    #[serde(default)]
    pub search_information: Option<SearchInformation>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    #[must_use]
    pub fn total_results(&self) -> u64 {
        self.search_information
            .as_ref()
            .and_then(|info| info.total_results)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub related_questions: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchInformation {
    #[serde(default)]
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiModeResponse {
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
    #[serde(default)]
    pub related_questions: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiOverview {
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiOverviewResponse {
    #[serde(default)]
    pub ai_overview: Option<AiOverview>,
    #[serde(default)]
    pub related_questions: Vec<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("SoundSwap/1.0")
            .build()
            .context("Failed to build SerpApi HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: SERPAPI_BASE.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn build_url(&self, engine: &str, query: &str, extra: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/search.json", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("engine", engine)
                .append_pair("q", query)
                .append_pair("api_key", &self.api_key);
            for (key, value) in extra {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, engine: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("SerpApi {engine} request failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("SerpApi {engine} error: {status} - {body}"));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse SerpApi {engine} response"))
    }

    pub async fn search(&self, query: &str, recency: Recency) -> Result<SearchResponse> {
        debug!(query, tbs = recency.as_tbs(), "SerpApi search");

        let url = self.build_url(
            "google",
            query,
            &[("tbs", recency.as_tbs()), ("num", "10"), ("hl", "en")],
        )?;
        let response: SearchResponse = self.get_json(url, "google").await?;

        if let Some(error) = response.error {
            return Err(anyhow!("SerpApi google error: {error}"));
        }

        Ok(response)
    }

    pub async fn ai_mode(&self, query: &str) -> Result<AiModeResponse> {
        debug!(query, "SerpApi AI mode lookup");

        let url = self.build_url("google_ai_mode", query, &[])?;
        let response: AiModeResponse = self.get_json(url, "google_ai_mode").await?;

        if let Some(error) = response.error {
            return Err(anyhow!("SerpApi AI mode error: {error}"));
        }

        Ok(response)
    }

    pub async fn ai_overview(&self, query: &str) -> Result<AiOverviewResponse> {
        debug!(query, "SerpApi AI overview lookup");

        let url = self.build_url("google_ai_overview", query, &[])?;
        let response: AiOverviewResponse = self.get_json(url, "google_ai_overview").await?;

        if let Some(error) = response.error {
            return Err(anyhow!("SerpApi AI overview error: {error}"));
        }

        Ok(response)
    }
}

#[async_trait]
impl SearchBackend for SerpApiClient {
    async fn search(&self, query: &str, recency: Recency) -> Result<SearchResponse> {
        Self::search(self, query, recency).await
    }

    async fn ai_mode(&self, query: &str) -> Result<AiModeResponse> {
        Self::ai_mode(self, query).await
    }

    async fn ai_overview(&self, query: &str) -> Result<AiOverviewResponse> {
        Self::ai_overview(self, query).await
    }
}
