use std::sync::Arc;
use tracing::{info, warn};

use super::ai_surface::{AiSurfaceData, fetch_ai_mode, fetch_ai_overview};
use super::fetcher::{self, BaseFetch, fetch_base};
use super::{
    DailyQuery, SearchBackend, TopicCategory, TopicReport, TrendError, TrendStatus,
    truncate_chars,
};
use crate::constants::{limits, scoring};

/// Keyword groups checked in order against the lowercased query; first match wins.
const CATEGORY_RULES: &[(&[&str], TopicCategory)] = &[
    (&["ai", "artificial"], TopicCategory::AiTools),
    (&["gear", "hardware", "equipment"], TopicCategory::Gear),
    (&["news", "industry", "trend"], TopicCategory::News),
    (&["production", "studio", "recording"], TopicCategory::Production),
];

const MAX_REPORT_INSIGHTS: usize = 2;

/// Builds [`TopicReport`]s by querying all three search surfaces concurrently.
#[derive(Clone)]
pub struct TrendAggregator {
    backend: Arc<dyn SearchBackend>,
}

impl TrendAggregator {
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Report for one of today's rotation queries. Never fails.
    pub async fn report(&self, query: &DailyQuery) -> TopicReport {
        self.report_or_fallback(&query.text, query.category, query.is_news)
            .await
    }

    /// Report for a free-form topic typed by a user. Never fails.
    pub async fn report_for_topic(&self, topic: &str) -> TopicReport {
        self.report_or_fallback(topic, TopicCategory::Other, false)
            .await
    }

    async fn report_or_fallback(
        &self,
        query: &str,
        category: TopicCategory,
        is_news: bool,
    ) -> TopicReport {
        match self.try_report(query, category, is_news).await {
            Ok(report) => {
                info!(
                    query = %report.query,
                    score = report.score,
                    status = %report.status,
                    category = %report.category,
                    ai_enhanced = report.ai_enhanced,
                    "Built topic report"
                );
                report
            }
            Err(e) => {
                warn!(query, error = %e, "Trend pipeline failed, using error report");
                error_report(query)
            }
        }
    }

    async fn try_report(
        &self,
        query: &str,
        category: TopicCategory,
        is_news: bool,
    ) -> Result<TopicReport, TrendError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TrendError::EmptyQuery);
        }

        let search_query = truncate_chars(query, limits::MAX_QUERY_CHARS);
        let backend = self.backend.as_ref();

        let (base, ai_mode, ai_overview) = tokio::join!(
            fetch_base(backend, search_query, category, is_news),
            fetch_ai_mode(backend, search_query),
            fetch_ai_overview(backend, search_query),
        );

        Ok(aggregate(query, base, ai_mode, ai_overview))
    }
}

/// Merges the three surfaces into one report.
#[must_use]
pub fn aggregate(
    query: &str,
    base: BaseFetch,
    ai_mode: Option<AiSurfaceData>,
    ai_overview: Option<AiSurfaceData>,
) -> TopicReport {
    let surfaces: Vec<&AiSurfaceData> = ai_mode.iter().chain(ai_overview.iter()).collect();

    let mut questions: Vec<String> = Vec::new();
    let all_questions = base
        .questions
        .iter()
        .chain(surfaces.iter().flat_map(|s| s.questions.iter()));
    for question in all_questions {
        if questions.len() >= limits::MAX_REPORT_QUESTIONS {
            break;
        }
        if !questions.contains(question) {
            questions.push(question.clone());
        }
    }

    let insights: Vec<String> = surfaces
        .iter()
        .flat_map(|s| s.insights.iter().cloned())
        .collect();

    let score = composite_score(
        base.trend_score,
        ai_mode.is_some(),
        ai_overview.is_some(),
        insights.len(),
    );
    let ai_enhanced = !surfaces.is_empty();

    TopicReport {
        query: query.to_string(),
        category: categorize(query, base.category),
        score,
        status: TrendStatus::from_score(score),
        link: base.link,
        title: base.title,
        snippet: base.snippet,
        questions,
        total_results: base.total_results,
        quality_score: base.quality_score,
        source: base.source,
        ai_enhanced,
        ai_insights: insights.into_iter().take(MAX_REPORT_INSIGHTS).collect(),
    }
}

#[must_use]
pub fn ai_bonus(ai_mode: bool, ai_overview: bool, insight_count: usize) -> i32 {
    let mut bonus = 0;
    if ai_mode || ai_overview {
        bonus += 15;
    }
    if ai_mode && ai_overview {
        bonus += 10;
    }
    let per_insight = i32::try_from(insight_count.min(5)).unwrap_or(5) * 3;
    bonus + per_insight.min(15)
}

/// Final trend score in `[40, 100]`.
#[must_use]
pub fn composite_score(
    base_score: i32,
    ai_mode: bool,
    ai_overview: bool,
    insight_count: usize,
) -> i32 {
    base_score
        .saturating_add(ai_bonus(ai_mode, ai_overview, insight_count))
        .clamp(scoring::MIN_SCORE, scoring::MAX_SCORE)
}

#[must_use]
pub fn categorize(query: &str, inherited: TopicCategory) -> TopicCategory {
    let query = query.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map_or(inherited, |(_, category)| *category)
}

/// Report returned when the pipeline itself fails.
#[must_use]
pub fn error_report(query: &str) -> TopicReport {
    let base = fetcher::fallback(query, TopicCategory::Error);

    TopicReport {
        query: fetcher::display_label(query).to_string(),
        category: TopicCategory::Error,
        score: scoring::MIN_SCORE,
        status: TrendStatus::Steady,
        link: base.link,
        title: base.title,
        snippet: base.snippet,
        questions: base.questions,
        total_results: 0,
        quality_score: 0,
        source: base.source,
        ai_enhanced: false,
        ai_insights: Vec::new(),
    }
}
