use async_trait::async_trait;
use serde_json::json;
use soundswap::clients::serpapi::{AiModeResponse, AiOverviewResponse, Recency, SearchResponse};
use soundswap::trends::{
    DailyQuery, SearchBackend, TopicCategory, TrendAggregator, TrendStatus, daily_queries,
};
use std::sync::{Arc, Mutex};

/// Serves canned payloads; a `None` surface fails like an unreachable upstream.
#[derive(Default)]
struct ScriptedBackend {
    search: Option<SearchResponse>,
    ai_mode: Option<AiModeResponse>,
    ai_overview: Option<AiOverviewResponse>,
    searches: Mutex<Vec<(String, Recency)>>,
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, query: &str, recency: Recency) -> anyhow::Result<SearchResponse> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), recency));
        self.search
            .clone()
            .ok_or_else(|| anyhow::anyhow!("search unavailable"))
    }

    async fn ai_mode(&self, _query: &str) -> anyhow::Result<AiModeResponse> {
        self.ai_mode
            .clone()
            .ok_or_else(|| anyhow::anyhow!("ai mode unavailable"))
    }

    async fn ai_overview(&self, _query: &str) -> anyhow::Result<AiOverviewResponse> {
        self.ai_overview
            .clone()
            .ok_or_else(|| anyhow::anyhow!("ai overview unavailable"))
    }
}

fn musictech_search() -> SearchResponse {
    serde_json::from_value(json!({
        "organic_results": [
            {"link": "https://www.youtube.com/watch?v=abc", "title": "Video", "snippet": "s", "date": "1 day ago"},
            {"link": "https://www.reddit.com/r/edmproduction/x", "title": "Thread", "snippet": "s", "date": "1 day ago"},
            {
                "link": "https://www.musictech.com/reviews/ai-mastering",
                "title": "The best AI mastering tools reviewed",
                "snippet": "An in-depth look at how AI mastering services stack up against engineers, with listening tests across genres.",
                "date": "2 days ago"
            }
        ]
    }))
    .unwrap()
}

fn ai_tools_query() -> DailyQuery {
    DailyQuery {
        text: "AI mastering tools reviews 2026".to_string(),
        category: TopicCategory::AiTools,
        is_news: false,
    }
}

#[tokio::test]
async fn test_premium_source_without_ai_surfaces() {
    let backend = Arc::new(ScriptedBackend {
        search: Some(musictech_search()),
        ..Default::default()
    });
    let aggregator = TrendAggregator::new(backend.clone());

    let report = aggregator.report(&ai_tools_query()).await;

    assert_eq!(report.quality_score, 65);
    assert_eq!(report.score, 80);
    assert_eq!(report.status, TrendStatus::Viral);
    assert_eq!(report.category, TopicCategory::AiTools);
    assert_eq!(report.source, "musictech.com");
    assert_eq!(report.link, "https://www.musictech.com/reviews/ai-mastering");
    assert!(!report.ai_enhanced);
    assert_eq!(report.status_label(), "VIRAL");
    assert_eq!(report.questions.len(), 3);

    let searches = backend.searches.lock().unwrap();
    assert_eq!(searches[0].1, Recency::PastWeek);
}

#[tokio::test]
async fn test_both_ai_surfaces_push_score_to_ceiling() {
    let ai_mode: AiModeResponse = serde_json::from_value(json!({
        "text_blocks": [
            {"type": "paragraph", "snippet": "AI mastering is now a default step for demos."},
            {"type": "paragraph", "snippet": "Engineers still lead on album work."},
            {"type": "paragraph", "snippet": "Reference tracks matter more than presets."},
            {"type": "paragraph", "snippet": "This one is over the insight limit."}
        ],
        "related_questions": [{"question": "Is AI mastering good enough for streaming?"}]
    }))
    .unwrap();
    let ai_overview: AiOverviewResponse = serde_json::from_value(json!({
        "ai_overview": {"text_blocks": [{"type": "paragraph", "snippet": "Several services offer instant masters."}]},
        "related_questions": [{"question": "Which AI mastering service is cheapest?"}]
    }))
    .unwrap();

    let aggregator = TrendAggregator::new(Arc::new(ScriptedBackend {
        search: Some(musictech_search()),
        ai_mode: Some(ai_mode),
        ai_overview: Some(ai_overview),
        ..Default::default()
    }));

    let report = aggregator.report(&ai_tools_query()).await;

    assert_eq!(report.score, 100);
    assert!(report.ai_enhanced);
    assert_eq!(report.status_label(), "🤖 AI+ VIRAL");
    assert_eq!(report.ai_insights.len(), 2);
    assert_eq!(report.questions.len(), 5);
    assert!(
        report
            .questions
            .contains(&"Which AI mastering service is cheapest?".to_string())
    );
}

#[tokio::test]
async fn test_single_ai_surface_bonus() {
    let ai_overview: AiOverviewResponse = serde_json::from_value(json!({
        "ai_overview": {"text_blocks": [{"snippet": "Tape emulation is back in fashion."}]}
    }))
    .unwrap();

    let aggregator = TrendAggregator::new(Arc::new(ScriptedBackend {
        search: Some(SearchResponse::default()),
        ai_overview: Some(ai_overview),
        ..Default::default()
    }));

    let report = aggregator.report_for_topic("tape saturation").await;

    // Floor 40, recency +25, one surface +15, one insight +3.
    assert_eq!(report.score, 83);
    assert_eq!(report.status, TrendStatus::Viral);
    assert_eq!(report.status_label(), "🤖 AI+ VIRAL");
    assert_eq!(report.source, "unknown");
    assert_eq!(report.category, TopicCategory::Other);
}

#[tokio::test]
async fn test_every_surface_failing_still_yields_report() {
    let aggregator = TrendAggregator::new(Arc::new(ScriptedBackend::default()));
    let daily = daily_queries(chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

    for query in &daily.queries {
        let report = aggregator.report(query).await;

        assert_eq!(report.score, 40);
        assert_eq!(report.status, TrendStatus::Steady);
        assert!(report.questions.len() >= 3);
        assert!(!report.link.is_empty());
        assert!(!report.title.is_empty());
        assert!(!report.snippet.is_empty());
        assert!(!report.ai_enhanced);
        assert_ne!(report.category, TopicCategory::Error);
    }
}

#[tokio::test]
async fn test_news_query_searches_past_day() {
    let backend = Arc::new(ScriptedBackend::default());
    let aggregator = TrendAggregator::new(backend.clone());

    let news = DailyQuery {
        text: "plugin industry news October 2026".to_string(),
        category: TopicCategory::News,
        is_news: true,
    };
    aggregator.report(&news).await;

    let searches = backend.searches.lock().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].1, Recency::PastDay);
}

#[tokio::test]
async fn test_long_query_is_truncated_for_search() {
    let backend = Arc::new(ScriptedBackend::default());
    let aggregator = TrendAggregator::new(backend.clone());

    let long = "synth ".repeat(40);
    let report = aggregator.report_for_topic(&long).await;

    let searches = backend.searches.lock().unwrap();
    assert_eq!(searches[0].0.chars().count(), 100);
    assert_eq!(report.query, long.trim());
}

#[tokio::test]
async fn test_blank_query_yields_error_report() {
    let backend = Arc::new(ScriptedBackend::default());
    let aggregator = TrendAggregator::new(backend.clone());

    let report = aggregator.report_for_topic("   ").await;

    assert_eq!(report.category, TopicCategory::Error);
    assert_eq!(report.score, 40);
    assert!(!report.title.trim().is_empty());
    assert!(!report.query.trim().is_empty());
    assert!(backend.searches.lock().unwrap().is_empty());

    let report = aggregator.report_for_topic("").await;
    assert_eq!(report.title, "music production");
}
