//! Organic search surface: picks the best primary source for a query and collects
//! "People also ask" questions.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{SearchBackend, TopicCategory};
use crate::clients::serpapi::{OrganicResult, Recency, SearchResponse};
use crate::constants::{domains, limits, scoring};

const FALLBACK_TOPIC: &str = "music production";

/// What the organic search surface contributes to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFetch {
    pub link: String,
    pub title: String,
    pub snippet: String,
    pub source: String,
    pub quality_score: i32,
    /// Found questions first, then synthesized ones.
    pub questions: Vec<String>,
    /// Questions the search engine supplied, before synthesis.
    pub found_questions: usize,
    pub total_results: u64,
    pub trend_score: i32,
    pub category: TopicCategory,
}

pub async fn fetch_base(
    backend: &dyn SearchBackend,
    query: &str,
    category: TopicCategory,
    is_news: bool,
) -> BaseFetch {
    let recency = if is_news {
        Recency::PastDay
    } else {
        Recency::PastWeek
    };

    match backend.search(query, recency).await {
        Ok(response) => {
            metrics::counter!("trend_fetch_total", "surface" => "search", "outcome" => "ok")
                .increment(1);
            from_response(query, category, &response)
        }
        Err(e) => {
            metrics::counter!("trend_fetch_total", "surface" => "search", "outcome" => "error")
                .increment(1);
            warn!(query, error = %e, "Search fetch failed, using fallback");
            fallback(query, category)
        }
    }
}

#[must_use]
pub fn from_response(query: &str, category: TopicCategory, response: &SearchResponse) -> BaseFetch {
    let total_results = response.total_results();

    let (best, quality_score) = match select_best(&response.organic_results) {
        Some((result, score)) => (Some(result), score),
        None => (
            response.organic_results.first(),
            scoring::UNFILTERED_QUALITY,
        ),
    };

    let mut questions = collect_questions(response);
    let found_questions = questions.len();
    synthesize_questions(query, &mut questions);

    let trend_score = base_trend_score(
        total_results,
        if best.is_some() { quality_score } else { 0 },
        found_questions,
    );

    debug!(
        query,
        quality_score, found_questions, total_results, trend_score, "Scored organic results"
    );

    let mut fetch = fallback(query, category);
    fetch.questions = questions;
    fetch.found_questions = found_questions;
    fetch.total_results = total_results;
    fetch.trend_score = trend_score;

    if let Some(result) = best {
        fetch.quality_score = quality_score;
        if let Some(host) = host_of(&result.link) {
            fetch.source = host;
        }
        if !result.link.is_empty() {
            fetch.link.clone_from(&result.link);
        }
        if !result.title.is_empty() {
            fetch.title.clone_from(&result.title);
        }
        if !result.snippet.is_empty() {
            fetch.snippet.clone_from(&result.snippet);
        }
    }

    fetch
}

/// Placeholder record used when the search surface is unavailable.
#[must_use]
pub fn fallback(query: &str, category: TopicCategory) -> BaseFetch {
    let label = display_label(query);
    let mut questions = Vec::new();
    synthesize_questions(label, &mut questions);

    BaseFetch {
        link: default_link(label),
        title: label.to_string(),
        snippet: default_snippet(label),
        source: "unknown".to_string(),
        quality_score: 0,
        questions,
        found_questions: 0,
        total_results: 0,
        trend_score: scoring::MIN_SCORE,
        category,
    }
}

/// Trimmed query, or the generic topic when nothing is left.
#[must_use]
pub fn display_label(query: &str) -> &str {
    let query = query.trim();
    if query.is_empty() { FALLBACK_TOPIC } else { query }
}

#[must_use]
pub fn default_link(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    )
}

#[must_use]
pub fn default_snippet(query: &str) -> String {
    format!("Producers are talking about {query} this week. Dig in for the latest angles.")
}

/// Hostname of a result link without a leading `www.`.
#[must_use]
pub fn host_of(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

#[must_use]
pub fn is_excluded(host: &str) -> bool {
    domains::EXCLUDED.iter().any(|d| host.contains(d))
}

/// Reputation and content-shape score of one organic hit.
#[must_use]
pub fn score_result(result: &OrganicResult, host: &str) -> i32 {
    let mut score = 0;

    if domains::PREMIUM.iter().any(|d| host.contains(d)) {
        score += 30;
    } else if domains::INDUSTRY.iter().any(|d| host.contains(d)) {
        score += 20;
    }

    let title_len = result.title.chars().count();
    if title_len > 20 && title_len < 100 {
        score += 10;
    }

    if result.snippet.chars().count() > 100 {
        score += 15;
    }

    if result.date.is_some() {
        score += 10;
    }

    score
}

/// Highest-scoring result that survives the exclusion list. Ties keep the earlier hit.
#[must_use]
pub fn select_best(results: &[OrganicResult]) -> Option<(&OrganicResult, i32)> {
    let mut best: Option<(&OrganicResult, i32)> = None;

    for result in results {
        let host = host_of(&result.link).unwrap_or_default();
        if is_excluded(&host) {
            continue;
        }

        let score = score_result(result, &host);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((result, score)),
        }
    }

    best
}

fn question_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("question")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Appends the string-shaped questions of `items` to `out`, skipping duplicates and
/// stopping at `cap` entries.
pub(crate) fn extend_questions(out: &mut Vec<String>, items: &[Value], cap: usize) {
    for item in items {
        if out.len() >= cap {
            break;
        }
        if let Some(question) = question_text(item)
            && !out.contains(&question)
        {
            out.push(question);
        }
    }
}

/// Gathers "People also ask" questions from every field the engine may use, stopping
/// once enough distinct questions are found.
#[must_use]
pub fn collect_questions(response: &SearchResponse) -> Vec<String> {
    let nested: &[Value] = response
        .organic_results
        .first()
        .map_or(&[], |r| r.related_questions.as_slice());

    let sources: [&[Value]; 4] = [
        &response.related_questions,
        &response.related_qa,
        &response.inline_questions,
        nested,
    ];

    let mut questions = Vec::new();
    for items in sources {
        if questions.len() >= limits::MIN_QUESTIONS {
            break;
        }
        extend_questions(&mut questions, items, limits::MAX_PAA_QUESTIONS);
    }

    questions
}

fn topic_words(query: &str) -> String {
    let words: Vec<String> = query
        .split_whitespace()
        .take(2)
        .map(str::to_lowercase)
        .collect();

    if words.is_empty() {
        FALLBACK_TOPIC.to_string()
    } else {
        words.join(" ")
    }
}

/// Tops `questions` up to the minimum with templated questions about the query.
pub fn synthesize_questions(query: &str, questions: &mut Vec<String>) {
    let topic = topic_words(query);

    let templates = [
        format!("What are the latest developments in {topic}?"),
        format!("How are music producers using {topic} right now?"),
        format!("What should beginners know about {topic}?"),
    ];

    for template in templates {
        if questions.len() >= limits::MIN_QUESTIONS {
            break;
        }
        if !questions.contains(&template) {
            questions.push(template);
        }
    }
}

/// Trend score of a successful organic search, in `[65, 95]`. Only
/// [`fallback`] records sit at the floor.
#[must_use]
pub fn base_trend_score(total_results: u64, quality_score: i32, found_questions: usize) -> i32 {
    let mut score = scoring::MIN_SCORE + scoring::RECENCY_BONUS;

    if total_results > 1_000_000 {
        score += 10;
    }
    if total_results > 5_000_000 {
        score += 5;
    }
    if total_results > 10_000_000 {
        score += 5;
    }

    if quality_score > 30 {
        score += 15;
    } else if quality_score > 20 {
        score += 10;
    } else if quality_score > 10 {
        score += 5;
    }

    if found_questions >= limits::MIN_QUESTIONS {
        score += 5;
    }

    score.clamp(scoring::MIN_SCORE, scoring::MAX_BASE_SCORE)
}
