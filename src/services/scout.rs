//! Daily topic scouting: today's rotation queries through the trend pipeline, posted
//! as one report to the configured channel.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::info;

use crate::clients::discord::ChatPlatform;
use crate::rate_limit::RateLimiter;
use crate::services::outline::keycap;
use crate::trends::{DailyQueries, TopicReport, TrendAggregator, daily_queries, truncate_chars};

const SOURCE_PREVIEW_CHARS: usize = 40;
const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Serialize)]
pub struct ScoutOutcome {
    pub status: &'static str,
    pub topics: usize,
    pub chunks: usize,
    pub timestamp: String,
}

pub struct ScoutService {
    aggregator: TrendAggregator,
    limiter: RateLimiter,
}

impl ScoutService {
    #[must_use]
    pub fn new(aggregator: TrendAggregator, query_interval: Duration) -> Self {
        Self {
            aggregator,
            limiter: RateLimiter::per_interval(query_interval),
        }
    }

    #[must_use]
    pub const fn aggregator(&self) -> &TrendAggregator {
        &self.aggregator
    }

    /// Reports for the day's rotation queries, fetched one after another.
    pub async fn daily_topics(&self, date: NaiveDate) -> (DailyQueries, Vec<TopicReport>) {
        let daily = daily_queries(date);
        let mut topics = Vec::with_capacity(daily.queries.len());

        for query in &daily.queries {
            self.limiter.acquire().await;
            topics.push(self.aggregator.report(query).await);
        }

        info!(
            date = %date,
            theme = daily.theme,
            topics = topics.len(),
            "Gathered daily topics"
        );
        (daily, topics)
    }

    /// Gathers today's topics and posts the report. A delivery failure is an error.
    pub async fn run(&self, chat: &dyn ChatPlatform, now: DateTime<Local>) -> Result<ScoutOutcome> {
        let (daily, topics) = self.daily_topics(now.date_naive()).await;
        let report = format_report(now.date_naive(), &daily, &topics);

        let chunks = chat
            .post_channel_message(&report)
            .await
            .context("Failed to deliver scout report")?;

        info!(topics = topics.len(), chunks, "Scout report sent");

        Ok(ScoutOutcome {
            status: "sent",
            topics: topics.len(),
            chunks,
            timestamp: now.to_rfc3339(),
        })
    }
}

/// One numbered topic block, shared by the channel report and the `/blog` menu.
pub(crate) fn push_topic_block(out: &mut String, position: usize, topic: &TopicReport) {
    let marker = keycap(position).map_or_else(|| format!("{position}."), str::to_string);
    let _ = writeln!(out, "{marker} **{}**", topic.query.to_uppercase());
    let _ = writeln!(
        out,
        "   📊 Trend: {}/100 {}",
        topic.score,
        topic.status_label()
    );
    let _ = writeln!(
        out,
        "   🔗 Source: {}...",
        truncate_chars(&topic.link, SOURCE_PREVIEW_CHARS)
    );
    out.push('\n');
}

#[must_use]
pub fn format_report(date: NaiveDate, daily: &DailyQueries, topics: &[TopicReport]) -> String {
    let mut report = format!(
        "🎸 **SOUNDSWAP DAILY TOPICS** ({})\n🎯 Theme: {}\n\n**Choose ONE for today's blog:**\n\n",
        date.format("%Y-%m-%d"),
        daily.theme
    );

    for (i, topic) in topics.iter().enumerate() {
        push_topic_block(&mut report, i + 1, topic);
    }

    report.push_str(DIVIDER);
    report.push_str("\n**Use `/blog` to generate your semantic SEO blog!**");
    report
}
