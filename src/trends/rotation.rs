//! Daily query rotation.
//!
//! Picks one query from each of four fixed pools using only calendar arithmetic, so
//! the same date always yields the same queries.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::TopicCategory;

const THEMES: [&str; 6] = [
    "AI Innovation",
    "Studio Gear",
    "Industry Shifts",
    "Creative Workflow",
    "Sound Design",
    "Release Strategy",
];

const AI_TOOLS_POOL: [&str; 8] = [
    "AI mastering tools reviews {year}",
    "AI music generation plugins {month} {year}",
    "AI stem separation software {year}",
    "best AI vocal tools for producers {year}",
    "AI mixing assistant plugins {month} {year}",
    "AI drum pattern generators {year}",
    "AI sample search tools {month} {year}",
    "AI chord progression generators {year}",
];

const GEAR_POOL: [&str; 8] = [
    "new synthesizer releases {month} {year}",
    "best audio interfaces {year}",
    "studio monitor reviews {month} {year}",
    "midi controller releases {year}",
    "budget home studio gear {month} {year}",
    "modular synth gear news {year}",
    "studio headphones for mixing {year}",
    "drum machine releases {month} {year}",
];

const NEWS_POOL: [&str; 8] = [
    "music production news {month} {year}",
    "music industry news independent artists {month} {year}",
    "streaming royalties news {month} {year}",
    "DAW update news {month} {year}",
    "plugin industry news {month} {year}",
    "music tech industry news {month} {year}",
    "independent label news {month} {year}",
    "music licensing news {month} {year}",
];

const TRENDING_POOL: [&str; 8] = [
    "trending music production techniques {year}",
    "viral producer workflows {month} {year}",
    "trending sound design styles {year}",
    "popular beat making trends {month} {year}",
    "trending mixing techniques {year}",
    "hyperpop production trends {year}",
    "lofi production trends {month} {year}",
    "afrobeats production trends {year}",
];

/// One query picked for today, tagged with the pool it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyQuery {
    pub text: String,
    pub category: TopicCategory,
    /// News queries search the past day instead of the past week.
    pub is_news: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyQueries {
    pub theme: &'static str,
    pub date_label: String,
    pub queries: Vec<DailyQuery>,
}

#[must_use]
pub fn daily_queries(date: NaiveDate) -> DailyQueries {
    let day = date.day() as usize;
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let week = date.iso_week().week() as usize;
    let month = date.month0() as usize;

    let month_name = date.format("%B").to_string();
    let year = date.year().to_string();
    let render = |template: &str| {
        template
            .replace("{month}", &month_name)
            .replace("{year}", &year)
    };

    let picks = [
        (
            AI_TOOLS_POOL[(day % 8 + weekday) % 8],
            TopicCategory::AiTools,
            false,
        ),
        (GEAR_POOL[(week + month) % 8], TopicCategory::Gear, false),
        (NEWS_POOL[(day + week) % 8], TopicCategory::News, true),
        (
            TRENDING_POOL[(month * 2 + weekday + day / 7) % 8],
            TopicCategory::Trending,
            false,
        ),
    ];

    DailyQueries {
        theme: THEMES[month % THEMES.len()],
        date_label: date.format("%A, %B %-d, %Y").to_string(),
        queries: picks
            .into_iter()
            .map(|(template, category, is_news)| DailyQuery {
                text: render(template),
                category,
                is_news,
            })
            .collect(),
    }
}
