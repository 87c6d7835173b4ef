use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;

use crate::clients::discord::DiscordClient;
use crate::clients::serpapi::SerpApiClient;
use crate::config::Config;
use crate::services::ScoutService;
use crate::services::scout::format_report;
use crate::trends::{TrendAggregator, daily_queries};

fn search_client(config: &Config) -> Result<SerpApiClient> {
    let client = SerpApiClient::new(&config.serpapi.api_key, config.serpapi.request_timeout_seconds)?;
    Ok(match &config.serpapi.base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    })
}

fn discord_client(config: &Config) -> Result<DiscordClient> {
    let client = DiscordClient::new(
        &config.discord.bot_token,
        &config.discord.app_id,
        &config.discord.channel_id,
        config.discord.request_timeout_seconds,
    )?;
    Ok(match &config.discord.api_base_url {
        Some(url) => client.with_base_url(url),
        None => client,
    })
}

pub fn cmd_topics(date: Option<NaiveDate>) {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let daily = daily_queries(date);

    println!("{}", daily.date_label);
    println!("Theme: {}", daily.theme);
    println!();
    for (i, query) in daily.queries.iter().enumerate() {
        let recency = if query.is_news { "past day" } else { "past week" };
        println!(
            "  {}. [{}] {} ({})",
            i + 1,
            query.category,
            query.text,
            recency
        );
    }
}

pub async fn cmd_report(config: &Config, query: &str) -> Result<()> {
    config.validate_search()?;

    let aggregator = TrendAggregator::new(Arc::new(search_client(config)?));
    let report = aggregator.report_for_topic(query).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn cmd_scout(config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        config.validate_search()?;
    } else {
        config.validate()?;
    }

    let scout = ScoutService::new(
        TrendAggregator::new(Arc::new(search_client(config)?)),
        Duration::from_millis(config.serpapi.query_interval_ms),
    );

    if dry_run {
        let today = Local::now().date_naive();
        let (daily, topics) = scout.daily_topics(today).await;
        println!("{}", format_report(today, &daily, &topics));
        return Ok(());
    }

    let discord = discord_client(config)?;
    let outcome = scout.run(&discord, Local::now()).await?;
    println!(
        "✓ Scout report sent: {} topics in {} message(s)",
        outcome.topics, outcome.chunks
    );
    Ok(())
}

pub async fn cmd_register(config: &Config) -> Result<()> {
    if config.discord.bot_token.trim().is_empty() || config.discord.app_id.trim().is_empty() {
        anyhow::bail!("DISCORD_BOT_TOKEN and DISCORD_APP_ID are required");
    }

    let registered = discord_client(config)?.register_commands().await?;
    for command in &registered {
        println!("✓ Registered {} ({})", command.name, command.id);
    }
    Ok(())
}
