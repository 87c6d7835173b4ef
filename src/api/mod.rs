use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use ed25519_dalek::VerifyingKey;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::clients::discord::{ChatPlatform, DiscordClient};
use crate::clients::gemini::{GeminiClient, TextGenerator};
use crate::clients::serpapi::SerpApiClient;
use crate::config::Config;
use crate::services::{ScoutService, SessionStore, Workflows};
use crate::trends::{SearchBackend, TrendAggregator};

mod error;
mod followup;
mod interactions;
mod observability;
mod scout;
mod system;
pub mod types;

pub use error::ApiError;
pub use interactions::verify_signature;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub scout: Arc<ScoutService>,

    pub workflows: Arc<Workflows>,

    pub chat: Arc<dyn ChatPlatform>,

    pub sessions: Arc<SessionStore>,

    pub verifying_key: VerifyingKey,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// The outbound collaborators the API depends on.
#[derive(Clone)]
pub struct Upstreams {
    pub search: Arc<dyn SearchBackend>,
    pub generator: Arc<dyn TextGenerator>,
    pub chat: Arc<dyn ChatPlatform>,
}

impl Upstreams {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut serpapi =
            SerpApiClient::new(&config.serpapi.api_key, config.serpapi.request_timeout_seconds)?;
        if let Some(url) = &config.serpapi.base_url {
            serpapi = serpapi.with_base_url(url);
        }

        let mut gemini = GeminiClient::new(
            &config.gemini.api_key,
            &config.gemini.model,
            config.gemini.request_timeout_seconds,
        )?;
        if let Some(url) = &config.gemini.base_url {
            gemini = gemini.with_base_url(url);
        }

        let mut discord = DiscordClient::new(
            &config.discord.bot_token,
            &config.discord.app_id,
            &config.discord.channel_id,
            config.discord.request_timeout_seconds,
        )?;
        if let Some(url) = &config.discord.api_base_url {
            discord = discord.with_base_url(url);
        }

        Ok(Self {
            search: Arc::new(serpapi),
            generator: Arc::new(gemini),
            chat: Arc::new(discord),
        })
    }
}

pub fn parse_public_key(hex_key: &str) -> anyhow::Result<VerifyingKey> {
    let bytes: [u8; 32] = hex::decode(hex_key.trim())
        .context("Public key is not valid hex")?
        .try_into()
        .map_err(|_| anyhow::anyhow!("Public key must be 32 bytes"))?;
    VerifyingKey::from_bytes(&bytes).context("Public key is not a valid Ed25519 point")
}

pub fn create_app_state(
    config: Config,
    upstreams: Upstreams,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let verifying_key = parse_public_key(&config.discord.public_key)?;

    let aggregator = TrendAggregator::new(upstreams.search);
    let scout = Arc::new(ScoutService::new(
        aggregator,
        Duration::from_millis(config.serpapi.query_interval_ms),
    ));
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session.ttl_seconds,
    )));
    let workflows = Arc::new(Workflows::new(
        scout.clone(),
        upstreams.generator,
        upstreams.chat.clone(),
        sessions.clone(),
    ));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        scout,
        workflows,
        chat: upstreams.chat,
        sessions,
        verifying_key,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let upstreams = Upstreams::from_config(&config)?;
    create_app_state(config, upstreams, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/interactions", post(interactions::handle_interaction))
        .route("/followup", post(followup::handle_followup))
        .route("/scout", get(scout::run_scout))
        .route("/health", get(system::health));

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
