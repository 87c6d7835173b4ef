use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use soundswap::api::{self, Upstreams};
use soundswap::clients::discord::ChatPlatform;
use soundswap::clients::gemini::TextGenerator;
use soundswap::clients::serpapi::{AiModeResponse, AiOverviewResponse, Recency, SearchResponse};
use soundswap::config::Config;
use soundswap::trends::SearchBackend;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const TIMESTAMP: &str = "1760000000";
const TOKEN: &str = "interaction-token";

const OUTLINES: &str = "\
OUTLINE 1: Mix Faster
Sentiment: Excited
- Hook: templates save hours

OUTLINE 2: Keep the Human Touch
Sentiment: Cautious
- Hook: taste still wins";

struct OfflineSearch;

#[async_trait]
impl SearchBackend for OfflineSearch {
    async fn search(&self, _query: &str, _recency: Recency) -> anyhow::Result<SearchResponse> {
        anyhow::bail!("offline")
    }

    async fn ai_mode(&self, _query: &str) -> anyhow::Result<AiModeResponse> {
        anyhow::bail!("offline")
    }

    async fn ai_overview(&self, _query: &str) -> anyhow::Result<AiOverviewResponse> {
        anyhow::bail!("offline")
    }
}

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if prompt.contains("OUTLINE 1:") {
            Ok(OUTLINES.to_string())
        } else {
            Ok("# The full post".to_string())
        }
    }
}

#[derive(Default)]
struct RecordingChat {
    edits: Mutex<Vec<(String, String)>>,
    posts: Mutex<Vec<String>>,
    fail_posts: bool,
}

#[async_trait]
impl ChatPlatform for RecordingChat {
    async fn edit_original(&self, token: &str, content: &str) -> anyhow::Result<()> {
        self.edits
            .lock()
            .unwrap()
            .push((token.to_string(), content.to_string()));
        Ok(())
    }

    async fn post_channel_message(&self, content: &str) -> anyhow::Result<usize> {
        if self.fail_posts {
            anyhow::bail!("channel unavailable");
        }
        self.posts.lock().unwrap().push(content.to_string());
        Ok(1)
    }
}

impl RecordingChat {
    async fn wait_for_edit(&self, predicate: impl Fn(&str) -> bool) -> String {
        for _ in 0..300 {
            let found = self
                .edits
                .lock()
                .unwrap()
                .iter()
                .rev()
                .map(|(_, content)| content)
                .find(|content| predicate(content))
                .cloned();
            if let Some(content) = found {
                return content;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected edit never arrived");
    }
}

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

fn test_config(cron_secret: Option<&str>) -> Config {
    let mut config = Config::default();
    config.discord.public_key = hex::encode(signing_key().verifying_key().to_bytes());
    config.serpapi.query_interval_ms = 0;
    config.security.cron_secret = cron_secret.map(str::to_string);
    config
}

fn spawn_app_with(config: Config, chat: Arc<RecordingChat>) -> Router {
    let upstreams = Upstreams {
        search: Arc::new(OfflineSearch),
        generator: Arc::new(CannedGenerator),
        chat,
    };
    let state = api::create_app_state(config, upstreams, None).expect("Failed to create app state");
    api::router(state)
}

fn spawn_app() -> (Router, Arc<RecordingChat>) {
    let chat = Arc::new(RecordingChat::default());
    (spawn_app_with(test_config(None), chat.clone()), chat)
}

fn signed_interaction(body: &str) -> Request<Body> {
    let signature = signing_key().sign(format!("{TIMESTAMP}{body}").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/interactions")
        .header("content-type", "application/json")
        .header("X-Signature-Ed25519", hex::encode(signature.to_bytes()))
        .header("X-Signature-Timestamp", TIMESTAMP)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn followup(content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/followup")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"token": TOKEN, "content": content}).to_string(),
        ))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() {
    let (app, _) = spawn_app();

    let response = app
        .oneshot(signed_interaction(r#"{"type":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"type": 1}));
}

#[tokio::test]
async fn test_bad_signatures_are_rejected() {
    let (app, _) = spawn_app();

    let mut tampered = signed_interaction(r#"{"type":1}"#);
    *tampered.body_mut() = Body::from(r#"{"type":2}"#);
    let response = app.clone().oneshot(tampered).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let unsigned = Request::builder()
        .method("POST")
        .uri("/api/interactions")
        .body(Body::from(r#"{"type":1}"#))
        .unwrap();
    let response = app.clone().oneshot(unsigned).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_signed_garbage_is_bad_request() {
    let (app, _) = spawn_app();

    let response = app.oneshot(signed_interaction("not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_command() {
    let (app, _) = spawn_app();

    let body = json!({"type": 2, "token": TOKEN, "data": {"name": "dance"}}).to_string();
    let response = app.oneshot(signed_interaction(&body)).await.unwrap();

    assert_eq!(
        json_body(response).await,
        json!({"type": 4, "data": {"content": "❌ Unknown command"}})
    );
}

#[tokio::test]
async fn test_blog_flow_through_followups() {
    let (app, chat) = spawn_app();

    let body = json!({"type": 2, "token": TOKEN, "data": {"name": "blog"}}).to_string();
    let response = app.clone().oneshot(signed_interaction(&body)).await.unwrap();
    assert_eq!(json_body(response).await, json!({"type": 5}));

    let menu = chat
        .wait_for_edit(|c| c.starts_with("🎸 **TODAY'S TOPICS**"))
        .await;
    assert!(menu.contains("1️⃣"));
    assert!(menu.contains("Reply with 1-4"));

    let response = app.clone().oneshot(followup("2")).await.unwrap();
    assert_eq!(
        json_body(response).await,
        json!({"status": "processing_outlines"})
    );
    let outlines = chat
        .wait_for_edit(|c| c.starts_with("📝 **BLOG OUTLINES:"))
        .await;
    assert!(outlines.contains("2️⃣ **Keep the Human Touch**"));

    let response = app.clone().oneshot(followup("2️⃣")).await.unwrap();
    assert_eq!(
        json_body(response).await,
        json!({"status": "generating_blog"})
    );
    let post = chat
        .wait_for_edit(|c| c.starts_with("✍️ **Keep the Human Touch**"))
        .await;
    assert!(post.ends_with("# The full post"));
}

#[tokio::test]
async fn test_outlines_command_with_topic() {
    let (app, chat) = spawn_app();

    let body = json!({
        "type": 2,
        "token": TOKEN,
        "data": {"name": "outlines", "options": [{"name": "topic", "type": 3, "value": "tape saturation"}]}
    })
    .to_string();
    let response = app.oneshot(signed_interaction(&body)).await.unwrap();
    assert_eq!(json_body(response).await, json!({"type": 5}));

    let outlines = chat
        .wait_for_edit(|c| c.starts_with("📝 **BLOG OUTLINES: TAPE SATURATION**"))
        .await;
    assert!(outlines.contains("💭 Sentiment: Excited"));
}

#[tokio::test]
async fn test_draft_context_command() {
    let (app, chat) = spawn_app();

    let body = json!({
        "type": 2,
        "token": TOKEN,
        "data": {
            "name": "Generate Draft",
            "type": 3,
            "target_id": "42",
            "resolved": {"messages": {"42": {"id": "42", "content": "Stem splitters hit 1.0"}}}
        }
    })
    .to_string();
    let response = app.oneshot(signed_interaction(&body)).await.unwrap();
    assert_eq!(json_body(response).await, json!({"type": 5}));

    let draft = chat
        .wait_for_edit(|c| c.starts_with("✍️ **SoundSwap AI Draft Complete:**"))
        .await;
    assert!(draft.contains("# The full post"));
}

#[tokio::test]
async fn test_followup_without_session_reports_expiry() {
    let (app, chat) = spawn_app();

    let response = app.oneshot(followup("3")).await.unwrap();
    assert_eq!(
        json_body(response).await,
        json!({"status": "processing_outlines"})
    );

    let error = chat.wait_for_edit(|c| c.starts_with("❌")).await;
    assert!(error.contains("expired"));
}

#[tokio::test]
async fn test_followup_rejects_other_input() {
    let (app, _) = spawn_app();

    let response = app.clone().oneshot(followup("seven")).await.unwrap();
    assert_eq!(json_body(response).await, json!({"status": "invalid_input"}));

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/followup")
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .unwrap();
    let response = app.clone().oneshot(malformed).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let no_token = Request::builder()
        .method("POST")
        .uri("/api/followup")
        .header("content-type", "application/json")
        .body(Body::from(json!({"token": " ", "content": "1"}).to_string()))
        .unwrap();
    let response = app.oneshot(no_token).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn scout_request(bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/scout");
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_scout_requires_cron_secret() {
    let chat = Arc::new(RecordingChat::default());
    let app = spawn_app_with(test_config(Some("s3cret")), chat.clone());

    let response = app.clone().oneshot(scout_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(scout_request(Some("wrong"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(chat.posts.lock().unwrap().is_empty());

    let response = app.oneshot(scout_request(Some("s3cret"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "sent");
    assert_eq!(body["topics"], 4);
    assert_eq!(body["chunks"], 1);
    assert!(body["timestamp"].is_string());

    let posts = chat.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].starts_with("🎸 **SOUNDSWAP DAILY TOPICS**"));
}

#[tokio::test]
async fn test_scout_delivery_failure_is_bad_gateway() {
    let chat = Arc::new(RecordingChat {
        fail_posts: true,
        ..Default::default()
    });
    let app = spawn_app_with(test_config(None), chat);

    let response = app.oneshot(scout_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Discord service is unavailable");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (app, _) = spawn_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["active_sessions"], 0);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_invalid_public_key_fails_state_creation() {
    let mut config = test_config(None);
    config.discord.public_key = "abcd".to_string();

    let upstreams = Upstreams {
        search: Arc::new(OfflineSearch),
        generator: Arc::new(CannedGenerator),
        chat: Arc::new(RecordingChat::default()),
    };
    assert!(api::create_app_state(config, upstreams, None).is_err());
}
