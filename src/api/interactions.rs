//! Interaction webhook.
//!
//! Requests are authenticated with the application's Ed25519 key over
//! `timestamp || body`. Slow commands are acknowledged with a deferred response and
//! finished in the background by [`Workflows`](crate::services::Workflows).

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{Interaction, InteractionData, InteractionResponse, interaction_type};
use super::{ApiError, AppState};
use crate::clients::discord::{BLOG_COMMAND, DRAFT_COMMAND, OUTLINES_COMMAND};
use crate::services::WorkflowJob;
use crate::services::outline::DEFAULT_TOPIC;

const SIGNATURE_HEADER: &str = "x-signature-ed25519";
const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

pub fn verify_signature(
    key: &VerifyingKey,
    signature_hex: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<(), ApiError> {
    let bytes = hex::decode(signature_hex)
        .map_err(|_| ApiError::unauthorized("Invalid request signature"))?;
    let signature = Signature::from_slice(&bytes)
        .map_err(|_| ApiError::unauthorized("Invalid request signature"))?;

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify(&message, &signature)
        .map_err(|_| ApiError::unauthorized("Invalid request signature"))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(format!("Missing {name} header")))
}

pub async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, ApiError> {
    let signature = header(&headers, SIGNATURE_HEADER)?;
    let timestamp = header(&headers, TIMESTAMP_HEADER)?;
    verify_signature(&state.verifying_key, signature, timestamp, &body)?;

    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| ApiError::validation(format!("Invalid interaction payload: {e}")))?;

    let response = match interaction.kind {
        interaction_type::PING => {
            debug!("Answered ping");
            InteractionResponse::pong()
        }
        interaction_type::APPLICATION_COMMAND => {
            let data = interaction.data.unwrap_or_default();
            match command_job(&data) {
                Ok(job) => {
                    info!(command = %data.name, "Deferred command");
                    let workflows = state.workflows.clone();
                    let token = interaction.token;
                    tokio::spawn(async move {
                        workflows.execute(&token, job).await;
                    });
                    InteractionResponse::deferred()
                }
                Err(reply) => reply,
            }
        }
        _ => InteractionResponse::message("Unknown Interaction"),
    };

    Ok(Json(response))
}

/// Maps a command to its background job, or to an immediate reply when there is
/// nothing to run.
fn command_job(data: &InteractionData) -> Result<WorkflowJob, InteractionResponse> {
    match data.name.as_str() {
        BLOG_COMMAND => Ok(WorkflowJob::DailyTopics),
        OUTLINES_COMMAND => {
            let topic = data
                .option_str("topic")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TOPIC);
            Ok(WorkflowJob::Outlines {
                topic: topic.to_string(),
            })
        }
        DRAFT_COMMAND => data
            .target_message()
            .filter(|c| !c.trim().is_empty())
            .map(|context| WorkflowJob::Draft {
                context: context.to_string(),
            })
            .ok_or_else(|| {
                InteractionResponse::message("❌ Error: Could not find message context.")
            }),
        _ => Err(InteractionResponse::message("❌ Unknown command")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn data(json: &str) -> InteractionData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_signature_roundtrip() {
        let signing = SigningKey::from_bytes(&[3u8; 32]);
        let body = br#"{"type":1}"#;
        let mut message = b"1700000000".to_vec();
        message.extend_from_slice(body);
        let signature = hex::encode(signing.sign(&message).to_bytes());

        let key = signing.verifying_key();
        assert!(verify_signature(&key, &signature, "1700000000", body).is_ok());
        assert!(verify_signature(&key, &signature, "1700000001", body).is_err());
        assert!(verify_signature(&key, "not-hex", "1700000000", body).is_err());
        assert!(verify_signature(&key, "abcd", "1700000000", body).is_err());
    }

    #[test]
    fn test_outlines_topic_option() {
        let job = command_job(&data(
            r#"{"name":"outlines","options":[{"name":"topic","value":"  tape saturation "}]}"#,
        ))
        .unwrap();
        assert_eq!(
            job,
            WorkflowJob::Outlines {
                topic: "tape saturation".to_string()
            }
        );

        let job = command_job(&data(r#"{"name":"outlines"}"#)).unwrap();
        assert_eq!(
            job,
            WorkflowJob::Outlines {
                topic: DEFAULT_TOPIC.to_string()
            }
        );
    }

    #[test]
    fn test_draft_without_message_is_immediate_error() {
        let reply = command_job(&data(r#"{"name":"Generate Draft"}"#)).unwrap_err();
        assert_eq!(
            reply,
            InteractionResponse::message("❌ Error: Could not find message context.")
        );
    }

    #[test]
    fn test_unknown_command() {
        let reply = command_job(&data(r#"{"name":"dance"}"#)).unwrap_err();
        assert_eq!(reply, InteractionResponse::message("❌ Unknown command"));
    }
}
