use crate::config::AppConfig;
use crate::utils::find_char_boundary;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides `bearer_token` from the config file.
pub const BEARER_TOKEN_ENV: &str = "CHATRELAY_BEARER_TOKEN";

/// Longest slice of a response body kept in error messages and logs.
const BODY_PREVIEW_BYTES: usize = 500;

// ── Error taxonomy ───────────────────────────────────────────────────────

/// Everything a dispatch can fail with. Every failure path in `send_chat`
/// terminates in one of these; nothing panics past the dispatcher boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Connection, DNS, or timeout failure on the last attempt.
    #[error("request to webhook failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx status on the last attempt.
    #[error("webhook returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// 2xx status but the body had no usable `output` field.
    #[error("webhook reply is missing the \"output\" field: {body}")]
    MalformedReply { body: String },

    #[error("no bearer token configured; set {BEARER_TOKEN_ENV} or bearer_token in chatrelay.toml")]
    MissingToken,

    #[error("bearer token contains characters that are invalid in a header")]
    InvalidToken,

    #[error("session id must not be empty")]
    EmptySessionId,

    /// `max_retries` was configured to zero, so no attempt was ever made.
    #[error("dispatch made no attempts (max_retries is 0)")]
    NoAttempts,
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    #[serde(rename = "chatInput")]
    chat_input: &'a str,
}

/// Success body. Additional fields the webhook sends are ignored.
#[derive(Deserialize)]
struct ChatReply {
    output: String,
}

// ── Dispatch ─────────────────────────────────────────────────────────────

/// Resolve the bearer token: environment first, config file second.
fn bearer_token(config: &AppConfig) -> Result<String, DispatchError> {
    if let Ok(token) = std::env::var(BEARER_TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    if !config.bearer_token.is_empty() {
        return Ok(config.bearer_token.clone());
    }
    Err(DispatchError::MissingToken)
}

fn build_headers(token: &str) -> Result<HeaderMap, DispatchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| DispatchError::InvalidToken)?,
    );
    Ok(headers)
}

fn body_preview(body: &str) -> String {
    body[..find_char_boundary(body, BODY_PREVIEW_BYTES)].to_string()
}

/// Send one chat turn to the webhook and return its `output` string.
///
/// Transport failures and non-2xx statuses share one retry loop: up to
/// `max_retries` total attempts, a fixed `retry_delay_ms` sleep between
/// them, each attempt bounded by `request_timeout_secs`. A 2xx reply that
/// lacks the `output` field is reported immediately; retrying it would just
/// replay the same malformed answer.
///
/// The dispatcher holds no state between calls. Its only side effect is the
/// network call; appending to the conversation log is the caller's job.
pub async fn send_chat(
    session_id: &str,
    text: &str,
    config: &AppConfig,
) -> Result<String, DispatchError> {
    if session_id.is_empty() {
        return Err(DispatchError::EmptySessionId);
    }

    let token = bearer_token(config)?;
    let headers = build_headers(&token)?;
    let payload = ChatRequest {
        session_id,
        chat_input: text,
    };

    let client = reqwest::Client::new();

    let mut last_err: Option<DispatchError> = None;
    for attempt in 0..config.max_retries {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
        }

        let result = client
            .post(&config.webhook_url)
            .headers(headers.clone())
            .json(&payload)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .send()
            .await;

        let resp = match result {
            Ok(r) => r,
            Err(e) => {
                last_err = Some(DispatchError::Transport(e));
                continue;
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                last_err = Some(DispatchError::Transport(e));
                continue;
            }
        };

        if !status.is_success() {
            last_err = Some(DispatchError::Protocol {
                status: status.as_u16(),
                body: body_preview(&body),
            });
            continue;
        }

        let reply: ChatReply =
            serde_json::from_str(&body).map_err(|_| DispatchError::MalformedReply {
                body: body_preview(&body),
            })?;

        return Ok(reply.output);
    }

    Err(last_err.unwrap_or(DispatchError::NoAttempts))
}
