use axum::{
    extract::State,
    response::{Html, IntoResponse, Json},
    Form,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::{ChatEvent, DashboardState};
use super::templates;
use crate::api;
use crate::session::ChatMessage;

/// Flattened message for template rendering.
#[derive(Clone)]
pub struct ChatMessageView {
    pub role_label: &'static str,
    pub content: String,
}

fn message_views(messages: &[ChatMessage]) -> Vec<ChatMessageView> {
    messages
        .iter()
        .map(|m| ChatMessageView {
            role_label: m.role.as_str(),
            content: m.content.clone(),
        })
        .collect()
}

// ── GET / — main dashboard page ──────────────────────────────────────

pub async fn index(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    let metrics = state.metrics.read().await;
    templates::render_index(
        &state.config.webhook_url,
        session.id().as_str(),
        &message_views(session.log().all()),
        &metrics,
        &state.usage,
    )
}

// ── POST /api/chat — one chat turn, returns the conversation partial ─

#[derive(Deserialize)]
pub struct ChatForm {
    pub message: String,
}

pub async fn post_chat(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<ChatForm>,
) -> impl IntoResponse {
    let text = form.message.trim().to_string();
    if text.is_empty() {
        return Html(r#"<div class="error-notice">Please enter a message.</div>"#.to_string());
    }

    // The write lock is held across the dispatch, so a second submit waits
    // for the current turn to finish. One in-flight request at a time, by
    // construction.
    let mut session = state.session.write().await;

    session.log_mut().append(ChatMessage::user(text.clone()));
    {
        let mut m = state.metrics.write().await;
        m.total_dispatches += 1;
    }
    let _ = state.logger.log_dispatch(session.id().as_str(), &text);

    let result = api::send_chat(session.id().as_str(), &text, &state.config).await;

    let error = match result {
        Ok(reply) => {
            let _ = state.logger.log_reply(&reply);
            session.log_mut().append(ChatMessage::assistant(reply.clone()));
            {
                let mut m = state.metrics.write().await;
                m.successful_replies += 1;
            }
            state.broadcast(ChatEvent::ReplyReceived { content: reply });
            None
        }
        Err(e) => {
            // Shown once in the returned partial; the log keeps only the
            // user message.
            let message = e.to_string();
            let _ = state.logger.log_error(&message);
            {
                let mut m = state.metrics.write().await;
                m.failed_dispatches += 1;
            }
            state.broadcast(ChatEvent::DispatchFailed {
                error: message.clone(),
            });
            Some(message)
        }
    };

    Html(templates::render_chat_log(
        &message_views(session.log().all()),
        error.as_deref(),
    ))
}

// ── POST /api/session/reset — fresh id, empty history ────────────────

pub async fn reset_session(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let mut session = state.session.write().await;
    session.reset();
    let _ = state.logger.log_session_reset(session.id().as_str());
    state.broadcast(ChatEvent::SessionReset {
        session_id: session.id().as_str().to_string(),
    });
    Html(templates::render_chat_log(&[], None))
}

// ── GET /api/history — conversation as JSON ───────────────────────────

pub async fn get_history(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    Json(serde_json::json!({
        "session_id": session.id().as_str(),
        "messages": session.log().all(),
    }))
}

// ── GET /api/history/html — HTML partial for HTMX swap ──────────────

pub async fn get_history_html(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let session = state.session.read().await;
    Html(templates::render_chat_log(
        &message_views(session.log().all()),
        None,
    ))
}

// ── GET /api/stats — session metrics as JSON ─────────────────────────

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_dispatches: usize,
    pub successful_replies: usize,
    pub failed_dispatches: usize,
    pub success_rate: f64,
}

pub async fn get_stats(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let m = state.metrics.read().await;
    Json(StatsResponse {
        total_dispatches: m.total_dispatches,
        successful_replies: m.successful_replies,
        failed_dispatches: m.failed_dispatches,
        success_rate: m.success_rate(),
    })
}

// ── GET /api/stats/html — HTML partial for HTMX ─────────────────────

pub async fn get_stats_html(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let m = state.metrics.read().await;
    Html(templates::render_stats(
        m.total_dispatches,
        m.successful_replies,
        m.failed_dispatches,
        m.success_rate(),
    ))
}
