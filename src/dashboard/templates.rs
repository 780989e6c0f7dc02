use askama::Template;

use super::demo::DailyUsage;
use super::routes::ChatMessageView;
use crate::logger::SessionMetrics;

// ── Askama Templates ─────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub webhook_url: &'a str,
    pub session_id: &'a str,
    pub messages: &'a [ChatMessageView],
    pub error: Option<&'a str>,
    pub total_dispatches: usize,
    pub successful_replies: usize,
    pub failed_dispatches: usize,
    pub success_rate: f64,
    pub usage: &'a [DailyUsage],
}

#[derive(Template)]
#[template(path = "partials/chat_log.html")]
pub struct ChatLogTemplate<'a> {
    pub messages: &'a [ChatMessageView],
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "partials/stats.html")]
pub struct StatsTemplate {
    pub total_dispatches: usize,
    pub successful_replies: usize,
    pub failed_dispatches: usize,
    pub success_rate: f64,
}

// ── Render helpers (called from routes.rs) ───────────────────────────

pub fn render_index(
    webhook_url: &str,
    session_id: &str,
    messages: &[ChatMessageView],
    metrics: &SessionMetrics,
    usage: &[DailyUsage],
) -> axum::response::Html<String> {
    let template = IndexTemplate {
        webhook_url,
        session_id,
        messages,
        error: None,
        total_dispatches: metrics.total_dispatches,
        successful_replies: metrics.successful_replies,
        failed_dispatches: metrics.failed_dispatches,
        success_rate: metrics.success_rate(),
        usage,
    };
    axum::response::Html(template.render().unwrap_or_else(|e| {
        let msg = e
            .to_string()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        format!("<h1>Template error: {}</h1>", msg)
    }))
}

pub fn render_chat_log(messages: &[ChatMessageView], error: Option<&str>) -> String {
    let template = ChatLogTemplate { messages, error };
    template.render().unwrap_or_default()
}

pub fn render_stats(
    total_dispatches: usize,
    successful_replies: usize,
    failed_dispatches: usize,
    success_rate: f64,
) -> String {
    let template = StatsTemplate {
        total_dispatches,
        successful_replies,
        failed_dispatches,
        success_rate,
    };
    template.render().unwrap_or_default()
}
