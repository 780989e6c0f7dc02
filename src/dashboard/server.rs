use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::routes;
use super::state::DashboardState;
use super::websocket;

/// Start the Axum dashboard server on the given port, bound to localhost.
pub async fn start_dashboard(state: Arc<DashboardState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Route table, kept separate from the serving loop.
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        // HTML pages
        .route("/", get(routes::index))
        // Chat + session lifecycle
        .route("/api/chat", post(routes::post_chat))
        .route("/api/session/reset", post(routes::reset_session))
        // JSON API endpoints
        .route("/api/history", get(routes::get_history))
        .route("/api/stats", get(routes::get_stats))
        // HTMX HTML partials
        .route("/api/history/html", get(routes::get_history_html))
        .route("/api/stats/html", get(routes::get_stats_html))
        // WebSocket for real-time events
        .route("/api/events", get(websocket::ws_handler))
        .with_state(state)
}
