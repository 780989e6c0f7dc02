use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

pub mod api;
pub mod config;
pub mod dashboard;
pub mod interface;
pub mod logger;
pub mod session;
pub mod utils;

/// Run the application: load `.env`, load config, then start either the web
/// dashboard or the CLI REPL.
///
/// With `enable_dashboard = true` in `chatrelay.toml`, the Axum dashboard is
/// served on localhost; otherwise the interactive REPL starts.
pub async fn run() -> Result<()> {
    // Load environment variables from .env (CHATRELAY_BEARER_TOKEN)
    dotenv().ok();

    let config = config::AppConfig::load();

    if config.enable_dashboard {
        let logger = logger::Logger::new(&config.log_dir)?;
        let port = config.dashboard_port;
        let state = Arc::new(dashboard::DashboardState::new(config, logger));
        dashboard::start_dashboard(state, port).await?;
    } else {
        interface::start_repl(&config).await;
    }

    Ok(())
}

// Re-exports for library consumers: common useful types
pub use api::{send_chat, DispatchError};
pub use config::AppConfig;
pub use session::{ChatMessage, ChatSession, ConversationLog, Role, SessionId};
