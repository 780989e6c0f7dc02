use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use super::demo::{self, DailyUsage};
use crate::config::AppConfig;
use crate::logger::{Logger, SessionMetrics};
use crate::session::ChatSession;

/// Shared state behind every dashboard route.
///
/// One session and one metrics counter per server process. The session sits
/// behind a `RwLock` that the chat route holds for the whole dispatch, so
/// only one turn is ever in flight.
pub struct DashboardState {
    pub config: AppConfig,
    pub session: RwLock<ChatSession>,
    pub metrics: RwLock<SessionMetrics>,
    pub logger: Logger,
    /// Mock usage rows shown in the dashboard header. Generated once at
    /// startup; nothing reads them back.
    pub usage: Vec<DailyUsage>,
    pub event_tx: broadcast::Sender<ChatEvent>,
}

/// Events pushed to WebSocket clients as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    ReplyReceived { content: String },
    DispatchFailed { error: String },
    SessionReset { session_id: String },
}

impl DashboardState {
    pub fn new(config: AppConfig, logger: Logger) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            config,
            session: RwLock::new(ChatSession::new()),
            metrics: RwLock::new(SessionMetrics::new()),
            logger,
            usage: demo::sample_usage(14),
            event_tx,
        }
    }

    /// Send an event to all connected WebSocket clients. Dropped silently
    /// when nobody is listening.
    pub fn broadcast(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_event_json_shape() {
        let event = ChatEvent::DispatchFailed {
            error: "webhook returned HTTP 500".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"dispatch_failed""#));
        assert!(json.contains("500"));
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_silent() {
        let state = DashboardState::new(
            AppConfig::default(),
            Logger::new("test_logs_dash_state").unwrap(),
        );
        state.broadcast(ChatEvent::SessionReset {
            session_id: "abc".to_string(),
        });
        let _ = std::fs::remove_dir_all("test_logs_dash_state");
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let state = DashboardState::new(
            AppConfig::default(),
            Logger::new("test_logs_dash_state2").unwrap(),
        );
        let mut rx = state.event_tx.subscribe();
        state.broadcast(ChatEvent::ReplyReceived {
            content: "hi there".to_string(),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ChatEvent::ReplyReceived { .. }));
        let _ = std::fs::remove_dir_all("test_logs_dash_state2");
    }
}
