//! Local web dashboard.
//!
//! Renders the conversation, session statistics, and a block of mock usage
//! metrics, and forwards chat turns to the webhook via htmx partials and a
//! WebSocket event feed.

pub mod demo;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;
pub mod websocket;

pub use server::start_dashboard;
pub use state::{ChatEvent, DashboardState};
