use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ── Session identity ─────────────────────────────────────────────────────

/// Opaque identifier for one interactive session. Generated once at session
/// start and reused for every dispatch, so the webhook can correlate the
/// turns of a single conversation. Immutable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Messages ─────────────────────────────────────────────────────────────

/// Who authored a message. Serialized lowercase to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation entry. Immutable once created; ordering in the log is
/// conversation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ── Conversation log ─────────────────────────────────────────────────────

/// Ordered, append-only history of one session. Entries are only ever added
/// by appending: the user's message when a turn starts, the assistant's
/// reply when a dispatch succeeds. A failed dispatch adds nothing. The log
/// is cleared only through `ChatSession::reset`.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Full ordered history, oldest first.
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// One interactive conversation: an id, its log, and when it began. Passed
/// explicitly to whoever needs it rather than living in ambient state.
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    log: ConversationLog,
    started_at: DateTime<Local>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            log: ConversationLog::new(),
            started_at: Local::now(),
        }
    }

    /// Start over: fresh id, empty log. The only way the log is ever cleared.
    pub fn reset(&mut self) {
        self.id = SessionId::new();
        self.log.clear();
        self.started_at = Local::now();
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ConversationLog {
        &mut self.log
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_id_format() {
        let id = SessionId::new();
        // Canonical UUID rendering: 36 chars, hyphenated
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(id.as_str().matches('-').count(), 4);
    }

    #[test]
    fn test_session_id_uniqueness() {
        let ids: HashSet<String> = (0..10_000)
            .map(|_| SessionId::new().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn test_log_preserves_order() {
        let mut log = ConversationLog::new();
        let m1 = ChatMessage::user("first");
        let m2 = ChatMessage::assistant("second");
        let m3 = ChatMessage::user("third");
        log.append(m1.clone());
        log.append(m2.clone());
        log.append(m3.clone());
        assert_eq!(log.all(), &[m1, m2, m3]);
    }

    #[test]
    fn test_log_starts_empty() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_session_reset_clears_log_and_rotates_id() {
        let mut session = ChatSession::new();
        let old_id = session.id().clone();
        session.log_mut().append(ChatMessage::user("hello"));
        session.log_mut().append(ChatMessage::assistant("hi there"));
        assert_eq!(session.log().len(), 2);

        session.reset();
        assert!(session.log().is_empty());
        assert_ne!(session.id(), &old_id);
    }

    #[test]
    fn test_message_constructors() {
        let user = ChatMessage::user("hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "hello");

        let assistant = ChatMessage::assistant("hi");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.content, "hi");
    }
}
