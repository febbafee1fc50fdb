//! Conversation context for follow-up chat.
//!
//! Each analysis seeds a fresh context; chat turns append to it. Contexts
//! are keyed by session so concurrent users never interleave their turns.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

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

/// Ordered sequence of conversation messages.
///
/// Invariant: the first message, if present, has role `System`. The context
/// is replaced wholesale by [`reseed`](Self::reseed) and otherwise grows by
/// append only.
#[derive(Debug, Default)]
pub struct ConversationContext {
    messages: Vec<Message>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire context with the seed for a freshly analyzed notice.
    pub fn reseed(&mut self, notice_text: &str) {
        self.messages = vec![
            Message::system("You are a legal assistant AI."),
            Message::user(format!("Legal notice text: {}", notice_text)),
        ];
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Session key used when the caller does not identify itself.
pub const DEFAULT_SESSION: &str = "default";

/// Session-keyed store of conversation contexts.
///
/// Each session gets its own context behind an async Mutex; callers hold the
/// lock for the duration of an analyze or chat operation, so two concurrent
/// calls on the same session serialize instead of interleaving.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<ConversationContext>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the context handle for a session, creating it on first use.
    pub async fn context_for(&self, session: &str) -> Arc<Mutex<ConversationContext>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(ctx) = sessions.get(session) {
                return Arc::clone(ctx);
            }
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(session.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ConversationContext::new()))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reseed_replaces_everything() {
        let mut ctx = ConversationContext::new();
        ctx.reseed("first notice");
        ctx.append_assistant("advice one");
        ctx.append_user("a question");

        ctx.reseed("second notice");
        assert_eq!(ctx.messages().len(), 2);
        assert_eq!(ctx.messages()[0].role, Role::System);
        assert_eq!(ctx.messages()[0].content, "You are a legal assistant AI.");
        assert_eq!(
            ctx.messages()[1].content,
            "Legal notice text: second notice"
        );
    }

    #[test]
    fn test_appends_preserve_order() {
        let mut ctx = ConversationContext::new();
        ctx.reseed("notice");
        ctx.append_assistant("advice");
        ctx.append_user("follow-up");
        ctx.append_assistant("reply");

        let roles: Vec<Role> = ctx.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn test_first_message_is_system_after_reseed() {
        let mut ctx = ConversationContext::new();
        assert!(ctx.is_empty());
        ctx.reseed("x");
        assert_eq!(ctx.messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();

        let a = store.context_for("alice").await;
        a.lock().await.reseed("alice's notice");

        let b = store.context_for("bob").await;
        assert!(b.lock().await.is_empty());

        // Same key returns the same context.
        let a2 = store.context_for("alice").await;
        assert_eq!(a2.lock().await.messages().len(), 2);
    }

    #[test]
    fn test_role_serialization() {
        let msg = Message::assistant("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
