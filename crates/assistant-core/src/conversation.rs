//! Conversation transcript types
//!
//! UI-agnostic records of the exchanged chat turns. The log is append-only:
//! turns are created by the session when a chat request succeeds and are
//! never edited afterwards.

use serde::{Deserialize, Serialize};

/// The role of a chat turn's author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    role: ChatRole,
    content: String,
}

impl ChatTurn {
    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub(crate) fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered record of every turn exchanged in this session.
///
/// Grows for the lifetime of the session; there is no eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationLog {
    turns: Vec<ChatTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Iterate the turns in insertion order.
    ///
    /// The iterator is lazy and `Clone`, so a renderer can walk it more than
    /// once (e.g. to measure wrapped height, then draw).
    pub fn render(&self) -> impl Iterator<Item = &ChatTurn> + Clone + '_ {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = ConversationLog::new();
        log.append(ChatTurn::user("hello"));
        log.append(ChatTurn::assistant("hi there"));
        log.append(ChatTurn::user("how are you"));

        let roles: Vec<ChatRole> = log.render().map(|t| t.role()).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(log.last().map(|t| t.content()), Some("how are you"));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_append_does_not_touch_prior_turns() {
        let mut log = ConversationLog::new();
        log.append(ChatTurn::user("first"));
        let before: Vec<ChatTurn> = log.render().cloned().collect();

        log.append(ChatTurn::assistant("second"));
        let after: Vec<ChatTurn> = log.render().cloned().collect();

        assert_eq!(&after[..1], &before[..]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut log = ConversationLog::new();
        log.append(ChatTurn::user("a"));
        log.append(ChatTurn::assistant("b"));

        let first: Vec<&ChatTurn> = log.render().collect();
        let second: Vec<&ChatTurn> = log.render().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_is_restartable() {
        let mut log = ConversationLog::new();
        log.append(ChatTurn::user("a"));

        let iter = log.render();
        let copy = iter.clone();
        assert_eq!(iter.count(), 1);
        assert_eq!(copy.count(), 1);
    }

    #[test]
    fn test_empty_log() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.render().count(), 0);
        assert!(log.last().is_none());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let turn = ChatTurn::assistant("x");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
