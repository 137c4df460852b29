//! Blackboard: the shared conversation memory all helpers read and write.
//!
//! Owned by the [`Router`](crate::router::Router) and lent to each helper by
//! mutable reference for the duration of a single `route()` call. Helpers
//! mutate its contents; they never replace it or keep a reference to it.

use std::collections::HashMap;

use crate::frame::Frame;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Label used when flattening history into a prompt.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Shared mutable state: conversation history plus per-kind resource maps.
///
/// `history` is append-only except on [`clear`](Blackboard::clear). Keys in
/// the resource maps are unique; inserting an existing key overwrites
/// silently.
#[derive(Debug, Default)]
pub struct Blackboard {
    pub history: Vec<Turn>,
    /// Document id to full text content.
    pub documents: HashMap<String, String>,
    /// Table id to tabular handle.
    pub tables: HashMap<String, Frame>,
    /// Fetched URL to truncated page body.
    pub web_cache: HashMap<String, String>,
    /// Free-form working storage for helpers.
    pub scratch: HashMap<String, serde_json::Value>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the conversation history.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Turn {
            role,
            content: content.into(),
        });
    }

    /// Render the history as role-prefixed lines, one turn per line, in
    /// insertion order. This is the conversation context every helper
    /// prepends to its prompt.
    pub fn flatten_history(&self) -> String {
        let mut out = String::new();
        for turn in &self.history {
            out.push_str(turn.role.prompt_label());
            out.push_str(": ");
            out.push_str(&turn.content);
            out.push('\n');
        }
        out
    }

    /// Reinitialise everything in place. The maps and history are emptied
    /// together; callers observe either the old state or the fully-cleared
    /// one.
    pub fn clear(&mut self) {
        self.history.clear();
        self.documents.clear();
        self.tables.clear();
        self.web_cache.clear();
        self.scratch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_insertion_order() {
        let mut board = Blackboard::new();
        board.push(Role::User, "hello");
        board.push(Role::Assistant, "hi there");
        board.push(Role::System, "(note)");

        assert_eq!(board.history.len(), 3);
        assert_eq!(board.history[0].role, Role::User);
        assert_eq!(board.history[1].role, Role::Assistant);
        assert_eq!(board.history[2].role, Role::System);
    }

    #[test]
    fn flatten_prefixes_roles() {
        let mut board = Blackboard::new();
        board.push(Role::User, "what is rust?");
        board.push(Role::Assistant, "a systems language");

        let flat = board.flatten_history();
        assert_eq!(flat, "User: what is rust?\nAssistant: a systems language\n");
    }

    #[test]
    fn clear_empties_everything() {
        let mut board = Blackboard::new();
        board.push(Role::User, "hello");
        board.documents.insert("d1".into(), "text".into());
        board.web_cache.insert("http://x".into(), "body".into());
        board.scratch.insert("k".into(), serde_json::json!(1));

        board.clear();

        assert!(board.history.is_empty());
        assert!(board.documents.is_empty());
        assert!(board.tables.is_empty());
        assert!(board.web_cache.is_empty());
        assert!(board.scratch.is_empty());
    }

    #[test]
    fn resource_insert_overwrites_silently() {
        let mut board = Blackboard::new();
        board.documents.insert("d1".into(), "first".into());
        board.documents.insert("d1".into(), "second".into());
        assert_eq!(board.documents.len(), 1);
        assert_eq!(board.documents["d1"], "second");
    }
}
