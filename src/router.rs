//! Router: owns the blackboard and dispatches each message to one helper.
//!
//! Dispatch priority, first match wins:
//! 1. web-intent override ("fetch http" / "scrape http" anywhere in the
//!    message, case-insensitive): always wins, never changes the active
//!    helper;
//! 2. the active helper, when one is set;
//! 3. the general helper.
//!
//! Helpers are a closed set of four variants; the router holds one instance
//! of each and lends them the blackboard per call. A helper `Err` is caught
//! here and rendered as a soft error string, so a `route()` call never
//! fails the session.

use tracing::{debug, info, warn};

use crate::blackboard::{Blackboard, Role};
use crate::config::Config;
use crate::error::AppError;
use crate::frame::Frame;
use crate::helpers::{DocumentHelper, GeneralHelper, TabularHelper, WebHelper};
use crate::llm::LlmClient;

/// The closed set of helper strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    Document,
    Tabular,
    Web,
    General,
}

impl HelperKind {
    /// Parse a helper name; unrecognized names fall back to General.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "document" | "doc" | "docs" => HelperKind::Document,
            "tabular" | "table" | "data" => HelperKind::Tabular,
            "web" => HelperKind::Web,
            _ => HelperKind::General,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HelperKind::Document => "document",
            HelperKind::Tabular => "tabular",
            HelperKind::Web => "web",
            HelperKind::General => "general",
        }
    }
}

/// Message predicates checked ahead of the active-helper fallback, in
/// priority order; the first matching predicate wins. Predicates receive
/// the lowercased message.
const OVERRIDES: &[(fn(&str) -> bool, HelperKind)] = &[(is_web_request, HelperKind::Web)];

fn is_web_request(lower: &str) -> bool {
    lower.contains("fetch http") || lower.contains("scrape http")
}

pub struct Router {
    board: Blackboard,
    document: DocumentHelper,
    tabular: TabularHelper,
    web: WebHelper,
    general: GeneralHelper,
    active: Option<HelperKind>,
}

impl Router {
    pub fn new(config: &Config, llm: LlmClient) -> Result<Self, AppError> {
        let plots_dir = config.work_dir.join("plots");
        Ok(Self {
            board: Blackboard::new(),
            document: DocumentHelper::new(&config.helpers.document, llm.clone())?,
            tabular: TabularHelper::new(&config.helpers.tabular, plots_dir, llm.clone())?,
            web: WebHelper::new(&config.helpers.web, llm.clone())?,
            general: GeneralHelper::new(llm),
            active: None,
        })
    }

    pub fn board(&self) -> &Blackboard {
        &self.board
    }

    pub fn active_helper(&self) -> Option<HelperKind> {
        self.active
    }

    /// Put a document on the blackboard and make the document helper
    /// active. Overwrites silently if the id exists.
    pub fn load_document(&mut self, id: &str, text: String) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::Blackboard("document id must not be empty".into()));
        }
        self.document.ingest(id, &text)?;
        self.board.documents.insert(id.to_string(), text);
        self.active = Some(HelperKind::Document);
        info!(doc_id = %id, "document loaded");
        Ok(())
    }

    /// Put a table on the blackboard and make the tabular helper active.
    /// Overwrites silently if the id exists.
    pub fn load_table(&mut self, id: &str, frame: Frame) -> Result<(), AppError> {
        if id.trim().is_empty() {
            return Err(AppError::Blackboard("table id must not be empty".into()));
        }
        self.tabular.set_active(id);
        self.board.tables.insert(id.to_string(), frame);
        self.active = Some(HelperKind::Tabular);
        info!(table_id = %id, "table loaded");
        Ok(())
    }

    /// Explicit helper override by name; unrecognized names fall back to
    /// General.
    pub fn set_active_helper(&mut self, name: &str) -> HelperKind {
        let kind = HelperKind::parse(name);
        self.active = Some(kind);
        info!(helper = kind.name(), "active helper set");
        kind
    }

    /// Dispatch one message and return the response. Appends exactly one
    /// User entry before dispatch and one Assistant entry after; the
    /// response is whatever the selected helper produced, or a soft error
    /// string if the helper failed internally.
    pub async fn route(&mut self, message: &str) -> String {
        self.board.push(Role::User, message);

        let kind = self.select(message);
        debug!(helper = kind.name(), "dispatching message");

        let reply = match self.dispatch(kind, message).await {
            Ok(text) => text,
            Err(e) => {
                warn!(helper = kind.name(), error = %e, "helper failed; returning soft error");
                format!("The {} helper hit an internal problem: {e}", kind.name())
            }
        };

        self.board.push(Role::Assistant, reply.clone());
        reply
    }

    fn select(&self, message: &str) -> HelperKind {
        let lower = message.to_lowercase();
        for (predicate, kind) in OVERRIDES {
            if predicate(&lower) {
                return *kind;
            }
        }
        self.active.unwrap_or(HelperKind::General)
    }

    async fn dispatch(&mut self, kind: HelperKind, message: &str) -> Result<String, AppError> {
        match kind {
            HelperKind::Document => self.document.handle(message, &mut self.board).await,
            HelperKind::Tabular => self.tabular.handle(message, &mut self.board).await,
            HelperKind::Web => self.web.handle(message, &mut self.board).await,
            HelperKind::General => self.general.handle(message, &mut self.board).await,
        }
    }

    /// Clear all shared state: history, every resource map, the chunk
    /// index, and the active-helper selection.
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.board.clear();
        self.document.reset()?;
        self.tabular.reset();
        self.active = None;
        info!("session reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_helper_names() {
        assert_eq!(HelperKind::parse("document"), HelperKind::Document);
        assert_eq!(HelperKind::parse("doc"), HelperKind::Document);
        assert_eq!(HelperKind::parse("Data"), HelperKind::Tabular);
        assert_eq!(HelperKind::parse("WEB"), HelperKind::Web);
        assert_eq!(HelperKind::parse("general"), HelperKind::General);
    }

    #[test]
    fn parse_unknown_falls_back_to_general() {
        assert_eq!(HelperKind::parse("psychic"), HelperKind::General);
        assert_eq!(HelperKind::parse(""), HelperKind::General);
    }

    #[test]
    fn web_request_predicate() {
        assert!(is_web_request("please fetch http://example.com"));
        assert!(is_web_request("scrape https://example.com now"));
        assert!(!is_web_request("fetch me a coffee"));
        assert!(!is_web_request("http://example.com alone"));
    }
}
