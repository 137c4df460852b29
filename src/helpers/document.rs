//! Document helper: Q&A over the active loaded document.
//!
//! Two mutually exclusive strategies, selected at startup:
//!
//! - **full-text** (default): the entire document rides along in the prompt
//!   and the completion client answers.
//! - **retrieval**: documents are chunked and indexed at load time; a query
//!   returns the concatenated top-K matching chunks as the response
//!   context, with no completion call at all.

use tracing::debug;

use crate::blackboard::Blackboard;
use crate::config::DocumentConfig;
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::retrieval::{ChunkIndex, chunk_text};

/// Soft reply when no document has been loaded yet.
pub const NO_DOCUMENT_HINT: &str = "No document is currently loaded. Load one with :load <path>.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentMode {
    FullText,
    Retrieval,
}

impl DocumentMode {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name {
            "full-text" => Ok(DocumentMode::FullText),
            "retrieval" => Ok(DocumentMode::Retrieval),
            other => Err(AppError::Config(format!(
                "helpers.document: unknown mode '{other}' (expected 'full-text' or 'retrieval')"
            ))),
        }
    }
}

pub struct DocumentHelper {
    mode: DocumentMode,
    llm: LlmClient,
    index: ChunkIndex,
    active_doc: Option<String>,
    top_k: usize,
    chunk_max_chars: usize,
    chunk_overlap: usize,
}

impl DocumentHelper {
    pub fn new(config: &DocumentConfig, llm: LlmClient) -> Result<Self, AppError> {
        Ok(Self {
            mode: DocumentMode::parse(&config.mode)?,
            llm,
            index: ChunkIndex::open_in_memory()?,
            active_doc: None,
            top_k: config.top_k,
            chunk_max_chars: config.chunk_max_chars,
            chunk_overlap: config.chunk_overlap,
        })
    }

    pub fn mode(&self) -> DocumentMode {
        self.mode
    }

    pub fn active_doc(&self) -> Option<&str> {
        self.active_doc.as_deref()
    }

    /// Called by the router when a document is loaded: marks it active and,
    /// in retrieval mode, chunks and indexes it.
    pub fn ingest(&mut self, doc_id: &str, text: &str) -> Result<(), AppError> {
        if self.mode == DocumentMode::Retrieval {
            let chunks = chunk_text(text, self.chunk_max_chars, self.chunk_overlap)?;
            self.index.index(doc_id, text, &chunks)?;
        }
        self.active_doc = Some(doc_id.to_string());
        Ok(())
    }

    pub async fn handle(&mut self, message: &str, board: &mut Blackboard) -> Result<String, AppError> {
        debug!(mode = ?self.mode, active = ?self.active_doc, "document helper handling message");

        let Some(doc_id) = self.active_doc.clone() else {
            return Ok(NO_DOCUMENT_HINT.to_string());
        };
        let Some(text) = board.documents.get(&doc_id) else {
            return Ok(format!("Document '{doc_id}' is no longer on the blackboard."));
        };

        match self.mode {
            DocumentMode::FullText => {
                let prompt = format!(
                    "{}\n\nDocument content:\n{text}\n\nUser's query: {message}\n",
                    board.flatten_history()
                );
                Ok(self.llm.complete_soft(&prompt, None).await)
            }
            DocumentMode::Retrieval => {
                let results = self.index.search(message, self.top_k)?;
                if results.is_empty() {
                    return Ok(format!("No passages in '{doc_id}' matched your query."));
                }
                let mut out = format!("Relevant passages from '{doc_id}':\n");
                for result in results {
                    out.push_str("\n---\n");
                    out.push_str(&result.text);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }

    /// Forget the active document and drop everything indexed.
    pub fn reset(&mut self) -> Result<(), AppError> {
        self.active_doc = None;
        self.index.clear()
    }
}
