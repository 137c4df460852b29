//! Document chunking for the retrieval index.
//!
//! Chunks are size-bounded with configurable overlap between consecutive
//! chunks, so a passage split across a boundary still appears whole in one
//! of its neighbours.

use text_splitter::{ChunkConfig, TextSplitter};

use crate::error::AppError;

/// A chunk plus its byte offset within the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub position: usize,
}

/// Split `text` into chunks of at most `max_chars` characters with
/// `overlap` characters shared between consecutive chunks.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Result<Vec<TextChunk>, AppError> {
    let config = ChunkConfig::new(max_chars)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("chunker: invalid overlap: {e}")))?;
    let splitter = TextSplitter::new(config);

    Ok(splitter
        .chunk_indices(text)
        .map(|(position, chunk)| TextChunk {
            text: chunk.to_string(),
            position,
        })
        .filter(|c| !c.text.trim().is_empty())
        .collect())
}
