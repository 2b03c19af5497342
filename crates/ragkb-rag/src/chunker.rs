//! Token-windowed document chunking with overlap

use std::ops::Range;
use std::sync::Arc;
use uuid::Uuid;

use ragkb_core::{Chunk, ChunkMetadata, ChunkingConfig, Document, Result};

use crate::tokenizer::{Cl100kTokenizer, Tokenizer};

/// Token ranges of the windows covering `token_count` tokens
///
/// Windows are `chunk_size` long and start `chunk_size - overlap` apart; the
/// last one may be shorter. The caller must have validated `overlap < chunk_size`.
pub fn token_windows(token_count: usize, chunk_size: usize, overlap: usize) -> Vec<Range<usize>> {
    debug_assert!(overlap < chunk_size);

    if token_count <= chunk_size {
        return vec![0..token_count];
    }

    let step = chunk_size - overlap;
    let mut windows = Vec::with_capacity(token_count / step + 1);
    let mut start = 0;

    while start < token_count {
        let end = (start + chunk_size).min(token_count);
        windows.push(start..end);
        start += step;
    }

    windows
}

/// Splits documents into overlapping, token-bounded chunks
pub struct TextChunker {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TextChunker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Chunker backed by the `cl100k_base` encoding
    pub fn cl100k() -> Result<Self> {
        Ok(Self::new(Arc::new(Cl100kTokenizer::new()?)))
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Split `text` into segments of at most `chunk_size` tokens
    ///
    /// Text that already fits is returned unchanged as a single segment.
    pub fn chunk_text(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
        ChunkingConfig { chunk_size, overlap }.validate()?;

        let tokens = self.tokenizer.encode(text);
        if tokens.len() <= chunk_size {
            return Ok(vec![text.to_string()]);
        }

        token_windows(tokens.len(), chunk_size, overlap)
            .into_iter()
            .map(|window| self.tokenizer.decode(&tokens[window]))
            .collect()
    }

    /// Chunk every document, document-major and segment-minor
    pub fn chunk_documents(
        &self,
        documents: &[Document],
        chunk_size: usize,
        overlap: usize,
    ) -> Result<Vec<Chunk>> {
        ChunkingConfig { chunk_size, overlap }.validate()?;

        let mut all_chunks = Vec::new();

        for document in documents {
            let segments = self.chunk_text(&document.content, chunk_size, overlap)?;
            let total_chunks = segments.len();

            tracing::debug!(
                source = %document.source,
                chunks = total_chunks,
                "Chunked document"
            );

            all_chunks.extend(segments.into_iter().enumerate().map(|(chunk_index, text)| Chunk {
                chunk_id: Uuid::new_v4().to_string(),
                text,
                source: document.source.clone(),
                metadata: ChunkMetadata {
                    doc_type: document.doc_type,
                    chunk_index,
                    total_chunks,
                },
            }));
        }

        Ok(all_chunks)
    }
}
