//! Catalog index build: per-row document synthesis, chunking, embedding.

use std::sync::Arc;

use super::CatalogDocument;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;
use crate::retrieval::store::{StoredChunk, VectorStore};

/// How many chunk texts go into one embedding request.
const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
}

/// Builds the searchable catalog index: synthesizes one text per product,
/// splits overlength texts into chunks, embeds each chunk, and stores
/// (chunk, vector, source row) in the vector store.
pub struct CatalogIndexer {
    chunk_size: usize,
}

impl CatalogIndexer {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub async fn build(
        &self,
        documents: &[CatalogDocument],
        llm: &Arc<dyn LlmProvider>,
        store: &Arc<dyn VectorStore>,
        embedding_model: &str,
    ) -> Result<IndexStats, ApiError> {
        let mut chunks = Vec::new();
        for doc in documents {
            let text = document_text(doc);
            for (chunk_index, chunk_text) in
                split_into_chunks(&text, self.chunk_size).into_iter().enumerate()
            {
                chunks.push(StoredChunk {
                    doc_id: doc.id,
                    chunk_index,
                    text: chunk_text,
                });
            }
        }

        let total_chunks = chunks.len();
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = llm.embed(&texts, embedding_model).await?;
            let items = batch.iter().cloned().zip(vectors).collect();
            store.insert_batch(items).await?;
        }

        let stats = IndexStats {
            documents: documents.len(),
            chunks: total_chunks,
        };
        tracing::info!(
            "catalog index built: {} documents, {} chunks",
            stats.documents,
            stats.chunks
        );
        Ok(stats)
    }
}

/// Fixed synthesis template for the embedded document text. An absent rating
/// renders as `N/A`.
pub fn document_text(doc: &CatalogDocument) -> String {
    let rating = doc
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "Category: {} | Product: {} | Rating: {} stars | Description: {}",
        doc.category, doc.title, rating, doc.description
    )
}

/// Split text into chunks of at most `chunk_size` characters, no overlap,
/// preferring a sentence boundary when a cut falls mid-text.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        let window: String = chars[start..end].iter().collect();

        let piece = if end < total {
            cut_at_sentence_boundary(&window)
        } else {
            window
        };
        // Advance by what was actually kept so no text is skipped.
        let advance = piece.chars().count().max(1);
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start += advance;
    }

    chunks
}

/// Look for a sentence ending in the last 20% of the window; keep everything
/// up to it. Falls back to the whole window.
fn cut_at_sentence_boundary(window: &str) -> String {
    let endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let search_start = window
        .char_indices()
        .nth((window.chars().count() * 80) / 100)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let tail = &window[search_start..];

    for ending in endings {
        if let Some(pos) = tail.rfind(ending) {
            let cut = search_start + pos + ending.len();
            return window[..cut].to_string();
        }
    }

    window.to_string()
}
