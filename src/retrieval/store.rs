//! VectorStore trait — abstract interface over the vector index.
//!
//! The in-process implementation is `MemoryVectorStore`; the trait is the
//! seam where a persistent backend would be slotted in.

use async_trait::async_trait;

use crate::core::errors::ApiError;

/// One embedded chunk of a catalog document.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    /// Source catalog row.
    pub doc_id: usize,
    /// Chunk position within the source document.
    pub chunk_index: usize,
    /// The synthesized text that was embedded.
    pub text: String,
}

/// A chunk hit with its similarity score (higher = more relevant). The score
/// is an opaque ordinal signal, not normalized to any fixed range.
#[derive(Debug, Clone)]
pub struct ChunkHit {
    pub chunk: StoredChunk,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embedding vectors.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// All chunks scored against the query embedding, best first. Ties keep
    /// insertion order. `limit` bounds the result length.
    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ChunkHit>, ApiError>;

    /// Total stored chunk count.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Drop all stored chunks (index rebuild).
    async fn clear(&self) -> Result<(), ApiError>;
}
