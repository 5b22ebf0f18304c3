//! In-memory vector store: brute-force cosine similarity over all stored
//! vectors. Built once at startup and shared read-only across sessions.

use std::sync::RwLock;

use async_trait::async_trait;

use super::store::{ChunkHit, StoredChunk, VectorStore};
use crate::core::errors::ApiError;

#[derive(Default)]
pub struct MemoryVectorStore {
    entries: RwLock<Vec<(StoredChunk, Vec<f32>)>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError> {
        let mut entries = self.entries.write().map_err(|e| ApiError::internal(&e))?;
        entries.extend(items);
        Ok(())
    }

    async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ChunkHit>, ApiError> {
        let entries = self.entries.read().map_err(|e| ApiError::internal(&e))?;

        let mut hits: Vec<ChunkHit> = entries
            .iter()
            .map(|(chunk, vector)| ChunkHit {
                chunk: chunk.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();

        // Stable sort keeps insertion (document) order for equal scores.
        hits.sort_by(|left, right| {
            right
                .score
                .partial_cmp(&left.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let entries = self.entries.read().map_err(|e| ApiError::internal(&e))?;
        Ok(entries.len())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        let mut entries = self.entries.write().map_err(|e| ApiError::internal(&e))?;
        entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    fn chunk(doc_id: usize, text: &str) -> StoredChunk {
        StoredChunk {
            doc_id,
            chunk_index: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = [1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(cosine_similarity(&vec, &vec), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn cosine_handles_mismatched_lengths() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0));
    }

    #[tokio::test]
    async fn search_returns_highest_similarity_first() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(vec![
                (chunk(0, "a"), vec![0.8, 0.2]),
                (chunk(1, "b"), vec![0.1, 0.9]),
                (chunk(2, "c"), vec![0.9, 0.0]),
            ])
            .await
            .expect("insert should work");

        let hits = store.search(&[1.0, 0.0], 10).await.expect("search");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk.doc_id, 2);
        assert_eq!(hits[2].chunk.doc_id, 1);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(vec![
                (chunk(0, "a"), vec![1.0, 0.0]),
                (chunk(1, "b"), vec![2.0, 0.0]),
                (chunk(2, "c"), vec![0.0, 1.0]),
            ])
            .await
            .expect("insert should work");

        // doc 0 and doc 1 both score 1.0 against the query.
        let hits = store.search(&[1.0, 0.0], 10).await.expect("search");
        assert_eq!(hits[0].chunk.doc_id, 0);
        assert_eq!(hits[1].chunk.doc_id, 1);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(vec![
                (chunk(0, "a"), vec![1.0, 0.0]),
                (chunk(1, "b"), vec![0.5, 0.5]),
            ])
            .await
            .expect("insert should work");

        let hits = store.search(&[1.0, 0.0], 1).await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(store.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = MemoryVectorStore::new();
        store
            .insert_batch(vec![(chunk(0, "a"), vec![1.0])])
            .await
            .expect("insert should work");
        store.clear().await.expect("clear");
        assert_eq!(store.count().await.expect("count"), 0);
    }
}
