//! Retrieval ranker: free-text query → top-k catalog documents.

use std::sync::Arc;

use serde::Serialize;

use super::store::VectorStore;
use crate::catalog::CatalogDocument;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

/// A catalog document with its relevance score. The score is an opaque
/// relative ranking signal; callers present it as a free-form "relevance"
/// field and must not assume any fixed range.
#[derive(Debug, Clone, Serialize)]
pub struct RankedDocument {
    #[serde(flatten)]
    pub document: CatalogDocument,
    pub score: f32,
}

pub struct Ranker {
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmProvider>,
    documents: Arc<Vec<CatalogDocument>>,
    embedding_model: String,
}

impl Ranker {
    pub fn new(
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmProvider>,
        documents: Arc<Vec<CatalogDocument>>,
        embedding_model: String,
    ) -> Self {
        Self {
            store,
            llm,
            documents,
            embedding_model,
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Top-k documents for the query, best first, at most `k` results.
    ///
    /// An empty index yields an empty result, not an error; `k` larger than
    /// the index yields every document. A document split into several chunks
    /// appears once, keeping its best chunk score; ties keep original
    /// document order.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RankedDocument>, ApiError> {
        if k == 0 || self.store.count().await? == 0 {
            return Ok(Vec::new());
        }

        let vectors = self
            .llm
            .embed(&[query.to_string()], &self.embedding_model)
            .await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding service returned no vector".to_string()))?;

        // Rank every chunk, then collapse chunk hits onto their source
        // document. Hits arrive best-first, so the first hit per document
        // carries its best chunk score.
        let hits = self.store.search(&query_vector, usize::MAX).await?;

        let mut seen = std::collections::HashSet::new();
        let mut ranked = Vec::with_capacity(k.min(self.documents.len()));
        for hit in hits {
            if !seen.insert(hit.chunk.doc_id) {
                continue;
            }
            let Some(document) = self.documents.get(hit.chunk.doc_id) else {
                tracing::warn!("stored chunk references unknown document {}", hit.chunk.doc_id);
                continue;
            };
            ranked.push(RankedDocument {
                document: document.clone(),
                score: hit.score,
            });
            if ranked.len() == k {
                break;
            }
        }

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::memory::MemoryVectorStore;
    use crate::retrieval::store::StoredChunk;
    use async_trait::async_trait;
    use crate::llm::types::ChatRequest;

    /// Embeds text onto a fixed axis per keyword so similarity is
    /// deterministic in tests.
    struct KeywordEmbedder;

    fn keyword_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        vec![
            if lower.contains("guitar") { 1.0 } else { 0.0 },
            if lower.contains("drum") { 1.0 } else { 0.0 },
            if lower.contains("piano") { 1.0 } else { 0.0 },
            0.1,
        ]
    }

    #[async_trait]
    impl LlmProvider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword-test"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            Err(ApiError::Internal("chat not scripted".to_string()))
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|text| keyword_vector(text)).collect())
        }
    }

    fn document(id: usize, title: &str) -> CatalogDocument {
        CatalogDocument {
            id,
            category: "Instruments".to_string(),
            title: title.to_string(),
            price: 100.0 + id as f64,
            rating: Some(4.0),
            description: String::new(),
        }
    }

    async fn build_ranker(titles: &[&str]) -> Ranker {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let llm: Arc<dyn LlmProvider> = Arc::new(KeywordEmbedder);
        let documents: Vec<CatalogDocument> = titles
            .iter()
            .enumerate()
            .map(|(id, title)| document(id, title))
            .collect();

        let items = documents
            .iter()
            .map(|doc| {
                (
                    StoredChunk {
                        doc_id: doc.id,
                        chunk_index: 0,
                        text: doc.title.clone(),
                    },
                    keyword_vector(&doc.title),
                )
            })
            .collect();
        store.insert_batch(items).await.expect("insert");

        Ranker::new(store, llm, Arc::new(documents), "test-embed".to_string())
    }

    #[tokio::test]
    async fn returns_exactly_k_results_sorted_descending() {
        let ranker = build_ranker(&["Guitar A", "Guitar B", "Drum Kit", "Piano"]).await;
        let results = ranker.search("best guitar", 2).await.expect("search");

        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert!(results[0].document.title.contains("Guitar"));
    }

    #[tokio::test]
    async fn k_larger_than_index_returns_all_documents() {
        let ranker = build_ranker(&["Guitar A", "Drum Kit"]).await;
        let results = ranker.search("guitar", 50).await.expect("search");
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_sequence() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let llm: Arc<dyn LlmProvider> = Arc::new(KeywordEmbedder);
        let ranker = Ranker::new(store, llm, Arc::new(Vec::new()), "test-embed".to_string());

        let results = ranker.search("anything", 5).await.expect("search");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn chunked_document_appears_once_with_best_score() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let llm: Arc<dyn LlmProvider> = Arc::new(KeywordEmbedder);
        let documents = vec![document(0, "Guitar A")];

        store
            .insert_batch(vec![
                (
                    StoredChunk {
                        doc_id: 0,
                        chunk_index: 0,
                        text: "guitar".to_string(),
                    },
                    keyword_vector("guitar"),
                ),
                (
                    StoredChunk {
                        doc_id: 0,
                        chunk_index: 1,
                        text: "unrelated".to_string(),
                    },
                    keyword_vector("unrelated"),
                ),
            ])
            .await
            .expect("insert");

        let ranker = Ranker::new(store, llm, Arc::new(documents), "test-embed".to_string());
        let results = ranker.search("guitar", 5).await.expect("search");

        assert_eq!(results.len(), 1);
        let best = keyword_vector("guitar");
        let query = keyword_vector("guitar");
        let expected: f32 = {
            let dot: f32 = best.iter().zip(&query).map(|(a, b)| a * b).sum();
            let norm: f32 = best.iter().map(|x| x * x).sum::<f32>().sqrt();
            dot / (norm * norm)
        };
        assert!((results[0].score - expected).abs() < 1e-5);
    }

    #[tokio::test]
    async fn zero_k_returns_empty() {
        let ranker = build_ranker(&["Guitar A"]).await;
        let results = ranker.search("guitar", 0).await.expect("search");
        assert!(results.is_empty());
    }
}
