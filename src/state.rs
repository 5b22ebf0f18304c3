use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use crate::agent::Orchestrator;
use crate::catalog::{load_catalog, CatalogIndexer};
use crate::core::errors::ApiError;
use crate::core::settings::Settings;
use crate::llm::openai::OpenAiCompatProvider;
use crate::llm::LlmProvider;
use crate::orders::OrderApiClient;
use crate::retrieval::{MemoryVectorStore, Ranker, VectorStore};
use crate::tools::{GetOrderTool, GetOrdersByPriorityTool, SearchProductsTool, Tool, ToolRegistry};

/// Global application state shared across all routes.
///
/// The catalog index is built once here and shared read-only; each session
/// owns its orchestrator (and with it the transcript) behind a per-session
/// async mutex so only one turn per session is in flight at a time.
pub struct AppState {
    pub settings: Settings,
    pub llm: Arc<dyn LlmProvider>,
    pub ranker: Arc<Ranker>,
    pub registry: Arc<ToolRegistry>,
    pub document_count: usize,
    sessions: Mutex<HashMap<String, Arc<AsyncMutex<Orchestrator>>>>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> Result<Arc<Self>, ApiError> {
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatProvider::new(
            settings.llm.base_url.clone(),
            settings.llm.api_key.clone(),
        ));

        let documents = Arc::new(load_catalog(&settings.catalog.csv_path)?);
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let indexer = CatalogIndexer::new(settings.catalog.chunk_size);
        indexer
            .build(&documents, &llm, &store, &settings.llm.embedding_model)
            .await?;

        let ranker = Arc::new(Ranker::new(
            store,
            llm.clone(),
            documents.clone(),
            settings.llm.embedding_model.clone(),
        ));

        let order_client = Arc::new(OrderApiClient::new(settings.order_api.base_url.clone()));
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(SearchProductsTool::new(ranker.clone())),
            Arc::new(GetOrderTool::new(order_client.clone())),
            Arc::new(GetOrdersByPriorityTool::new(order_client)),
        ];
        let registry = Arc::new(ToolRegistry::new(tools));

        Ok(Arc::new(AppState {
            document_count: documents.len(),
            settings,
            llm,
            ranker,
            registry,
            sessions: Mutex::new(HashMap::new()),
        }))
    }

    /// Get or create the session's orchestrator.
    pub fn session(&self, session_id: &str) -> Result<Arc<AsyncMutex<Orchestrator>>, ApiError> {
        let mut sessions = self.sessions.lock().map_err(|e| ApiError::internal(&e))?;
        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            Arc::new(AsyncMutex::new(Orchestrator::new(
                self.llm.clone(),
                self.registry.clone(),
                self.settings.llm.chat_model.clone(),
                self.settings.llm.temperature,
            )))
        });
        Ok(entry.clone())
    }

    /// Look up an existing session without creating one.
    pub fn existing_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Arc<AsyncMutex<Orchestrator>>>, ApiError> {
        let sessions = self.sessions.lock().map_err(|e| ApiError::internal(&e))?;
        Ok(sessions.get(session_id).cloned())
    }
}
