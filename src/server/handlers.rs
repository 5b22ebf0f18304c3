use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

const MAX_SEARCH_K: usize = 50;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "documents": state.document_count,
    }))
}

/// One user utterance in, one assistant reply out. The per-session lock
/// serializes turns: a session processes exactly one utterance at a time.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let session_id = payload
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let session = state.session(&session_id)?;
    let mut orchestrator = session.lock().await;
    let reply = orchestrator.handle(&message).await;

    Ok(Json(json!({
        "session_id": session_id,
        "reply": reply,
    })))
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .existing_session(&session_id)?
        .ok_or_else(|| ApiError::NotFound(format!("unknown session: {}", session_id)))?;

    let mut orchestrator = session.lock().await;
    orchestrator.reset();

    Ok(Json(json!({ "status": "reset" })))
}

pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .existing_session(&session_id)?
        .ok_or_else(|| ApiError::NotFound(format!("unknown session: {}", session_id)))?;

    let orchestrator = session.lock().await;
    let turns = orchestrator.transcript().turns().to_vec();

    Ok(Json(json!({ "session_id": session_id, "turns": turns })))
}

/// Direct retrieval endpoint; the relevance score is a free-form ranking
/// signal, not a normalized value.
pub async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    let k = params
        .k
        .unwrap_or(state.settings.catalog.top_k)
        .min(MAX_SEARCH_K);

    let results = state.ranker.search(query, k).await?;
    Ok(Json(json!({ "results": results })))
}
