use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Client for an OpenAI-compatible endpoint serving `/v1/chat/completions`
/// and `/v1/embeddings`. Covers both the language-generation service and the
/// embedding service behind one base URL.
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        let mut builder = self.client.get(&url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        match builder.send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
            if let Some(s) = request.stop {
                obj.insert("stop".to_string(), json!(s));
            }
        }

        let res = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("chat completion error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ApiError::Internal("chat completion response missing content".to_string())
            })?;

        Ok(content.to_string())
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let res = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("embedding error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        let data = payload["data"].as_array().ok_or_else(|| {
            ApiError::Internal("embedding response missing data array".to_string())
        })?;

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            let vals = item["embedding"].as_array().ok_or_else(|| {
                ApiError::Internal("embedding response missing vector".to_string())
            })?;
            let vec: Vec<f32> = vals
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            embeddings.push(vec);
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Internal(format!(
                "embedding count mismatch: {} inputs, {} vectors",
                inputs.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}
