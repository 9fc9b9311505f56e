//! Reqwest-backed rerank client.
//!
//! Speaks the wire shape shared by the common rerank APIs: a JSON body of
//! `{ model, query, documents }` answered by a `results` (or `data`) array
//! of `{ index, relevance_score | score }` items. Scores are re-aligned by
//! index so the output vector always matches the input document order.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use async_trait::async_trait;

use super::RerankBackend;
use crate::error::AgentError;

/// Configuration for [`HttpReranker`].
#[derive(Debug, Clone)]
pub struct HttpRerankerConfig {
    /// Base URL of the rerank endpoint, e.g. `https://api.example.com/v1/rerank`.
    pub url: String,
    /// Bearer token, when the endpoint requires one.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Rerank backend calling an HTTP rerank service.
#[derive(Debug)]
pub struct HttpReranker {
    client: Client,
    config: HttpRerankerConfig,
}

impl HttpReranker {
    /// Creates the client.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when the HTTP client cannot be built.
    pub fn new(config: HttpRerankerConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config {
                message: format!("failed to build rerank HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl RerankBackend for HttpReranker {
    fn provider(&self) -> &str {
        "http_rerank"
    }

    async fn score(
        &self,
        model: &str,
        query: &str,
        docs: &[String],
    ) -> Result<Vec<f32>, AgentError> {
        let body = serde_json::json!({
            "model": model,
            "query": query,
            "documents": docs,
        });

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AgentError::backend("http_rerank", e.to_string()))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| AgentError::backend("http_rerank", e.to_string()))?;

        parse_rerank_response(&json, docs.len())
    }
}

/// Extracts index-aligned scores from a rerank response. Items the service
/// omits keep a `0.0` score.
fn parse_rerank_response(json: &Value, doc_count: usize) -> Result<Vec<f32>, AgentError> {
    let results = json
        .get("results")
        .or_else(|| json.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AgentError::backend("http_rerank", "response is missing results array")
        })?;

    let mut scores = vec![0.0f32; doc_count];
    for item in results {
        let index = item
            .get("index")
            .and_then(Value::as_u64)
            .ok_or_else(|| AgentError::backend("http_rerank", "result missing index"))?
            as usize;
        let score = item
            .get("relevance_score")
            .or_else(|| item.get("score"))
            .and_then(Value::as_f64)
            .ok_or_else(|| AgentError::backend("http_rerank", "result missing score"))?;
        if index < scores.len() {
            scores[index] = score as f32;
        }
    }
    Ok(scores)
}
