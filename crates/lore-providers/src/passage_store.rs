//! HTTP passage store and knowledge ingestor.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /collections/{id}/search` with `{ "query" | "vector", "k" }` returns `{ "hits": [...] }`
//! - `POST /collections/{id}/ingest` with `{ "documents": [...] }` returns `{ "job_id": "..." }`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use lore_core::config::PassageStoreConfig;
use lore_core::errors::PassageStoreError;
use lore_core::models::CorrectionDocument;
use lore_core::traits::{IKnowledgeIngestor, IPassageStore, PassageHit, SearchInput};

use crate::auth::{apply_bearer, resolve_api_key};

pub struct HttpPassageStore {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<PassageHit>,
}

#[derive(Deserialize)]
struct IngestResponse {
    job_id: String,
}

impl HttpPassageStore {
    pub fn from_config(config: &PassageStoreConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: resolve_api_key(&config.api_key_env),
            timeout: Duration::from_millis(config.timeout_ms),
            client: reqwest::Client::new(),
        }
    }

    fn collection_url(&self, collection_id: &str, action: &str) -> String {
        format!("{}/collections/{}/{}", self.base_url, collection_id, action)
    }

    async fn post(
        &self,
        collection_id: &str,
        action: &str,
        body: &Value,
    ) -> Result<reqwest::Response, PassageStoreError> {
        let req = self
            .client
            .post(self.collection_url(collection_id, action))
            .timeout(self.timeout)
            .json(body);
        let resp = apply_bearer(req, self.api_key.as_deref())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PassageStoreError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    PassageStoreError::Unavailable {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PassageStoreError::CollectionNotFound {
                collection: collection_id.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match action {
                "ingest" if status.is_client_error() => PassageStoreError::IngestionRejected {
                    collection: collection_id.to_string(),
                    reason: body,
                },
                _ => PassageStoreError::Unavailable {
                    reason: format!("HTTP {status}: {body}"),
                },
            });
        }
        Ok(resp)
    }
}

pub fn search_body(input: &SearchInput, k: usize) -> Value {
    match input {
        SearchInput::Text(text) => json!({ "query": text, "k": k }),
        SearchInput::Embedding(vector) => json!({ "vector": vector, "k": k }),
    }
}

#[async_trait]
impl IPassageStore for HttpPassageStore {
    async fn search(
        &self,
        input: &SearchInput,
        collection_id: &str,
        k: usize,
    ) -> Result<Vec<PassageHit>, PassageStoreError> {
        let resp = self
            .post(collection_id, "search", &search_body(input, k))
            .await?;
        let parsed: SearchResponse =
            resp.json()
                .await
                .map_err(|e| PassageStoreError::MalformedResponse {
                    reason: e.to_string(),
                })?;
        debug!(collection = collection_id, hits = parsed.hits.len(), "passage search");
        Ok(parsed.hits.into_iter().take(k).collect())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[async_trait]
impl IKnowledgeIngestor for HttpPassageStore {
    async fn submit(
        &self,
        collection_id: &str,
        documents: &[CorrectionDocument],
    ) -> Result<String, PassageStoreError> {
        let resp = self
            .post(collection_id, "ingest", &json!({ "documents": documents }))
            .await?;
        let parsed: IngestResponse =
            resp.json()
                .await
                .map_err(|e| PassageStoreError::MalformedResponse {
                    reason: e.to_string(),
                })?;
        Ok(parsed.job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_body_carries_text_or_vector() {
        let body = search_body(&SearchInput::Text("orders".into()), 5);
        assert_eq!(body["query"], "orders");
        assert_eq!(body["k"], 5);

        let body = search_body(&SearchInput::Embedding(vec![0.5]), 3);
        assert_eq!(body["vector"][0], 0.5);
    }

    #[test]
    fn collection_urls_are_scoped() {
        let store = HttpPassageStore::from_config(&PassageStoreConfig {
            base_url: "http://localhost:8080/".into(),
            ..Default::default()
        });
        assert_eq!(
            store.collection_url("support-kb", "search"),
            "http://localhost:8080/collections/support-kb/search"
        );
    }
}
