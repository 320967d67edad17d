//! OpenAI-compatible `/embeddings` client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use lore_core::config::OracleConfig;
use lore_core::errors::OracleError;
use lore_core::traits::IEmbeddingProvider;

use crate::auth::{apply_bearer, is_local_endpoint, resolve_api_key};

pub struct OpenAiEmbeddingProvider {
    api_key: Option<String>,
    url: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiEmbeddingProvider {
    /// Returns `Ok(None)` when no embedding model is configured.
    pub fn from_config(config: &OracleConfig) -> Result<Option<Self>, OracleError> {
        let Some(model) = config.embedding_model.clone() else {
            return Ok(None);
        };
        let base_url = config.base_url.trim_end_matches('/');
        let api_key = resolve_api_key(&config.api_key_env);
        if api_key.is_none() && !is_local_endpoint(base_url) {
            return Err(OracleError::ApiKeyMissing {
                provider: config.provider.clone(),
            });
        }
        Ok(Some(Self {
            api_key,
            url: format!("{base_url}/embeddings"),
            model,
            dimensions: config.embedding_dimensions,
            timeout: Duration::from_millis(config.timeout_ms),
            client: reqwest::Client::new(),
        }))
    }
}

pub fn parse_embedding(json: &Value) -> Result<Vec<f32>, OracleError> {
    let values = json["data"]
        .get(0)
        .and_then(|d| d["embedding"].as_array())
        .ok_or_else(|| OracleError::MalformedResponse {
            reason: "missing data[0].embedding".to_string(),
        })?;
    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| OracleError::MalformedResponse {
                    reason: "non-numeric embedding component".to_string(),
                })
        })
        .collect()
}

#[async_trait]
impl IEmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let req = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&json!({ "model": self.model, "input": text }));
        let resp = apply_bearer(req, self.api_key.as_deref())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    OracleError::Unavailable {
                        provider: "embeddings".to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(OracleError::Http {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let json: Value = resp
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse {
                reason: e.to_string(),
            })?;
        parse_embedding(&json)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_embedding() {
        let json = json!({ "data": [{ "embedding": [0.5, -1.0, 2] }] });
        assert_eq!(parse_embedding(&json).unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn unconfigured_model_yields_none() {
        let config = OracleConfig::default();
        assert!(OpenAiEmbeddingProvider::from_config(&config).unwrap().is_none());
    }
}
