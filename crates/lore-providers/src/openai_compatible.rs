//! OpenAI-compatible chat completion oracle.
//!
//! Works with any endpoint speaking the `/chat/completions` protocol. Reasoning
//! traces are read from `reasoning_content` when the provider returns one, or
//! split out of inline `<think>` blocks otherwise.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use lore_core::config::OracleConfig;
use lore_core::errors::OracleError;
use lore_core::traits::{Completion, CompletionOptions, ILlmOracle};

use crate::auth::{apply_bearer, is_local_endpoint, resolve_api_key};

pub struct OpenAiCompatibleOracle {
    name: String,
    api_key: Option<String>,
    base_url: String,
    chat_path: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleOracle {
    /// Build from config. The API key comes from `config.api_key_env`; it may be
    /// absent only for local endpoints.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let api_key = resolve_api_key(&config.api_key_env);
        if api_key.is_none() && !is_local_endpoint(&base_url) {
            return Err(OracleError::ApiKeyMissing {
                provider: config.provider.clone(),
            });
        }
        Ok(Self {
            name: config.provider.clone(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn is_anthropic(&self) -> bool {
        self.name == "anthropic" || self.base_url.contains("anthropic")
    }

    fn request_body(&self, prompt: &str, options: &CompletionOptions) -> Value {
        let mut body = json!({
            "model": options.model,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(budget) = options.thinking_budget {
            if self.is_anthropic() {
                body["thinking"] = json!({ "type": "enabled", "budget_tokens": budget });
            } else {
                body["reasoning"] = json!({ "max_tokens": budget });
            }
        }
        body
    }
}

/// Extract text and reasoning trace from a chat completion response.
pub fn parse_completion(json: &Value) -> Result<Completion, OracleError> {
    let message = json["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| OracleError::MalformedResponse {
            reason: "no choices in response".to_string(),
        })?;

    let content = message["content"].as_str().unwrap_or_default();
    let (inline_thinking, text) = split_think_block(content);
    let thinking = message["reasoning_content"]
        .as_str()
        .map(str::to_string)
        .or(inline_thinking);

    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    Ok(Completion { text, thinking })
}

/// Split a leading `<think>...</think>` block from the visible answer.
pub fn split_think_block(content: &str) -> (Option<String>, String) {
    let trimmed = content.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<think>") {
        if let Some(end) = rest.find("</think>") {
            let thinking = rest[..end].trim().to_string();
            let answer = rest[end + "</think>".len()..].trim().to_string();
            return (Some(thinking).filter(|t| !t.is_empty()), answer);
        }
    }
    (None, content.trim().to_string())
}

#[async_trait]
impl ILlmOracle for OpenAiCompatibleOracle {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, OracleError> {
        let url = format!("{}{}", self.base_url, self.chat_path);
        let req = self
            .client
            .post(&url)
            .timeout(options.timeout)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt, options));
        let req = apply_bearer(req, self.api_key.as_deref());

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout {
                    timeout_ms: options.timeout.as_millis() as u64,
                }
            } else {
                OracleError::Unavailable {
                    provider: self.name.clone(),
                    reason: format!("connection failed ({url}): {e}"),
                }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), "oracle call rejected");
            return Err(OracleError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse {
                reason: e.to_string(),
            })?;
        let completion = parse_completion(&json)?;
        debug!(
            provider = %self.name,
            model = %options.model,
            chars = completion.text.len(),
            has_thinking = completion.thinking.is_some(),
            "oracle completion"
        );
        Ok(completion)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_completion() {
        let json = json!({ "choices": [{ "message": { "content": "  Use sales_orders.  " } }] });
        let completion = parse_completion(&json).unwrap();
        assert_eq!(completion.text, "Use sales_orders.");
        assert!(completion.thinking.is_none());
    }

    #[test]
    fn reasoning_content_becomes_thinking() {
        let json = json!({ "choices": [{ "message": {
            "content": "Answer", "reasoning_content": "step 1"
        } }] });
        let completion = parse_completion(&json).unwrap();
        assert_eq!(completion.thinking.as_deref(), Some("step 1"));
    }

    #[test]
    fn inline_think_block_is_split() {
        let (thinking, text) = split_think_block("<think>look at schema</think>\nThe table is x.");
        assert_eq!(thinking.as_deref(), Some("look at schema"));
        assert_eq!(text, "The table is x.");
    }

    #[test]
    fn empty_content_is_an_error() {
        let json = json!({ "choices": [{ "message": { "content": "" } }] });
        assert!(matches!(parse_completion(&json), Err(OracleError::EmptyResponse)));
        assert!(matches!(
            parse_completion(&json!({})),
            Err(OracleError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn remote_endpoint_without_key_is_rejected() {
        let config = OracleConfig {
            api_key_env: "LORE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiCompatibleOracle::from_config(&config),
            Err(OracleError::ApiKeyMissing { .. })
        ));
    }

    #[test]
    fn thinking_budget_is_forwarded() {
        let config = OracleConfig {
            base_url: "http://localhost:11434/v1".into(),
            api_key_env: "LORE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        let oracle = OpenAiCompatibleOracle::from_config(&config).unwrap();
        let options = CompletionOptions {
            model: "m".into(),
            max_tokens: 100,
            temperature: 0.2,
            thinking_budget: Some(512),
            timeout: std::time::Duration::from_secs(1),
        };
        let body = oracle.request_body("q", &options);
        assert_eq!(body["reasoning"]["max_tokens"], 512);
        assert_eq!(body["messages"][0]["content"], "q");
    }
}
