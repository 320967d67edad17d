use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::OracleError;

/// Per-call model selection and budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// When set, ask the model for a reasoning trace with this token budget.
    pub thinking_budget: Option<u32>,
    pub timeout: Duration,
}

/// Text (and optional reasoning trace) returned by the oracle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub thinking: Option<String>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thinking: None,
        }
    }
}

/// LLM completion oracle used for expansion, HyDE, reranking, and synthesis.
#[async_trait]
pub trait ILlmOracle: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, OracleError>;

    fn name(&self) -> &str;
}

/// Optional embedding oracle. Without one, strategies search with raw text.
#[async_trait]
pub trait IEmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError>;

    fn dimensions(&self) -> usize;
}
