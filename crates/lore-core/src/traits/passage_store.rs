use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PassageStoreError;
use crate::models::{CorrectionDocument, PassageRef};

/// What to search with: raw text (the store embeds it) or a precomputed vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchInput {
    Text(String),
    Embedding(Vec<f32>),
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageHit {
    pub passage_id: String,
    pub text: String,
    pub score: f64,
    #[serde(default)]
    pub source_uri: Option<String>,
    #[serde(default)]
    pub chunk_id: Option<String>,
}

impl PassageHit {
    pub fn passage_ref(&self) -> PassageRef {
        PassageRef {
            passage_id: self.passage_id.clone(),
            source_uri: self.source_uri.clone(),
            chunk_id: self.chunk_id.clone(),
        }
    }
}

/// External vector-indexed corpus with per-domain collections.
#[async_trait]
pub trait IPassageStore: Send + Sync {
    /// Return up to `k` passages nearest to `input` in `collection_id`.
    async fn search(
        &self,
        input: &SearchInput,
        collection_id: &str,
        k: usize,
    ) -> Result<Vec<PassageHit>, PassageStoreError>;

    /// Human-readable store name.
    fn name(&self) -> &str;
}

/// Accepts corrected documentation for asynchronous ingestion into a collection.
#[async_trait]
pub trait IKnowledgeIngestor: Send + Sync {
    /// Start an ingestion job and return its identifier.
    async fn submit(
        &self,
        collection_id: &str,
        documents: &[CorrectionDocument],
    ) -> Result<String, PassageStoreError>;
}
