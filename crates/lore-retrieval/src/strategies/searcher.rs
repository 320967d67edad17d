use std::sync::Arc;

use tracing::warn;

use lore_core::errors::PassageStoreError;
use lore_core::models::{RetrievalCandidate, StrategyKind};
use lore_core::traits::{IEmbeddingProvider, IPassageStore, SearchInput};

/// Embeds (when an embedder is configured) and searches one collection.
pub struct PassageSearcher {
    store: Arc<dyn IPassageStore>,
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    k: usize,
}

impl PassageSearcher {
    pub fn new(store: Arc<dyn IPassageStore>, k: usize) -> Self {
        Self {
            store,
            embedder: None,
            k,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Search `collection_id` for `text`. A failed embedding falls back to text search.
    pub async fn search(
        &self,
        text: &str,
        collection_id: &str,
        strategy: StrategyKind,
    ) -> Result<Vec<RetrievalCandidate>, PassageStoreError> {
        let input = match &self.embedder {
            Some(embedder) => match embedder.embed(text).await {
                Ok(vector) => SearchInput::Embedding(vector),
                Err(e) => {
                    warn!(strategy = %strategy, error = %e, "embedding failed, searching by text");
                    SearchInput::Text(text.to_string())
                }
            },
            None => SearchInput::Text(text.to_string()),
        };

        let hits = self.store.search(&input, collection_id, self.k).await?;
        Ok(hits
            .into_iter()
            .map(|hit| {
                let passage = hit.passage_ref();
                RetrievalCandidate::new(passage, hit.text, hit.score, strategy)
            })
            .collect())
    }
}
