use std::sync::Arc;

use async_trait::async_trait;

use lore_core::models::StrategyKind;
use lore_core::DomainTarget;

use super::{PassageSearcher, RetrievalStrategy, StrategyOutcome};

/// Search with the query exactly as asked.
pub struct StandardStrategy {
    searcher: Arc<PassageSearcher>,
}

impl StandardStrategy {
    pub fn new(searcher: Arc<PassageSearcher>) -> Self {
        Self { searcher }
    }
}

#[async_trait]
impl RetrievalStrategy for StandardStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Standard
    }

    async fn run(&self, query: &str, target: &DomainTarget) -> StrategyOutcome {
        match self
            .searcher
            .search(query, &target.collection_id, StrategyKind::Standard)
            .await
        {
            Ok(candidates) => StrategyOutcome::succeeded(StrategyKind::Standard, candidates),
            Err(e) => StrategyOutcome::failed(StrategyKind::Standard, e.to_string()),
        }
    }
}
