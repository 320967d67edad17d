//! Hypothetical Document Embedding (HyDE).
//!
//! The oracle drafts a passage that would answer the query; the draft is
//! searched instead of the question. An empty draft or failed oracle call
//! searches the raw query instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use lore_core::models::StrategyKind;
use lore_core::traits::{CompletionOptions, ILlmOracle};
use lore_core::DomainTarget;

use super::{PassageSearcher, RetrievalStrategy, StrategyOutcome};
use crate::prompts;

pub struct HydeStrategy {
    searcher: Arc<PassageSearcher>,
    oracle: Arc<dyn ILlmOracle>,
    options: CompletionOptions,
}

impl HydeStrategy {
    pub fn new(
        searcher: Arc<PassageSearcher>,
        oracle: Arc<dyn ILlmOracle>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            searcher,
            oracle,
            options,
        }
    }
}

#[async_trait]
impl RetrievalStrategy for HydeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hyde
    }

    async fn run(&self, query: &str, target: &DomainTarget) -> StrategyOutcome {
        let prompt = prompts::hyde_prompt(query, target.domain);
        let draft = match self.oracle.complete(&prompt, &self.options).await {
            Ok(completion) if !completion.text.trim().is_empty() => Some(completion.text),
            Ok(_) => {
                warn!("hypothetical document was empty, using raw query");
                None
            }
            Err(e) => {
                warn!(error = %e, "hypothetical document oracle failed, using raw query");
                None
            }
        };
        let fell_back = draft.is_none();
        let search_text = draft.as_deref().unwrap_or(query);

        match self
            .searcher
            .search(search_text, &target.collection_id, StrategyKind::Hyde)
            .await
        {
            Ok(candidates) => {
                let mut outcome = StrategyOutcome::succeeded(StrategyKind::Hyde, candidates);
                outcome.fell_back = fell_back;
                outcome
            }
            Err(e) => StrategyOutcome::failed(StrategyKind::Hyde, e.to_string()),
        }
    }
}
