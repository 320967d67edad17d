//! Query expansion: ask the oracle for alternative phrasings, search each, union.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use lore_core::constants::{MAX_EXPANSION_QUERIES, MIN_EXPANSION_QUERIES};
use lore_core::models::StrategyKind;
use lore_core::traits::{CompletionOptions, ILlmOracle};
use lore_core::DomainTarget;

use super::{PassageSearcher, RetrievalStrategy, StrategyOutcome};
use crate::prompts;
use crate::search::merge::merge_lists;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[.):-]|[-*•])\s*").unwrap());

pub struct ExpansionStrategy {
    searcher: Arc<PassageSearcher>,
    oracle: Arc<dyn ILlmOracle>,
    options: CompletionOptions,
    count: usize,
}

impl ExpansionStrategy {
    /// `count` is clamped to the supported phrasing range.
    pub fn new(
        searcher: Arc<PassageSearcher>,
        oracle: Arc<dyn ILlmOracle>,
        options: CompletionOptions,
        count: usize,
    ) -> Self {
        Self {
            searcher,
            oracle,
            options,
            count: count.clamp(MIN_EXPANSION_QUERIES, MAX_EXPANSION_QUERIES),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// The original query followed by up to `count` distinct rewrites from `raw`.
pub fn parse_phrasings(original: &str, raw: &str, count: usize) -> Vec<String> {
    let mut phrasings = vec![original.trim().to_string()];
    for line in raw.lines() {
        if phrasings.len() > count {
            break;
        }
        let cleaned = LIST_MARKER
            .replace(line, "")
            .trim()
            .trim_matches('"')
            .trim()
            .to_string();
        if cleaned.is_empty() {
            continue;
        }
        if phrasings.iter().any(|p| p.eq_ignore_ascii_case(&cleaned)) {
            continue;
        }
        phrasings.push(cleaned);
    }
    phrasings
}

#[async_trait]
impl RetrievalStrategy for ExpansionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Expansion
    }

    async fn run(&self, query: &str, target: &DomainTarget) -> StrategyOutcome {
        let prompt = prompts::expansion_prompt(query, self.count);
        let (phrasings, fell_back) = match self.oracle.complete(&prompt, &self.options).await {
            Ok(completion) => {
                let phrasings = parse_phrasings(query, &completion.text, self.count);
                let fell_back = phrasings.len() == 1;
                (phrasings, fell_back)
            }
            Err(e) => {
                warn!(error = %e, "query expansion oracle failed, using raw query");
                (vec![query.to_string()], true)
            }
        };
        debug!(phrasings = phrasings.len(), "expanded query");

        let searches = phrasings.iter().map(|phrasing| {
            self.searcher
                .search(phrasing, &target.collection_id, StrategyKind::Expansion)
        });
        let results = join_all(searches).await;

        let mut lists = Vec::new();
        let mut last_error = None;
        for result in results {
            match result {
                Ok(candidates) => lists.push(candidates),
                Err(e) => last_error = Some(e.to_string()),
            }
        }
        if lists.is_empty() {
            return StrategyOutcome::failed(
                StrategyKind::Expansion,
                last_error.unwrap_or_else(|| "no phrasings searched".to_string()),
            );
        }

        let mut outcome = StrategyOutcome::succeeded(StrategyKind::Expansion, merge_lists(lists));
        outcome.fell_back = fell_back;
        outcome
    }
}
