//! Relevance reranking through the oracle, falling back to merge order.
//!
//! At most `max_candidates` go to the oracle. Scores come back as a JSON array
//! of `{index, score, explanation}`; indices the oracle skips score 0. When the
//! oracle is disabled, fails, misses its deadline, or replies with something
//! unparseable, the merged order is kept and truncated to `top_k`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use serde::Deserialize;
use tracing::{debug, warn, Instrument};

use lore_core::config::RerankConfig;
use lore_core::models::{Degradation, DegradationKind, RankedContext, RetrievalCandidate};
use lore_core::traits::{CompletionOptions, ILlmOracle};
use lore_observability::tracing_setup::events;

use crate::prompts;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ScoredIndex {
    index: usize,
    score: f64,
    #[serde(default)]
    explanation: Option<String>,
}

/// Ranked contexts plus the degradation incurred, if the oracle was unusable.
#[derive(Debug, Clone)]
pub struct RerankOutput {
    pub contexts: Vec<RankedContext>,
    pub degradation: Option<Degradation>,
    /// The oracle scored the candidates.
    pub scored: bool,
}

pub struct Reranker {
    oracle: Arc<dyn ILlmOracle>,
    config: RerankConfig,
    options: CompletionOptions,
}

/// Extract `(score, explanation)` per candidate index from an oracle reply.
pub fn parse_scores(raw: &str, count: usize) -> Result<Vec<(f64, Option<String>)>, String> {
    let start = raw.find('[').ok_or("no JSON array in rerank reply")?;
    let end = raw.rfind(']').ok_or("unterminated JSON array in rerank reply")?;
    if end < start {
        return Err("malformed JSON array in rerank reply".to_string());
    }
    let parsed: Vec<ScoredIndex> =
        serde_json::from_str(&raw[start..=end]).map_err(|e| e.to_string())?;

    let mut scores = vec![(0.0, None); count];
    for entry in parsed {
        if let Some(slot) = scores.get_mut(entry.index) {
            let score = if entry.score.is_finite() {
                entry.score.clamp(0.0, 1.0)
            } else {
                0.0
            };
            *slot = (score, entry.explanation);
        }
    }
    Ok(scores)
}

fn to_context(candidate: RetrievalCandidate, score: f64, explanation: Option<String>) -> RankedContext {
    RankedContext {
        passage: candidate.passage,
        text: candidate.text,
        score,
        explanation,
        provenance: candidate.provenance,
    }
}

impl Reranker {
    pub fn new(
        oracle: Arc<dyn ILlmOracle>,
        config: RerankConfig,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let options = CompletionOptions {
            model: model.into(),
            max_tokens: config.max_tokens,
            temperature: 0.0,
            thinking_budget: None,
            timeout,
        };
        Self {
            oracle,
            config,
            options,
        }
    }

    /// Rerank `candidates`, giving up on the oracle at `deadline` or after
    /// the configured oracle timeout, whichever comes first.
    pub async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<RetrievalCandidate>,
        deadline: Instant,
    ) -> RerankOutput {
        candidates.truncate(self.config.max_candidates);
        if candidates.is_empty() {
            return RerankOutput {
                contexts: Vec::new(),
                degradation: None,
                scored: false,
            };
        }
        if !self.config.enabled {
            return RerankOutput {
                contexts: self.passthrough(candidates),
                degradation: None,
                scored: false,
            };
        }

        let deadline = deadline.min(Instant::now() + self.options.timeout);
        let span = lore_observability::rerank_span!(candidates.len());
        let prompt = prompts::rerank_prompt(query, &candidates);
        let reply = tokio::time::timeout_at(deadline, self.oracle.complete(&prompt, &self.options))
            .instrument(span)
            .await;

        let scores = match reply {
            Ok(Ok(completion)) => parse_scores(&completion.text, candidates.len()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("rerank missed its deadline".to_string()),
        };

        match scores {
            Ok(scores) => {
                let mut contexts: Vec<RankedContext> = candidates
                    .into_iter()
                    .zip(scores)
                    .filter(|(_, (score, _))| *score >= self.config.min_relevance)
                    .map(|(candidate, (score, explanation))| to_context(candidate, score, explanation))
                    .collect();
                contexts.sort_by(|a, b| b.score.total_cmp(&a.score));
                contexts.truncate(self.config.top_k);
                debug!(kept = contexts.len(), "reranked candidates");
                RerankOutput {
                    contexts,
                    degradation: None,
                    scored: true,
                }
            }
            Err(reason) => {
                warn!(reason = %reason, "rerank unavailable, keeping merge order");
                events::degradation_triggered("rerank", &reason, "merge order");
                RerankOutput {
                    contexts: self.passthrough(candidates),
                    degradation: Some(Degradation::new(
                        DegradationKind::RerankUnavailable,
                        "rerank",
                        reason,
                        "merge order",
                    )),
                    scored: false,
                }
            }
        }
    }

    fn passthrough(&self, candidates: Vec<RetrievalCandidate>) -> Vec<RankedContext> {
        candidates
            .into_iter()
            .take(self.config.top_k)
            .map(|candidate| {
                let score = candidate.score.clamp(0.0, 1.0);
                to_context(candidate, score, None)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::{PassageRef, StrategyKind};
    use test_fixtures::ScriptedOracle;

    const RERANK: &str = "Rate how relevant";

    fn candidate(id: &str, score: f64) -> RetrievalCandidate {
        RetrievalCandidate::new(PassageRef::new(id), format!("passage {id}"), score, StrategyKind::Standard)
    }

    fn reranker(oracle: Arc<ScriptedOracle>, max_candidates: usize) -> Reranker {
        let config = RerankConfig {
            max_candidates,
            top_k: 5,
            ..RerankConfig::default()
        };
        Reranker::new(oracle, config, "test-model", Duration::from_secs(5))
    }

    fn in_one_second() -> Instant {
        Instant::now() + Duration::from_secs(1)
    }

    #[tokio::test]
    async fn only_the_first_max_candidates_reach_the_oracle() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.when(RERANK, r#"[{"index": 0, "score": 0.4}, {"index": 1, "score": 0.9}]"#);
        let candidates = vec![candidate("a", 0.9), candidate("b", 0.8), candidate("c", 0.7)];

        let out = reranker(oracle.clone(), 2)
            .rerank("which table", candidates, in_one_second())
            .await;

        let prompt = &oracle.prompts()[0];
        assert!(prompt.contains("[0] passage a"));
        assert!(prompt.contains("[1] passage b"));
        assert!(!prompt.contains("passage c"));
        let texts: Vec<_> = out.contexts.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["passage b", "passage a"]);
        assert!(out.scored);
        assert!(out.degradation.is_none());
    }

    #[tokio::test]
    async fn missed_deadline_keeps_merge_order() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.stall_when(RERANK, Duration::from_secs(3), "[]");
        let candidates = vec![candidate("a", 0.9), candidate("b", 1.4)];

        let started = Instant::now();
        let out = reranker(oracle, 20)
            .rerank("which table", candidates, Instant::now() + Duration::from_millis(50))
            .await;

        assert!(started.elapsed() < Duration::from_secs(1));
        let texts: Vec<_> = out.contexts.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["passage a", "passage b"]);
        assert_eq!(out.contexts[1].score, 1.0);
        assert!(!out.scored);
        let degradation = out.degradation.unwrap();
        assert_eq!(degradation.kind, DegradationKind::RerankUnavailable);
        assert!(degradation.failure.contains("deadline"));
    }

    #[test]
    fn parses_array_wrapped_in_prose() {
        let raw = "Sure:\n[{\"index\": 1, \"score\": 0.9, \"explanation\": \"direct\"}, {\"index\": 0, \"score\": 1.7}]\nDone.";
        let scores = parse_scores(raw, 3).unwrap();
        assert_eq!(scores[0], (1.0, None));
        assert_eq!(scores[1], (0.9, Some("direct".to_string())));
        assert_eq!(scores[2], (0.0, None));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let scores = parse_scores("[{\"index\": 7, \"score\": 0.5}]", 2).unwrap();
        assert_eq!(scores, vec![(0.0, None), (0.0, None)]);
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_scores("the first passage is best", 2).is_err());
        assert!(parse_scores("[not json]", 2).is_err());
    }
}
