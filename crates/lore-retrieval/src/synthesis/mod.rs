//! Answer synthesis from ranked contexts.
//!
//! Never fails: an empty context set produces a "nothing found" answer without
//! calling the oracle, and an oracle failure or a missed deadline produces an
//! apologetic answer plus a `SynthesisFailed` degradation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{warn, Instrument};

use lore_core::config::SynthesisConfig;
use lore_core::models::{Degradation, DegradationKind, RankedContext, SynthesisOptions};
use lore_core::traits::{CompletionOptions, ICorrectionHints, ILlmOracle};
use lore_core::{Answer, Domain, LoreError};
use lore_observability::tracing_setup::events;

use crate::prompts;

pub struct Synthesizer {
    oracle: Arc<dyn ILlmOracle>,
    hints: Option<Arc<dyn ICorrectionHints>>,
    config: SynthesisConfig,
    model: String,
    timeout: Duration,
}

/// Context texts in rank order, cut to fit within `budget` characters.
pub fn fit_contexts(contexts: &[RankedContext], budget: usize) -> Vec<String> {
    let mut remaining = budget;
    let mut out = Vec::new();
    for context in contexts {
        if remaining == 0 {
            break;
        }
        let text = context.text.trim();
        let len = text.chars().count();
        if len <= remaining {
            out.push(text.to_string());
            remaining -= len;
        } else {
            out.push(text.chars().take(remaining).collect());
            remaining = 0;
        }
    }
    out
}

pub fn no_context_answer(domain: Domain) -> String {
    format!(
        "I couldn't find relevant information in the {} knowledge base for this question. \
         Try rephrasing it, or mention specific names such as tables, features, or error messages.",
        domain.label()
    )
}

impl Synthesizer {
    pub fn new(
        oracle: Arc<dyn ILlmOracle>,
        config: SynthesisConfig,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            oracle,
            hints: None,
            config,
            model: model.into(),
            timeout,
        }
    }

    pub fn with_hints(mut self, hints: Arc<dyn ICorrectionHints>) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Answer from `contexts`. Hint lookup and the oracle call both stop at
    /// `deadline` or after the configured oracle timeout, whichever comes first.
    pub async fn synthesize(
        &self,
        query: &str,
        domain: Domain,
        contexts: &[RankedContext],
        options: &SynthesisOptions,
        deadline: Instant,
    ) -> Answer {
        if contexts.is_empty() {
            return Answer::new(no_context_answer(domain), domain);
        }

        let deadline = deadline.min(Instant::now() + self.timeout);
        let texts = fit_contexts(contexts, self.config.max_context_chars);
        let hints = match &self.hints {
            Some(source) if self.config.correction_hints > 0 => {
                let lookup = source.hints_for(query, domain, self.config.correction_hints);
                match tokio::time::timeout_at(deadline, lookup).await {
                    Ok(hints) => hints,
                    Err(_) => {
                        warn!(domain = %domain, "correction hints skipped, deadline reached");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };
        let prompt = prompts::synthesis_prompt(query, domain, &texts, &hints);
        let completion_options = CompletionOptions {
            model: self.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            thinking_budget: options
                .extended_thinking
                .then_some(self.config.thinking_budget_tokens),
            timeout: self.timeout,
        };

        let span = lore_observability::synthesis_span!(domain, texts.len());
        let reply = tokio::time::timeout_at(
            deadline,
            self.oracle.complete(&prompt, &completion_options),
        )
        .instrument(span)
        .await;

        let mut answer = match reply {
            Ok(Ok(completion)) if !completion.text.trim().is_empty() => {
                let mut answer = Answer::new(completion.text.trim(), domain);
                if options.include_thinking {
                    answer.thinking = completion.thinking;
                }
                answer
            }
            outcome => {
                let reason = match outcome {
                    Ok(Err(e)) => e.to_string(),
                    Ok(Ok(_)) => "oracle returned an empty answer".to_string(),
                    Err(_) => "synthesis missed its deadline".to_string(),
                };
                warn!(domain = %domain, reason = %reason, "synthesis failed");
                events::degradation_triggered("synthesis", &reason, "apology answer");
                let fallback = LoreError::SynthesisFailed {
                    reason: reason.clone(),
                }
                .user_message();
                let mut answer = Answer::new(fallback, domain);
                answer.degradations.push(Degradation::new(
                    DegradationKind::SynthesisFailed,
                    "synthesis",
                    reason,
                    "apology answer",
                ));
                answer
            }
        };
        if options.include_contexts {
            answer.contexts = Some(texts);
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::{PassageRef, StrategyKind};
    use lore_core::traits::CorrectionHint;
    use std::collections::BTreeSet;
    use test_fixtures::ScriptedOracle;

    fn ctx(text: &str) -> RankedContext {
        RankedContext {
            passage: PassageRef::new(text),
            text: text.to_string(),
            score: 1.0,
            explanation: None,
            provenance: BTreeSet::from([StrategyKind::Standard]),
        }
    }

    #[test]
    fn fit_contexts_truncates_the_last_context() {
        let fitted = fit_contexts(&[ctx("abcdef"), ctx("ghijkl"), ctx("mnop")], 9);
        assert_eq!(fitted, vec!["abcdef".to_string(), "ghi".to_string()]);
    }

    #[test]
    fn fit_contexts_counts_characters_not_bytes() {
        let fitted = fit_contexts(&[ctx("ééé")], 2);
        assert_eq!(fitted, vec!["éé".to_string()]);
    }

    fn in_one_second() -> Instant {
        Instant::now() + Duration::from_secs(1)
    }

    struct FixedHints;

    #[async_trait::async_trait]
    impl ICorrectionHints for FixedHints {
        async fn hints_for(&self, _query: &str, domain: Domain, limit: usize) -> Vec<CorrectionHint> {
            if domain != Domain::Database {
                return Vec::new();
            }
            vec![CorrectionHint {
                example_id: "ex-1".into(),
                query_pattern: "which columns are in table [TABLE]?".into(),
                correct_response: "use information_schema.columns".into(),
            }]
            .into_iter()
            .take(limit)
            .collect()
        }
    }

    #[tokio::test]
    async fn correction_hints_reach_the_prompt() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.otherwise("The orders table has id and total.");
        let synthesizer = Synthesizer::new(
            oracle.clone(),
            SynthesisConfig::default(),
            "test-model",
            Duration::from_secs(1),
        )
        .with_hints(Arc::new(FixedHints));

        let answer = synthesizer
            .synthesize(
                "which columns are in table orders?",
                Domain::Database,
                &[ctx("orders(id, total)")],
                &SynthesisOptions::default(),
                in_one_second(),
            )
            .await;
        assert!(!answer.is_degraded());

        let prompt = &oracle.prompts()[0];
        assert!(prompt.contains("--- USER CORRECTIONS ---"));
        assert!(prompt.contains("use information_schema.columns"));
    }

    #[tokio::test]
    async fn missed_deadline_is_an_apology() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.stall_when("ANSWER:", Duration::from_secs(3), "too late");
        let synthesizer = Synthesizer::new(
            oracle,
            SynthesisConfig::default(),
            "test-model",
            Duration::from_secs(5),
        );

        let started = Instant::now();
        let answer = synthesizer
            .synthesize(
                "how do I reset a password",
                Domain::Support,
                &[ctx("reset from the admin console")],
                &SynthesisOptions::default(),
                Instant::now() + Duration::from_millis(50),
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(answer.text.contains("rephrasing"));
        assert_eq!(answer.degradations.len(), 1);
        assert_eq!(answer.degradations[0].kind, DegradationKind::SynthesisFailed);
        assert!(answer.degradations[0].failure.contains("deadline"));
    }
}
