//! Request routing: classify, fan out per target, compose one answer.
//!
//! Each target runs its own pipeline (strategies, merge, rerank, synthesis)
//! concurrently with the others. The primary target's answer is authoritative;
//! secondary answers are attached as related notes.
//!
//! The whole request runs under one deadline and one cancellation token.
//! Rerank and synthesis get stage deadlines carved from what is left of the
//! request budget, so a slow oracle degrades one stage instead of failing the
//! request. A target still running at the request deadline is dropped with a
//! degradation and the answer is composed from the targets that finished.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};

use lore_core::constants::RELATED_EXCERPT_CHARS;
use lore_core::models::{Degradation, DegradationKind, MessageRole, RelatedNote, SessionEvent};
use lore_core::traits::{ICorrectionHints, IEmbeddingProvider, ILlmOracle, IPassageStore};
use lore_core::{Answer, Domain, DomainTarget, LoreConfig, LoreError, LoreResult, Query};
use lore_observability::tracing_setup::events;
use lore_observability::ObservabilityEngine;
use lore_session::SessionEmitter;

use crate::analysis::{SchemaAnalysis, SchemaAnalyzer};
use crate::classifier::{DomainClassifier, RoutingPlan};
use crate::ranking::Reranker;
use crate::search::{merge, RetrievalCache, StrategyRunner};
use crate::strategies::{build_strategies, PassageSearcher};
use crate::synthesis::Synthesizer;

/// Upper bound on the slice of the request budget kept for composing.
const MAX_COMPOSE_RESERVE: Duration = Duration::from_millis(250);

/// Result of one target's pipeline.
struct TargetRun {
    target: DomainTarget,
    /// `None` when every strategy failed or the target missed the deadline.
    answer: Option<Answer>,
    found_context: bool,
    degradations: Vec<Degradation>,
    /// Components that ran cleanly for this target.
    recovered: Vec<String>,
    cache_hits: usize,
    cache_misses: usize,
}

impl TargetRun {
    fn late(target: &DomainTarget) -> Self {
        let component = format!("target.{}", target.domain);
        let failure = "missed the request deadline";
        let fallback = "answer without this domain";
        warn!(domain = %target.domain, "target dropped at the request deadline");
        events::degradation_triggered(&component, failure, fallback);
        Self {
            target: target.clone(),
            answer: None,
            found_context: false,
            degradations: vec![Degradation::new(
                DegradationKind::StrategyFailed,
                component,
                failure,
                fallback,
            )],
            recovered: Vec::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }
}

struct Routed {
    answer: Answer,
    recovered: Vec<String>,
    cache_hits: usize,
    cache_misses: usize,
}

/// Rerank and synthesis deadlines for a target whose strategies finished at
/// `now`. Rerank may use half of what remains; synthesis runs until the
/// request deadline less the compose reserve.
fn stage_deadlines(now: Instant, request_deadline: Instant, reserve: Duration) -> (Instant, Instant) {
    let synthesis = request_deadline
        .checked_sub(reserve)
        .unwrap_or(request_deadline)
        .max(now);
    let rerank = now + (synthesis - now) / 2;
    (rerank, synthesis)
}

pub struct QueryRouterBuilder {
    config: LoreConfig,
    oracle: Arc<dyn ILlmOracle>,
    store: Arc<dyn IPassageStore>,
    embedder: Option<Arc<dyn IEmbeddingProvider>>,
    hints: Option<Arc<dyn ICorrectionHints>>,
    sessions: Option<SessionEmitter>,
    observability: Option<Arc<ObservabilityEngine>>,
}

impl QueryRouterBuilder {
    pub fn embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn hints(mut self, hints: Arc<dyn ICorrectionHints>) -> Self {
        self.hints = Some(hints);
        self
    }

    pub fn sessions(mut self, sessions: SessionEmitter) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn observability(mut self, engine: Arc<ObservabilityEngine>) -> Self {
        self.observability = Some(engine);
        self
    }

    pub fn build(self) -> LoreResult<QueryRouter> {
        self.config.validate()?;
        let config = self.config;
        let oracle_timeout = Duration::from_millis(config.oracle.timeout_ms);

        let mut searcher = PassageSearcher::new(self.store, config.retrieval.results_per_strategy);
        if let Some(embedder) = self.embedder {
            searcher = searcher.with_embedder(embedder);
        }
        let searcher = Arc::new(searcher);
        let strategies = build_strategies(&config, searcher.clone(), self.oracle.clone());
        let mut runner = StrategyRunner::new(
            strategies,
            Duration::from_millis(config.retrieval.runner_timeout_ms),
            config.retrieval.results_per_strategy,
        );
        if config.cache.enabled {
            runner = runner.with_cache(Arc::new(RetrievalCache::new(&config.cache)));
        }

        let analyzer = SchemaAnalyzer::new(
            searcher,
            self.oracle.clone(),
            config.oracle.model.clone(),
            oracle_timeout,
        );
        let reranker = Reranker::new(
            self.oracle.clone(),
            config.rerank.clone(),
            config.oracle.model.clone(),
            oracle_timeout,
        );
        let mut synthesizer = Synthesizer::new(
            self.oracle,
            config.synthesis.clone(),
            config.oracle.model.clone(),
            oracle_timeout,
        );
        if let Some(hints) = self.hints {
            synthesizer = synthesizer.with_hints(hints);
        }

        let sessions = if config.session.enabled {
            self.sessions
        } else {
            None
        };

        let request_timeout = Duration::from_millis(config.retrieval.request_timeout_ms);
        Ok(QueryRouter {
            classifier: DomainClassifier::new(&config.classifier),
            request_timeout,
            compose_reserve: (request_timeout / 20).min(MAX_COMPOSE_RESERVE),
            search_timeout: Duration::from_millis(config.retrieval.runner_timeout_ms),
            config,
            runner,
            reranker,
            synthesizer,
            analyzer,
            sessions,
            observability: self.observability,
        })
    }
}

pub struct QueryRouter {
    config: LoreConfig,
    classifier: DomainClassifier,
    runner: StrategyRunner,
    reranker: Reranker,
    synthesizer: Synthesizer,
    analyzer: SchemaAnalyzer,
    request_timeout: Duration,
    compose_reserve: Duration,
    search_timeout: Duration,
    sessions: Option<SessionEmitter>,
    observability: Option<Arc<ObservabilityEngine>>,
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(RELATED_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

impl QueryRouter {
    pub fn builder(
        config: LoreConfig,
        oracle: Arc<dyn ILlmOracle>,
        store: Arc<dyn IPassageStore>,
    ) -> QueryRouterBuilder {
        QueryRouterBuilder {
            config,
            oracle,
            store,
            embedder: None,
            hints: None,
            sessions: None,
            observability: None,
        }
    }

    pub fn config(&self) -> &LoreConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    /// Answer one query. Secondary targets surface as related notes.
    pub async fn answer(&self, query: &Query, cancel: &CancellationToken) -> LoreResult<Answer> {
        let started = Instant::now();
        let span = lore_observability::route_span!(query.text, query.mode);
        let routed = self.route(query, cancel, started).instrument(span).await?;

        let latency = started.elapsed();
        info!(
            domains = ?routed.answer.source_domains,
            degradations = routed.answer.degradations.len(),
            latency_ms = latency.as_millis() as u64,
            "query answered"
        );
        if let Some(engine) = &self.observability {
            engine.record_answer(
                &query.text,
                &routed.answer,
                latency,
                routed.cache_hits,
                routed.cache_misses,
            );
            for component in &routed.recovered {
                engine.mark_recovered(component);
            }
        }
        self.emit_session(query, &routed.answer, latency);
        Ok(routed.answer)
    }

    /// One answer per resolved target, primary first. Routing degradations
    /// ride on the first answer.
    pub async fn answer_per_domain(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> LoreResult<Vec<Answer>> {
        let started = Instant::now();
        let span = lore_observability::route_span!(query.text, query.mode);
        let (plan, runs) = self
            .run_targets(query, cancel, started)
            .instrument(span)
            .await?;
        if runs.iter().all(|run| run.answer.is_none()) {
            return Err(all_failed(&runs));
        }

        let mut answers = Vec::with_capacity(runs.len());
        for run in runs {
            let mut answer = match run.answer {
                Some(answer) => answer,
                None => Answer::new(
                    LoreError::AllTargetsFailed {
                        domains: run.target.domain.to_string(),
                    }
                    .user_message(),
                    run.target.domain,
                ),
            };
            let mut degradations = run.degradations;
            degradations.append(&mut answer.degradations);
            answer.degradations = degradations;
            answers.push(answer);
        }
        if let Some(first) = answers.first_mut() {
            let mut degradations = plan.degradations;
            degradations.append(&mut first.degradations);
            first.degradations = degradations;
        }
        Ok(answers)
    }

    /// Describe the relationships of `table` from the database collection of
    /// `application` (or the default catalog).
    pub async fn relationships(
        &self,
        table: &str,
        application: Option<&str>,
        cancel: &CancellationToken,
    ) -> LoreResult<Answer> {
        self.analyze(SchemaAnalysis::relationships(table), application, cancel)
            .await
    }

    /// Suggest an optimized form of `sql` using schema knowledge from the
    /// database collection of `application` (or the default catalog).
    pub async fn optimize_sql(
        &self,
        sql: &str,
        application: Option<&str>,
        cancel: &CancellationToken,
    ) -> LoreResult<Answer> {
        self.analyze(SchemaAnalysis::sql_optimization(sql), application, cancel)
            .await
    }

    async fn analyze(
        &self,
        analysis: SchemaAnalysis,
        application: Option<&str>,
        cancel: &CancellationToken,
    ) -> LoreResult<Answer> {
        let started = Instant::now();
        let catalog = self.config.domains.catalog_for(application);
        let collection = catalog
            .collection(Domain::Database)
            .ok_or_else(|| LoreError::NoTargets {
                mode: Domain::Database.to_string(),
            })?;
        let deadline = started + self.request_timeout;
        let search_deadline = (started + self.search_timeout).min(deadline);
        let report_deadline = deadline
            .checked_sub(self.compose_reserve)
            .unwrap_or(deadline);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LoreError::Cancelled),
            answer = self.analyzer.analyze(&analysis, collection, search_deadline, report_deadline) => answer,
        }
    }

    async fn route(
        &self,
        query: &Query,
        cancel: &CancellationToken,
        started: Instant,
    ) -> LoreResult<Routed> {
        let (plan, runs) = self.run_targets(query, cancel, started).await?;
        compose(plan, runs)
    }

    /// Run every target concurrently until all finish or the request deadline
    /// passes. Targets still running at the deadline come back as late runs.
    async fn run_targets(
        &self,
        query: &Query,
        cancel: &CancellationToken,
        started: Instant,
    ) -> LoreResult<(RoutingPlan, Vec<TargetRun>)> {
        let catalog = self.config.domains.catalog_for(query.application.as_deref());
        let plan = self.classifier.resolve(&query.text, query.mode, catalog)?;
        let deadline = started + self.request_timeout;

        let mut pending: FuturesUnordered<_> = plan
            .targets
            .iter()
            .enumerate()
            .map(|(index, target)| async move {
                (index, self.run_target(query, target, cancel, deadline).await)
            })
            .collect();
        let mut finished: Vec<Option<TargetRun>> =
            std::iter::repeat_with(|| None).take(plan.targets.len()).collect();

        let expired = tokio::time::sleep_until(deadline);
        tokio::pin!(expired);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LoreError::Cancelled),
                _ = &mut expired => break,
                next = pending.next() => match next {
                    Some((index, run)) => finished[index] = Some(run?),
                    None => break,
                },
            }
        }
        drop(pending);

        if finished.iter().all(Option::is_none) {
            return Err(LoreError::Timeout {
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
        let runs: Vec<TargetRun> = plan
            .targets
            .iter()
            .zip(finished)
            .map(|(target, run)| run.unwrap_or_else(|| TargetRun::late(target)))
            .collect();
        Ok((plan, runs))
    }

    async fn run_target(
        &self,
        query: &Query,
        target: &DomainTarget,
        cancel: &CancellationToken,
        request_deadline: Instant,
    ) -> LoreResult<TargetRun> {
        let report = self.runner.run(&query.text, target, cancel).await?;
        let mut degradations = report.degradations(target);
        let mut recovered = report.clean_components(target);
        if report.all_failed() {
            return Ok(TargetRun {
                target: target.clone(),
                answer: None,
                found_context: false,
                degradations,
                recovered,
                cache_hits: report.cache_hits,
                cache_misses: report.cache_misses,
            });
        }

        let (rerank_deadline, synthesis_deadline) =
            stage_deadlines(Instant::now(), request_deadline, self.compose_reserve);
        let merged = merge(&report.outcomes);
        let reranked = self
            .reranker
            .rerank(&query.text, merged, rerank_deadline)
            .await;
        if reranked.scored {
            recovered.push("rerank".to_string());
        }
        degradations.extend(reranked.degradation);
        let answer = self
            .synthesizer
            .synthesize(
                &query.text,
                target.domain,
                &reranked.contexts,
                &query.options,
                synthesis_deadline,
            )
            .await;
        let synthesized = !reranked.contexts.is_empty() && !answer.is_degraded();
        if synthesized {
            recovered.push("synthesis".to_string());
        }

        Ok(TargetRun {
            target: target.clone(),
            found_context: synthesized,
            answer: Some(answer),
            degradations,
            recovered,
            cache_hits: report.cache_hits,
            cache_misses: report.cache_misses,
        })
    }

    fn emit_session(&self, query: &Query, answer: &Answer, latency: Duration) {
        let (Some(sessions), Some(session_id)) = (&self.sessions, &query.session_id) else {
            return;
        };
        let domains = answer
            .source_domains
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut user = SessionEvent::new(session_id.as_str(), MessageRole::User, query.text.as_str())
            .with_metadata("query_type", query.mode.to_string());
        user.tenant_id = query.tenant_id.clone();
        let mut assistant = SessionEvent::new(
            session_id.as_str(),
            MessageRole::Assistant,
            answer.to_response().answer,
        )
        .with_metadata("query_type", query.mode.to_string())
        .with_metadata("domains", domains)
        .with_metadata("latency_ms", latency.as_millis().to_string());
        assistant.tenant_id = query.tenant_id.clone();

        sessions.emit(user);
        sessions.emit(assistant);
    }
}

fn all_failed(runs: &[TargetRun]) -> LoreError {
    LoreError::AllTargetsFailed {
        domains: runs
            .iter()
            .map(|run| run.target.domain.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Pick the authoritative answer and attach the rest as related notes.
///
/// The primary answers when any of its strategies succeeded; otherwise the
/// first secondary that succeeded is promoted.
fn compose(plan: RoutingPlan, runs: Vec<TargetRun>) -> LoreResult<Routed> {
    let main_index = runs
        .iter()
        .position(|run| run.target.is_primary() && run.answer.is_some())
        .or_else(|| runs.iter().position(|run| run.answer.is_some()))
        .ok_or_else(|| all_failed(&runs))?;

    let mut degradations = plan.degradations;
    let mut recovered = Vec::new();
    let mut cache_hits = 0;
    let mut cache_misses = 0;
    let mut main = None;
    let mut related: Vec<(Domain, Answer)> = Vec::new();

    for (index, mut run) in runs.into_iter().enumerate() {
        cache_hits += run.cache_hits;
        cache_misses += run.cache_misses;
        degradations.append(&mut run.degradations);
        recovered.append(&mut run.recovered);
        let Some(mut answer) = run.answer else {
            continue;
        };
        if index == main_index {
            main = Some(answer);
        } else {
            degradations.append(&mut answer.degradations);
            if run.found_context {
                related.push((run.target.domain, answer));
            }
        }
    }

    let mut answer = main.ok_or_else(|| LoreError::AllTargetsFailed {
        domains: String::new(),
    })?;
    degradations.append(&mut answer.degradations);
    answer.degradations = degradations;
    for (domain, secondary) in related {
        if !answer.source_domains.contains(&domain) {
            answer.source_domains.push(domain);
        }
        answer.related.push(RelatedNote {
            domain,
            excerpt: excerpt(&secondary.text),
        });
    }

    // a component that degraded anywhere in this request has not recovered
    recovered.sort();
    recovered.dedup();
    recovered.retain(|component| {
        !answer
            .degradations
            .iter()
            .any(|d| &d.component == component)
    });

    Ok(Routed {
        answer,
        recovered,
        cache_hits,
        cache_misses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(target: DomainTarget, text: &str) -> TargetRun {
        TargetRun {
            answer: Some(Answer::new(text, target.domain)),
            target,
            found_context: true,
            degradations: Vec::new(),
            recovered: vec!["synthesis".to_string()],
            cache_hits: 1,
            cache_misses: 2,
        }
    }

    fn plan(targets: Vec<DomainTarget>) -> RoutingPlan {
        RoutingPlan {
            targets,
            classification: None,
            degradations: Vec::new(),
        }
    }

    #[test]
    fn stage_deadlines_split_the_remaining_budget() {
        let now = Instant::now();
        let (rerank, synthesis) = stage_deadlines(
            now,
            now + Duration::from_millis(1_000),
            Duration::from_millis(200),
        );
        assert_eq!(synthesis, now + Duration::from_millis(800));
        assert_eq!(rerank, now + Duration::from_millis(400));

        // a spent budget leaves no time for either stage
        let (rerank, synthesis) = stage_deadlines(now, now, Duration::from_millis(200));
        assert_eq!(rerank, now);
        assert_eq!(synthesis, now);
    }

    #[test]
    fn late_secondary_is_dropped_with_a_degradation() {
        let database = DomainTarget::primary(Domain::Database, "database-kb");
        let support = DomainTarget::secondary(Domain::Support, "support-kb");
        let runs = vec![
            finished(database.clone(), "orders has customer_id"),
            TargetRun::late(&support),
        ];

        let routed = compose(plan(vec![database, support]), runs).unwrap();
        assert_eq!(routed.answer.text, "orders has customer_id");
        assert_eq!(routed.answer.source_domains, vec![Domain::Database]);
        assert!(routed.answer.related.is_empty());
        let late = &routed.answer.degradations[0];
        assert_eq!(late.component, "target.support");
        assert!(late.failure.contains("deadline"));
        assert_eq!(routed.recovered, vec!["synthesis".to_string()]);
    }

    #[test]
    fn late_primary_promotes_a_finished_secondary() {
        let database = DomainTarget::primary(Domain::Database, "database-kb");
        let support = DomainTarget::secondary(Domain::Support, "support-kb");
        let runs = vec![
            TargetRun::late(&database),
            finished(support.clone(), "restart the sync service"),
        ];

        let routed = compose(plan(vec![database, support]), runs).unwrap();
        assert_eq!(routed.answer.text, "restart the sync service");
        assert_eq!(routed.answer.degradations[0].component, "target.database");
        assert_eq!(routed.cache_hits, 1);
    }

    #[test]
    fn components_that_degraded_are_not_recovered() {
        let database = DomainTarget::primary(Domain::Database, "database-kb");
        let mut run = finished(database.clone(), "answer");
        run.recovered.push("rerank".to_string());
        run.degradations.push(Degradation::new(
            DegradationKind::SynthesisFailed,
            "synthesis",
            "oracle offline",
            "apology answer",
        ));

        let routed = compose(plan(vec![database]), vec![run]).unwrap();
        assert_eq!(routed.recovered, vec!["rerank".to_string()]);
    }

    #[test]
    fn excerpt_truncates_long_text() {
        let long = "x".repeat(RELATED_EXCERPT_CHARS + 10);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), RELATED_EXCERPT_CHARS + 3);
        assert_eq!(excerpt("short"), "short");
    }
}
