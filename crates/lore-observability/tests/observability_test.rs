use std::time::Duration;

use lore_core::models::{Answer, Degradation, DegradationKind};
use lore_core::Domain;
use lore_observability::{
    DegradationTracker, ObservabilityEngine, QueryLog, QueryLogEntry, RecoveryStatus,
};

#[test]
fn query_log_keeps_only_the_newest_entries() {
    let mut log = QueryLog::with_capacity(2);
    for i in 0..3 {
        log.record(QueryLogEntry::new(
            format!("q{i}"),
            Some(Domain::Database),
            Duration::from_millis(10),
            1,
            0,
            0,
        ));
    }
    assert_eq!(log.entries().len(), 2);
    assert_eq!(log.entries()[0].query, "q1");
}

fn rerank_timeout() -> Degradation {
    Degradation::new(
        DegradationKind::RerankUnavailable,
        "rerank",
        "oracle timeout",
        "merge order",
    )
}

#[test]
fn tracker_marks_active_events_of_a_component_recovered() {
    let mut tracker = DegradationTracker::new();
    tracker.record(rerank_timeout());
    tracker.record(rerank_timeout());
    tracker.record(Degradation::new(
        DegradationKind::SynthesisFailed,
        "synthesis",
        "oracle timeout",
        "apology answer",
    ));
    assert_eq!(tracker.active_degradations().len(), 3);

    tracker.mark_recovered("rerank");
    let active = tracker.active_degradations();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].event.component, "synthesis");
    assert_eq!(tracker.count_by_kind(DegradationKind::RerankUnavailable), 2);
    assert!(tracker
        .events()
        .filter(|t| t.event.component == "rerank")
        .all(|t| t.recovery_status == RecoveryStatus::Recovered && t.recovered_at.is_some()));
}

#[test]
fn tracker_keeps_only_the_newest_events() {
    let mut tracker = DegradationTracker::with_capacity(2);
    for failure in ["first", "second", "third"] {
        tracker.record(Degradation::new(
            DegradationKind::StrategyFailed,
            "strategy.hyde.database",
            failure,
            "remaining strategies",
        ));
    }
    assert_eq!(tracker.len(), 2);
    let failures: Vec<_> = tracker.events().map(|t| t.event.failure.as_str()).collect();
    assert_eq!(failures, vec!["second", "third"]);
}

#[test]
fn engine_recovery_clears_active_degradations() {
    let engine = ObservabilityEngine::new();
    let mut degraded = Answer::new("merge order answer", Domain::Database);
    degraded.degradations.push(rerank_timeout());
    engine.record_answer("q1", &degraded, Duration::from_millis(20), 0, 0);
    assert_eq!(engine.report().active_degradations, 1);

    engine.mark_recovered("synthesis");
    assert_eq!(engine.report().active_degradations, 1);
    engine.mark_recovered("rerank");
    assert_eq!(engine.report().active_degradations, 0);
}

#[test]
fn engine_report_aggregates_answers() {
    let engine = ObservabilityEngine::new();
    let mut degraded = Answer::new("partial", Domain::Support);
    degraded.degradations.push(Degradation::new(
        DegradationKind::StrategyFailed,
        "hyde",
        "oracle offline",
        "remaining strategies",
    ));
    engine.record_answer("q1", &Answer::new("ok", Domain::Database), Duration::from_millis(20), 1, 2);
    engine.record_answer("q2", &degraded, Duration::from_millis(40), 0, 3);

    let report = engine.report();
    assert_eq!(report.queries, 2);
    assert_eq!(report.avg_latency_ms, 30);
    assert_eq!(report.degraded_rate, 0.5);
    assert_eq!(report.active_degradations, 1);
    assert_eq!(report.metrics.strategy_failures.get("hyde"), Some(&1));
    assert_eq!(report.metrics.queries_by_domain.get("database"), Some(&1));
    assert!((report.metrics.cache_hit_rate() - 1.0 / 6.0).abs() < 1e-9);
}
