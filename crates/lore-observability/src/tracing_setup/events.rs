//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn query_routed(query: &str, primary: &str, targets: usize, defaulted: bool) {
    tracing::info!(
        event = "query_routed",
        query = %query,
        primary = %primary,
        targets = targets,
        defaulted = defaulted,
        "query routed"
    );
}

pub fn strategy_failed(strategy: &str, collection: &str, reason: &str) {
    tracing::warn!(
        event = "strategy_failed",
        strategy = %strategy,
        collection = %collection,
        reason = %reason,
        "retrieval strategy failed"
    );
}

pub fn correction_rejected(correction_id: &str, reason: &str) {
    tracing::warn!(
        event = "feedback_validation_rejected",
        correction_id = %correction_id,
        reason = %reason,
        "correction rejected"
    );
}

pub fn improvement_transitioned(improvement_id: &str, from: &str, to: &str) {
    tracing::info!(
        event = "improvement_transitioned",
        improvement_id = %improvement_id,
        from = %from,
        to = %to,
        "improvement status changed"
    );
}

pub fn session_event_dropped(session_id: &str, reason: &str) {
    tracing::warn!(
        event = "session_event_dropped",
        session_id = %session_id,
        reason = %reason,
        "session event dropped"
    );
}
