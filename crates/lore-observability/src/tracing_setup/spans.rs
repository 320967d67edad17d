//! Span definitions per pipeline stage.

/// Span for one routed request.
#[macro_export]
macro_rules! route_span {
    ($query:expr, $mode:expr) => {
        tracing::info_span!("lore.route", query = %$query, mode = %$mode)
    };
}

/// Span for one strategy runner against one collection.
#[macro_export]
macro_rules! strategy_span {
    ($strategy:expr, $collection:expr) => {
        tracing::info_span!("lore.strategy", strategy = %$strategy, collection = %$collection)
    };
}

#[macro_export]
macro_rules! rerank_span {
    ($candidates:expr) => {
        tracing::info_span!("lore.rerank", candidates = $candidates)
    };
}

#[macro_export]
macro_rules! synthesis_span {
    ($domain:expr, $contexts:expr) => {
        tracing::info_span!("lore.synthesis", domain = %$domain, contexts = $contexts)
    };
}

/// Span for one schema analysis (relationships, SQL optimization).
#[macro_export]
macro_rules! analysis_span {
    ($analysis:expr, $collection:expr) => {
        tracing::info_span!("lore.analysis", analysis = %$analysis, collection = %$collection)
    };
}

/// Span for one generalizer run over a tenant/domain scope.
#[macro_export]
macro_rules! feedback_span {
    ($tenant:expr, $domain:expr) => {
        tracing::info_span!("lore.feedback", tenant = %$tenant, domain = %$domain)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ROUTE: &str = "lore.route";
    pub const STRATEGY: &str = "lore.strategy";
    pub const RERANK: &str = "lore.rerank";
    pub const SYNTHESIS: &str = "lore.synthesis";
    pub const ANALYSIS: &str = "lore.analysis";
    pub const FEEDBACK: &str = "lore.feedback";
}
