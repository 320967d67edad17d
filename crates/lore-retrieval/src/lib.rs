//! # lore-retrieval
//!
//! The online query path: classify → retrieve with every strategy → merge →
//! rerank → synthesize, per target, composed by the router. The router also
//! runs schema analyses (table relationships, SQL optimization) against the
//! database collection.

pub mod analysis;
pub mod classifier;
pub mod prompts;
pub mod ranking;
pub mod router;
pub mod search;
pub mod strategies;
pub mod synthesis;

pub use analysis::{sql_tables, SchemaAnalysis, SchemaAnalyzer};
pub use classifier::{Classification, DomainClassifier, RoutingPlan};
pub use router::{QueryRouter, QueryRouterBuilder};
pub use search::{merge, merge_lists, RetrievalCache, StrategyRunner};
pub use strategies::{RetrievalStrategy, StrategyOutcome};
