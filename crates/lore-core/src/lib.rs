//! # lore-core
//!
//! Foundation crate for the Lore retrieval-and-routing engine.
//! Defines the domain model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod domain;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::LoreConfig;
pub use domain::{Domain, DomainTarget, QueryMode, TargetRole};
pub use errors::{LoreError, LoreResult};
pub use models::{Answer, Query, RankedContext, RetrievalCandidate, StrategyKind};
