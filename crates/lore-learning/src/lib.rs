//! # lore-learning
//!
//! Offline feedback loop: pending corrections → generalized training examples
//! → corrected documentation submitted for ingestion → improvement records.
//! Validated examples flow back into synthesis as correction hints.

pub mod analysis;
pub mod engine;
pub mod hints;
pub mod lifecycle;
pub mod retry;

pub use analysis::{generalize_pattern, weight_for};
pub use engine::{validate_correction, FeedbackGeneralizer, ProcessReport};
pub use hints::CorrectionHintProvider;
pub use retry::RetryPolicy;
