//! Correction analysis: query-pattern generalization and category weighting.

pub mod category_weight;
pub mod pattern;

pub use category_weight::weight_for;
pub use pattern::generalize_pattern;
