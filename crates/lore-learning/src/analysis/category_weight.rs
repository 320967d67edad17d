//! Problem category → training-example weight.
//!
//! - incorrect_sql → 1.5
//! - wrong_table → 1.3
//! - missing_information → 1.2
//! - outdated_information → 1.2
//! - formatting → 0.8
//! - other → 1.0

use lore_core::models::ProblemCategory;

fn multiplier(category: ProblemCategory) -> f64 {
    match category {
        ProblemCategory::IncorrectSql => 1.5,
        ProblemCategory::WrongTable => 1.3,
        ProblemCategory::MissingInformation => 1.2,
        ProblemCategory::OutdatedInformation => 1.2,
        ProblemCategory::Formatting => 0.8,
        ProblemCategory::Other => 1.0,
    }
}

/// Initial weight of an example derived from a correction of this category.
pub fn weight_for(category: ProblemCategory, base: f64) -> f64 {
    base * multiplier(category)
}
