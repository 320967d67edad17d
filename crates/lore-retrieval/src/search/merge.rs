//! Deduplicating merge of candidate lists.
//!
//! Candidates are keyed on passage id. A duplicate keeps the higher score and
//! the union of provenance. Output is ordered by score descending, ties kept
//! in first-seen order, so the merge is deterministic for a fixed input order.

use std::collections::HashMap;

use lore_core::models::RetrievalCandidate;

use crate::strategies::StrategyOutcome;

pub fn merge_lists<I>(lists: I) -> Vec<RetrievalCandidate>
where
    I: IntoIterator<Item = Vec<RetrievalCandidate>>,
{
    let mut merged: Vec<RetrievalCandidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in lists.into_iter().flatten() {
        match index.get(candidate.passage_id()) {
            Some(&pos) => {
                let existing = &mut merged[pos];
                if candidate.score > existing.score {
                    existing.score = candidate.score;
                    existing.text = candidate.text;
                }
                existing.provenance.extend(candidate.provenance);
            }
            None => {
                index.insert(candidate.passage_id().to_string(), merged.len());
                merged.push(candidate);
            }
        }
    }

    // sort_by is stable: equal scores keep first-seen order.
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged
}

/// Merge strategy outcomes in priority order, skipping failed ones.
pub fn merge(outcomes: &[StrategyOutcome]) -> Vec<RetrievalCandidate> {
    let mut ordered: Vec<&StrategyOutcome> = outcomes.iter().filter(|o| !o.is_failed()).collect();
    ordered.sort_by_key(|o| o.kind);
    merge_lists(ordered.into_iter().map(|o| o.candidates.clone()))
}
