//! Validated training examples served back to synthesis as correction hints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use lore_core::config::DomainCatalog;
use lore_core::models::{FeedbackScope, ValidationStatus};
use lore_core::traits::{CorrectionHint, ICorrectionHints, IFeedbackStore};
use lore_core::Domain;

use crate::analysis::generalize_pattern;

/// Matches a query against validated examples by generalized pattern.
///
/// Examples are scoped to one tenant and the catalog's collection for the
/// domain. Every hint handed out bumps the example's usage count. Store
/// access runs on the blocking pool.
pub struct CorrectionHintProvider {
    store: Arc<dyn IFeedbackStore>,
    tenant_id: String,
    catalog: DomainCatalog,
}

impl CorrectionHintProvider {
    pub fn new(
        store: Arc<dyn IFeedbackStore>,
        tenant_id: impl Into<String>,
        catalog: DomainCatalog,
    ) -> Self {
        Self {
            store,
            tenant_id: tenant_id.into(),
            catalog,
        }
    }
}

fn lookup(
    store: &dyn IFeedbackStore,
    scope: &FeedbackScope,
    query_text: &str,
    limit: usize,
) -> Vec<CorrectionHint> {
    let examples = match store.training_examples(scope, Some(ValidationStatus::Validated)) {
        Ok(examples) => examples,
        Err(e) => {
            warn!(collection = %scope.domain_id, error = %e, "correction hints unavailable");
            return Vec::new();
        }
    };

    let pattern = generalize_pattern(query_text);
    let hints: Vec<CorrectionHint> = examples
        .into_iter()
        .filter(|example| example.query_pattern == pattern)
        .take(limit)
        .map(|example| CorrectionHint {
            example_id: example.id,
            query_pattern: example.query_pattern,
            correct_response: example.correct_response,
        })
        .collect();

    for hint in &hints {
        if let Err(e) = store.increment_usage(&hint.example_id) {
            warn!(example_id = %hint.example_id, error = %e, "usage count not updated");
        }
    }
    hints
}

#[async_trait]
impl ICorrectionHints for CorrectionHintProvider {
    async fn hints_for(
        &self,
        query_text: &str,
        domain: Domain,
        limit: usize,
    ) -> Vec<CorrectionHint> {
        if limit == 0 {
            return Vec::new();
        }
        let Some(collection) = self.catalog.collection(domain) else {
            return Vec::new();
        };
        let scope = FeedbackScope::new(self.tenant_id.as_str(), collection);
        let store = self.store.clone();
        let query_text = query_text.to_string();

        match tokio::task::spawn_blocking(move || lookup(store.as_ref(), &scope, &query_text, limit))
            .await
        {
            Ok(hints) => hints,
            Err(e) => {
                warn!(domain = %domain, error = %e, "correction hint lookup aborted");
                Vec::new()
            }
        }
    }
}
