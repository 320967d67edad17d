//! Corrected documentation bundled from training examples for ingestion.

use chrono::Utc;

use lore_core::constants::CORRECTION_DOCUMENT_CATEGORY;
use lore_core::models::{CorrectionDocument, TrainingExample};

pub fn correction_document(example: &TrainingExample) -> CorrectionDocument {
    let explanation = if example.notes.trim().is_empty() {
        "Corrected based on user feedback".to_string()
    } else {
        format!("Corrected based on user feedback: {}", example.notes.trim())
    };
    CorrectionDocument {
        query_pattern: example.query_pattern.clone(),
        correct_response: example.correct_response.clone(),
        explanation,
        category: CORRECTION_DOCUMENT_CATEGORY.to_string(),
        created_at: Utc::now(),
    }
}

pub fn correction_documents(examples: &[TrainingExample]) -> Vec<CorrectionDocument> {
    examples.iter().map(correction_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::ValidationStatus;

    fn example(notes: &str) -> TrainingExample {
        TrainingExample {
            id: "ex-1".into(),
            correction_id: "c-1".into(),
            tenant_id: "acme".into(),
            domain_id: "database-kb".into(),
            query_pattern: "which columns are in table [TABLE]?".into(),
            correct_response: "id, total".into(),
            incorrect_response: String::new(),
            notes: notes.into(),
            weight: 1.0,
            validation_status: ValidationStatus::Pending,
            usage_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn document_carries_pattern_and_category() {
        let doc = correction_document(&example("missing columns"));
        assert_eq!(doc.query_pattern, "which columns are in table [TABLE]?");
        assert_eq!(doc.category, "user_corrections");
        assert_eq!(doc.explanation, "Corrected based on user feedback: missing columns");

        let json = serde_json::to_value(&doc).unwrap();
        for key in ["query_pattern", "correct_response", "explanation", "category", "created_at"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn empty_notes_leave_a_plain_explanation() {
        assert_eq!(
            correction_document(&example("  ")).explanation,
            "Corrected based on user feedback"
        );
    }
}
