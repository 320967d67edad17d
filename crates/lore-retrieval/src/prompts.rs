//! Prompt templates for every oracle call the pipeline makes.

use lore_core::constants::CONTEXT_SEPARATOR;
use lore_core::models::RetrievalCandidate;
use lore_core::traits::CorrectionHint;
use lore_core::Domain;

pub fn expansion_prompt(query: &str, count: usize) -> String {
    format!(
        "Rewrite the following question in {count} semantically different ways to improve \
         document retrieval. Vary the vocabulary, structure, and perspective while keeping \
         the same information need.\n\n\
         QUESTION: {query}\n\n\
         Reply with the rewrites only, one per line, without numbering or commentary."
    )
}

pub fn hyde_prompt(query: &str, domain: Domain) -> String {
    let register = match domain {
        Domain::Database => {
            "database documentation, naming concrete tables, columns, keys, and relationships"
        }
        Domain::Support => "a support knowledge-base article describing symptoms, causes, and fixes",
        Domain::Documentation => "product documentation with step-by-step instructions",
    };
    format!(
        "Write a short passage that would perfectly answer the question below, in the style of \
         {register}.\n\n\
         QUESTION: {query}\n\n\
         Reply with the passage only."
    )
}

pub fn rerank_prompt(query: &str, candidates: &[RetrievalCandidate]) -> String {
    let mut prompt = format!(
        "Rate how relevant each passage is to the question on a scale from 0.0 (irrelevant) \
         to 1.0 (directly answers it).\n\nQUESTION: {query}\n\n"
    );
    for (index, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("[{index}] {}\n\n", candidate.text.trim()));
    }
    prompt.push_str(
        "Reply with a JSON array only, one object per passage: \
         [{\"index\": 0, \"score\": 0.9, \"explanation\": \"...\"}]",
    );
    prompt
}

pub fn synthesis_prompt(
    query: &str,
    domain: Domain,
    contexts: &[String],
    hints: &[CorrectionHint],
) -> String {
    let role = match domain {
        Domain::Database => "a database expert who answers with precise table, column, and SQL details",
        Domain::Support => "a support engineer who gives concrete troubleshooting steps",
        Domain::Documentation => "a technical writer who explains features clearly",
    };
    let mut prompt = format!(
        "You are {role}. Answer the question using only the context below. \
         Format the answer as structured markdown. If the context is insufficient, \
         say what is missing.\n\n\
         CONTEXT:\n{}\n\n",
        contexts.join(CONTEXT_SEPARATOR)
    );
    if !hints.is_empty() {
        prompt.push_str(
            "--- USER CORRECTIONS ---\n\
             Users corrected earlier answers to similar questions. Prioritize these:\n",
        );
        for hint in hints {
            prompt.push_str(&format!(
                "- For questions like \"{}\": {}\n",
                hint.query_pattern, hint.correct_response
            ));
        }
        prompt.push('\n');
    }
    prompt.push_str(&format!("QUESTION: {query}\n\nANSWER:"));
    prompt
}

pub fn relationship_prompt(table: &str, contexts: &[String]) -> String {
    format!(
        "Using only the database documentation excerpts below, describe every relationship \
         of the '{table}' table.\n\n\
         DOCUMENTATION EXCERPTS:\n{}\n\n\
         Cover:\n\
         1. The primary key of '{table}'\n\
         2. Foreign keys in '{table}' and the tables they reference\n\
         3. Tables with foreign keys referencing '{table}'\n\
         4. The overall relationship graph around '{table}'\n\
         5. Notable rules such as cascading deletes or indexing considerations\n\n\
         Format the report as markdown with bullet points or tables. \
         Say explicitly which of these the excerpts do not cover.\n\n\
         RELATIONSHIPS:",
        contexts.join(CONTEXT_SEPARATOR)
    )
}

pub fn sql_optimization_prompt(sql: &str, contexts: &[String]) -> String {
    format!(
        "Optimize the SQL query below using the schema information provided.\n\n\
         ORIGINAL SQL:\n```sql\n{}\n```\n\n\
         SCHEMA INFORMATION:\n{}\n\n\
         Reply with only:\n\
         1. The optimized SQL\n\
         2. Brief `--` comments explaining the key changes\n\
         3. Index recommendations as `--` comments\n\n\
         OPTIMIZED SQL:",
        sql.trim(),
        contexts.join(CONTEXT_SEPARATOR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_prompt_joins_contexts_and_appends_hints() {
        let hints = vec![CorrectionHint {
            example_id: "ex-1".into(),
            query_pattern: "which table stores [ORDER_ENTITY]".into(),
            correct_response: "sales_orders".into(),
        }];
        let prompt = synthesis_prompt(
            "which table stores orders",
            Domain::Database,
            &["A".to_string(), "B".to_string()],
            &hints,
        );
        assert!(prompt.contains("A\n\n---\n\nB"));
        assert!(prompt.contains("--- USER CORRECTIONS ---"));
        assert!(prompt.contains("sales_orders"));
    }

    #[test]
    fn synthesis_prompt_without_hints_has_no_corrections_section() {
        let prompt = synthesis_prompt("q", Domain::Support, &["ctx".to_string()], &[]);
        assert!(!prompt.contains("USER CORRECTIONS"));
    }

    #[test]
    fn analysis_prompts_embed_subject_and_contexts() {
        let contexts = ["A".to_string(), "B".to_string()];
        let prompt = relationship_prompt("orders", &contexts);
        assert!(prompt.contains("'orders' table"));
        assert!(prompt.contains("A\n\n---\n\nB"));

        let prompt = sql_optimization_prompt("  SELECT * FROM orders ", &contexts);
        assert!(prompt.contains("```sql\nSELECT * FROM orders\n```"));
        assert!(prompt.ends_with("OPTIMIZED SQL:"));
    }
}
