//! Schema analyses over a database collection: the relationships of one
//! table, and optimization advice for one SQL statement.
//!
//! Each analysis issues a fixed set of focused searches, merges the hits by
//! passage, keeps the best `MAX_ANALYSIS_CONTEXTS`, and asks the oracle for a
//! report. A failed search is skipped with a degradation; if every search
//! fails the analysis fails. A failed or late oracle call yields an apology
//! with a `SynthesisFailed` degradation.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use tokio::time::Instant;
use tracing::{info, warn, Instrument};

use lore_core::models::{Degradation, DegradationKind, RetrievalCandidate, StrategyKind};
use lore_core::traits::{CompletionOptions, ILlmOracle};
use lore_core::{Answer, Domain, LoreError, LoreResult};
use lore_observability::tracing_setup::events;

use crate::prompts;
use crate::search::merge_lists;
use crate::strategies::PassageSearcher;
use crate::synthesis::no_context_answer;

/// Contexts handed to the oracle for one analysis.
pub const MAX_ANALYSIS_CONTEXTS: usize = 10;

const ANALYSIS_MAX_TOKENS: u32 = 4_000;
const ANALYSIS_TEMPERATURE: f32 = 0.2;
/// Characters of the statement quoted in the optimization search.
const SQL_SEARCH_PREFIX_CHARS: usize = 100;

static SQL_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:from|join)\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap());

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaAnalysis {
    Relationships { table: String },
    SqlOptimization { sql: String },
}

impl SchemaAnalysis {
    pub fn relationships(table: impl Into<String>) -> Self {
        Self::Relationships {
            table: table.into().trim().to_string(),
        }
    }

    pub fn sql_optimization(sql: impl Into<String>) -> Self {
        Self::SqlOptimization {
            sql: sql.into().trim().to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Relationships { .. } => "relationships",
            Self::SqlOptimization { .. } => "sql_optimization",
        }
    }

    /// Searches issued against the collection, in order.
    pub fn search_queries(&self) -> Vec<String> {
        match self {
            Self::Relationships { table } => vec![
                format!("relationships of {table} table"),
                format!("{table} foreign keys"),
                format!("tables that reference {table}"),
                format!("{table} primary key"),
                format!("{table} table schema relationships"),
            ],
            Self::SqlOptimization { sql } => {
                let mut queries: Vec<String> = sql_tables(sql)
                    .into_iter()
                    .flat_map(|table| {
                        [
                            format!("{table} schema columns indexes"),
                            format!("{table} table structure"),
                            format!("{table} primary key and indexes"),
                        ]
                    })
                    .collect();
                let prefix: String = sql.chars().take(SQL_SEARCH_PREFIX_CHARS).collect();
                queries.push(format!("SQL query optimization for: {prefix}"));
                queries
            }
        }
    }

    fn prompt(&self, contexts: &[String]) -> String {
        match self {
            Self::Relationships { table } => prompts::relationship_prompt(table, contexts),
            Self::SqlOptimization { sql } => prompts::sql_optimization_prompt(sql, contexts),
        }
    }

    fn heading(&self) -> String {
        match self {
            Self::Relationships { table } => format!("Relationship analysis for table {table}"),
            Self::SqlOptimization { sql } => format!(
                "SQL optimization, tables: {}",
                sql_tables(sql).join(", ")
            ),
        }
    }
}

/// Tables named after `FROM` or `JOIN`, first occurrence order, case-insensitive dedup.
pub fn sql_tables(sql: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SQL_TABLE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|table| seen.insert(table.to_lowercase()))
        .collect()
}

pub struct SchemaAnalyzer {
    searcher: Arc<PassageSearcher>,
    oracle: Arc<dyn ILlmOracle>,
    options: CompletionOptions,
}

impl SchemaAnalyzer {
    pub fn new(
        searcher: Arc<PassageSearcher>,
        oracle: Arc<dyn ILlmOracle>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            searcher,
            oracle,
            options: CompletionOptions {
                model: model.into(),
                max_tokens: ANALYSIS_MAX_TOKENS,
                temperature: ANALYSIS_TEMPERATURE,
                thinking_budget: None,
                timeout,
            },
        }
    }

    /// Run `analysis` against `collection_id`. Searches stop at
    /// `search_deadline`, the oracle at `deadline`.
    ///
    /// The answer always carries the contexts used and a trace of the searches
    /// in `thinking`.
    pub async fn analyze(
        &self,
        analysis: &SchemaAnalysis,
        collection_id: &str,
        search_deadline: Instant,
        deadline: Instant,
    ) -> LoreResult<Answer> {
        let span = lore_observability::analysis_span!(analysis.name(), collection_id);
        self.run(analysis, collection_id, search_deadline, deadline)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        analysis: &SchemaAnalysis,
        collection_id: &str,
        search_deadline: Instant,
        deadline: Instant,
    ) -> LoreResult<Answer> {
        let queries = analysis.search_queries();
        let mut trace = vec![analysis.heading(), "Searches:".to_string()];
        trace.extend(queries.iter().enumerate().map(|(i, q)| format!("{}. {q}", i + 1)));

        let results = join_all(queries.iter().map(|query| {
            tokio::time::timeout_at(
                search_deadline,
                self.searcher.search(query, collection_id, StrategyKind::Standard),
            )
        }))
        .await;

        let mut degradations = Vec::new();
        let mut lists: Vec<Vec<RetrievalCandidate>> = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            let failure = match result {
                Ok(Ok(candidates)) => {
                    lists.push(candidates);
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => "search missed its deadline".to_string(),
            };
            warn!(analysis = analysis.name(), query = %query, reason = %failure, "analysis search failed");
            degradations.push(Degradation::new(
                DegradationKind::StrategyFailed,
                format!("analysis.{}.search", analysis.name()),
                failure,
                "remaining searches",
            ));
        }
        if lists.is_empty() {
            return Err(LoreError::AllTargetsFailed {
                domains: Domain::Database.to_string(),
            });
        }

        let found: usize = lists.iter().map(Vec::len).sum();
        let mut merged = merge_lists(lists);
        let unique = merged.len();
        merged.truncate(MAX_ANALYSIS_CONTEXTS);
        trace.push(format!(
            "Found {found} passages, {unique} unique, kept the top {}.",
            merged.len()
        ));
        let contexts: Vec<String> = merged.iter().map(|c| c.text.trim().to_string()).collect();

        let mut answer = if contexts.is_empty() {
            Answer::new(no_context_answer(Domain::Database), Domain::Database)
        } else {
            self.report(analysis, &contexts, deadline, &mut degradations)
                .await
        };
        info!(
            analysis = analysis.name(),
            contexts = contexts.len(),
            degradations = degradations.len(),
            "schema analysis finished"
        );
        answer.degradations = degradations;
        answer.contexts = Some(contexts);
        answer.thinking = Some(trace.join("\n"));
        Ok(answer)
    }

    async fn report(
        &self,
        analysis: &SchemaAnalysis,
        contexts: &[String],
        deadline: Instant,
        degradations: &mut Vec<Degradation>,
    ) -> Answer {
        let deadline = deadline.min(Instant::now() + self.options.timeout);
        let prompt = analysis.prompt(contexts);
        let reply =
            tokio::time::timeout_at(deadline, self.oracle.complete(&prompt, &self.options)).await;

        let reason = match reply {
            Ok(Ok(completion)) if !completion.text.trim().is_empty() => {
                return Answer::new(completion.text.trim(), Domain::Database);
            }
            Ok(Ok(_)) => "oracle returned an empty report".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "analysis missed its deadline".to_string(),
        };
        warn!(analysis = analysis.name(), reason = %reason, "schema analysis report failed");
        events::degradation_triggered("analysis", &reason, "apology answer");
        let fallback = LoreError::SynthesisFailed {
            reason: reason.clone(),
        }
        .user_message();
        degradations.push(Degradation::new(
            DegradationKind::SynthesisFailed,
            "analysis",
            reason,
            "apology answer",
        ));
        Answer::new(fallback, Domain::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_tables_follow_from_and_join_once_each() {
        let sql = "select o.id from Orders o join customers c on c.id = o.customer_id \
                   left JOIN orders x on x.id = o.id join sales.invoices i on i.order_id = o.id";
        assert_eq!(sql_tables(sql), vec!["Orders", "customers", "sales.invoices"]);
        assert!(sql_tables("select 1").is_empty());
    }

    #[test]
    fn optimization_searches_cover_each_table_then_the_statement() {
        let analysis = SchemaAnalysis::sql_optimization("SELECT * FROM orders JOIN customers ON true");
        let queries = analysis.search_queries();
        assert_eq!(queries.len(), 7);
        assert_eq!(queries[0], "orders schema columns indexes");
        assert_eq!(queries[3], "customers schema columns indexes");
        assert!(queries[6].starts_with("SQL query optimization for: SELECT * FROM orders"));
    }

    #[test]
    fn optimization_search_quotes_a_bounded_prefix() {
        let long = format!("SELECT {} FROM t", "x, ".repeat(100));
        let queries = SchemaAnalysis::sql_optimization(long).search_queries();
        let last = queries.last().unwrap();
        let quoted = last.trim_start_matches("SQL query optimization for: ");
        assert_eq!(quoted.chars().count(), SQL_SEARCH_PREFIX_CHARS);
    }

    #[test]
    fn relationship_searches_name_the_table() {
        let queries = SchemaAnalysis::relationships("  orders ").search_queries();
        assert_eq!(queries.len(), 5);
        assert!(queries.iter().all(|q| q.contains("orders")));
        assert_eq!(queries[0], "relationships of orders table");
    }
}
