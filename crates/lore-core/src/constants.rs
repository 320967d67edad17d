/// Lore system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the built-in domain keyword table used by the classifier.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

/// Expansion phrasing count is clamped to this range.
pub const MIN_EXPANSION_QUERIES: usize = 3;
pub const MAX_EXPANSION_QUERIES: usize = 5;

/// Hard ceiling on candidates ever sent to a relevance oracle.
pub const MAX_RERANK_CEILING: usize = 100;

/// Characters of a secondary answer surfaced as a related note.
pub const RELATED_EXCERPT_CHARS: usize = 200;

/// Separator placed between contexts in synthesis prompts.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Improvement type recorded for correction-driven knowledge updates.
pub const IMPROVEMENT_KIND_CONTENT_UPDATE: &str = "content_update";

/// Category attached to corrected documentation submitted for ingestion.
pub const CORRECTION_DOCUMENT_CATEGORY: &str = "user_corrections";
