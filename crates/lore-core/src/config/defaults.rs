// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_RESULTS_PER_STRATEGY: usize = 5;
pub const DEFAULT_EXPANSION_QUERIES: usize = 4;
pub const DEFAULT_RUNNER_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 12_000;

// --- Rerank ---
pub const DEFAULT_RERANK_ENABLED: bool = true;
pub const DEFAULT_RERANK_MAX_CANDIDATES: usize = 20;
pub const DEFAULT_RERANK_TOP_K: usize = 5;
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.0;
pub const DEFAULT_RERANK_MAX_TOKENS: u32 = 1_500;

// --- Synthesis ---
pub const DEFAULT_SYNTHESIS_MAX_TOKENS: u32 = 4_000;
pub const DEFAULT_SYNTHESIS_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_THINKING_BUDGET_TOKENS: u32 = 2_000;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 4_000;
pub const DEFAULT_CORRECTION_HINTS: usize = 3;

// --- Oracle ---
pub const DEFAULT_ORACLE_PROVIDER: &str = "openai";
pub const DEFAULT_ORACLE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ORACLE_API_KEY_ENV: &str = "LORE_API_KEY";
pub const DEFAULT_ORACLE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EXPANSION_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_EXPANSION_MAX_TOKENS: u32 = 1_500;
pub const DEFAULT_HYDE_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_HYDE_MAX_TOKENS: u32 = 1_000;
pub const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 10_000;

// --- Passage store ---
pub const DEFAULT_PASSAGE_STORE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PASSAGE_STORE_API_KEY_ENV: &str = "LORE_STORE_API_KEY";
pub const DEFAULT_PASSAGE_STORE_TIMEOUT_MS: u64 = 4_000;

// --- Cache ---
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

// --- Domains ---
pub const DEFAULT_DATABASE_COLLECTION: &str = "database-kb";
pub const DEFAULT_SUPPORT_COLLECTION: &str = "support-kb";
pub const DEFAULT_DOCUMENTATION_COLLECTION: &str = "documentation-kb";

// --- Learning ---
pub const DEFAULT_FEEDBACK_DB_PATH: &str = "lore-feedback.db";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;
pub const DEFAULT_EXAMPLE_WEIGHT: f64 = 1.0;

// --- Session ---
pub const DEFAULT_SESSION_ENABLED: bool = true;
pub const DEFAULT_SESSION_CHANNEL_CAPACITY: usize = 1_024;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
