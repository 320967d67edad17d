//! Test fixtures for Lore: golden datasets plus scripted collaborators.
//!
//! The fakes here stand in for the LLM oracle, the passage store, the
//! ingestion endpoint, and the session sink so pipelines can be exercised
//! deterministically from any crate's tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use lore_core::errors::{LoreResult, OracleError, PassageStoreError};
use lore_core::models::{CorrectionDocument, CorrectionRecord, ProblemCategory, SessionEvent};
use lore_core::traits::{
    Completion, CompletionOptions, IKnowledgeIngestor, ILlmOracle, IPassageStore,
    ISessionSink, PassageHit, SearchInput,
};
use lore_core::Domain;

// --- Golden data ---

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// One routing expectation from `classifier_queries.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierCase {
    pub query: String,
    pub primary: Domain,
    pub secondaries: Vec<Domain>,
}

pub fn classifier_cases() -> Vec<ClassifierCase> {
    load_fixture("classifier_queries.json")
}

/// One correction from `corrections.json`, with the pattern it should generalize to.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionCase {
    pub query_text: String,
    pub incorrect_response: String,
    pub corrected_response: String,
    pub notes: String,
    pub category: String,
    pub expected_pattern: String,
}

impl CorrectionCase {
    pub fn to_record(&self, tenant_id: &str, domain_id: &str) -> CorrectionRecord {
        let mut record = correction(
            tenant_id,
            domain_id,
            &self.query_text,
            &self.corrected_response,
        );
        record.incorrect_response = self.incorrect_response.clone();
        record.notes = self.notes.clone();
        record.category = ProblemCategory::parse_lenient(&self.category);
        record
    }
}

pub fn correction_cases() -> Vec<CorrectionCase> {
    load_fixture("corrections.json")
}

// --- Builders ---

/// A pending correction with an empty incorrect response and no notes.
pub fn correction(
    tenant_id: &str,
    domain_id: &str,
    query_text: &str,
    corrected_response: &str,
) -> CorrectionRecord {
    CorrectionRecord::new(tenant_id, domain_id, query_text, "", corrected_response)
}

pub fn hit(passage_id: &str, text: &str, score: f64) -> PassageHit {
    PassageHit {
        passage_id: passage_id.to_string(),
        text: text.to_string(),
        score,
        source_uri: None,
        chunk_id: None,
    }
}

// --- Scripted oracle ---

#[derive(Clone)]
enum Script {
    Reply(Completion),
    Fail(OracleError),
    Stall(Duration, Completion),
}

/// LLM oracle that answers by prompt substring. First matching rule wins.
pub struct ScriptedOracle {
    rules: Mutex<Vec<(String, Script)>>,
    fallback: Mutex<Script>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    /// An oracle whose unmatched prompts fail with `EmptyResponse`.
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            fallback: Mutex::new(Script::Fail(OracleError::EmptyResponse)),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// An oracle that fails every call.
    pub fn offline() -> Self {
        let oracle = Self::new();
        oracle.otherwise_fail(OracleError::Unavailable {
            provider: "scripted".into(),
            reason: "offline".into(),
        });
        oracle
    }

    pub fn when(&self, needle: &str, reply: &str) -> &Self {
        self.push(needle, Script::Reply(Completion::text(reply)));
        self
    }

    pub fn when_with_thinking(&self, needle: &str, reply: &str, thinking: &str) -> &Self {
        self.push(
            needle,
            Script::Reply(Completion {
                text: reply.to_string(),
                thinking: Some(thinking.to_string()),
            }),
        );
        self
    }

    pub fn fail_when(&self, needle: &str, error: OracleError) -> &Self {
        self.push(needle, Script::Fail(error));
        self
    }

    /// Sleep for `delay` before replying. Used to trip timeouts.
    pub fn stall_when(&self, needle: &str, delay: Duration, reply: &str) -> &Self {
        self.push(needle, Script::Stall(delay, Completion::text(reply)));
        self
    }

    pub fn otherwise(&self, reply: &str) -> &Self {
        *self.fallback.lock().unwrap() = Script::Reply(Completion::text(reply));
        self
    }

    pub fn otherwise_fail(&self, error: OracleError) -> &Self {
        *self.fallback.lock().unwrap() = Script::Fail(error);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of received prompts containing `needle`.
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }

    fn push(&self, needle: &str, script: Script) {
        self.rules.lock().unwrap().push((needle.to_string(), script));
    }

    fn script_for(&self, prompt: &str) -> Script {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

#[async_trait]
impl ILlmOracle for ScriptedOracle {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script_for(prompt) {
            Script::Reply(mut completion) => {
                if options.thinking_budget.is_none() {
                    completion.thinking = None;
                }
                Ok(completion)
            }
            Script::Fail(err) => Err(err),
            Script::Stall(delay, completion) => {
                tokio::time::sleep(delay).await;
                Ok(completion)
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// --- Static passage store ---

enum CollectionScript {
    Hits(Vec<PassageHit>),
    Fail(PassageStoreError),
    Stall(Duration),
}

/// Passage store serving fixed hits per collection.
///
/// Per-query hits (matched by substring of the search text) take precedence
/// over the collection's default hits.
#[derive(Default)]
pub struct StaticPassageStore {
    collections: Mutex<HashMap<String, CollectionScript>>,
    by_query: Mutex<Vec<(String, String, Vec<PassageHit>)>>,
    searches: Mutex<Vec<(String, SearchInput)>>,
}

impl StaticPassageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(self, collection: &str, hits: Vec<PassageHit>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), CollectionScript::Hits(hits));
        self
    }

    pub fn with_query_hits(self, collection: &str, needle: &str, hits: Vec<PassageHit>) -> Self {
        self.by_query
            .lock()
            .unwrap()
            .push((collection.to_string(), needle.to_string(), hits));
        self
    }

    pub fn failing(self, collection: &str, error: PassageStoreError) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), CollectionScript::Fail(error));
        self
    }

    pub fn stalling(self, collection: &str, delay: Duration) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), CollectionScript::Stall(delay));
        self
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    /// Collections searched so far, in call order.
    pub fn searched_collections(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Text inputs searched so far, in call order.
    pub fn searched_texts(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, input)| match input {
                SearchInput::Text(t) => Some(t.clone()),
                SearchInput::Embedding(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl IPassageStore for StaticPassageStore {
    async fn search(
        &self,
        input: &SearchInput,
        collection_id: &str,
        k: usize,
    ) -> Result<Vec<PassageHit>, PassageStoreError> {
        self.searches
            .lock()
            .unwrap()
            .push((collection_id.to_string(), input.clone()));

        if let SearchInput::Text(text) = input {
            let by_query = self.by_query.lock().unwrap();
            if let Some((_, _, hits)) = by_query
                .iter()
                .find(|(c, needle, _)| c == collection_id && text.contains(needle.as_str()))
            {
                return Ok(hits.iter().take(k).cloned().collect());
            }
        }

        let stall = {
            let collections = self.collections.lock().unwrap();
            match collections.get(collection_id) {
                Some(CollectionScript::Hits(hits)) => {
                    return Ok(hits.iter().take(k).cloned().collect())
                }
                Some(CollectionScript::Fail(err)) => return Err(err.clone()),
                Some(CollectionScript::Stall(delay)) => *delay,
                None => {
                    return Err(PassageStoreError::CollectionNotFound {
                        collection: collection_id.to_string(),
                    })
                }
            }
        };
        tokio::time::sleep(stall).await;
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "static"
    }
}

// --- Ingestion and session sinks ---

/// Ingestor that records submissions and hands out sequential job ids.
#[derive(Default)]
pub struct RecordingIngestor {
    submissions: Mutex<Vec<(String, Vec<CorrectionDocument>)>>,
    failure: Mutex<Option<PassageStoreError>>,
}

impl RecordingIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: PassageStoreError) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            failure: Mutex::new(Some(error)),
        }
    }

    pub fn submissions(&self) -> Vec<(String, Vec<CorrectionDocument>)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl IKnowledgeIngestor for RecordingIngestor {
    async fn submit(
        &self,
        collection_id: &str,
        documents: &[CorrectionDocument],
    ) -> Result<String, PassageStoreError> {
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((collection_id.to_string(), documents.to_vec()));
        Ok(format!("job-{}", submissions.len()))
    }
}

/// Session sink that keeps every appended event in memory.
#[derive(Default)]
pub struct RecordingSessionSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSessionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ISessionSink for RecordingSessionSink {
    async fn append(&self, event: &SessionEvent) -> LoreResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
