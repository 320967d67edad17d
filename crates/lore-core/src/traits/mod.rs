mod correction_hints;
mod feedback_store;
mod oracle;
mod passage_store;
mod session_sink;

pub use correction_hints::{CorrectionHint, ICorrectionHints};
pub use feedback_store::IFeedbackStore;
pub use oracle::{Completion, CompletionOptions, IEmbeddingProvider, ILlmOracle};
pub use passage_store::{IKnowledgeIngestor, IPassageStore, PassageHit, SearchInput};
pub use session_sink::ISessionSink;
