pub mod reranker;

pub use reranker::{parse_scores, RerankOutput, Reranker};
