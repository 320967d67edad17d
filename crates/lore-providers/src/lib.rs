//! # lore-providers
//!
//! Network implementations of the lore-core collaborator traits.
//! Providers are distinguished only by endpoint URL and API key.

pub mod auth;
pub mod embeddings;
pub mod openai_compatible;
pub mod passage_store;

pub use embeddings::OpenAiEmbeddingProvider;
pub use openai_compatible::OpenAiCompatibleOracle;
pub use passage_store::HttpPassageStore;
