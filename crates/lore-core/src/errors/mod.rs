mod config_error;
mod feedback_error;
mod lore_error;
mod oracle_error;
mod passage_store_error;
mod storage_error;

pub use config_error::ConfigError;
pub use feedback_error::FeedbackError;
pub use lore_error::{LoreError, LoreResult};
pub use oracle_error::OracleError;
pub use passage_store_error::PassageStoreError;
pub use storage_error::StorageError;
