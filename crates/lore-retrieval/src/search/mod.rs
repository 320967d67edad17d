pub mod cache;
pub mod merge;
pub mod runner;

pub use cache::RetrievalCache;
pub use merge::{merge, merge_lists};
pub use runner::{RunReport, StrategyRunner};
