//! Improvement lifecycle and reviewer operations on stored feedback records.

pub mod documents;
mod improvements;
mod review;
