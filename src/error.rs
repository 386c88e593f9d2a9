//! Error types for recommendation operations

use thiserror::Error;

/// Errors a recommender can return for a single key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    /// Not enough processing units to make a meaningful recommendation
    #[error("cannot make recommendations with just 1 CPU (got {cpus})")]
    InsufficientResources { cpus: i64 },

    /// Key is not one this recommender knows how to tune
    #[error("unknown key: {0}")]
    UnknownKey(String),
}
