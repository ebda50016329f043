//! Location safety scoring and user reputation ranking.

pub mod clock;
pub mod location;
pub mod user;

use thiserror::Error;

use crate::store::StoreError;

pub use clock::{Clock, SystemClock};
pub use location::LocationRankingEngine;
pub use user::{AlphaOutcome, UserRankingEngine};

#[derive(Debug, Error)]
pub enum RankingError {
    /// No enabled user currently holds the top alpha flag.
    #[error("no top alpha user is currently assigned")]
    NoTopAlpha,
    #[error("top alpha holds an invalid incident count of {0}")]
    InvalidAlpha(i64),
    #[error("failed to convert aggregation result")]
    AggregationShape,
    #[error("top alpha changed while promoting user {0}")]
    AlphaConflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RankingError {
    /// Maps decode failures of an aggregation row to [`RankingError::AggregationShape`].
    fn from_aggregation(err: StoreError) -> Self {
        match err {
            StoreError::Decode(reason) => {
                tracing::error!("Aggregation result has an unexpected shape: {}", reason);
                RankingError::AggregationShape
            }
            other => RankingError::Store(other),
        }
    }
}
