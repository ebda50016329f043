// Redis backed caches: location rankings and rate limit counters

pub mod keys;
pub mod operations;

pub use operations::{RankingCacheOperations, RateLimitCacheOperations};
