/// Cache operations

pub mod ranking;
pub mod rate_limit;

pub use ranking::RankingCacheOperations;
pub use rate_limit::RateLimitCacheOperations;
