/// Cache key builders

pub mod ranking_keys;
pub mod rate_limit_keys;

pub use ranking_keys::{LOCATION_RANKING_VERSION_KEY, location_ranking_key};
pub use rate_limit_keys::rate_limit_key;
