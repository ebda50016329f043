use std::sync::Arc;
use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::rate_limit_key;

/// Fixed window request counters.
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// Counts one request from `client` and returns the count within the
    /// current window. The window starts with the first request.
    pub async fn hit(
        redis: &Arc<RedisClient>,
        client: &str,
        window: Duration,
    ) -> redis::RedisResult<u64> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let key = rate_limit_key(client);

        let count: u64 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window.as_secs() as i64).await?;
        }

        Ok(count)
    }
}
