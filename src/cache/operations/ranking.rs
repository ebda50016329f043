use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::{LOCATION_RANKING_VERSION_KEY, location_ranking_key};
use crate::models::LocationRanking;

/// Lifetime of a cached location ranking, in seconds.
pub const CACHE_EXPIRE: u64 = 120;

/// Short lived cache of computed location rankings. Any entry write bumps
/// the generation, so a cached ranking never outlives the entries it counted.
pub struct RankingCacheOperations {
    redis_client: Arc<RedisClient>,
}

impl RankingCacheOperations {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }

    /// Current cache generation; zero before the first entry write.
    pub async fn generation(&self) -> redis::RedisResult<u64> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let version: Option<u64> = conn.get(LOCATION_RANKING_VERSION_KEY).await?;
        Ok(version.unwrap_or(0))
    }

    pub async fn get_location_ranking(
        &self,
        generation: u64,
        latitude: f64,
        longitude: f64,
    ) -> redis::RedisResult<Option<LocationRanking>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn
            .get(location_ranking_key(generation, latitude, longitude))
            .await?;

        match cached {
            Some(json) => match serde_json::from_str(&json) {
                Ok(ranking) => Ok(Some(ranking)),
                Err(e) => {
                    tracing::warn!("Discarding unreadable cached ranking: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Stores `ranking` under the generation observed before it was computed,
    /// so a ranking racing an entry write lands in an already retired generation.
    pub async fn cache_location_ranking(
        &self,
        generation: u64,
        latitude: f64,
        longitude: f64,
        ranking: &LocationRanking,
    ) -> redis::RedisResult<()> {
        let json = serde_json::to_string(ranking).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "serialization error", e.to_string()))
        })?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(
                location_ranking_key(generation, latitude, longitude),
                json,
                CACHE_EXPIRE,
            )
            .await?;
        Ok(())
    }

    /// Starts a new cache generation; returns its number.
    pub async fn invalidate_location_rankings(&self) -> redis::RedisResult<u64> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        conn.incr(LOCATION_RANKING_VERSION_KEY, 1).await
    }
}
