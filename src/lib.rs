use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use config::Config;
use database::PgStore;
use geocode::Geocoder;
use ranking::{LocationRankingEngine, SystemClock, UserRankingEngine};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod geocode;
pub mod middleware;
pub mod models;
pub mod ranking;
pub mod result;
pub mod router;
pub mod routes;
pub mod scheduler;
pub mod store;
pub mod utils;

pub type LocationRanker = LocationRankingEngine<PgStore, SystemClock>;
pub type UserRanker = UserRankingEngine<PgStore, SystemClock>;

#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub geocoder: Geocoder,
    pub location_ranking: Arc<LocationRanker>,
    pub user_ranking: Arc<UserRanker>,
}

impl AppState {
    pub fn new(pool: PgPool, redis: RedisClient, config: Config) -> Self {
        let store = PgStore::new(pool);
        Self {
            geocoder: Geocoder::new(config.google_maps_key.clone()),
            location_ranking: Arc::new(LocationRankingEngine::new(store.clone(), SystemClock)),
            user_ranking: Arc::new(UserRankingEngine::new(store.clone(), SystemClock)),
            store,
            config,
            redis: Arc::new(redis),
        }
    }
}
