use axum::extract::{Json, Query, State};

use crate::{
    AppState,
    cache::RankingCacheOperations,
    error::AppResult,
    models::LocationRanking,
    result::ApiResponse,
    routes::validate_coordinates,
    utils::success_to_api_response,
};

use super::model::LocationQuery;

/// Safety classification of a coordinate, served from redis when fresh.
/// Entry writes start a new cache generation, so deleted entries stop counting
/// immediately. Redis problems only cost the cache.
#[axum::debug_handler]
pub async fn location_ranking(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ApiResponse<LocationRanking>>> {
    validate_coordinates(query.lat, query.lng)?;
    let cache = RankingCacheOperations::new(state.redis.clone());

    let generation = match cache.generation().await {
        Ok(generation) => Some(generation),
        Err(e) => {
            tracing::warn!("Location ranking cache unavailable: {}", e);
            None
        }
    };

    if let Some(generation) = generation {
        match cache.get_location_ranking(generation, query.lat, query.lng).await {
            Ok(Some(ranking)) => {
                tracing::debug!("Location ranking cache hit for ({}, {})", query.lat, query.lng);
                return Ok(success_to_api_response(ranking));
            }
            Ok(None) => {
                tracing::debug!("Location ranking cache miss for ({}, {})", query.lat, query.lng);
            }
            Err(e) => tracing::warn!("Location ranking cache unavailable: {}", e),
        }
    }

    let ranking = state.location_ranking.rank_location(query.lat, query.lng).await?;

    if let Some(generation) = generation {
        if let Err(e) = cache
            .cache_location_ranking(generation, query.lat, query.lng, &ranking)
            .await
        {
            tracing::warn!("Failed to cache location ranking: {}", e);
        }
    }

    Ok(success_to_api_response(ranking))
}

/// Retires cached location rankings after a write that changes what they
/// count. Failures are logged; the cache then expires on its own.
pub(crate) async fn invalidate_rankings(state: &AppState) {
    let cache = RankingCacheOperations::new(state.redis.clone());
    match cache.invalidate_location_rankings().await {
        Ok(generation) => tracing::debug!("Location ranking cache generation {}", generation),
        Err(e) => tracing::warn!("Failed to invalidate location rankings: {}", e),
    }
}
