use chrono::Duration;

use super::{Clock, RankingError};
use crate::models::{LocationRanking, SafetyLevel};
use crate::store::{EntryStore, IncidentQuery};

/// Search radius around the ranked coordinate, in metres.
pub const SEARCH_RADIUS_METERS: f64 = 5000.0;
/// Number of days of reports that feed a ranking.
pub const LOOKBACK_DAYS: u32 = 5;
/// Alert types below this level never count as incidents.
pub const MIN_SEVERITY_LEVEL: i32 = 3;

/// Classifies a coordinate from nearby, recent, severe reports.
pub struct LocationRankingEngine<S, C> {
    store: S,
    clock: C,
}

impl<S: EntryStore, C: Clock> LocationRankingEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn rank_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationRanking, RankingError> {
        let query = IncidentQuery {
            latitude,
            longitude,
            radius_meters: SEARCH_RADIUS_METERS,
            since: self.clock.now() - Duration::days(i64::from(LOOKBACK_DAYS)),
            min_level: MIN_SEVERITY_LEVEL,
        };

        let aggregate = self
            .store
            .count_incidents(&query)
            .await
            .map_err(RankingError::from_aggregation)?;

        let num_incidents = match aggregate {
            Some(row) => u32::try_from(row.num_incidents).map_err(|_| {
                tracing::error!("Incident count out of range: {}", row.num_incidents);
                RankingError::AggregationShape
            })?,
            None => 0,
        };

        if num_incidents == 0 {
            tracing::debug!("No incidents near ({}, {})", latitude, longitude);
            return Ok(LocationRanking::safe());
        }

        let average = f64::from(num_incidents) / f64::from(LOOKBACK_DAYS);
        Ok(LocationRanking {
            average,
            text: classify(average),
            num_incidents,
        })
    }
}

/// Maps an incidents-per-day average onto its safety band.
///
/// The bands leave a gap between 0.4 and 0.5; values there, negatives and NaN
/// are `Unknown`.
pub fn classify(average: f64) -> SafetyLevel {
    if (0.0..=0.4).contains(&average) {
        SafetyLevel::Safe
    } else if (0.5..=0.9).contains(&average) {
        SafetyLevel::Warning
    } else if average >= 1.0 {
        SafetyLevel::Unsafe
    } else {
        SafetyLevel::Unknown
    }
}
