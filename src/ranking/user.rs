use futures_util::future::try_join;
use tokio::sync::Mutex;

use super::{Clock, RankingError};
use crate::models::{Rank, Ranking, User};
use crate::store::UserStore;

/// Minimum percentile of the top alpha's count for the alpha tier.
pub const ALPHA_PERCENTILE: u64 = 80;
/// Minimum percentile for the beta tier.
pub const BETA_PERCENTILE: u64 = 40;

/// Result of a top alpha recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphaOutcome {
    /// No enabled user has an enabled entry.
    NoCandidate,
    /// The holder kept the flag; its count was refreshed.
    Retained { user_id: String, num_incidents: i64 },
    /// The flag moved to a new holder.
    Promoted {
        user_id: String,
        previous: Option<String>,
        num_incidents: i64,
    },
}

/// Ranks users against the current top reporter ("alpha").
pub struct UserRankingEngine<S, C> {
    store: S,
    clock: C,
    // serializes alpha recomputations within this process
    recompute_lock: Mutex<()>,
}

impl<S: UserStore, C: Clock> UserRankingEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            recompute_lock: Mutex::new(()),
        }
    }

    /// Selects the user with the most enabled entries and moves the top alpha
    /// flag onto them.
    pub async fn recompute_top_alpha(&self) -> Result<AlphaOutcome, RankingError> {
        let _guard = self.recompute_lock.lock().await;

        let Some(winner) = self.store.top_reporter().await? else {
            tracing::info!("No reporter with active entries, top alpha left unchanged");
            return Ok(AlphaOutcome::NoCandidate);
        };
        if winner.num_incidents <= 0 {
            return Err(RankingError::AggregationShape);
        }

        let previous = self
            .store
            .find_top_alpha()
            .await?
            .map(|holder| holder.user_id);

        let ranking = Ranking {
            rank: Rank::Alpha,
            is_top_alpha: true,
            num_incidents: winner.num_incidents,
            last_updated: Some(self.clock.now()),
        };

        let promoted = self
            .store
            .promote_top_alpha(previous.as_deref(), &winner.user_id, &ranking)
            .await?;
        if !promoted {
            tracing::warn!(
                "Top alpha changed concurrently, promotion of {} aborted",
                winner.user_id
            );
            return Err(RankingError::AlphaConflict(winner.user_id));
        }

        if previous.as_deref() == Some(winner.user_id.as_str()) {
            tracing::debug!(
                "User {} remains top alpha with {} incidents",
                winner.user_id,
                winner.num_incidents
            );
            Ok(AlphaOutcome::Retained {
                user_id: winner.user_id,
                num_incidents: winner.num_incidents,
            })
        } else {
            tracing::info!(
                "User {} promoted to top alpha with {} incidents (previous: {:?})",
                winner.user_id,
                winner.num_incidents,
                previous
            );
            Ok(AlphaOutcome::Promoted {
                user_id: winner.user_id,
                previous,
                num_incidents: winner.num_incidents,
            })
        }
    }

    /// Returns the user's ranking, recomputing it at most once per calendar day.
    pub async fn get_user_ranking(&self, user: &User) -> Result<Ranking, RankingError> {
        if self.is_fresh(&user.ranking) {
            tracing::debug!("Ranking cache hit for user {}", user.user_id);
            return Ok(user.ranking.clone());
        }
        self.compute_user_ranking(user).await
    }

    /// Whether the ranking was computed on the current local calendar date.
    pub fn is_fresh(&self, ranking: &Ranking) -> bool {
        ranking
            .last_updated
            .is_some_and(|at| self.clock.calendar_date(at) >= self.clock.today())
    }

    pub async fn compute_user_ranking(&self, user: &User) -> Result<Ranking, RankingError> {
        let (alpha, user_count) = try_join(
            self.store.find_top_alpha(),
            self.store.count_active_entries(&user.user_id),
        )
        .await?;
        let alpha = alpha.ok_or(RankingError::NoTopAlpha)?;

        let percentile = percentile(user_count, alpha.ranking.num_incidents)?;
        let rank = tier_for_percentile(percentile);
        let now = self.clock.now();

        self.store.save_rank(&user.user_id, rank, now).await?;
        tracing::debug!(
            "User {} ranked {} at percentile {}",
            user.user_id,
            rank.name(),
            percentile
        );

        Ok(Ranking {
            rank,
            last_updated: Some(now),
            ..user.ranking.clone()
        })
    }
}

/// `floor(user_count * 100 / alpha_count)` in integer arithmetic.
pub fn percentile(user_count: i64, alpha_count: i64) -> Result<u64, RankingError> {
    let alpha = u64::try_from(alpha_count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(RankingError::InvalidAlpha(alpha_count))?;
    let user = u64::try_from(user_count).map_err(|_| RankingError::AggregationShape)?;
    Ok(user * 100 / alpha)
}

pub fn tier_for_percentile(percentile: u64) -> Rank {
    if percentile >= ALPHA_PERCENTILE {
        Rank::Alpha
    } else if percentile >= BETA_PERCENTILE {
        Rank::Beta
    } else {
        Rank::Pup
    }
}
