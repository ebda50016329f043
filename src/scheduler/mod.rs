//! Periodic top alpha recomputation.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::ranking::{AlphaOutcome, Clock, RankingError, UserRankingEngine};
use crate::store::UserStore;

/// Runs one alpha recomputation and logs its outcome. Errors are logged and
/// returned; the next scheduled run starts from whatever state the store holds.
pub async fn run_alpha_job<S: UserStore, C: Clock>(
    engine: &UserRankingEngine<S, C>,
) -> Result<AlphaOutcome, RankingError> {
    match engine.recompute_top_alpha().await {
        Ok(outcome) => {
            match &outcome {
                AlphaOutcome::NoCandidate => tracing::info!("Alpha job: no candidate"),
                AlphaOutcome::Retained { user_id, num_incidents } => tracing::info!(
                    "Alpha job: {} retained top alpha with {} incidents",
                    user_id,
                    num_incidents
                ),
                AlphaOutcome::Promoted { user_id, num_incidents, .. } => tracing::info!(
                    "Alpha job: {} promoted with {} incidents",
                    user_id,
                    num_incidents
                ),
            }
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Alpha job failed: {}", e);
            Err(e)
        }
    }
}

/// Registers the alpha job on `cron` (six fields, seconds first) and starts
/// the scheduler.
pub async fn start_scheduler<S, C>(
    engine: Arc<UserRankingEngine<S, C>>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError>
where
    S: UserStore + 'static,
    C: Clock + 'static,
{
    let sched = JobScheduler::new().await?;

    sched
        .add(Job::new_async(cron, move |_, _| {
            let engine = engine.clone();
            Box::pin(async move {
                // already logged
                let _ = run_alpha_job(engine.as_ref()).await;
            })
        })?)
        .await?;

    sched.start().await?;
    tracing::info!("Alpha job scheduled on `{}`", cron);
    Ok(sched)
}
