// Postgres (PostGIS) implementation of the store traits

pub mod models;
pub mod operations;

use std::future::Future;
use std::time::Duration;

use crate::store::{StoreError, StoreResult};

pub use operations::PgStore;

/// Budget of a single write.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Budget of a single read or aggregation.
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one store operation under a deadline. An elapsed deadline is an
/// error; the operation is not retried.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => {
            tracing::warn!("Store operation {} exceeded {:?}", operation, limit);
            Err(StoreError::Timeout(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn elapsed_deadline_is_a_timeout() {
        let result: StoreResult<()> = with_timeout(
            "find_entry",
            Duration::from_millis(10),
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(StoreError::Timeout("find_entry"))));
    }

    #[tokio::test]
    async fn errors_pass_through_the_deadline() {
        let result: StoreResult<()> = with_timeout("insert_entry", WRITE_TIMEOUT, async {
            Err(sqlx::Error::RowNotFound)
        })
        .await;

        assert!(matches!(result, Err(StoreError::Database(sqlx::Error::RowNotFound))));
    }
}
