// Store trait implementations over a shared connection pool

pub mod alert_type;
pub mod entry;
pub mod user;

use sqlx::PgPool;

/// Postgres backed store. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
