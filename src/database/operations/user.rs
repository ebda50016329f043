use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::PgStore;
use crate::database::models::{USER_COLUMNS, UserEntity};
use crate::database::{READ_TIMEOUT, WRITE_TIMEOUT, with_timeout};
use crate::models::{Rank, Ranking, User, UserChanges};
use crate::store::{ReporterCount, StoreResult, UserStore};

const TOP_REPORTER: &str = r#"
    SELECT u.user_id, COUNT(e.entry_id) AS num_incidents
    FROM users u
    INNER JOIN entries e ON e.uploaded_by = u.user_id
    WHERE u.status = 'enabled' AND e.status = 'enabled'
    GROUP BY u.user_id
    ORDER BY num_incidents DESC, u.user_id ASC
    LIMIT 1
"#;

const LOCK_TOP_ALPHA: &str = r#"
    SELECT user_id FROM users
    WHERE is_top_alpha AND status = 'enabled'
    ORDER BY user_id
    LIMIT 1
    FOR UPDATE
"#;

fn into_user(row: Option<UserEntity>) -> StoreResult<Option<User>> {
    row.map(User::try_from).transpose()
}

/// Compare-and-swap of the top alpha flag inside one transaction. The current
/// holder row stays locked until commit, so a concurrent promotion either
/// waits and then sees a different holder, or trips the single holder index.
async fn swap_top_alpha(
    pool: &PgPool,
    expected_holder: Option<&str>,
    winner: &str,
    ranking: &Ranking,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let current: Option<String> = sqlx::query_scalar(LOCK_TOP_ALPHA)
        .fetch_optional(&mut *tx)
        .await?;
    if current.as_deref() != expected_holder {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE users SET is_top_alpha = FALSE WHERE is_top_alpha AND user_id <> $1")
        .bind(winner)
        .execute(&mut *tx)
        .await?;

    let promoted = sqlx::query(
        "UPDATE users SET rank = $2, is_top_alpha = $3, num_incidents = $4, rank_updated_at = $5 \
         WHERE user_id = $1 AND status = 'enabled'",
    )
    .bind(winner)
    .bind(i16::from(ranking.rank))
    .bind(ranking.is_top_alpha)
    .bind(ranking.num_incidents)
    .bind(ranking.last_updated)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if promoted == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}

impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        with_timeout(
            "insert_user",
            WRITE_TIMEOUT,
            sqlx::query(
                r#"
                INSERT INTO users (
                    user_id, username, email, password_hash, is_admin, admin_role,
                    rank, is_top_alpha, num_incidents, rank_updated_at,
                    status, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(&user.user_id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_admin)
            .bind(user.admin_role.map(|role| role.as_str()))
            .bind(i16::from(user.ranking.rank))
            .bind(user.ranking.is_top_alpha)
            .bind(user.ranking.num_incidents)
            .bind(user.ranking.last_updated)
            .bind(user.status.as_str())
            .bind(user.created)
            .bind(user.updated)
            .execute(self.pool()),
        )
        .await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str, is_admin: bool) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE user_id = $1 AND is_admin = $2 AND status = 'enabled'"
        );
        let row = with_timeout(
            "find_user",
            READ_TIMEOUT,
            sqlx::query_as::<_, UserEntity>(&sql)
                .bind(user_id)
                .bind(is_admin)
                .fetch_optional(self.pool()),
        )
        .await?;
        into_user(row)
    }

    async fn find_user_by_email(&self, email: &str, is_admin: bool) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE email = $1 AND is_admin = $2 AND status = 'enabled'"
        );
        let row = with_timeout(
            "find_user_by_email",
            READ_TIMEOUT,
            sqlx::query_as::<_, UserEntity>(&sql)
                .bind(email)
                .bind(is_admin)
                .fetch_optional(self.pool()),
        )
        .await?;
        into_user(row)
    }

    async fn list_users(&self, is_admin: bool) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE is_admin = $1 AND status = 'enabled' ORDER BY created_at"
        );
        let rows = with_timeout(
            "list_users",
            READ_TIMEOUT,
            sqlx::query_as::<_, UserEntity>(&sql)
                .bind(is_admin)
                .fetch_all(self.pool()),
        )
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_user(
        &self,
        user_id: &str,
        is_admin: bool,
        changes: &UserChanges,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users SET
                username = COALESCE($3, username),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                admin_role = CASE WHEN is_admin THEN COALESCE($6, admin_role) ELSE admin_role END,
                updated_at = $7
            WHERE user_id = $1 AND is_admin = $2 AND status = 'enabled'
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = with_timeout(
            "update_user",
            WRITE_TIMEOUT,
            sqlx::query_as::<_, UserEntity>(&sql)
                .bind(user_id)
                .bind(is_admin)
                .bind(changes.username.as_deref())
                .bind(changes.email.as_deref())
                .bind(changes.password_hash.as_deref())
                .bind(changes.admin_role.map(|role| role.as_str()))
                .bind(updated)
                .fetch_optional(self.pool()),
        )
        .await?;
        into_user(row)
    }

    async fn delete_user(&self, user_id: &str, is_admin: bool, updated: DateTime<Utc>) -> StoreResult<bool> {
        let result = with_timeout(
            "delete_user",
            WRITE_TIMEOUT,
            sqlx::query(
                "UPDATE users SET status = 'deleted', is_top_alpha = FALSE, updated_at = $3 \
                 WHERE user_id = $1 AND is_admin = $2 AND status = 'enabled'",
            )
            .bind(user_id)
            .bind(is_admin)
            .bind(updated)
            .execute(self.pool()),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_top_alpha(&self) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE is_top_alpha AND status = 'enabled' ORDER BY user_id LIMIT 1"
        );
        let row = with_timeout(
            "find_top_alpha",
            READ_TIMEOUT,
            sqlx::query_as::<_, UserEntity>(&sql).fetch_optional(self.pool()),
        )
        .await?;
        into_user(row)
    }

    async fn count_active_entries(&self, user_id: &str) -> StoreResult<i64> {
        with_timeout(
            "count_active_entries",
            READ_TIMEOUT,
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM entries WHERE uploaded_by = $1 AND status = 'enabled'",
            )
            .bind(user_id)
            .fetch_one(self.pool()),
        )
        .await
    }

    async fn top_reporter(&self) -> StoreResult<Option<ReporterCount>> {
        with_timeout(
            "top_reporter",
            READ_TIMEOUT,
            sqlx::query_as::<_, ReporterCount>(TOP_REPORTER).fetch_optional(self.pool()),
        )
        .await
    }

    async fn save_rank(&self, user_id: &str, rank: Rank, last_updated: DateTime<Utc>) -> StoreResult<()> {
        with_timeout(
            "save_rank",
            WRITE_TIMEOUT,
            sqlx::query("UPDATE users SET rank = $2, rank_updated_at = $3 WHERE user_id = $1")
                .bind(user_id)
                .bind(i16::from(rank))
                .bind(last_updated)
                .execute(self.pool()),
        )
        .await?;
        Ok(())
    }

    async fn promote_top_alpha(
        &self,
        expected_holder: Option<&str>,
        winner: &str,
        ranking: &Ranking,
    ) -> StoreResult<bool> {
        with_timeout(
            "promote_top_alpha",
            WRITE_TIMEOUT,
            swap_top_alpha(self.pool(), expected_holder, winner, ranking),
        )
        .await
    }
}
