use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::parse_status;
use crate::models::{AdminRole, Rank, Ranking, User};
use crate::store::StoreError;

pub const USER_COLUMNS: &str = "user_id, username, email, password_hash, is_admin, admin_role, \
     rank, is_top_alpha, num_incidents, rank_updated_at, status, created_at, updated_at";

/// User row; the embedded ranking is flattened into columns.
#[derive(Debug, FromRow)]
pub struct UserEntity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub admin_role: Option<String>,
    pub rank: i16,
    pub is_top_alpha: bool,
    pub num_incidents: i64,
    pub rank_updated_at: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserEntity> for User {
    type Error = StoreError;

    fn try_from(row: UserEntity) -> Result<Self, Self::Error> {
        let admin_role = row
            .admin_role
            .as_deref()
            .map(str::parse::<AdminRole>)
            .transpose()
            .map_err(StoreError::Decode)?;

        Ok(User {
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_admin: row.is_admin,
            admin_role,
            ranking: Ranking {
                rank: Rank::try_from(row.rank).map_err(StoreError::Decode)?,
                is_top_alpha: row.is_top_alpha,
                num_incidents: row.num_incidents,
                last_updated: row.rank_updated_at,
            },
            status: parse_status(&row.status)?,
            created: row.created_at,
            updated: row.updated_at,
        })
    }
}
