use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AdminRole, Rank, Ranking, Status, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: i64,
}

/// Ranking as shown to clients, with the tier spelled out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub rank: Rank,
    pub rank_name: &'static str,
    pub is_top_alpha: bool,
    pub num_incidents: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<Ranking> for RankingView {
    fn from(ranking: Ranking) -> Self {
        Self {
            rank: ranking.rank,
            rank_name: ranking.rank.name(),
            is_top_alpha: ranking.is_top_alpha,
            num_incidents: ranking.num_incidents,
            last_updated: ranking.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<AdminRole>,
    pub ranking: RankingView,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl UserView {
    /// Builds the view with a ranking other than the stored one.
    pub fn with_ranking(user: User, ranking: Ranking) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            admin_role: user.admin_role,
            ranking: ranking.into(),
            status: user.status,
            created: user.created,
            updated: user.updated,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        let ranking = user.ranking.clone();
        Self::with_ranking(user, ranking)
    }
}
