use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Ranking, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Super,
    Standard,
}

impl AdminRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminRole::Super => "super",
            AdminRole::Standard => "standard",
        }
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super" => Ok(AdminRole::Super),
            "standard" => Ok(AdminRole::Standard),
            other => Err(format!("unknown admin role `{other}`")),
        }
    }
}

/// A user or admin account. Emails are unique within the admin and the
/// non-admin partition separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "id")]
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub admin_role: Option<AdminRole>,
    pub ranking: Ranking,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        admin_role: Option<AdminRole>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            is_admin: admin_role.is_some(),
            admin_role,
            ranking: Ranking::default(),
            status: Status::Enabled,
            created: now,
            updated: now,
        }
    }
}

/// Partial update applied by admins. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub admin_role: Option<AdminRole>,
}

impl UserChanges {
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if user.is_admin {
            if let Some(role) = self.admin_role {
                user.admin_role = Some(role);
            }
        }
        user.updated = now;
    }
}
