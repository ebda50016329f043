use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{AdminRole, UserChanges};
use crate::ranking::AlphaOutcome;
use crate::routes::{require, validate_email, validate_password};
use crate::utils::hash_password;

/// Selects the admin (`isAdmin=true`) or the regular user partition.
#[derive(Debug, Default, Deserialize)]
pub struct PartitionQuery {
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub admin_role: Option<AdminRole>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub admin_role: Option<AdminRole>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        if let Some(username) = &self.username {
            require("username", username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email.trim())?;
        }
        let password_hash = match &self.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password).map_err(AppError::internal)?)
            }
            None => None,
        };

        Ok(UserChanges {
            username: self.username.map(|name| name.trim().to_string()),
            email: self.email.map(|email| email.trim().to_string()),
            password_hash,
            admin_role: self.admin_role,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedUserResponse {
    pub id: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub num_incidents: i64,
}

impl From<AlphaOutcome> for RecomputeResponse {
    fn from(outcome: AlphaOutcome) -> Self {
        match outcome {
            AlphaOutcome::NoCandidate => Self {
                outcome: "no_candidate",
                user_id: None,
                previous: None,
                num_incidents: 0,
            },
            AlphaOutcome::Retained {
                user_id,
                num_incidents,
            } => Self {
                outcome: "retained",
                previous: Some(user_id.clone()),
                user_id: Some(user_id),
                num_incidents,
            },
            AlphaOutcome::Promoted {
                user_id,
                previous,
                num_incidents,
            } => Self {
                outcome: "promoted",
                user_id: Some(user_id),
                previous,
                num_incidents,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_defaults_to_regular_users() {
        let query: PartitionQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.is_admin);
    }

    #[test]
    fn update_validates_only_present_fields() {
        let changes = UpdateUserRequest {
            username: Some(" ada ".to_string()),
            ..UpdateUserRequest::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.username.as_deref(), Some("ada"));
        assert!(changes.password_hash.is_none());

        let bad = UpdateUserRequest {
            email: Some("not-an-email".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(matches!(bad.into_changes(), Err(AppError::Validation(_))));
    }

    #[test]
    fn describes_recompute_outcomes() {
        let promoted = RecomputeResponse::from(AlphaOutcome::Promoted {
            user_id: "bolu".to_string(),
            previous: Some("ada".to_string()),
            num_incidents: 7,
        });
        assert_eq!(promoted.outcome, "promoted");
        assert_eq!(promoted.previous.as_deref(), Some("ada"));

        let none = serde_json::to_value(RecomputeResponse::from(AlphaOutcome::NoCandidate)).unwrap();
        assert_eq!(none, serde_json::json!({"outcome": "no_candidate", "numIncidents": 0}));
    }
}
