use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Status;

/// Severity classification attached to every entry. Higher levels are more severe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertType {
    #[serde(rename = "id")]
    pub alert_type_id: String,
    pub name: String,
    pub level: i32,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertTypeFields {
    pub name: String,
    pub level: i32,
}

impl AlertType {
    pub fn new(fields: AlertTypeFields, now: DateTime<Utc>) -> Self {
        Self {
            alert_type_id: Uuid::new_v4().to_string(),
            name: fields.name,
            level: fields.level,
            status: Status::Enabled,
            created: now,
            updated: now,
        }
    }
}
