use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::parse_status;
use crate::models::AlertType;
use crate::store::StoreError;

pub const ALERT_TYPE_COLUMNS: &str =
    "alert_type_id, name, level, status, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct AlertTypeEntity {
    pub alert_type_id: String,
    pub name: String,
    pub level: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AlertTypeEntity> for AlertType {
    type Error = StoreError;

    fn try_from(row: AlertTypeEntity) -> Result<Self, Self::Error> {
        Ok(AlertType {
            alert_type_id: row.alert_type_id,
            name: row.name,
            level: row.level,
            status: parse_status(&row.status)?,
            created: row.created_at,
            updated: row.updated_at,
        })
    }
}
