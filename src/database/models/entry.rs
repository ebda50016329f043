use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

use super::parse_status;
use crate::models::{Address, Entry, GeoPoint};
use crate::store::StoreError;

/// Columns selected for an [`EntryEntity`]; the geography point is split into
/// plain coordinates.
pub const ENTRY_COLUMNS: &str = "entry_id, title, description, uploaded_by, content_url, \
     content_type, ST_Y(location::geometry) AS latitude, ST_X(location::geometry) AS longitude, \
     address, alert_type, status, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct EntryEntity {
    pub entry_id: String,
    pub title: String,
    pub description: String,
    pub uploaded_by: Option<String>,
    pub content_url: String,
    pub content_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<Json<Address>>,
    pub alert_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EntryEntity> for Entry {
    type Error = StoreError;

    fn try_from(row: EntryEntity) -> Result<Self, Self::Error> {
        Ok(Entry {
            entry_id: row.entry_id,
            title: row.title,
            description: row.description,
            uploaded_by: row.uploaded_by,
            content_url: row.content_url,
            content_type: row.content_type,
            location: GeoPoint::new(row.latitude, row.longitude),
            address: row.address.map(|Json(address)| address),
            alert_type: row.alert_type,
            status: parse_status(&row.status)?,
            created: row.created_at,
            updated: row.updated_at,
        })
    }
}
