use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::entry::DEFAULT_CONTENT_TYPE;
use crate::models::{EntryFields, GeoPoint};
use crate::routes::{require, validate_coordinates};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "contentURL")]
    pub content_url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub location: GeoPoint,
    pub alert_type: String,
    /// Hide the uploader. Anonymous entries never count towards a ranking.
    #[serde(default)]
    pub anonymous: bool,
}

impl EntryRequest {
    /// Checks required fields and the coordinate. The address is resolved
    /// later.
    pub fn validate(self) -> Result<EntryFields, AppError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("contentURL", &self.content_url)?;
        require("alertType", &self.alert_type)?;
        if self.location.kind != GeoPoint::POINT {
            return Err(AppError::Validation("location must be a Point".to_string()));
        }
        validate_coordinates(self.location.latitude(), self.location.longitude())?;

        let content_type = self
            .content_type
            .map(|kind| kind.trim().to_string())
            .filter(|kind| !kind.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(EntryFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            content_url: self.content_url.trim().to_string(),
            content_type,
            location: self.location,
            address: None,
            alert_type: self.alert_type.trim().to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct BulkInsertResponse {
    pub inserted: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedEntryResponse {
    pub id: String,
}
