use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Status;

/// Content type assumed when a report does not say otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "image";

/// GeoJSON style point. Coordinates are stored longitude first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "GeoPoint::point_tag")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub const POINT: &'static str = "Point";

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: Self::POINT.to_string(),
            coordinates: [longitude, latitude],
        }
    }

    fn point_tag() -> String {
        Self::POINT.to_string()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Whether the point is a finite WGS84 coordinate.
    pub fn is_valid(&self) -> bool {
        self.kind == Self::POINT && is_valid_coordinate(self.latitude(), self.longitude())
    }
}

pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Human readable address resolved from an entry's coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub formatted_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

/// A geotagged incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(rename = "id")]
    pub entry_id: String,
    pub title: String,
    pub description: String,
    /// `None` for anonymous uploads.
    pub uploaded_by: Option<String>,
    #[serde(rename = "contentURL")]
    pub content_url: String,
    pub content_type: String,
    pub location: GeoPoint,
    pub address: Option<Address>,
    pub alert_type: String,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// The mutable part of an entry, replaced wholesale on update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub title: String,
    pub description: String,
    pub content_url: String,
    pub content_type: String,
    pub location: GeoPoint,
    pub address: Option<Address>,
    pub alert_type: String,
}

impl Entry {
    /// Builds a fresh, enabled entry stamped with `now`.
    pub fn new(fields: EntryFields, uploaded_by: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            uploaded_by,
            content_url: fields.content_url,
            content_type: fields.content_type,
            location: fields.location,
            address: fields.address,
            alert_type: fields.alert_type,
            status: Status::Enabled,
            created: now,
            updated: now,
        }
    }

    pub fn apply(&mut self, fields: EntryFields, now: DateTime<Utc>) {
        self.title = fields.title;
        self.description = fields.description;
        self.content_url = fields.content_url;
        self.content_type = fields.content_type;
        self.location = fields.location;
        self.address = fields.address;
        self.alert_type = fields.alert_type;
        self.updated = now;
    }
}
