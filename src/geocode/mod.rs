//! Reverse geocoding through the Google Geocoding API.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{Address, GeoPoint};

pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoding key configured")]
    MissingKey,
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder answered with status {0}")]
    Status(String),
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl Geocoder {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GOOGLE_GEOCODE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            base_url: base_url.into(),
        }
    }

    /// Resolves the address of a point. `Ok(None)` when Google has no result.
    pub async fn reverse(&self, point: &GeoPoint) -> Result<Option<Address>, GeocodeError> {
        let key = self.api_key.as_deref().ok_or(GeocodeError::MissingKey)?;
        let latlng = format!("{},{}", point.latitude(), point.longitude());

        let response: GeocodeResponse = self
            .client
            .get(&self.base_url)
            .query(&[("latlng", latlng.as_str()), ("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_response(response)
    }

    /// Like [`Geocoder::reverse`] but tolerant: failures are logged and the
    /// entry is simply stored without an address.
    pub async fn address_for(&self, point: &GeoPoint) -> Option<Address> {
        match self.reverse(point).await {
            Ok(address) => address,
            Err(GeocodeError::MissingKey) => {
                tracing::debug!("Skipping reverse geocoding, no key configured");
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Reverse geocoding of ({}, {}) failed: {}",
                    point.latitude(),
                    point.longitude(),
                    e
                );
                None
            }
        }
    }
}

fn parse_response(response: GeocodeResponse) -> Result<Option<Address>, GeocodeError> {
    match response.status.as_str() {
        "OK" => Ok(response.results.into_iter().next().map(into_address)),
        "ZERO_RESULTS" => Ok(None),
        other => Err(GeocodeError::Status(other.to_string())),
    }
}

fn into_address(result: GeocodeResult) -> Address {
    let mut address = Address {
        formatted_address: result.formatted_address,
        ..Address::default()
    };

    for component in &result.address_components {
        for kind in &component.types {
            if let Some(slot) = component_slot(&mut address, kind) {
                slot.get_or_insert_with(|| component.long_name.clone());
                break;
            }
        }
    }

    address
}

fn component_slot<'a>(address: &'a mut Address, kind: &str) -> Option<&'a mut Option<String>> {
    match kind {
        "street_number" => Some(&mut address.street_number),
        "route" => Some(&mut address.street),
        "locality" => Some(&mut address.city),
        "administrative_area_level_1" => Some(&mut address.state),
        "country" => Some(&mut address.country),
        "postal_code" => Some(&mut address.postcode),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Option<Address>, GeocodeError> {
        parse_response(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn picks_the_first_result() {
        let address = parse(
            r#"{
                "status": "OK",
                "results": [
                    {
                        "formatted_address": "12 Broad St, Lagos Island, Lagos, Nigeria",
                        "address_components": [
                            {"long_name": "12", "short_name": "12", "types": ["street_number"]},
                            {"long_name": "Broad Street", "short_name": "Broad St", "types": ["route"]},
                            {"long_name": "Lagos", "short_name": "Lagos", "types": ["locality", "political"]},
                            {"long_name": "Lagos", "short_name": "LA", "types": ["administrative_area_level_1", "political"]},
                            {"long_name": "Nigeria", "short_name": "NG", "types": ["country", "political"]},
                            {"long_name": "Sublocality", "short_name": "S", "types": ["sublocality"]}
                        ]
                    },
                    {"formatted_address": "Lagos, Nigeria", "address_components": []}
                ]
            }"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(address.formatted_address, "12 Broad St, Lagos Island, Lagos, Nigeria");
        assert_eq!(address.street_number.as_deref(), Some("12"));
        assert_eq!(address.street.as_deref(), Some("Broad Street"));
        assert_eq!(address.city.as_deref(), Some("Lagos"));
        assert_eq!(address.country.as_deref(), Some("Nigeria"));
        assert_eq!(address.postcode, None);
    }

    #[test]
    fn zero_results_is_no_address() {
        assert_eq!(parse(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap(), None);
    }

    #[test]
    fn error_status_is_reported() {
        let err = parse(r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#).unwrap_err();

        assert!(matches!(err, GeocodeError::Status(ref status) if status == "REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn missing_key_yields_no_address() {
        let geocoder = Geocoder::new(Some(String::new()));

        assert_eq!(geocoder.address_for(&GeoPoint::new(6.45, 3.39)).await, None);
    }
}
