use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lng: f64,
}
