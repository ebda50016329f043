/// Location ranking key prefix
const LOCATION_RANKING_PREFIX: &str = "ranking:loc:";

/// Generation counter bumped whenever entries change.
pub const LOCATION_RANKING_VERSION_KEY: &str = "ranking:loc:version";

/// Coordinates are rounded to four decimals (about 11 m), so nearby lookups
/// share one entry. Keys of older generations are never read again and expire.
pub fn location_ranking_key(version: u64, latitude: f64, longitude: f64) -> String {
    format!(
        "{}v{}:{:.4}:{:.4}",
        LOCATION_RANKING_PREFIX, version, latitude, longitude
    )
}
