use serde::{Deserialize, Deserializer};

use crate::Restaurant;

/// Raw response from the restaurants-by-postcode endpoint.
///
/// The service sends plenty of other top-level keys (metadata, filters,
/// promoted placements); only the restaurant list is kept. A missing or
/// `null` list reads as empty, and records that cannot be read at all are
/// skipped rather than failing the whole response.
#[derive(Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "readable_restaurants")]
    pub restaurants: Vec<Restaurant>,
}

fn readable_restaurants<'de, D>(deserializer: D) -> Result<Vec<Restaurant>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(records
        .unwrap_or_default()
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(restaurant) => Some(restaurant),
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable restaurant record");
                None
            }
        })
        .collect())
}
