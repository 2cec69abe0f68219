use serde::{Deserialize, Deserializer, Serialize};

/// A restaurant as returned by the discovery service.
///
/// Everything except `id` is optional. Consumers read the optional numeric
/// fields through the `*_or_*` accessors so every strategy resolves missing
/// data the same way.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisines: Option<Vec<Cuisine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_eta_minutes: Option<DeliveryEta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_delivery_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open_now_for_delivery: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cuisine {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_upper: Option<f64>,
}

impl Restaurant {
    pub fn star_rating_or_zero(&self) -> f64 {
        self.rating
            .as_ref()
            .and_then(|rating| rating.star_rating)
            .unwrap_or(0.0)
    }

    /// Lower ETA bound; restaurants without one sort after everything else.
    pub fn eta_lower_or_infinity(&self) -> f64 {
        self.delivery_eta_minutes
            .as_ref()
            .and_then(|eta| eta.range_lower)
            .unwrap_or(f64::INFINITY)
    }

    pub fn minimum_order_or_zero(&self) -> f64 {
        self.minimum_delivery_value.unwrap_or(0.0)
    }

    pub fn delivery_cost_or_zero(&self) -> f64 {
        self.delivery_cost.unwrap_or(0.0)
    }

    pub fn is_open_now(&self) -> bool {
        self.is_open_now_for_delivery == Some(true)
    }

    pub fn is_new_restaurant(&self) -> bool {
        self.is_new == Some(true)
    }

    /// Only an explicit cost of zero counts as free.
    pub fn has_free_delivery(&self) -> bool {
        self.delivery_cost == Some(0.0)
    }

    pub fn cuisine_names(&self) -> impl Iterator<Item = &str> {
        self.cuisines
            .iter()
            .flatten()
            .map(|cuisine| cuisine.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn cuisines_label(&self) -> String {
        self.cuisine_names().collect::<Vec<_>>().join(", ")
    }

    pub fn delivery_time_label(&self) -> String {
        let (lower, upper) = self
            .delivery_eta_minutes
            .as_ref()
            .map(|eta| (eta.range_lower, eta.range_upper))
            .unwrap_or_default();
        format!("{}-{} min", lower.unwrap_or(0.0), upper.unwrap_or(0.0))
    }

    pub fn delivery_fee_label(&self) -> Option<String> {
        self.delivery_cost.map(|cost| {
            if cost == 0.0 {
                "Free delivery".to_string()
            } else {
                format!("€{cost:.2} Delivery")
            }
        })
    }

    pub fn minimum_order_label(&self) -> Option<String> {
        self.minimum_delivery_value.map(|value| {
            if value == 0.0 {
                "No min. order".to_string()
            } else {
                format!("€{value:.2} min")
            }
        })
    }

    /// Single-line address, skipping missing parts.
    pub fn address_label(&self) -> Option<String> {
        let address = self.address.as_ref()?;
        let parts: Vec<&str> = [&address.first_line, &address.city, &address.postal_code]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// `(latitude, longitude)` for map placement.
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        self.address
            .as_ref()
            .and_then(|address| address.location.as_ref())
            .and_then(|point| point.coordinates)
            .map(|[longitude, latitude]| (latitude, longitude))
    }
}

/// Reads `null` the same as a missing value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}
