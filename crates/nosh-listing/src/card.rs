use nosh_jet::Restaurant;
use serde::Serialize;

/// What a listing card shows for one restaurant, every field already
/// formatted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCard {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    pub cuisines: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// `[latitude, longitude]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<(f64, f64)>,
    pub open_now: bool,
    pub is_new: bool,
}

impl From<&Restaurant> for RestaurantCard {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.clone(),
            name: restaurant.name.clone().unwrap_or_default(),
            logo_url: restaurant.logo_url.clone(),
            rating: rating_label(restaurant),
            cuisines: restaurant.cuisines_label(),
            delivery_time: restaurant
                .delivery_eta_minutes
                .as_ref()
                .map(|_| restaurant.delivery_time_label()),
            delivery_fee: restaurant.delivery_fee_label(),
            minimum_order: restaurant.minimum_order_label(),
            address: restaurant.address_label(),
            location: restaurant.lat_lng(),
            open_now: restaurant.is_open_now(),
            is_new: restaurant.is_new_restaurant(),
        }
    }
}

fn rating_label(restaurant: &Restaurant) -> Option<String> {
    let rating = restaurant.rating.as_ref()?;
    let stars = rating.star_rating?;
    Some(match rating.count {
        Some(count) => format!("{stars:.1} ({count}+)"),
        None => format!("{stars:.1}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nosh_jet::restaurant::{Address, Cuisine, DeliveryEta, GeoPoint, Rating};

    #[test]
    fn formats_full_record() {
        let restaurant = Restaurant {
            id: "42".to_string(),
            name: Some("Pizza Palace".to_string()),
            rating: Some(Rating {
                star_rating: Some(4.5),
                count: Some(120),
            }),
            cuisines: Some(vec![
                Cuisine {
                    name: "Italian".to_string(),
                },
                Cuisine {
                    name: "Pizza".to_string(),
                },
            ]),
            delivery_eta_minutes: Some(DeliveryEta {
                range_lower: Some(20.0),
                range_upper: Some(35.0),
            }),
            delivery_cost: Some(0.0),
            minimum_delivery_value: Some(12.5),
            address: Some(Address {
                first_line: Some("1 High Street".to_string()),
                city: Some("Canterbury".to_string()),
                postal_code: Some("CT1 2EH".to_string()),
                location: Some(GeoPoint {
                    kind: Some("Point".to_string()),
                    coordinates: Some([1.08, 51.28]),
                }),
            }),
            is_open_now_for_delivery: Some(true),
            ..Default::default()
        };

        let card = RestaurantCard::from(&restaurant);

        assert_eq!(card.rating.as_deref(), Some("4.5 (120+)"));
        assert_eq!(card.cuisines, "Italian, Pizza");
        assert_eq!(card.delivery_time.as_deref(), Some("20-35 min"));
        assert_eq!(card.delivery_fee.as_deref(), Some("Free delivery"));
        assert_eq!(card.minimum_order.as_deref(), Some("€12.50 min"));
        assert_eq!(card.address.as_deref(), Some("1 High Street, Canterbury, CT1 2EH"));
        assert_eq!(card.location, Some((51.28, 1.08)));
        assert!(card.open_now);
        assert!(!card.is_new);
    }

    #[test]
    fn sparse_record_leaves_labels_out() {
        let restaurant = Restaurant {
            id: "1".to_string(),
            delivery_cost: Some(1.5),
            ..Default::default()
        };

        let card = RestaurantCard::from(&restaurant);
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(card.name, "");
        assert_eq!(card.delivery_fee.as_deref(), Some("€1.50 Delivery"));
        assert_eq!(json.get("rating"), None);
        assert_eq!(json.get("location"), None);
        assert_eq!(json["cuisines"], "");
        assert_eq!(json["openNow"], false);
    }
}
