use nosh_jet::Restaurant;

use crate::SharedRestaurant;

/// One step of the filter chain.
///
/// Filters commute, so the order produced by [`FilterOptions::strategies`]
/// only affects how much work later steps do. Each `apply` leaves its input
/// untouched and hands back the surviving restaurants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterStrategy {
    /// Matched case-insensitively after trimming; blank keeps everything.
    SearchQuery(String),
    OpenNow,
    IsNew,
    FreeDelivery,
}

impl FilterStrategy {
    pub fn search_query(query: &str) -> Self {
        Self::SearchQuery(query.trim().to_lowercase())
    }

    pub fn apply(&self, restaurants: &[SharedRestaurant]) -> Vec<SharedRestaurant> {
        match self {
            Self::SearchQuery(query) => {
                let needle = query.trim().to_lowercase();
                if needle.is_empty() {
                    return restaurants.to_vec();
                }
                keep(restaurants, |restaurant| name_or_cuisine_contains(restaurant, &needle))
            }
            Self::OpenNow => keep(restaurants, Restaurant::is_open_now),
            Self::IsNew => keep(restaurants, Restaurant::is_new_restaurant),
            Self::FreeDelivery => keep(restaurants, Restaurant::has_free_delivery),
        }
    }
}

fn keep(
    restaurants: &[SharedRestaurant],
    predicate: impl Fn(&Restaurant) -> bool,
) -> Vec<SharedRestaurant> {
    restaurants
        .iter()
        .filter(|restaurant| predicate(restaurant))
        .cloned()
        .collect()
}

/// `needle` must already be lowercased.
fn name_or_cuisine_contains(restaurant: &Restaurant, needle: &str) -> bool {
    let name_matches = restaurant
        .name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle));
    name_matches
        || restaurant
            .cuisine_names()
            .any(|cuisine| cuisine.to_lowercase().contains(needle))
}

/// Which filters are switched on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub query: String,
    pub open_now: bool,
    pub is_new: bool,
    pub free_delivery: bool,
}

impl FilterOptions {
    /// Builds the enabled filters: search first, then the facets.
    pub fn strategies(&self) -> Vec<FilterStrategy> {
        let mut strategies = Vec::with_capacity(4);
        if !self.query.trim().is_empty() {
            strategies.push(FilterStrategy::search_query(&self.query));
        }
        if self.open_now {
            strategies.push(FilterStrategy::OpenNow);
        }
        if self.is_new {
            strategies.push(FilterStrategy::IsNew);
        }
        if self.free_delivery {
            strategies.push(FilterStrategy::FreeDelivery);
        }
        strategies
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.open_now || self.is_new || self.free_delivery
    }
}
