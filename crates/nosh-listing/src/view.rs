use serde::Serialize;

use crate::{
    list_state::ListSelection,
    pagination::{Page, DEFAULT_PER_PAGE},
    pipeline,
    sort::SortOption,
    store::{FetchPhase, RestaurantsState},
    SharedRestaurant,
};

/// What the listing should show, in priority order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum ListingStatus {
    Loading,
    Failed(String),
    Results,
    /// Restaurants were fetched but none survived the filters.
    NoMatches,
    NoRestaurants,
}

/// The fetched restaurants run through the current selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    #[serde(flatten)]
    pub status: ListingStatus,
    pub phase: FetchPhase,
    pub search_query: String,
    pub sort: SortOption,
    pub sort_label: &'static str,
    pub has_active_filters: bool,
    pub total_restaurants: usize,
    pub filtered_count: usize,
    #[serde(skip)]
    pub processed_restaurants: Vec<SharedRestaurant>,
}

impl ListingView {
    pub fn build(state: &RestaurantsState, selection: &ListSelection) -> Self {
        let filters = selection.filter_options().strategies();
        let processed_restaurants = pipeline::process(&state.restaurants, &filters, selection.sort);
        let total_restaurants = state.restaurants.len();
        let filtered_count = processed_restaurants.len();

        let phase = state.phase();
        let status = match phase {
            FetchPhase::Loading => ListingStatus::Loading,
            FetchPhase::Failure => ListingStatus::Failed(state.error.clone().unwrap_or_default()),
            FetchPhase::Idle | FetchPhase::Success if filtered_count > 0 => ListingStatus::Results,
            FetchPhase::Idle | FetchPhase::Success if total_restaurants > 0 => {
                ListingStatus::NoMatches
            }
            FetchPhase::Idle | FetchPhase::Success => ListingStatus::NoRestaurants,
        };

        Self {
            status,
            phase,
            search_query: selection.search_query.clone(),
            sort: selection.sort,
            sort_label: selection.sort.label(),
            has_active_filters: selection.has_active_filters(),
            total_restaurants,
            filtered_count,
            processed_restaurants,
        }
    }

    /// Message for the non-result states, `None` when there is a list to show.
    pub fn message(&self) -> Option<String> {
        match &self.status {
            ListingStatus::Loading | ListingStatus::Results => None,
            ListingStatus::Failed(message) => Some(message.clone()),
            ListingStatus::NoMatches => Some(format!(
                "No restaurants match your search for \"{}\".",
                self.search_query
            )),
            ListingStatus::NoRestaurants => {
                Some("No restaurants found for this postcode.".to_string())
            }
        }
    }

    pub fn page(&self, page: u64) -> Page {
        Page::new(&self.processed_restaurants, page, DEFAULT_PER_PAGE)
    }
}
