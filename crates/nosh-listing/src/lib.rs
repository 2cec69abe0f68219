//! Turns fetched restaurants into the listing a user asked for: filter and
//! sort strategies, the processing pipeline, query-string backed selection
//! state, and the store the fetch orchestrator reports into.

pub mod card;
pub mod filter;
pub mod list_state;
pub mod orchestrator;
pub mod pagination;
pub mod pipeline;
pub mod sort;
pub mod store;
pub mod view;

/// Restaurants are shared between the store and every processed list.
pub type SharedRestaurant = std::sync::Arc<nosh_jet::Restaurant>;

pub use card::RestaurantCard;
pub use filter::{FilterOptions, FilterStrategy};
pub use list_state::{
    ListAction, ListPatch, ListPatchBuilder, ListSelection, ListStateController, MemoryLocation,
    QueryLocation, QueryParams,
};
pub use orchestrator::{FetchOrchestrator, RestaurantLookup};
pub use pagination::{Page, PageMarker};
pub use pipeline::process;
pub use sort::SortOption;
pub use store::{AppAction, AppState, FetchPhase, ResponseOrdering, RestaurantsState, Store};
pub use view::{ListingStatus, ListingView};
