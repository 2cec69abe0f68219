//! Application state and its transitions.
//!
//! State changes go through [`reduce`], a plain function over `&mut AppState`.
//! [`Store`] owns the state inside a `watch` channel so each dispatch is
//! applied under the channel lock and subscribers see every applied change.

use nosh_jet::Postcode;
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::SharedRestaurant;

/// How completions of overlapping fetches are reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseOrdering {
    /// Responses to anything but the newest request are dropped.
    #[default]
    LatestRequestWins,
    /// Every response is applied; whichever lands last wins.
    LastResponseWins,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestaurantsState {
    pub restaurants: Vec<SharedRestaurant>,
    pub loading: bool,
    pub error: Option<String>,
    /// Id of the newest fetch started; zero before the first one.
    pub latest_request: u64,
}

/// Where the fetch lifecycle stands, derived from [`RestaurantsState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Failure,
}

impl RestaurantsState {
    pub fn phase(&self) -> FetchPhase {
        if self.loading {
            FetchPhase::Loading
        } else if self.error.is_some() {
            FetchPhase::Failure
        } else if self.latest_request == 0 {
            FetchPhase::Idle
        } else {
            FetchPhase::Success
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub postcode: Postcode,
    pub restaurants: RestaurantsState,
}

#[derive(Clone, Debug)]
pub enum AppAction {
    /// Allocates the next request id.
    FetchRestaurantsStart,
    FetchRestaurantsSuccess {
        request_id: u64,
        restaurants: Vec<SharedRestaurant>,
    },
    FetchRestaurantsFailure {
        request_id: u64,
        message: String,
    },
    SetPostcode(Postcode),
}

/// Applies `action`. Returns `false` when the action was dropped as stale.
pub fn reduce(state: &mut AppState, action: AppAction, ordering: ResponseOrdering) -> bool {
    let restaurants = &mut state.restaurants;
    match action {
        AppAction::FetchRestaurantsStart => {
            restaurants.latest_request += 1;
            restaurants.loading = true;
            restaurants.error = None;
        }
        AppAction::FetchRestaurantsSuccess {
            request_id,
            restaurants: fetched,
        } => {
            if is_stale(restaurants, request_id, ordering) {
                return false;
            }
            restaurants.loading = false;
            restaurants.error = None;
            restaurants.restaurants = fetched;
        }
        AppAction::FetchRestaurantsFailure {
            request_id,
            message,
        } => {
            if is_stale(restaurants, request_id, ordering) {
                return false;
            }
            restaurants.loading = false;
            restaurants.error = Some(message);
        }
        AppAction::SetPostcode(postcode) => {
            if state.postcode == postcode {
                return false;
            }
            state.postcode = postcode;
        }
    }
    true
}

fn is_stale(state: &RestaurantsState, request_id: u64, ordering: ResponseOrdering) -> bool {
    match ordering {
        ResponseOrdering::LatestRequestWins => request_id < state.latest_request,
        ResponseOrdering::LastResponseWins => false,
    }
}

/// What a fetch needs to know at the moment it starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchTicket {
    pub request_id: u64,
    pub postcode: Postcode,
}

#[derive(Debug)]
pub struct Store {
    state: watch::Sender<AppState>,
    ordering: ResponseOrdering,
}

impl Store {
    pub fn new(initial: AppState, ordering: ResponseOrdering) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state, ordering }
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.ordering
    }

    pub fn dispatch(&self, action: AppAction) -> bool {
        let ordering = self.ordering;
        let applied = self
            .state
            .send_if_modified(|state| reduce(state, action, ordering));
        if !applied {
            tracing::debug!("action had no effect");
        }
        applied
    }

    /// Starts a fetch and reads its request id and postcode in the same step,
    /// so no other dispatch can slip in between.
    pub fn begin_fetch(&self) -> FetchTicket {
        let ordering = self.ordering;
        let mut ticket = FetchTicket::default();
        self.state.send_modify(|state| {
            reduce(state, AppAction::FetchRestaurantsStart, ordering);
            ticket = FetchTicket {
                request_id: state.restaurants.latest_request,
                postcode: state.postcode.clone(),
            };
        });
        ticket
    }

    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn watch(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Current state followed by every later change.
    pub fn subscribe(&self) -> WatchStream<AppState> {
        WatchStream::new(self.state.subscribe())
    }

    /// Waits until no fetch is loading and returns that state.
    pub async fn settled(&self) -> AppState {
        let mut receiver = self.state.subscribe();
        let settled = match receiver.wait_for(|state| !state.restaurants.loading).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.state())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default(), ResponseOrdering::default())
    }
}
