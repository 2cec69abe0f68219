//! Runs restaurant fetches and reports their outcome to the [`Store`].
//!
//! Every trigger starts a fresh request; nothing in flight is cancelled.
//! Overlapping requests are reconciled by the store's [`ResponseOrdering`]:
//! by default a response to anything but the newest request is dropped.
//!
//! [`ResponseOrdering`]: crate::store::ResponseOrdering

use std::{fmt, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use nosh_jet::{Postcode, Restaurant};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::store::{AppAction, Store};

/// Where restaurants come from.
pub trait RestaurantLookup: Send + Sync + 'static {
    type Error: fmt::Display + Send;

    fn lookup<'a>(
        &'a self,
        postcode: &'a Postcode,
    ) -> BoxFuture<'a, Result<Vec<Restaurant>, Self::Error>>;
}

impl RestaurantLookup for nosh_jet::Client {
    type Error = nosh_jet::GetError;

    fn lookup<'a>(
        &'a self,
        postcode: &'a Postcode,
    ) -> BoxFuture<'a, Result<Vec<Restaurant>, Self::Error>> {
        self.restaurants_by_postcode(postcode).boxed()
    }
}

pub struct FetchOrchestrator<L> {
    store: Arc<Store>,
    lookup: Arc<L>,
}

impl<L> Clone for FetchOrchestrator<L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<L: RestaurantLookup> FetchOrchestrator<L> {
    pub fn new(store: Arc<Store>, lookup: Arc<L>) -> Self {
        Self { store, lookup }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Marks the store as loading and spawns the lookup.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// resolves once the outcome has been dispatched.
    pub fn start_fetch(&self) -> JoinHandle<()> {
        let ticket = self.store.begin_fetch();
        let span = tracing::info_span!(
            "fetch_restaurants",
            request_id = ticket.request_id,
            postcode = %ticket.postcode
        );
        let store = Arc::clone(&self.store);
        let lookup = Arc::clone(&self.lookup);

        tokio::spawn(
            async move {
                let action = match lookup.lookup(&ticket.postcode).await {
                    Ok(restaurants) => {
                        tracing::info!(count = restaurants.len(), "restaurants fetched");
                        AppAction::FetchRestaurantsSuccess {
                            request_id: ticket.request_id,
                            restaurants: restaurants.into_iter().map(Arc::new).collect(),
                        }
                    }
                    Err(error) => {
                        tracing::warn!(%error, "restaurant fetch failed");
                        AppAction::FetchRestaurantsFailure {
                            request_id: ticket.request_id,
                            message: error.to_string(),
                        }
                    }
                };
                if !store.dispatch(action) {
                    tracing::debug!("discarding response to superseded request");
                }
            }
            .instrument(span),
        )
    }

    /// Starts a fetch and waits for its outcome to be dispatched.
    pub async fn fetch(&self) {
        if let Err(error) = self.start_fetch().await {
            tracing::error!(%error, "fetch task did not complete");
        }
    }

    /// Switches postcode and refetches.
    pub fn change_postcode(&self, postcode: Postcode) -> JoinHandle<()> {
        self.store.dispatch(AppAction::SetPostcode(postcode));
        self.start_fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        store::{AppState, ResponseOrdering, RestaurantsState},
        test_support::{named, restaurant_ids},
    };
    use std::{collections::VecDeque, sync::Mutex};
    use tokio::sync::oneshot;

    type Reply = Result<Vec<Restaurant>, String>;

    /// Answers lookups in call order, each one when its sender fires.
    #[derive(Default)]
    struct ScriptedLookup {
        replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        postcodes: Mutex<Vec<String>>,
    }

    impl ScriptedLookup {
        fn expect(&self) -> oneshot::Sender<Reply> {
            let (sender, receiver) = oneshot::channel();
            self.replies.lock().unwrap().push_back(receiver);
            sender
        }
    }

    impl RestaurantLookup for ScriptedLookup {
        type Error = String;

        fn lookup<'a>(&'a self, postcode: &'a Postcode) -> BoxFuture<'a, Reply> {
            self.postcodes.lock().unwrap().push(postcode.to_string());
            let reply = self.replies.lock().unwrap().pop_front();
            async move {
                match reply {
                    Some(receiver) => receiver
                        .await
                        .unwrap_or_else(|_| Err("lookup abandoned".to_string())),
                    None => Err("unexpected lookup".to_string()),
                }
            }
            .boxed()
        }
    }

    fn restaurant(id: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            ..Default::default()
        }
    }

    fn orchestrator(
        ordering: ResponseOrdering,
    ) -> (FetchOrchestrator<ScriptedLookup>, Arc<ScriptedLookup>) {
        let lookup = Arc::new(ScriptedLookup::default());
        let store = Arc::new(Store::new(AppState::default(), ordering));
        (FetchOrchestrator::new(store, Arc::clone(&lookup)), lookup)
    }

    #[tokio::test]
    async fn success_populates_store() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::default());
        let reply = lookup.expect();

        // Act
        let handle = orchestrator.start_fetch();
        assert!(orchestrator.store().with_state(|s| s.restaurants.loading));
        reply.send(Ok(vec![restaurant("1"), restaurant("2")])).unwrap();
        handle.await.unwrap();

        // Assert
        let state = orchestrator.store().state();
        assert!(!state.restaurants.loading);
        assert_eq!(state.restaurants.error, None);
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["1", "2"]);
        assert_eq!(*lookup.postcodes.lock().unwrap(), vec!["CT12EH".to_string()]);
    }

    #[tokio::test]
    async fn network_error_keeps_existing_restaurants() {
        // Arrange
        let lookup = Arc::new(ScriptedLookup::default());
        let store = Arc::new(Store::new(
            AppState {
                postcode: Postcode::parse("CT12EH").unwrap(),
                restaurants: RestaurantsState {
                    restaurants: vec![named("1", Some("Pizza Palace"), None)],
                    ..Default::default()
                },
            },
            ResponseOrdering::default(),
        ));
        let orchestrator = FetchOrchestrator::new(Arc::clone(&store), Arc::clone(&lookup));
        let reply = lookup.expect();

        // Act
        let handle = orchestrator.start_fetch();
        reply.send(Err("Network Error".to_string())).unwrap();
        handle.await.unwrap();

        // Assert
        let state = store.state();
        assert!(!state.restaurants.loading);
        assert_eq!(state.restaurants.error.as_deref(), Some("Network Error"));
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["1"]);
    }

    #[tokio::test]
    async fn retry_after_failure_clears_error() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::default());
        let failure = lookup.expect();
        let success = lookup.expect();
        failure.send(Err("Request failed with status code 503".to_string())).unwrap();
        orchestrator.fetch().await;
        assert!(orchestrator.store().state().restaurants.error.is_some());

        // Act
        let handle = orchestrator.start_fetch();
        assert_eq!(orchestrator.store().state().restaurants.error, None);
        success.send(Ok(vec![restaurant("9")])).unwrap();
        handle.await.unwrap();

        // Assert
        let state = orchestrator.store().state();
        assert_eq!(state.restaurants.error, None);
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["9"]);
    }

    #[tokio::test]
    async fn superseded_response_is_ignored() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::LatestRequestWins);
        let first = lookup.expect();
        let second = lookup.expect();

        // Act
        let first_handle = orchestrator.start_fetch();
        let second_handle = orchestrator.start_fetch();
        second.send(Ok(vec![restaurant("new")])).unwrap();
        second_handle.await.unwrap();
        first.send(Ok(vec![restaurant("old")])).unwrap();
        first_handle.await.unwrap();

        // Assert
        let state = orchestrator.store().state();
        assert!(!state.restaurants.loading);
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["new"]);
    }

    #[tokio::test]
    async fn stays_loading_until_latest_request_completes() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::LatestRequestWins);
        let first = lookup.expect();
        let second = lookup.expect();

        // Act
        let first_handle = orchestrator.start_fetch();
        let second_handle = orchestrator.start_fetch();
        first.send(Err("timed out".to_string())).unwrap();
        first_handle.await.unwrap();

        // Assert
        let state = orchestrator.store().state();
        assert!(state.restaurants.loading);
        assert_eq!(state.restaurants.error, None);

        second.send(Ok(vec![])).unwrap();
        second_handle.await.unwrap();
        assert!(!orchestrator.store().state().restaurants.loading);
    }

    #[tokio::test]
    async fn last_response_wins_when_unguarded() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::LastResponseWins);
        let first = lookup.expect();
        let second = lookup.expect();

        // Act
        let first_handle = orchestrator.start_fetch();
        let second_handle = orchestrator.start_fetch();
        second.send(Ok(vec![restaurant("new")])).unwrap();
        second_handle.await.unwrap();
        first.send(Ok(vec![restaurant("old")])).unwrap();
        first_handle.await.unwrap();

        // Assert
        let state = orchestrator.store().state();
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["old"]);
    }

    #[tokio::test]
    async fn change_postcode_refetches() {
        // Arrange
        let (orchestrator, lookup) = orchestrator(ResponseOrdering::default());
        let reply = lookup.expect();
        reply.send(Ok(vec![restaurant("ec")])).unwrap();

        // Act
        orchestrator
            .change_postcode(Postcode::parse("ec4m 7rf").unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(*lookup.postcodes.lock().unwrap(), vec!["EC4M7RF".to_string()]);
        assert_eq!(orchestrator.store().state().postcode.as_str(), "EC4M7RF");
    }

    #[tokio::test]
    async fn fetches_through_http_client() {
        use httpmock::prelude::*;
        use serde_json::json;

        // Arrange
        let server = MockServer::start_async().await;
        let restaurants_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/discovery/uk/restaurants/enriched/bypostcode/CT12EH");
                then.status(200).json_body(json!({
                    "restaurants": [{ "id": "1", "name": "Pizza Palace" }]
                }));
            })
            .await;
        let config = nosh_jet::ClientConfigBuilder::default()
            .base_url(server.base_url())
            .build()
            .unwrap();
        let client =
            nosh_jet::Client::new(nosh_jet::default_http_client(5).unwrap(), &config).unwrap();
        let orchestrator = FetchOrchestrator::new(Arc::new(Store::default()), Arc::new(client));

        // Act
        orchestrator.fetch().await;

        // Assert
        let state = orchestrator.store().state();
        assert_eq!(restaurant_ids(&state.restaurants.restaurants), vec!["1"]);
        restaurants_mock.assert();
    }

    #[tokio::test]
    async fn http_failure_becomes_error_message() {
        use httpmock::prelude::*;

        // Arrange
        let server = MockServer::start_async().await;
        let restaurants_mock = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503);
            })
            .await;
        let config = nosh_jet::ClientConfigBuilder::default()
            .base_url(server.base_url())
            .build()
            .unwrap();
        let client =
            nosh_jet::Client::new(nosh_jet::default_http_client(5).unwrap(), &config).unwrap();
        let orchestrator = FetchOrchestrator::new(Arc::new(Store::default()), Arc::new(client));

        // Act
        orchestrator.fetch().await;

        // Assert
        let error = orchestrator.store().state().restaurants.error.unwrap();
        assert!(error.contains("503"), "unexpected error message: {error}");
        restaurants_mock.assert();
    }
}
