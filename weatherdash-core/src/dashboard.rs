//! Session driver: feeds user intents through [`session::reduce`] and runs
//! the resulting effects on tokio tasks. Task results come back through an
//! mpsc channel and are applied by [`Dashboard::next_event`].

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    error::StorageError,
    gateway::{DEFAULT_MAX_RESULTS, WeatherGateway},
    geolocation::{Geolocator, PositionOptions, locate},
    model::{Location, Preferences},
    session::{self, Effect, Event, SessionState, Transition},
    storage::{KeyValueStore, PreferenceStore},
};

/// Name given to a location built from the device position.
pub const MY_LOCATION: &str = "My Location";

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub debounce: Duration,
    pub max_results: usize,
    pub position: PositionOptions,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            max_results: DEFAULT_MAX_RESULTS,
            position: PositionOptions::default(),
        }
    }
}

pub struct Dashboard<G, S> {
    gateway: Arc<G>,
    store: PreferenceStore<S>,
    settings: DashboardSettings,
    state: SessionState,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    pending_search: Option<JoinHandle<()>>,
}

impl<G, S> Dashboard<G, S>
where
    G: WeatherGateway + 'static,
    S: KeyValueStore,
{
    /// Loads preferences and favorites from `store`; the session starts idle.
    pub fn new(gateway: Arc<G>, store: PreferenceStore<S>, settings: DashboardSettings) -> Self {
        let state = SessionState::new(store.load(), store.load_favorites());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            gateway,
            store,
            settings,
            state,
            events_tx,
            events_rx,
            pending_search: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &PreferenceStore<S> {
        &self.store
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Shows the most recent favorite, or else the device position. When
    /// neither is available the session stays idle without an error.
    pub async fn start<L: Geolocator + ?Sized>(&mut self, geolocator: &L) {
        if let Some(first) = self.state.favorites.first().cloned() {
            tracing::info!("Starting with favorite {}", first.display_name());
            self.dispatch(Event::Selected(first));
            return;
        }

        match locate(geolocator, &self.settings.position).await {
            Ok(coords) => {
                tracing::info!("Located device at {}, {}", coords.latitude, coords.longitude);
                self.dispatch(Event::Selected(Location::from_coordinates(MY_LOCATION, coords)));
            }
            Err(e) => {
                tracing::debug!("No device position, waiting for a search: {}", e);
            }
        }
    }

    /// Search box input. Only the last input within the debounce window is sent.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.dispatch(Event::QueryChanged(query.into()));
    }

    /// A suggestion or favorite was chosen.
    pub fn pick(&mut self, location: Location) {
        self.dispatch(Event::Picked(location));
    }

    pub fn set_preferences(&mut self, preferences: Preferences) -> Result<(), StorageError> {
        self.store.save(&preferences)?;
        self.dispatch(Event::PreferencesChanged(preferences));
        Ok(())
    }

    pub fn toggle_unit(&mut self) -> Result<(), StorageError> {
        let next = self.state.preferences.with_unit_toggled();
        self.set_preferences(next)
    }

    pub fn toggle_theme(&mut self) -> Result<(), StorageError> {
        let next = self.state.preferences.with_theme_toggled();
        self.set_preferences(next)
    }

    /// Adds the selected location to favorites, or removes it if present.
    /// Does nothing when nothing is selected.
    pub fn toggle_favorite(&mut self) -> Result<(), StorageError> {
        let Some(selected) = self.state.selected.clone() else {
            return Ok(());
        };

        let favorites = if self.state.is_favorite(&selected) {
            self.store.remove_favorite(&selected)?
        } else {
            self.store.add_favorite(&selected)?
        };
        self.dispatch(Event::FavoritesChanged(favorites));
        Ok(())
    }

    pub fn add_favorite(&mut self, location: &Location) -> Result<(), StorageError> {
        let favorites = self.store.add_favorite(location)?;
        self.dispatch(Event::FavoritesChanged(favorites));
        Ok(())
    }

    pub fn remove_favorite(&mut self, location: &Location) -> Result<(), StorageError> {
        let favorites = self.store.remove_favorite(location)?;
        self.dispatch(Event::FavoritesChanged(favorites));
        Ok(())
    }

    /// Waits for one background result and applies it. Returns `false` if
    /// the channel is closed.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Applies background results until no fetch or search is outstanding.
    pub async fn settle(&mut self) {
        while self.state.is_busy() {
            if !self.next_event().await {
                break;
            }
        }
    }

    fn dispatch(&mut self, event: Event) {
        let Transition { state, effects } = session::reduce(&self.state, event);
        self.state = state;
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::CancelSearch => self.cancel_pending_search(),

            Effect::ScheduleSearch { ticket, query } => {
                self.cancel_pending_search();

                let gateway = Arc::clone(&self.gateway);
                let tx = self.events_tx.clone();
                let debounce = self.settings.debounce;
                let max_results = self.settings.max_results;

                self.pending_search = Some(tokio::spawn(async move {
                    tokio::time::sleep(debounce).await;

                    let results = match gateway.search_locations(&query, max_results).await {
                        Ok(results) => results,
                        Err(e) => {
                            tracing::debug!("Search for '{}' failed: {}", query, e);
                            Vec::new()
                        }
                    };
                    let _ = tx.send(Event::SuggestionsLoaded { ticket, results });
                }));
            }

            Effect::FetchForecast {
                generation,
                location,
            } => {
                tracing::info!("Loading forecast #{} for {}", generation, location.display_name());

                let gateway = Arc::clone(&self.gateway);
                let tx = self.events_tx.clone();

                tokio::spawn(async move {
                    let result = gateway
                        .fetch_forecast_bundle(location.latitude, location.longitude)
                        .await
                        .map_err(|e| {
                            let name = location.display_name();
                            tracing::warn!("Forecast for {name} failed: {e}");
                            e.user_message()
                        });
                    let _ = tx.send(Event::ForecastLoaded { generation, result });
                });
            }
        }
    }

    fn cancel_pending_search(&mut self) {
        if let Some(handle) = self.pending_search.take() {
            handle.abort();
        }
    }
}

impl<G, S> Drop for Dashboard<G, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_search.take() {
            handle.abort();
        }
    }
}
