//! Session state machine.
//!
//! [`SessionState`] is never mutated in place: [`reduce`] takes the current
//! state and an [`Event`] and returns the next state together with the
//! [`Effect`]s the driver has to run. Completions of those effects come back
//! as events tagged with the ticket or generation they were issued under, and
//! anything older than the current one is dropped.

use std::sync::Arc;

use crate::model::{ForecastBundle, Location, Preferences};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing selected yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last forecast fetch failed; carries a user-facing message.
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub status: Status,
    pub selected: Option<Location>,
    /// Most recent successful fetch.
    pub bundle: Option<Arc<ForecastBundle>>,
    pub query: String,
    pub suggestions: Vec<Location>,
    /// A search is scheduled or in flight.
    pub searching: bool,
    pub preferences: Preferences,
    pub favorites: Vec<Location>,
    /// Bumped on every selection.
    pub generation: u64,
    /// Bumped on every query change.
    pub search_ticket: u64,
}

impl SessionState {
    pub fn new(preferences: Preferences, favorites: Vec<Location>) -> Self {
        Self {
            preferences,
            favorites,
            ..Self::default()
        }
    }

    /// A fetch or search is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.status == Status::Loading || self.searching
    }

    /// Same place as stored favorites are keyed on: name and country.
    pub fn is_favorite(&self, location: &Location) -> bool {
        self.favorites.iter().any(|f| f.same_favorite_key(location))
    }

    pub fn selected_is_favorite(&self) -> bool {
        self.selected.as_ref().is_some_and(|loc| self.is_favorite(loc))
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// The search box changed.
    QueryChanged(String),
    SuggestionsLoaded {
        ticket: u64,
        results: Vec<Location>,
    },
    /// Chosen from suggestions or favorites.
    Picked(Location),
    /// Chosen without user input (startup favorite or device position).
    Selected(Location),
    ForecastLoaded {
        generation: u64,
        result: Result<ForecastBundle, String>,
    },
    PreferencesChanged(Preferences),
    FavoritesChanged(Vec<Location>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Wait out the debounce period, then search.
    ScheduleSearch { ticket: u64, query: String },
    /// Drop any pending debounce timer.
    CancelSearch,
    FetchForecast { generation: u64, location: Location },
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &SessionState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

pub fn reduce(state: &SessionState, event: Event) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        Event::QueryChanged(query) => {
            next.search_ticket += 1;
            next.suggestions.clear();
            let trimmed = query.trim().to_string();
            next.query = query;

            if trimmed.is_empty() {
                next.searching = false;
                effects.push(Effect::CancelSearch);
            } else {
                next.searching = true;
                effects.push(Effect::ScheduleSearch {
                    ticket: next.search_ticket,
                    query: trimmed,
                });
            }
        }

        Event::SuggestionsLoaded { ticket, results } => {
            if ticket != state.search_ticket {
                tracing::debug!("Dropping suggestions for stale search #{}", ticket);
                return Transition::unchanged(state);
            }
            next.suggestions = results;
            next.searching = false;
        }

        Event::Picked(location) => {
            next.search_ticket += 1;
            next.searching = false;
            next.suggestions.clear();
            next.query = location.display_name();
            effects.push(Effect::CancelSearch);
            effects.push(begin_loading(&mut next, location));
        }

        Event::Selected(location) => {
            effects.push(begin_loading(&mut next, location));
        }

        Event::ForecastLoaded { generation, result } => {
            if generation != state.generation {
                tracing::debug!(
                    "Dropping forecast #{} (current is #{})",
                    generation,
                    state.generation
                );
                return Transition::unchanged(state);
            }
            match result {
                Ok(bundle) => {
                    next.bundle = Some(Arc::new(bundle));
                    next.status = Status::Ready;
                }
                Err(message) => {
                    next.status = Status::Error(message);
                }
            }
        }

        Event::PreferencesChanged(preferences) => {
            next.preferences = preferences;
        }

        Event::FavoritesChanged(favorites) => {
            next.favorites = favorites;
        }
    }

    Transition {
        state: next,
        effects,
    }
}

fn begin_loading(next: &mut SessionState, location: Location) -> Effect {
    next.generation += 1;
    next.status = Status::Loading;
    next.selected = Some(location.clone());
    Effect::FetchForecast {
        generation: next.generation,
        location,
    }
}
