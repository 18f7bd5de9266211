//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - The forecast data model and its display formatting
//! - The Open-Meteo gateway (geocoding and forecasts)
//! - Persistent preferences and favorites
//! - The session state machine and its async driver
//!
//! It is used by `weatherdash-cli`, but any front end can drive a [`Dashboard`]
//! and render its [`SessionState`].

pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod gateway;
pub mod geolocation;
pub mod model;
pub mod session;
pub mod storage;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardSettings, MY_LOCATION};
pub use error::{GatewayError, GeolocationError, StorageError};
pub use gateway::{WeatherGateway, open_meteo::OpenMeteoGateway};
pub use geolocation::{FixedGeolocator, Geolocator, PositionOptions};
pub use model::{
    Backdrop, Coordinates, CurrentConditions, DailySeries, ForecastBundle, HourlySeries, Location,
    Preferences, UnitSystem,
};
pub use session::{SessionState, Status};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore};
