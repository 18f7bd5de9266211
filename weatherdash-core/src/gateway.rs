use crate::{
    config::ApiConfig,
    error::GatewayError,
    gateway::open_meteo::OpenMeteoGateway,
    model::{ForecastBundle, Location},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Default cap on geocoding suggestions.
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Source of geocoding and forecast data.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// Places matching a free-text name. No matches is an empty vec.
    async fn search_locations(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Location>, GatewayError>;

    /// Current, hourly and 7-day data for a coordinate pair.
    async fn fetch_forecast_bundle(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastBundle, GatewayError>;
}

/// Construct the Open-Meteo gateway from API settings.
pub fn gateway_from_config(api: &ApiConfig) -> OpenMeteoGateway {
    OpenMeteoGateway::with_endpoints(
        api.geocoding_url.clone(),
        api.forecast_url.clone(),
        api.language.clone(),
    )
}
