use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::GatewayError,
    model::{CurrentConditions, DailySeries, ForecastBundle, HourlySeries, Location},
};

use super::WeatherGateway;

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const FORECAST_DAYS: u8 = 7;

const CURRENT_FIELDS: [&str; 10] = [
    "temperature_2m",
    "apparent_temperature",
    "relative_humidity_2m",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
    "wind_direction_10m",
    "is_day",
    "surface_pressure",
    "visibility",
];
const HOURLY_FIELDS: [&str; 2] = ["temperature_2m", "relative_humidity_2m"];
const DAILY_FIELDS: [&str; 5] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
];

/// Open-Meteo geocoding and forecast client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoGateway {
    geocoding_url: String,
    forecast_url: String,
    language: String,
    http: Client,
}

impl Default for OpenMeteoGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoGateway {
    pub fn new() -> Self {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL, DEFAULT_LANGUAGE)
    }

    pub fn with_endpoints(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
            language: language.into(),
            http: Client::new(),
        }
    }

    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    pub fn forecast_url(&self) -> &str {
        &self.forecast_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        tracing::debug!("Open-Meteo {} request: {} {:?}", operation, url, query);

        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                operation,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::Parse {
            operation,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    id: Option<i64>,
    name: String,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
}

impl From<OmPlace> for Location {
    fn from(place: OmPlace) -> Self {
        Location {
            id: place.id,
            name: place.name,
            country: place.country,
            latitude: place.latitude,
            longitude: place.longitude,
            timezone: place.timezone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    precipitation: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    is_day: u8,
    surface_pressure: Option<f64>,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    timezone: String,
    current: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

impl OmForecastResponse {
    fn into_bundle(self) -> Result<ForecastBundle, GatewayError> {
        let c = self.current;
        let current = CurrentConditions {
            temperature: c.temperature_2m,
            apparent_temperature: c.apparent_temperature,
            humidity: c.relative_humidity_2m,
            precipitation: c.precipitation,
            wind_speed: c.wind_speed_10m,
            wind_direction: c.wind_direction_10m,
            is_day: c.is_day != 0,
            code: c.weather_code,
            time: c.time,
            pressure: c.surface_pressure,
            visibility: c.visibility,
        };

        let hourly = HourlySeries {
            time: self.hourly.time,
            temperature: self.hourly.temperature_2m,
            humidity: self.hourly.relative_humidity_2m,
        };
        if !hourly.is_aligned() {
            return Err(GatewayError::Parse {
                operation: "forecast",
                reason: "hourly sequences differ in length".to_string(),
            });
        }

        let daily = DailySeries {
            time: self.daily.time,
            temperature_max: self.daily.temperature_2m_max,
            temperature_min: self.daily.temperature_2m_min,
            sunrise: self.daily.sunrise,
            sunset: self.daily.sunset,
            weather_code: self.daily.weather_code,
        };
        if !daily.is_aligned() {
            return Err(GatewayError::Parse {
                operation: "forecast",
                reason: "daily sequences differ in length".to_string(),
            });
        }

        Ok(ForecastBundle {
            current,
            hourly,
            daily,
            timezone: self.timezone,
        })
    }
}

#[async_trait]
impl WeatherGateway for OpenMeteoGateway {
    async fn search_locations(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Location>, GatewayError> {
        let parsed: OmGeocodingResponse = self
            .get_json(
                "geocoding",
                &self.geocoding_url,
                &[
                    ("name", query.to_string()),
                    ("count", max_results.to_string()),
                    ("language", self.language.clone()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(parsed.results.into_iter().map(Location::from).collect())
    }

    async fn fetch_forecast_bundle(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastBundle, GatewayError> {
        let parsed: OmForecastResponse = self
            .get_json(
                "forecast",
                &self.forecast_url,
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("timezone", "auto".to_string()),
                    ("current", CURRENT_FIELDS.join(",")),
                    ("hourly", HOURLY_FIELDS.join(",")),
                    ("daily", DAILY_FIELDS.join(",")),
                    ("forecast_days", FORECAST_DAYS.to_string()),
                ],
            )
            .await?;

        let bundle = parsed.into_bundle()?;
        tracing::debug!(
            "Forecast for {},{} in {}: {} hours, {} days",
            latitude,
            longitude,
            bundle.timezone,
            bundle.hourly.len(),
            bundle.daily.len()
        );
        Ok(bundle)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn field_lists_match_the_request_contract() {
        assert_eq!(CURRENT_FIELDS.len(), 10);
        assert_eq!(HOURLY_FIELDS.join(","), "temperature_2m,relative_humidity_2m");
        assert_eq!(
            DAILY_FIELDS.join(","),
            "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset"
        );
    }

    #[test]
    fn missing_results_key_is_empty() {
        let parsed: OmGeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms":0.5}"#).unwrap();
        assert!(parsed.results.is_empty());
    }
}
