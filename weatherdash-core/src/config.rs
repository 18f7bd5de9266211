use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    dashboard::DashboardSettings,
    gateway::{
        DEFAULT_MAX_RESULTS,
        open_meteo::{DEFAULT_LANGUAGE, FORECAST_URL, GEOCODING_URL},
    },
    geolocation::PositionOptions,
    model::Coordinates,
};

/// Upstream endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Language for geocoding results.
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a typed query is sent.
    pub debounce_ms: u64,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub timeout_secs: u64,
    pub high_accuracy: bool,

    /// Position reported as the device location. Example TOML:
    /// [geolocation.home]
    /// latitude = 48.86
    /// longitude = 2.35
    pub home: Option<Coordinates>,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            high_accuracy: true,
            home: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the default state file in the platform data directory.
    pub state_file: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub geolocation: GeolocationConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where favorites and preferences are persisted.
    pub fn state_file_path(&self) -> Result<PathBuf> {
        match &self.storage.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("state.json")),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            debounce: Duration::from_millis(self.search.debounce_ms),
            max_results: self.search.max_results,
            position: self.position_options(),
        }
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.geolocation.high_accuracy,
            timeout: Duration::from_secs(self.geolocation.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_contract() {
        let cfg = Config::default();
        let settings = cfg.dashboard_settings();

        assert_eq!(settings.debounce, Duration::from_millis(400));
        assert_eq!(settings.max_results, 8);
        assert_eq!(settings.position.timeout, Duration::from_secs(5));
        assert!(settings.position.high_accuracy);
        assert_eq!(cfg.api.forecast_url, "https://api.open-meteo.com/v1/forecast");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [search]
            debounce_ms = 250

            [geolocation.home]
            latitude = 35.68
            longitude = 139.69
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.search.debounce_ms, 250);
        assert_eq!(cfg.search.max_results, 8);
        assert_eq!(cfg.geolocation.timeout_secs, 5);
        assert_eq!(
            cfg.geolocation.home,
            Some(Coordinates {
                latitude: 35.68,
                longitude: 139.69
            })
        );
        assert_eq!(cfg.api.language, "en");
    }

    #[test]
    fn explicit_state_file_wins() {
        let cfg = Config::from_toml(
            r#"
            [storage]
            state_file = "/tmp/weatherdash-state.json"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.state_file_path().unwrap(),
            PathBuf::from("/tmp/weatherdash-state.json")
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("search = 3").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.geolocation.home = Some(Coordinates {
            latitude: 1.0,
            longitude: 2.0,
        });
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.geolocation.home, cfg.geolocation.home);
        assert_eq!(back.search.debounce_ms, 400);
    }
}
