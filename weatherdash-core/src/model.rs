use serde::{Deserialize, Serialize};

/// Hours of the hourly series shown by the dashboard.
pub const HOURLY_WINDOW: usize = 24;

/// Maximum number of stored favorite locations.
pub const MAX_FAVORITES: usize = 10;

/// A place the dashboard can show weather for.
///
/// Equality is (name, country, latitude). The upstream id is optional and
/// not part of identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Location {
    /// Location built from raw device coordinates.
    pub fn from_coordinates(name: impl Into<String>, coords: Coordinates) -> Self {
        Self {
            id: None,
            name: name.into(),
            country: None,
            latitude: coords.latitude,
            longitude: coords.longitude,
            timezone: None,
        }
    }

    /// "Paris, France", or just the name when the country is unknown.
    pub fn display_name(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }

    /// Favorites are deduplicated on (name, country) only.
    pub fn same_favorite_key(&self, other: &Location) -> bool {
        self.name == other.name && self.country == other.country
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.country == other.country && self.latitude == other.latitude
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees Celsius.
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Percent.
    pub humidity: f64,
    /// Millimetres.
    pub precipitation: f64,
    /// km/h.
    pub wind_speed: f64,
    /// Degrees, meteorological (direction the wind comes from).
    pub wind_direction: f64,
    pub is_day: bool,
    pub code: i32,
    /// Local ISO-8601 timestamp of the observation.
    pub time: String,
    /// hPa.
    pub pressure: Option<f64>,
    /// Metres.
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
}

/// One hour of [`HourlySeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourPoint<'a> {
    pub time: &'a str,
    pub temperature: f64,
    pub humidity: f64,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True when all parallel sequences have the same length.
    pub fn is_aligned(&self) -> bool {
        self.temperature.len() == self.time.len() && self.humidity.len() == self.time.len()
    }

    /// The first `limit` hours.
    pub fn points(&self, limit: usize) -> impl Iterator<Item = HourPoint<'_>> {
        self.time
            .iter()
            .zip(&self.temperature)
            .zip(&self.humidity)
            .take(limit)
            .map(|((time, &temperature), &humidity)| HourPoint {
                time,
                temperature,
                humidity,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub temperature_max: Vec<f64>,
    pub temperature_min: Vec<f64>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    pub weather_code: Vec<i32>,
}

/// One day of [`DailySeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayPoint<'a> {
    pub date: &'a str,
    pub max: f64,
    pub min: f64,
    pub sunrise: &'a str,
    pub sunset: &'a str,
    pub code: i32,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        let n = self.time.len();
        self.temperature_max.len() == n
            && self.temperature_min.len() == n
            && self.sunrise.len() == n
            && self.sunset.len() == n
            && self.weather_code.len() == n
    }

    pub fn days(&self) -> impl Iterator<Item = DayPoint<'_>> {
        (0..self.len()).filter_map(move |i| {
            Some(DayPoint {
                date: self.time.get(i)?,
                max: *self.temperature_max.get(i)?,
                min: *self.temperature_min.get(i)?,
                sunrise: self.sunrise.get(i)?,
                sunset: self.sunset.get(i)?,
                code: *self.weather_code.get(i)?,
            })
        })
    }
}

/// Everything the dashboard shows for one location at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
    /// IANA zone name resolved by the upstream API.
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

pub const THEME_LIGHT: &str = "light";
pub const THEME_DARK: &str = "dark";

/// User preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub unit: UnitSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Preferences {
    /// Active theme; unset means light.
    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or(THEME_LIGHT)
    }

    pub fn with_unit_toggled(&self) -> Self {
        Self {
            unit: self.unit.toggled(),
            theme: self.theme.clone(),
        }
    }

    /// Flips dark and light. Any other theme flips to dark.
    pub fn with_theme_toggled(&self) -> Self {
        let next = if self.theme_name() == THEME_DARK {
            THEME_LIGHT
        } else {
            THEME_DARK
        };
        Self {
            unit: self.unit,
            theme: Some(next.to_string()),
        }
    }
}

/// Color group for a weather code, used to pick the dashboard backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    Clear,
    Overcast,
    Rain,
    Snow,
    Storm,
    Default,
}

impl Backdrop {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 | 45 | 48 => Self::Overcast,
            61 | 63 | 65 | 80 | 81 | 82 => Self::Rain,
            71 | 73 | 75 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Storm,
            _ => Self::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Location {
        Location {
            id: Some(2988507),
            name: "Paris".into(),
            country: Some("France".into()),
            latitude: 48.86,
            longitude: 2.35,
            timezone: Some("Europe/Paris".into()),
        }
    }

    #[test]
    fn location_equality_ignores_id() {
        let mut other = paris();
        other.id = None;
        other.timezone = None;
        assert_eq!(paris(), other);

        other.latitude = 48.0;
        assert_ne!(paris(), other);
    }

    #[test]
    fn display_name_includes_country_when_known() {
        assert_eq!(paris().display_name(), "Paris, France");

        let here = Location::from_coordinates(
            "My Location",
            Coordinates {
                latitude: 1.0,
                longitude: 2.0,
            },
        );
        assert_eq!(here.display_name(), "My Location");
    }

    #[test]
    fn location_json_omits_absent_fields() {
        let here = Location::from_coordinates(
            "My Location",
            Coordinates {
                latitude: 1.5,
                longitude: 2.5,
            },
        );
        let json = serde_json::to_value(&here).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "My Location", "latitude": 1.5, "longitude": 2.5})
        );
    }

    #[test]
    fn hourly_points_are_truncated() {
        let series = HourlySeries {
            time: (0..30).map(|h| format!("2024-06-01T{:02}:00", h % 24)).collect(),
            temperature: (0..30).map(f64::from).collect(),
            humidity: vec![50.0; 30],
        };
        assert!(series.is_aligned());
        let points: Vec<_> = series.points(HOURLY_WINDOW).collect();
        assert_eq!(points.len(), 24);
        assert_eq!(points[23].temperature, 23.0);
    }

    #[test]
    fn daily_alignment_detects_short_sequences() {
        let mut daily = DailySeries {
            time: vec!["2024-06-01".into(), "2024-06-02".into()],
            temperature_max: vec![20.0, 21.0],
            temperature_min: vec![10.0, 11.0],
            sunrise: vec!["2024-06-01T05:50".into(), "2024-06-02T05:49".into()],
            sunset: vec!["2024-06-01T21:50".into(), "2024-06-02T21:51".into()],
            weather_code: vec![0, 3],
        };
        assert!(daily.is_aligned());
        assert_eq!(daily.days().count(), 2);

        daily.weather_code.pop();
        assert!(!daily.is_aligned());
    }

    #[test]
    fn unit_system_parses_case_insensitively() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn theme_toggle_starts_from_light() {
        let prefs = Preferences::default();
        assert_eq!(prefs.theme_name(), "light");

        let dark = prefs.with_theme_toggled();
        assert_eq!(dark.theme.as_deref(), Some("dark"));
        assert_eq!(dark.with_theme_toggled().theme.as_deref(), Some("light"));
    }

    #[test]
    fn backdrop_groups_codes() {
        assert_eq!(Backdrop::from_code(1), Backdrop::Clear);
        assert_eq!(Backdrop::from_code(48), Backdrop::Overcast);
        assert_eq!(Backdrop::from_code(81), Backdrop::Rain);
        assert_eq!(Backdrop::from_code(86), Backdrop::Snow);
        assert_eq!(Backdrop::from_code(99), Backdrop::Storm);
        assert_eq!(Backdrop::from_code(51), Backdrop::Default);
    }
}
