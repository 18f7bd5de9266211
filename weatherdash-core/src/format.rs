//! Presentation helpers: unit conversion, labels and local-time rendering.
//!
//! Values are stored in metric (Celsius, km/h) and converted only here.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::model::UnitSystem;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Rounds half-way values up (towards positive infinity).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn cel_to_fahr(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn kmh_to_mph(k: f64) -> f64 {
    k * 0.621371
}

pub fn unit_suffix(unit: UnitSystem) -> &'static str {
    match unit {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
    }
}

/// Temperature for display, e.g. `21°C` or `71°F`.
pub fn format_temp(celsius: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Imperial => format!("{}°F", round_half_up(cel_to_fahr(celsius))),
        UnitSystem::Metric => format!("{}°C", round_half_up(celsius)),
    }
}

/// Wind speed for display, e.g. `12 km/h` or `7 mph`.
pub fn format_wind(kmh: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Imperial => format!("{} mph", round_half_up(kmh_to_mph(kmh))),
        UnitSystem::Metric => format!("{} km/h", round_half_up(kmh)),
    }
}

pub fn format_humidity(percent: f64) -> String {
    format!("{percent}%")
}

pub fn format_precipitation(mm: f64) -> String {
    format!("{mm} mm")
}

/// One of 16 compass points for a direction in degrees.
pub fn deg_to_compass(degrees: f64) -> &'static str {
    let index = round_half_up(degrees / 22.5).rem_euclid(16) as usize;
    COMPASS_POINTS[index]
}

/// WMO weather interpretation code to a short phrase.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn weather_code_label(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// `01 Jun, 14:00` in the given zone, or the viewer's zone when `tz` is `None`.
pub fn format_local_time(iso: &str, tz: Option<&str>) -> String {
    render(iso, tz, "%d %b, %H:%M")
}

/// Two-digit hour, for the hourly axis.
pub fn format_hour(iso: &str, tz: Option<&str>) -> String {
    render(iso, tz, "%H")
}

/// `HH:MM`, for sunrise/sunset.
pub fn format_clock(iso: &str, tz: Option<&str>) -> String {
    render(iso, tz, "%H:%M")
}

/// Short weekday name, for the daily grid.
pub fn format_weekday(iso: &str, tz: Option<&str>) -> String {
    render(iso, tz, "%a")
}

enum Stamp {
    /// Carries its own UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// Already wall-clock time at the location (`timezone=auto` responses).
    Wall(NaiveDateTime),
}

fn parse_stamp(iso: &str) -> Option<Stamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(Stamp::Zoned(dt));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(iso, pattern) {
            return Some(Stamp::Wall(naive));
        }
    }
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Stamp::Wall)
}

fn render(iso: &str, tz: Option<&str>, pattern: &str) -> String {
    let Some(stamp) = parse_stamp(iso) else {
        tracing::debug!("Unparseable timestamp '{}', showing verbatim", iso);
        return iso.to_string();
    };

    match stamp {
        Stamp::Wall(naive) => naive.format(pattern).to_string(),
        Stamp::Zoned(dt) => match tz {
            None => dt.with_timezone(&Local).format(pattern).to_string(),
            Some(name) => match name.parse::<Tz>() {
                Ok(zone) => dt.with_timezone(&zone).format(pattern).to_string(),
                Err(_) => dt.format(pattern).to_string(),
            },
        },
    }
}
