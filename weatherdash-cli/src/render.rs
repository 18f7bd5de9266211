//! Plain-text rendering of the dashboard session.

use std::fmt::Write;

use weatherdash_core::{
    Backdrop, ForecastBundle, Location, Preferences, SessionState, Status,
    format::{
        deg_to_compass, format_clock, format_hour, format_humidity, format_local_time,
        format_precipitation, format_temp, format_weekday, format_wind, unit_suffix,
        weather_code_label,
    },
    model::HOURLY_WINDOW,
};

pub const IDLE_HINT: &str = "Search or allow location to see weather.";

pub fn render_state(state: &SessionState) -> String {
    match (&state.status, &state.bundle, &state.selected) {
        (Status::Idle, _, _) => IDLE_HINT.to_string(),
        (Status::Loading, _, Some(location)) => {
            format!("Loading weather for {}...", location.display_name())
        }
        (Status::Loading, _, None) => "Loading weather...".to_string(),
        (Status::Error(message), _, _) => format!("Error: {message}"),
        (Status::Ready, Some(bundle), Some(location)) => render_bundle(
            location,
            bundle,
            &state.preferences,
            state.selected_is_favorite(),
        ),
        (Status::Ready, _, _) => IDLE_HINT.to_string(),
    }
}

fn sky_glyph(code: i32) -> &'static str {
    match Backdrop::from_code(code) {
        Backdrop::Clear => "☀",
        Backdrop::Overcast => "☁",
        Backdrop::Rain => "☂",
        Backdrop::Snow => "❄",
        Backdrop::Storm => "⚡",
        Backdrop::Default => "·",
    }
}

pub fn render_bundle(
    location: &Location,
    bundle: &ForecastBundle,
    prefs: &Preferences,
    is_favorite: bool,
) -> String {
    let unit = prefs.unit;
    let tz = Some(bundle.timezone.as_str());
    let current = &bundle.current;
    let mut out = String::new();

    let star = if is_favorite { " ★" } else { "" };
    let _ = writeln!(
        out,
        "{} {}{}",
        sky_glyph(current.code),
        location.display_name(),
        star
    );
    let _ = writeln!(
        out,
        "Updated {} ({}) · theme {}",
        format_local_time(&current.time, tz),
        bundle.timezone,
        prefs.theme_name()
    );
    let _ = writeln!(out);

    let mut metrics = vec![
        ("Temp", format_temp(current.temperature, unit)),
        ("Feels like", format_temp(current.apparent_temperature, unit)),
        ("Humidity", format_humidity(current.humidity)),
        (
            "Wind",
            format!(
                "{} {}",
                format_wind(current.wind_speed, unit),
                deg_to_compass(current.wind_direction)
            ),
        ),
        ("Precip", format_precipitation(current.precipitation)),
        ("Condition", weather_code_label(current.code).to_string()),
    ];
    if let Some(pressure) = current.pressure {
        metrics.push(("Pressure", format!("{pressure} hPa")));
    }
    for (label, value) in metrics {
        let _ = writeln!(out, "  {label:<11}{value}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Next 24 Hours ({})", unit_suffix(unit));
    for point in bundle.hourly.points(HOURLY_WINDOW) {
        let _ = writeln!(
            out,
            "  {}h  {:>6}  {:>4}",
            format_hour(point.time, tz),
            format_temp(point.temperature, unit),
            format_humidity(point.humidity)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "7-Day Forecast");
    for day in bundle.daily.days() {
        let _ = writeln!(
            out,
            "  {:<4}{:>6} / {:<6} {:<24} ↑ {}  ↓ {}",
            format_weekday(day.date, tz),
            format_temp(day.max, unit),
            format_temp(day.min, unit),
            weather_code_label(day.code),
            format_clock(day.sunrise, tz),
            format_clock(day.sunset, tz)
        );
    }

    out
}

pub fn render_locations(locations: &[Location]) -> String {
    let mut out = String::new();
    for (i, location) in locations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} ({:.2}, {:.2})",
            i + 1,
            location.display_name(),
            location.latitude,
            location.longitude
        );
    }
    out
}
