use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use weatherdash_core::{
    Config, Coordinates, Dashboard, FixedGeolocator, JsonFileStore, Location, OpenMeteoGateway,
    PreferenceStore, Preferences, UnitSystem, gateway::gateway_from_config,
};

use crate::render::{render_locations, render_state};

type AppDashboard = Dashboard<OpenMeteoGateway, JsonFileStore>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the most recent favorite, or the configured home position.
    Start,

    /// List places matching a name.
    Search {
        /// City or place name, e.g. "Paris".
        name: String,
    },

    /// Show the forecast for a place name or a coordinate pair.
    Show {
        /// Place name; the first match is used.
        name: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Interactive search, forecast and preference session.
    Browse,

    /// Manage favorite locations.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Set the unit system, or toggle it when omitted.
    Unit {
        /// "metric" or "imperial".
        unit: Option<String>,
    },

    /// Set the theme, or toggle dark/light when omitted.
    Theme { name: Option<String> },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    /// Add the first match for a place name.
    Add { name: String },
    /// Remove every favorite with this name.
    Remove { name: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut dash = open_dashboard(&config)?;

        match self.command {
            Command::Start => {
                dash.start(&FixedGeolocator::new(config.geolocation.home)).await;
                dash.settle().await;
                println!("{}", render_state(dash.state()));
            }
            Command::Search { name } => {
                let places = search(&mut dash, &name).await;
                if places.is_empty() {
                    println!("No places found for '{name}'.");
                } else {
                    print!("{}", render_locations(&places));
                }
            }
            Command::Show { name, lat, lon } => {
                let location = match (name, lat, lon) {
                    (_, Some(latitude), Some(longitude)) => Location::from_coordinates(
                        format!("{latitude:.2}, {longitude:.2}"),
                        Coordinates {
                            latitude,
                            longitude,
                        },
                    ),
                    (Some(name), _, _) => first_match(&mut dash, &name).await?,
                    _ => bail!("Give a place name or both --lat and --lon."),
                };
                dash.pick(location);
                dash.settle().await;
                println!("{}", render_state(dash.state()));
            }
            Command::Browse => browse(&mut dash, &config).await?,
            Command::Favorites { action } => favorites(&mut dash, action).await?,
            Command::Unit { unit } => {
                let saved = match unit {
                    Some(raw) => {
                        let unit = UnitSystem::try_from(raw.as_str())?;
                        let prefs = Preferences {
                            unit,
                            theme: dash.state().preferences.theme.clone(),
                        };
                        dash.set_preferences(prefs)
                    }
                    None => dash.toggle_unit(),
                };
                saved.context("Failed to save preferences")?;
                println!("Units: {}", dash.state().preferences.unit);
            }
            Command::Theme { name } => {
                let saved = match name {
                    Some(theme) => {
                        let prefs = Preferences {
                            unit: dash.state().preferences.unit,
                            theme: Some(theme),
                        };
                        dash.set_preferences(prefs)
                    }
                    None => dash.toggle_theme(),
                };
                saved.context("Failed to save preferences")?;
                println!("Theme: {}", dash.state().preferences.theme_name());
            }
        }

        Ok(())
    }
}

fn open_dashboard(config: &Config) -> anyhow::Result<AppDashboard> {
    let state_file = config.state_file_path()?;
    tracing::debug!("Using state file {}", state_file.display());

    Ok(Dashboard::new(
        Arc::new(gateway_from_config(&config.api)),
        PreferenceStore::new(JsonFileStore::new(state_file)),
        config.dashboard_settings(),
    ))
}

async fn search(dash: &mut AppDashboard, name: &str) -> Vec<Location> {
    dash.set_query(name);
    dash.settle().await;
    dash.state().suggestions.clone()
}

async fn first_match(dash: &mut AppDashboard, name: &str) -> anyhow::Result<Location> {
    search(dash, name)
        .await
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No places found for '{name}'."))
}

async fn favorites(dash: &mut AppDashboard, action: FavoritesAction) -> anyhow::Result<()> {
    match action {
        FavoritesAction::List => {
            let list = &dash.state().favorites;
            if list.is_empty() {
                println!("No favorites yet.");
            } else {
                print!("{}", render_locations(list));
            }
        }
        FavoritesAction::Add { name } => {
            let location = first_match(dash, &name).await?;
            dash.add_favorite(&location).context("Failed to save favorites")?;
            println!("Added {}.", location.display_name());
        }
        FavoritesAction::Remove { name } => {
            let matches: Vec<Location> = dash
                .state()
                .favorites
                .iter()
                .filter(|f| f.name.eq_ignore_ascii_case(&name))
                .cloned()
                .collect();
            if matches.is_empty() {
                bail!("'{name}' is not a favorite.");
            }
            for location in &matches {
                dash.remove_favorite(location).context("Failed to save favorites")?;
                println!("Removed {}.", location.display_name());
            }
        }
    }
    Ok(())
}

const SEARCH: &str = "Search for a place";
const OPEN_FAVORITE: &str = "Open a favorite";
const TOGGLE_FAVORITE: &str = "Add/remove current place from favorites";
const TOGGLE_UNIT: &str = "Switch °C/°F";
const TOGGLE_THEME: &str = "Switch dark/light theme";
const QUIT: &str = "Quit";

/// Prompt result, with Esc and Ctrl-C mapped to `None`.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn browse(dash: &mut AppDashboard, config: &Config) -> anyhow::Result<()> {
    dash.start(&FixedGeolocator::new(config.geolocation.home)).await;
    dash.settle().await;
    println!("{}\n", render_state(dash.state()));

    loop {
        let actions = vec![
            SEARCH,
            OPEN_FAVORITE,
            TOGGLE_FAVORITE,
            TOGGLE_UNIT,
            TOGGLE_THEME,
            QUIT,
        ];
        let Some(action) = answered(Select::new("What next?", actions).prompt())? else {
            break;
        };

        match action {
            SEARCH => {
                let Some(query) = answered(Text::new("City:").prompt())? else {
                    continue;
                };
                let places = search(dash, &query).await;
                if places.is_empty() {
                    println!("No places found for '{query}'.");
                    continue;
                }
                if let Some(place) = choose(&places)? {
                    dash.pick(place);
                }
            }
            OPEN_FAVORITE => {
                let list = dash.state().favorites.clone();
                if list.is_empty() {
                    println!("No favorites yet.");
                    continue;
                }
                if let Some(place) = choose(&list)? {
                    dash.pick(place);
                }
            }
            TOGGLE_FAVORITE => dash
                .toggle_favorite()
                .context("Failed to save favorites")?,
            TOGGLE_UNIT => dash.toggle_unit().context("Failed to save preferences")?,
            TOGGLE_THEME => dash.toggle_theme().context("Failed to save preferences")?,
            _ => break,
        }

        dash.settle().await;
        println!("{}\n", render_state(dash.state()));
    }

    Ok(())
}

fn choose(places: &[Location]) -> anyhow::Result<Option<Location>> {
    let labels: Vec<String> = places.iter().map(Location::display_name).collect();
    let picked = answered(Select::new("Pick a place:", labels).raw_prompt())?;
    Ok(picked.and_then(|option| places.get(option.index).cloned()))
}
