use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use skyglass_core::{
    Config, Coordinates, FileStore, FixedLocation, KeyValueStore, LAST_CITY_KEY, LoadOutcome,
    OpenWeatherClient, WeatherCoordinator,
};
use std::sync::Arc;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglass", version, about = "Current weather for a city or a position")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Position flags, used when no city is given and none was searched before.
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct PositionArgs {
    /// Latitude of the current position.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the current position.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show the weather once.
    Show {
        /// City to look up; defaults to the last searched city.
        city: Option<String>,

        #[command(flatten)]
        position: PositionArgs,

        /// Print the display record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search interactively: each city entered is looked up, an empty line refreshes.
    Search {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Forget the last searched city.
    Forget,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, position, json } => {
                let coordinator = build_coordinator(position.coordinates())?;
                coordinator.set_city(city);

                let outcome = coordinator.load_data().await;
                report(&outcome);
                if outcome.is_updated() {
                    print_info(&coordinator, json)?;
                }
                Ok(())
            }
            Command::Search { position } => {
                search(build_coordinator(position.coordinates())?).await
            }
            Command::Forget => {
                let config = Config::load()?;
                let store = FileStore::open(config.state_file_path()?)?;
                store.remove(LAST_CITY_KEY)?;
                println!("Last searched city forgotten.");
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_coordinator(position: Option<Coordinates>) -> anyhow::Result<WeatherCoordinator> {
    let config = Config::load()?;
    let client = OpenWeatherClient::from_config(&config)?;
    let state_path = config.state_file_path()?;
    tracing::debug!(
        state = %state_path.display(),
        base_url = %config.base_url,
        "Building coordinator"
    );
    let store = FileStore::open(state_path)?;

    Ok(WeatherCoordinator::new(
        Arc::new(client),
        Arc::new(FixedLocation(position)),
        Arc::new(store),
    ))
}

async fn search(coordinator: WeatherCoordinator) -> anyhow::Result<()> {
    // Startup load mirrors the view appearing: last city or position.
    let outcome = coordinator.load_data().await;
    report(&outcome);
    if outcome.is_updated() {
        print_info(&coordinator, false)?;
    }

    loop {
        let input = tokio::task::spawn_blocking(|| {
            Text::new("City:")
                .with_help_message("Enter to refresh, :q to quit")
                .prompt()
        })
        .await?;

        let text = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match text.trim() {
            ":q" => break,
            "" => coordinator.set_city(None),
            city => coordinator.set_city(Some(city.to_string())),
        }

        let outcome = coordinator.load_data().await;
        report(&outcome);
        if outcome.is_updated() {
            print_info(&coordinator, false)?;
        }
    }

    Ok(())
}

fn print_info(coordinator: &WeatherCoordinator, json: bool) -> anyhow::Result<()> {
    let info = coordinator.info();
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", render::render(&info)?);
    }
    Ok(())
}

fn report(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Updated(_) => {}
        LoadOutcome::NoData(query) => eprintln!("No weather data for {query}."),
        LoadOutcome::NoSource => eprintln!(
            "Nothing to look up.\n\
             Hint: pass a city, or a position with --lat/--lon."
        ),
        LoadOutcome::Failed { query, error } => {
            eprintln!("Could not fetch weather for {query}: {error}")
        }
        LoadOutcome::Superseded(query) => eprintln!("Result for {query} arrived too late."),
    }
}
