//! Core library for the `skyglass` weather client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the [`WeatherClient`] abstraction over it
//! - Device location and last-city persistence
//! - The coordinator that picks a source, fetches, and publishes the display record
//!
//! It is used by `skyglass-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod location;
pub mod model;
pub mod store;

pub use client::{OpenWeatherClient, WeatherClient};
pub use config::Config;
pub use coordinator::{LoadOutcome, WeatherCoordinator};
pub use error::FetchError;
pub use location::{
    AuthorizationStatus, DeviceLocation, FixedLocation, LocationBackend, LocationEvent,
    LocationProvider,
};
pub use model::{Coordinates, WeatherInfo, WeatherQuery, WeatherResponse};
pub use store::{FileStore, KeyValueStore, LAST_CITY_KEY, MemoryStore};
