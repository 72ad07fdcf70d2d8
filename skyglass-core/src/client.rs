use crate::{FetchError, WeatherQuery, WeatherResponse};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Fetches current weather from a remote API.
///
/// `Ok(None)` means the API answered but the body was not a weather document.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// `country` and `state` are accepted for future use and currently ignored.
    async fn fetch_by_name(
        &self,
        city: &str,
        country: Option<&str>,
        state: Option<&str>,
    ) -> Result<Option<WeatherResponse>, FetchError>;

    async fn fetch_by_position(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<WeatherResponse>, FetchError>;

    async fn fetch(&self, query: &WeatherQuery) -> Result<Option<WeatherResponse>, FetchError> {
        match query {
            WeatherQuery::ByName(city) => self.fetch_by_name(city, None, None).await,
            WeatherQuery::ByPosition { lat, lon } => self.fetch_by_position(*lat, *lon).await,
        }
    }
}
