use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, trace, warn};

use crate::{Config, FetchError, WeatherQuery, WeatherResponse, config::DEFAULT_BASE_URL};

use super::WeatherClient;

/// Client for the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    /// Build a client from config: API key, base URL and optional timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            http: builder.build()?,
        })
    }

    fn request_url(&self, query: &WeatherQuery) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidRequest(format!("{}: {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidRequest(format!(
                "{}: unsupported scheme '{}'",
                self.base_url,
                url.scheme()
            )));
        }

        {
            let mut pairs = url.query_pairs_mut();
            match query {
                WeatherQuery::ByName(city) => {
                    pairs.append_pair("q", city);
                }
                WeatherQuery::ByPosition { lat, lon } => {
                    pairs.append_pair("lat", &lat.to_string());
                    pairs.append_pair("lon", &lon.to_string());
                }
            }
            pairs.append_pair("appid", &self.api_key);
        }

        Ok(url)
    }

    async fn get(&self, query: &WeatherQuery) -> Result<Option<WeatherResponse>, FetchError> {
        let url = self.request_url(query)?;
        debug!(%query, base_url = %self.base_url, "Requesting current weather");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(
                %query,
                %status,
                body = %truncate_body(&body),
                "OpenWeather returned a non-success status"
            );
        }

        match serde_json::from_str::<WeatherResponse>(&body) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                debug!(%query, error = %e, "Response body is not a weather document");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_by_name(
        &self,
        city: &str,
        country: Option<&str>,
        state: Option<&str>,
    ) -> Result<Option<WeatherResponse>, FetchError> {
        if country.is_some() || state.is_some() {
            trace!(?country, ?state, "country/state are not part of the query yet");
        }
        self.get(&WeatherQuery::ByName(city.to_string())).await
    }

    async fn fetch_by_position(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<WeatherResponse>, FetchError> {
        self.get(&WeatherQuery::ByPosition { lat, lon }).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
