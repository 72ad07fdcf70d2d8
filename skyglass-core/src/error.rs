use thiserror::Error;

/// Failures surfaced by a [`WeatherClient`](crate::WeatherClient).
///
/// Undecodable response bodies are not errors; the client reports them as
/// "no data" instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid request URL: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
