use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::WeatherRecord;

pub mod openweather;

pub use openweather::OpenWeatherFetcher;

/// Current-weather endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Why a single fetch failed. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to send request to weather service: {0}")]
    Request(reqwest::Error),

    #[error("Failed to retrieve weather (HTTP {status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to read weather service response body: {0}")]
    Body(reqwest::Error),

    #[error("Failed to parse weather JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where and how to reach the weather service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub endpoint: String,
    /// Sent as `appid` when present.
    pub api_key: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_string(), api_key: None }
    }
}

/// One-shot retrieval of current weather for a location.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, location_id: &str) -> Result<WeatherRecord, FetchError>;
}
