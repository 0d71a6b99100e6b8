use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::model::WeatherRecord;

use super::{FetchError, FetcherConfig, WeatherFetcher};

/// Fetches from the OpenWeatherMap current-weather endpoint by city id.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    config: FetcherConfig,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        Self { config, http: Client::new() }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    fn query<'a>(&'a self, location_id: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("id", location_id)];
        if let Some(key) = self.config.api_key.as_deref() {
            query.push(("appid", key));
        }
        query
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, location_id: &str) -> Result<WeatherRecord, FetchError> {
        let res = self
            .http
            .get(&self.config.endpoint)
            .query(&self.query(location_id))
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Body)?;
        debug!(endpoint = %self.config.endpoint, %status, bytes = body.len(), "weather service responded");

        if status != StatusCode::OK {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
