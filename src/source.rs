//! Reading source: fetches one batch of current conditions per tick.
//!
//! [`OpenWeatherSource`] queries the OpenWeatherMap current-weather endpoint
//! once per configured city. A city whose request or decode fails is left out
//! of the batch; partial batches are normal.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::ReadingPayload;

#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_batch(&self) -> Vec<ReadingPayload>;
}

// ---

/// Subset of the provider's current-weather response that we consume.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: Option<String>,
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    dt: Option<i64>,
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: Option<String>,
}

impl From<CurrentWeather> for ReadingPayload {
    fn from(body: CurrentWeather) -> Self {
        // ---
        let (temp_k, feels_like_k) = match body.main {
            Some(main) => (main.temp, main.feels_like),
            None => (None, None),
        };

        ReadingPayload {
            city: body.name,
            temp_k,
            feels_like_k,
            condition: body.weather.into_iter().next().and_then(|w| w.main),
            observed_at: body.dt,
            utc_offset_secs: body.timezone,
        }
    }
}

/// Decode one current-weather response body.
pub fn parse_current_weather(body: &serde_json::Value) -> serde_json::Result<ReadingPayload> {
    // ---
    let parsed: CurrentWeather = serde_json::from_value(body.clone())?;
    Ok(parsed.into())
}

// ---

/// Upper bound on the TCP connect phase of a request.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OpenWeatherSource {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    country_code: String,
    cities: Vec<String>,
}

impl OpenWeatherSource {
    // ---
    /// Build a source whose requests give up after `timeout`.
    ///
    /// A city that does not answer in time is omitted from the batch like any
    /// other failed fetch.
    pub fn new(
        api_url: &str,
        api_key: &str,
        country_code: &str,
        cities: &[String],
        timeout: Duration,
    ) -> Result<Self> {
        // ---
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            country_code: country_code.to_string(),
            cities: cities.to_vec(),
        })
    }

    fn query_for(&self, city: &str) -> String {
        // ---
        if self.country_code.is_empty() {
            city.to_string()
        } else {
            format!("{},{}", city, self.country_code)
        }
    }
}

async fn fetch_city(
    client: reqwest::Client,
    url: String,
    query: String,
    api_key: String,
) -> Result<ReadingPayload, reqwest::Error> {
    // ---
    let body: serde_json::Value = client
        .get(&url)
        .query(&[("q", query.as_str()), ("appid", api_key.as_str())])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    debug!(query = %query, "Raw response: {}", body);

    match parse_current_weather(&body) {
        Ok(payload) => Ok(payload),
        Err(e) => {
            // Shape mismatch: hand the engine an empty payload so it is counted as malformed
            warn!(query = %query, error = %e, "Unexpected response shape");
            Ok(ReadingPayload::default())
        }
    }
}

#[async_trait]
impl ReadingSource for OpenWeatherSource {
    async fn fetch_batch(&self) -> Vec<ReadingPayload> {
        // ---
        let handles: Vec<_> = self
            .cities
            .iter()
            .map(|city| {
                let query = self.query_for(city);
                let handle = tokio::spawn(fetch_city(
                    self.client.clone(),
                    self.api_url.clone(),
                    query,
                    self.api_key.clone(),
                ));
                (city.clone(), handle)
            })
            .collect();

        // Await in configured order so batch order is stable
        let mut batch = Vec::with_capacity(handles.len());
        for (city, handle) in handles {
            match handle.await {
                Ok(Ok(payload)) => batch.push(payload),
                Ok(Err(e)) => warn!(city = %city, error = %e, "Fetch failed, omitting city"),
                Err(e) => warn!(city = %city, error = %e, "Fetch task aborted, omitting city"),
            }
        }

        debug!(
            requested = self.cities.len(),
            received = batch.len(),
            "Batch fetched"
        );
        batch
    }
}
