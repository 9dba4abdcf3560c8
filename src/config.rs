//! Configuration loader for the `codemetal-weatherflow` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Every other module receives a typed [`Config`]
//! instead of reading the environment itself.
//!
use std::{env, net::SocketAddr, time::Duration};

use anyhow::{anyhow, Result};
use chrono::FixedOffset;

use crate::pipeline::{AggregationMode, EngineConfig, DEFAULT_THRESHOLD_C};

/// Cities polled when `WEATHER_CITIES` is not set.
pub const DEFAULT_CITIES: [&str; 6] = [
    "Delhi",
    "Mumbai",
    "Chennai",
    "Bangalore",
    "Kolkata",
    "Hyderabad",
];

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// OpenWeatherMap API key.
    pub api_key: String,

    /// Current-weather endpoint.
    pub api_url: String,

    /// Cities to poll, in display order. Never empty.
    pub cities: Vec<String>,

    /// Country qualifier appended to each city query.
    pub country_code: String,

    /// Alert threshold in degrees Celsius.
    pub threshold: f64,

    /// Seconds between polls.
    pub refresh_interval_secs: u64,

    /// Per-request timeout for provider calls, in seconds.
    pub http_timeout_secs: u64,

    /// How batches within one day are combined.
    pub aggregation_mode: AggregationMode,

    /// Offset from UTC used to decide which calendar day a cycle belongs to.
    pub day_offset_minutes: i32,

    /// Address the HTTP display API listens on.
    pub bind_addr: SocketAddr,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `OPENWEATHER_API_KEY` – provider API key
///
/// Optional:
/// - `OPENWEATHER_API_URL` – endpoint (default: OpenWeatherMap 2.5 current weather)
/// - `WEATHER_CITIES` – comma separated city list (default: six Indian metros)
/// - `WEATHER_COUNTRY_CODE` – country qualifier (default: `IN`)
/// - `ALERT_THRESHOLD_C` – alert threshold (default: 35.0)
/// - `REFRESH_INTERVAL_SECS` – poll interval (default: 300)
/// - `HTTP_TIMEOUT_SECS` – per-request provider timeout (default: 10)
/// - `AGGREGATION_MODE` – `latest` or `cumulative` (default: `latest`)
/// - `DAY_UTC_OFFSET_MINUTES` – day boundary offset (default: 0)
/// - `BIND_ADDR` – HTTP listen address (default: `0.0.0.0:8080`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_from(|name| env::var(name).ok())
}

/// Same as [`load_from_env`] but reads variables through `lookup`.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let api_key = require_env!(lookup, "OPENWEATHER_API_KEY");
    let api_url = lookup("OPENWEATHER_API_URL")
        .unwrap_or_else(|| "https://api.openweathermap.org/data/2.5/weather".to_string());
    let country_code = lookup("WEATHER_COUNTRY_CODE").unwrap_or_else(|| "IN".to_string());

    let cities = match lookup("WEATHER_CITIES") {
        Some(raw) => parse_cities(&raw)?,
        None => DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
    };

    let threshold = parse_env!(lookup, "ALERT_THRESHOLD_C", f64, DEFAULT_THRESHOLD_C);
    if !threshold.is_finite() {
        return Err(anyhow!("Invalid ALERT_THRESHOLD_C: must be finite"));
    }

    let refresh_interval_secs = parse_env!(lookup, "REFRESH_INTERVAL_SECS", u64, 300);
    if refresh_interval_secs == 0 {
        return Err(anyhow!("Invalid REFRESH_INTERVAL_SECS: must be greater than 0"));
    }

    let http_timeout_secs = parse_env!(lookup, "HTTP_TIMEOUT_SECS", u64, 10);
    if http_timeout_secs == 0 {
        return Err(anyhow!("Invalid HTTP_TIMEOUT_SECS: must be greater than 0"));
    }

    let aggregation_mode = match lookup("AGGREGATION_MODE").as_deref().map(str::trim) {
        None | Some("latest") => AggregationMode::LatestBatch,
        Some("cumulative") => AggregationMode::Cumulative,
        Some(other) => return Err(anyhow!("Invalid AGGREGATION_MODE: {}", other)),
    };

    let day_offset_minutes = parse_env!(lookup, "DAY_UTC_OFFSET_MINUTES", i32, 0);
    if FixedOffset::east_opt(day_offset_minutes.saturating_mul(60)).is_none() {
        return Err(anyhow!(
            "Invalid DAY_UTC_OFFSET_MINUTES: {} is out of range",
            day_offset_minutes
        ));
    }

    let bind_addr = parse_env!(
        lookup,
        "BIND_ADDR",
        SocketAddr,
        SocketAddr::from(([0, 0, 0, 0], 8080))
    );

    Ok(Config {
        api_key,
        api_url,
        cities,
        country_code,
        threshold,
        refresh_interval_secs,
        http_timeout_secs,
        aggregation_mode,
        day_offset_minutes,
        bind_addr,
    })
}

fn parse_cities(raw: &str) -> Result<Vec<String>> {
    // ---
    let cities: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    if cities.is_empty() {
        return Err(anyhow!("WEATHER_CITIES must name at least one city"));
    }
    Ok(cities)
}

impl Config {
    // ---
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        // ---
        let minutes = self.day_offset_minutes;
        let day_offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .ok_or_else(|| anyhow!("Day offset {} minutes is out of range", minutes))?;

        Ok(EngineConfig {
            threshold: self.threshold,
            mode: self.aggregation_mode,
            day_offset,
        })
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API key while showing all other configuration values.
    pub fn log_config(&self) {
        // ---
        let masked_key = match self.api_key.len().checked_sub(4) {
            Some(start) if start > 0 => {
                format!("****{}", self.api_key.get(start..).unwrap_or_default())
            }
            _ => "****".to_string(),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  OPENWEATHER_API_KEY    : {}", masked_key);
        tracing::info!("  OPENWEATHER_API_URL    : {}", self.api_url);
        tracing::info!("  WEATHER_CITIES         : {}", self.cities.join(","));
        tracing::info!("  WEATHER_COUNTRY_CODE   : {}", self.country_code);
        tracing::info!("  ALERT_THRESHOLD_C      : {}", self.threshold);
        tracing::info!("  REFRESH_INTERVAL_SECS  : {}", self.refresh_interval_secs);
        tracing::info!("  HTTP_TIMEOUT_SECS      : {}", self.http_timeout_secs);
        tracing::info!("  AGGREGATION_MODE       : {:?}", self.aggregation_mode);
        tracing::info!("  DAY_UTC_OFFSET_MINUTES : {}", self.day_offset_minutes);
        tracing::info!("  BIND_ADDR              : {}", self.bind_addr);
    }
}
