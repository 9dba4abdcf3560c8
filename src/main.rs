//! Application entry point for the `codemetal-weatherflow` service.
//!
//! This binary orchestrates the full startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the OpenWeatherMap reading source and the aggregation engine
//! - Spawning the fixed-interval scheduler that feeds the engine
//! - Binding the Axum HTTP server that serves the read-only display API
//!
//! # Environment Variables
//! - `OPENWEATHER_API_KEY` (**required**) – provider API key
//! - `WEATHER_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `WEATHER_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the remaining settings.
use std::{env, io::IsTerminal};

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use weatherflow::pipeline::AggregationEngine;
use weatherflow::sink::SharedSnapshot;
use weatherflow::source::OpenWeatherSource;
use weatherflow::{config, routes, scheduler};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let source = OpenWeatherSource::new(
        &cfg.api_url,
        &cfg.api_key,
        &cfg.country_code,
        &cfg.cities,
        cfg.http_timeout(),
    )
    .context("Failed to build HTTP client")?;
    let snapshot = SharedSnapshot::new();
    let engine = AggregationEngine::new(cfg.engine_config()?, snapshot.clone());

    let every = cfg.refresh_interval();
    tokio::spawn(async move {
        scheduler::run(source, engine, every, None).await;
    });

    let app = routes::router(snapshot);

    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `WEATHER_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `WEATHER_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("WEATHER_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to WEATHER_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("WEATHER_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
