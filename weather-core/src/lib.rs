//! Core library for the `weather-feed` CLI.
//!
//! This crate defines:
//! - Configuration (config file, run settings)
//! - The weather fetcher and its OpenWeatherMap implementation
//! - Template rendering of weather records
//! - Refresh scheduling: trigger sources, the refresh worker and the
//!   completion coordinator that decides when a run-once process exits
//!
//! It is used by `weather-feed`, but can also be reused by other binaries or services.

pub mod config;
pub mod coordinator;
pub mod model;
pub mod provider;
pub mod render;
pub mod scheduler;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{Config, DEFAULT_FETCH_DELAY, MAX_FETCH_DELAY, RunConfig};
pub use coordinator::{Coordinator, Shutdown};
pub use model::{Temperature, WeatherRecord};
pub use provider::{FetchError, FetcherConfig, OpenWeatherFetcher, WeatherFetcher};
pub use render::{RenderError, WeatherTemplate, format_temp};
pub use scheduler::{IntervalSignalTriggers, Scheduler, SchedulerError, Trigger, TriggerSource};
pub use worker::{Completion, RefreshRequest, RefreshWorker, StopReason, WorkerExit};
