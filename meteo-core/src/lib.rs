//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - The weather domain model (locations, current conditions, forecasts)
//! - Decoding of Open-Meteo's parallel-array responses into that model
//! - A client that resolves places and issues forecast requests
//! - Configuration handling
//!
//! It is used by `meteo-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod lookup;
pub mod model;
pub mod transport;

pub use client::{ClientOptions, MAX_FORECAST_DAYS, WeatherClient};
pub use config::Config;
pub use error::{ErrorKind, WeatherError};
pub use lookup::{compass_from_degrees, condition_from_code};
pub use model::{
    CurrentConditions, DailyForecastEntry, ForecastMode, ForecastResult, HourlyForecastEntry,
    Location, Place,
};
pub use transport::{HttpFetch, HttpReply, ReqwestFetch};
