use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, value_parser};
use inquire::{CustomType, Text};
use meteo_core::{
    ClientOptions, Config, CurrentConditions, ForecastMode, ForecastResult, Location,
    MAX_FORECAST_DAYS, Place, WeatherClient,
};
use std::{io, time::Duration};

use crate::{
    color::{Palette, color_enabled},
    render::Renderer,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "meteo",
    version,
    about = "Current weather and forecasts for any location, for humans and scripts"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by all commands.
#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Weather API base URL.
    #[arg(long, env = "WEATHER_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Geocoding API base URL.
    #[arg(long, env = "WEATHER_GEO_BASE_URL", global = true)]
    pub geo_base_url: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, global = true, value_parser = value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable color output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose logging to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Query(Query),

    /// Interactively set the default location and API settings.
    Configure,
}

/// Commands that fetch and render weather data.
#[derive(Debug, Subcommand)]
pub enum Query {
    /// Get current weather for a location.
    Current {
        /// Location name (e.g. "New York", "London, UK") or "lat,lon".
        /// Falls back to the configured default location.
        #[arg(allow_hyphen_values = true)]
        location: Vec<String>,
    },

    /// Get weather forecast for a location.
    Forecast {
        /// Location name (e.g. "Paris", "Tokyo, Japan") or "lat,lon".
        #[arg(allow_hyphen_values = true)]
        location: Vec<String>,

        /// Number of forecast days (1-16).
        #[arg(long, default_value_t = 7, value_parser = value_parser!(u8).range(1..=16))]
        days: u8,

        /// Show hourly forecast instead of daily.
        #[arg(long)]
        hourly: bool,

        /// Number of hours for hourly forecast (1-384).
        #[arg(long, default_value_t = 24, value_parser = value_parser!(u16).range(1..=384))]
        hours: u16,
    },

    /// Search for location coordinates.
    Search {
        /// Location search query.
        #[arg(required = true)]
        query: Vec<String>,

        /// Max results (1-10).
        #[arg(long, default_value_t = 5, value_parser = value_parser!(u8).range(1..=10))]
        limit: u8,
    },
}

/// A fetched result waiting to be rendered.
#[derive(Debug)]
enum Output {
    Current(CurrentConditions),
    Forecast(ForecastResult),
    Locations(Vec<Location>),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let query = match self.command {
            Command::Query(query) => query,
            Command::Configure => return configure(config_or_default(Config::load())),
        };
        let config = Config::load()?;

        let client = WeatherClient::new(self.global.client_options(&config))?;
        let palette = Palette::new(!self.global.json && color_enabled(self.global.no_color));
        let renderer = Renderer::new(self.global.json, palette);
        tracing::debug!(json = self.global.json, color = palette.is_enabled(), "output settings");

        // Dropping the command future on Ctrl-C aborts the in-flight request.
        let output = tokio::select! {
            output = query.execute(&client, &config) => output?,
            _ = tokio::signal::ctrl_c() => bail!("interrupted"),
        };

        let mut out = io::stdout().lock();
        let written = match &output {
            Output::Current(current) => renderer.current(&mut out, current),
            Output::Forecast(forecast) => renderer.forecast(&mut out, forecast),
            Output::Locations(locations) => renderer.locations(&mut out, locations),
        };
        written.context("Failed to write output")
    }
}

impl GlobalOptions {
    /// Flags and environment take precedence over the config file.
    pub fn client_options(&self, config: &Config) -> ClientOptions {
        let mut options = config.client_options();

        if let Some(url) = &self.base_url {
            options.base_url = url.clone();
        }
        if let Some(url) = &self.geo_base_url {
            options.geo_base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            options.timeout = Duration::from_secs(secs);
        }

        options
    }
}

impl Query {
    async fn execute(self, client: &WeatherClient, config: &Config) -> Result<Output> {
        match self {
            Query::Current { location } => {
                let place = resolve_place(&location, config)?;
                tracing::info!(%place, "fetching current weather");

                Ok(Output::Current(client.current(&place).await?))
            }
            Query::Forecast { location, days, hourly, hours } => {
                let place = resolve_place(&location, config)?;

                let mut forecast = if hourly {
                    let days = hourly_days(hours);
                    tracing::info!(%place, hours, days, "fetching hourly forecast");
                    client.forecast(&place, days, ForecastMode::Hourly).await?
                } else {
                    tracing::info!(%place, days, "fetching daily forecast");
                    client.forecast(&place, days, ForecastMode::Daily).await?
                };

                if hourly {
                    forecast.limit_hours(usize::from(hours));
                }
                Ok(Output::Forecast(forecast))
            }
            Query::Search { query, limit } => {
                let query = query.join(" ");
                tracing::info!(%query, "searching locations");

                let mut locations = client.search_location(&query).await?;
                locations.truncate(usize::from(limit));
                Ok(Output::Locations(locations))
            }
        }
    }
}

/// Days to request so that `hours` hourly points are covered: whole days,
/// rounded up, capped at the API maximum.
fn hourly_days(hours: u16) -> u8 {
    let days = hours.div_ceil(24).min(u16::from(MAX_FORECAST_DAYS));
    u8::try_from(days).unwrap_or(MAX_FORECAST_DAYS)
}

fn resolve_place(words: &[String], config: &Config) -> Result<Place> {
    let joined = words.join(" ");
    if !joined.trim().is_empty() {
        return Ok(joined.parse()?);
    }

    config.default_place().ok_or_else(|| {
        anyhow!(
            "No location given and no default location configured.\n\
             Hint: pass a location or run `meteo configure`."
        )
    })
}

/// `configure` is how a broken config file gets repaired, so it starts from
/// the defaults instead of failing when the existing file can't be loaded.
fn config_or_default(loaded: Result<Config>) -> Config {
    loaded.unwrap_or_else(|err| {
        tracing::warn!("ignoring unreadable config: {err:#}");
        Config::default()
    })
}

fn configure(mut config: Config) -> Result<()> {
    let defaults = ClientOptions::default();

    let location = Text::new("Default location (name or lat,lon):")
        .with_initial_value(config.default_location.as_deref().unwrap_or(""))
        .with_help_message("Leave empty to always pass a location")
        .prompt()?;
    config.default_location = non_empty(location);

    let base_url = Text::new("Weather API base URL:")
        .with_initial_value(config.base_url.as_deref().unwrap_or(&defaults.base_url))
        .prompt()?;
    config.base_url = non_default(base_url, &defaults.base_url);

    let geo_base_url = Text::new("Geocoding API base URL:")
        .with_initial_value(config.geo_base_url.as_deref().unwrap_or(&defaults.geo_base_url))
        .prompt()?;
    config.geo_base_url = non_default(geo_base_url, &defaults.geo_base_url);

    let timeout = CustomType::<u64>::new("HTTP timeout in seconds:")
        .with_default(config.timeout_secs.unwrap_or(defaults.timeout.as_secs()))
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;
    config.timeout_secs = (timeout != defaults.timeout.as_secs()).then_some(timeout);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_default(value: String, default: &str) -> Option<String> {
    non_empty(value).filter(|v| v != default)
}
