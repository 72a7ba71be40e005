//! Decoding of Open-Meteo responses into the domain model.
//!
//! Forecast responses carry each measurement as its own array, all indexed
//! by a shared `time` array. Decoding validates that every array has the
//! same length as `time` and then folds them into one entry per instant.
//! Null or absent measurements become 0; unparseable timestamps become
//! `None`. Anything structurally wrong fails the whole decode.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::WeatherError,
    lookup::condition_from_code,
    model::{
        CurrentConditions, DailyForecastEntry, ForecastMode, ForecastResult, HourlyForecastEntry,
        Location,
    },
};

/// Decodes a `current=...` forecast response.
pub fn decode_current(
    body: &[u8],
    known: Option<&Location>,
) -> Result<CurrentConditions, WeatherError> {
    let mut envelope: Envelope = serde_json::from_slice(body)?;
    let current: CurrentBlock = envelope.take_block("current")?;
    let offset = envelope.offset();

    let time = current
        .time
        .as_deref()
        .and_then(|t| parse_timestamp(t, offset).ok());

    Ok(CurrentConditions {
        location: envelope.resolve_location(known)?,
        time,
        temperature: current.temperature_2m,
        apparent: current.apparent_temperature.unwrap_or_default(),
        humidity: percent(current.relative_humidity_2m),
        precipitation: current.precipitation.unwrap_or_default(),
        rain: current.rain.unwrap_or_default(),
        snowfall: current.snowfall.unwrap_or_default(),
        wind_speed: current.wind_speed_10m.unwrap_or_default(),
        wind_direction: degrees(current.wind_direction_10m),
        pressure: current.pressure_msl.unwrap_or_default(),
        cloud_cover: percent(current.cloud_cover),
        visibility: 0.0,
        uv_index: current.uv_index.unwrap_or_default(),
        weather_code: current.weather_code,
        condition: condition_from_code(current.weather_code).to_string(),
    })
}

/// Decodes an `hourly=...` or `daily=...` forecast response.
pub fn decode_forecast(
    body: &[u8],
    mode: ForecastMode,
    known: Option<&Location>,
) -> Result<ForecastResult, WeatherError> {
    let mut envelope: Envelope = serde_json::from_slice(body)?;
    let offset = envelope.offset();

    let (daily, hourly) = match mode {
        ForecastMode::Daily => {
            let block: DailyBlock = envelope.take_block("daily")?;
            (block.into_entries(offset)?, Vec::new())
        }
        ForecastMode::Hourly => {
            let block: HourlyBlock = envelope.take_block("hourly")?;
            (Vec::new(), block.into_entries(offset)?)
        }
    };

    Ok(ForecastResult {
        location: envelope.resolve_location(known)?,
        daily,
        hourly,
    })
}

/// Decodes a geocoding search response, keeping the provider's ranking.
///
/// A response without results is reported as [`WeatherError::NotFound`].
pub fn decode_search(body: &[u8], query: &str) -> Result<Vec<Location>, WeatherError> {
    let response: SearchResponse = serde_json::from_slice(body)?;

    if response.results.is_empty() {
        return Err(WeatherError::NotFound { query: query.to_string() });
    }

    Ok(response
        .results
        .into_iter()
        .map(|r| Location {
            name: r.name,
            latitude: r.latitude,
            longitude: r.longitude,
            country: r.country,
            admin1: r.admin1,
            timezone: r.timezone,
        })
        .collect())
}

/// Parses an API timestamp.
///
/// RFC 3339 strings carry their own offset. Open-Meteo local times
/// (`2024-07-15T14:00`) have none and are placed at `offset`.
pub fn parse_timestamp(value: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, WeatherError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| WeatherError::Timestamp { value: value.to_string() })
}

fn parse_date(value: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidDate(value.to_string()))
}

fn percent(value: Option<f64>) -> u8 {
    value.unwrap_or_default().round().clamp(0.0, 100.0) as u8
}

fn degrees(value: Option<f64>) -> i32 {
    value.unwrap_or_default().round() as i32
}

/// Ensures a sibling array is index-aligned with `time`.
fn column<'a, T>(field: &'static str, values: &'a [T], expected: usize) -> Result<&'a [T], WeatherError> {
    if values.len() != expected {
        return Err(WeatherError::LengthMismatch {
            field,
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}

fn at(values: &[Option<f64>], i: usize) -> f64 {
    values[i].unwrap_or_default()
}

fn timestamp_at(values: &[Option<String>], i: usize, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    values[i]
        .as_deref()
        .and_then(|t| parse_timestamp(t, offset).ok())
}

#[derive(Debug, Deserialize)]
struct Envelope {
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(flatten)]
    blocks: serde_json::Map<String, serde_json::Value>,
}

impl Envelope {
    fn take_block<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<T, WeatherError> {
        let block = self.blocks.remove(key).ok_or(WeatherError::MissingKey(key))?;
        Ok(serde_json::from_value(block)?)
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }

    fn resolve_location(&self, known: Option<&Location>) -> Result<Location, WeatherError> {
        if let Some(known) = known {
            let mut location = known.clone();
            if self.timezone.is_some() {
                location.timezone = self.timezone.clone();
            }
            return Ok(location);
        }

        Ok(Location {
            timezone: self.timezone.clone(),
            ..Location::from_coordinates(
                self.latitude.ok_or(WeatherError::MissingKey("latitude"))?,
                self.longitude.ok_or(WeatherError::MissingKey("longitude"))?,
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    temperature_2m: f64,
    weather_code: i32,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    rain: Option<f64>,
    snowfall: Option<f64>,
    cloud_cover: Option<f64>,
    pressure_msl: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Option<Vec<Option<String>>>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    rain: Vec<Option<f64>>,
    #[serde(default)]
    snowfall: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pressure_msl: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
}

impl HourlyBlock {
    fn into_entries(self, offset: FixedOffset) -> Result<Vec<HourlyForecastEntry>, WeatherError> {
        let time = self.time.ok_or(WeatherError::MissingKey("time"))?;
        let n = time.len();

        let temperature = column("temperature_2m", &self.temperature_2m, n)?;
        let apparent = column("apparent_temperature", &self.apparent_temperature, n)?;
        let humidity = column("relative_humidity_2m", &self.relative_humidity_2m, n)?;
        let precip_prob = column("precipitation_probability", &self.precipitation_probability, n)?;
        let precipitation = column("precipitation", &self.precipitation, n)?;
        let rain = column("rain", &self.rain, n)?;
        let snowfall = column("snowfall", &self.snowfall, n)?;
        let weather_code = column("weather_code", &self.weather_code, n)?;
        let pressure = column("pressure_msl", &self.pressure_msl, n)?;
        let cloud_cover = column("cloud_cover", &self.cloud_cover, n)?;
        let wind_speed = column("wind_speed_10m", &self.wind_speed_10m, n)?;
        let wind_direction = column("wind_direction_10m", &self.wind_direction_10m, n)?;
        let uv_index = column("uv_index", &self.uv_index, n)?;

        Ok((0..n)
            .map(|i| {
                let code = weather_code[i].unwrap_or_default();
                HourlyForecastEntry {
                    time: timestamp_at(&time, i, offset),
                    temperature: at(temperature, i),
                    apparent: at(apparent, i),
                    humidity: percent(humidity[i]),
                    precipitation: at(precipitation, i),
                    rain: at(rain, i),
                    snowfall: at(snowfall, i),
                    wind_speed: at(wind_speed, i),
                    wind_direction: degrees(wind_direction[i]),
                    pressure: at(pressure, i),
                    cloud_cover: percent(cloud_cover[i]),
                    visibility: 0.0,
                    uv_index: at(uv_index, i),
                    precip_prob: percent(precip_prob[i]),
                    weather_code: code,
                    condition: condition_from_code(code).to_string(),
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Option<Vec<String>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature_max: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature_min: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    rain_sum: Vec<Option<f64>>,
    #[serde(default)]
    snowfall_sum: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m_dominant: Vec<Option<f64>>,
}

impl DailyBlock {
    fn into_entries(self, offset: FixedOffset) -> Result<Vec<DailyForecastEntry>, WeatherError> {
        let time = self.time.ok_or(WeatherError::MissingKey("time"))?;
        let n = time.len();

        let temp_max = column("temperature_2m_max", &self.temperature_2m_max, n)?;
        let temp_min = column("temperature_2m_min", &self.temperature_2m_min, n)?;
        let apparent_max = column("apparent_temperature_max", &self.apparent_temperature_max, n)?;
        let apparent_min = column("apparent_temperature_min", &self.apparent_temperature_min, n)?;
        let sunrise = column("sunrise", &self.sunrise, n)?;
        let sunset = column("sunset", &self.sunset, n)?;
        let uv_index_max = column("uv_index_max", &self.uv_index_max, n)?;
        let precipitation = column("precipitation_sum", &self.precipitation_sum, n)?;
        let rain = column("rain_sum", &self.rain_sum, n)?;
        let snowfall = column("snowfall_sum", &self.snowfall_sum, n)?;
        let precip_prob = column("precipitation_probability_max", &self.precipitation_probability_max, n)?;
        let weather_code = column("weather_code", &self.weather_code, n)?;
        let wind_speed_max = column("wind_speed_10m_max", &self.wind_speed_10m_max, n)?;
        let wind_direction = column("wind_direction_10m_dominant", &self.wind_direction_10m_dominant, n)?;

        time.iter()
            .enumerate()
            .map(|(i, date)| -> Result<DailyForecastEntry, WeatherError> {
                let code = weather_code[i].unwrap_or_default();
                Ok(DailyForecastEntry {
                    date: parse_date(date)?,
                    temp_max: at(temp_max, i),
                    temp_min: at(temp_min, i),
                    apparent_max: at(apparent_max, i),
                    apparent_min: at(apparent_min, i),
                    precipitation: at(precipitation, i),
                    rain: at(rain, i),
                    snowfall: at(snowfall, i),
                    wind_speed_max: at(wind_speed_max, i),
                    wind_direction: degrees(wind_direction[i]),
                    uv_index_max: at(uv_index_max, i),
                    precip_prob: percent(precip_prob[i]),
                    sunrise: timestamp_at(sunrise, i, offset),
                    sunset: timestamp_at(sunset, i, offset),
                    weather_code: code,
                    condition: condition_from_code(code).to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: Option<String>,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    timezone: Option<String>,
}
