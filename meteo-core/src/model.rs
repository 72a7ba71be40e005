use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A geographic place with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    /// IANA timezone name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Location {
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            name: None,
            latitude,
            longitude,
            country: None,
            admin1: None,
            timezone: None,
        }
    }

    /// Name, region and country joined with ", ", skipping absent parts.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [&self.name, &self.admin1, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            format!("{:.4}, {:.4}", self.latitude, self.longitude)
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location: Location,
    /// Observation time; `None` when the upstream value could not be parsed.
    pub time: Option<DateTime<FixedOffset>>,
    /// °C
    pub temperature: f64,
    /// Feels-like °C
    pub apparent: f64,
    /// %
    pub humidity: u8,
    /// mm
    pub precipitation: f64,
    /// mm
    pub rain: f64,
    /// cm
    pub snowfall: f64,
    /// km/h
    pub wind_speed: f64,
    pub wind_direction: i32,
    /// hPa
    pub pressure: f64,
    pub cloud_cover: u8,
    /// Meters. Reserved: no request asks for it, so it stays 0.
    pub visibility: f64,
    pub uv_index: f64,
    pub weather_code: i32,
    pub condition: String,
}

/// A single day's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub apparent_max: f64,
    pub apparent_min: f64,
    pub precipitation: f64,
    pub rain: f64,
    pub snowfall: f64,
    pub wind_speed_max: f64,
    /// Dominant direction in degrees.
    pub wind_direction: i32,
    pub uv_index_max: f64,
    pub precip_prob: u8,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
    pub weather_code: i32,
    pub condition: String,
}

/// A single hour's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastEntry {
    pub time: Option<DateTime<FixedOffset>>,
    pub temperature: f64,
    pub apparent: f64,
    pub humidity: u8,
    pub precipitation: f64,
    pub rain: f64,
    pub snowfall: f64,
    pub wind_speed: f64,
    pub wind_direction: i32,
    pub pressure: f64,
    pub cloud_cover: u8,
    pub visibility: f64,
    pub uv_index: f64,
    pub precip_prob: u8,
    pub weather_code: i32,
    pub condition: String,
}

/// Forecast for one location; only the series matching the requested
/// [`ForecastMode`] is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily: Vec<DailyForecastEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hourly: Vec<HourlyForecastEntry>,
}

impl ForecastResult {
    /// Keeps at most the first `hours` hourly entries.
    pub fn limit_hours(&mut self, hours: usize) {
        self.hourly.truncate(hours);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    Daily,
    Hourly,
}

impl ForecastMode {
    /// Top-level response key and query parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMode::Daily => "daily",
            ForecastMode::Hourly => "hourly",
        }
    }
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked about: a free-text place or explicit coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Name(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl FromStr for Place {
    type Err = std::convert::Infallible;

    /// `"52.52,13.41"` becomes coordinates when both values are in range;
    /// anything else is treated as a place name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some((lat, lon)) = trimmed.split_once(',') {
            if let (Ok(latitude), Ok(longitude)) =
                (lat.trim().parse::<f64>(), lon.trim().parse::<f64>())
            {
                if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
                    return Ok(Place::Coordinates { latitude, longitude });
                }
            }
        }

        Ok(Place::Name(trimmed.to_string()))
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Name(name) => f.write_str(name),
            Place::Coordinates { latitude, longitude } => write!(f, "{latitude:.4},{longitude:.4}"),
        }
    }
}
