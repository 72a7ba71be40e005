//! Orchestration of geocoding and forecast requests against Open-Meteo.

use std::{sync::Arc, time::Duration};

use crate::{
    decode::{decode_current, decode_forecast, decode_search},
    error::WeatherError,
    model::{CurrentConditions, ForecastMode, ForecastResult, Location, Place},
    transport::{HttpFetch, ReqwestFetch},
};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_GEO_BASE_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Open-Meteo accepts between 1 and 16 forecast days.
pub const MAX_FORECAST_DAYS: u8 = 16;

const SEARCH_COUNT: &str = "10";

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "rain",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "uv_index",
];

const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "snowfall",
    "weather_code",
    "pressure_msl",
    "cloud_cover",
    "wind_speed_10m",
    "wind_direction_10m",
    "uv_index",
];

const DAILY_FIELDS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "uv_index_max",
    "precipitation_sum",
    "rain_sum",
    "snowfall_sum",
    "precipitation_probability_max",
    "weather_code",
    "wind_speed_10m_max",
    "wind_direction_10m_dominant",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub base_url: String,
    pub geo_base_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: String,
    geo_base_url: String,
    http: Arc<dyn HttpFetch>,
}

impl WeatherClient {
    pub fn new(options: ClientOptions) -> Result<Self, WeatherError> {
        let http = ReqwestFetch::new(options.timeout)?;
        Ok(Self::with_transport(options, Arc::new(http)))
    }

    /// Builds a client on top of an arbitrary transport.
    pub fn with_transport(options: ClientOptions, http: Arc<dyn HttpFetch>) -> Self {
        Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            geo_base_url: options.geo_base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Finds locations matching `query`, best match first.
    pub async fn search_location(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let url = format!("{}/search", self.geo_base_url);
        let params = [
            ("name", query.to_string()),
            ("count", SEARCH_COUNT.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let reply = self.http.get(&url, &params).await?.error_for_status()?;
        decode_search(&reply.body, query)
    }

    pub async fn current(&self, place: &Place) -> Result<CurrentConditions, WeatherError> {
        match place {
            Place::Name(name) => {
                let location = self.best_match(name).await?;
                self.current_at(location.latitude, location.longitude, Some(&location))
                    .await
            }
            Place::Coordinates { latitude, longitude } => {
                self.current_at(*latitude, *longitude, None).await
            }
        }
    }

    /// Current conditions at coordinates. `known` carries the place metadata
    /// when the caller already resolved it.
    pub async fn current_at(
        &self,
        latitude: f64,
        longitude: f64,
        known: Option<&Location>,
    ) -> Result<CurrentConditions, WeatherError> {
        let mut params = coordinate_params(latitude, longitude);
        params.push(("current", CURRENT_FIELDS.join(",")));

        let reply = self.fetch_forecast(&params).await?;
        decode_current(&reply, known)
    }

    pub async fn forecast(
        &self,
        place: &Place,
        days: u8,
        mode: ForecastMode,
    ) -> Result<ForecastResult, WeatherError> {
        validate_days(days)?;

        match place {
            Place::Name(name) => {
                let location = self.best_match(name).await?;
                self.forecast_at(location.latitude, location.longitude, days, mode, Some(&location))
                    .await
            }
            Place::Coordinates { latitude, longitude } => {
                self.forecast_at(*latitude, *longitude, days, mode, None).await
            }
        }
    }

    pub async fn forecast_at(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
        mode: ForecastMode,
        known: Option<&Location>,
    ) -> Result<ForecastResult, WeatherError> {
        validate_days(days)?;

        let fields = match mode {
            ForecastMode::Daily => DAILY_FIELDS,
            ForecastMode::Hourly => HOURLY_FIELDS,
        };

        let mut params = coordinate_params(latitude, longitude);
        params.push(("forecast_days", days.to_string()));
        params.push((mode.as_str(), fields.join(",")));

        let reply = self.fetch_forecast(&params).await?;
        decode_forecast(&reply, mode, known)
    }

    async fn best_match(&self, name: &str) -> Result<Location, WeatherError> {
        let locations = self.search_location(name).await?;
        tracing::debug!(query = name, matches = locations.len(), "resolved location");

        locations
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound { query: name.to_string() })
    }

    async fn fetch_forecast(&self, params: &[(&str, String)]) -> Result<Vec<u8>, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        let reply = self.http.get(&url, params).await?.error_for_status()?;
        Ok(reply.body)
    }
}

fn coordinate_params(latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", format!("{latitude:.4}")),
        ("longitude", format!("{longitude:.4}")),
        ("timezone", "auto".to_string()),
    ]
}

fn validate_days(days: u8) -> Result<(), WeatherError> {
    if (1..=MAX_FORECAST_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(WeatherError::InvalidArgument(format!(
            "days must be between 1 and {MAX_FORECAST_DAYS}, got {days}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, transport::HttpReply};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Request {
        url: String,
        query: Vec<(String, String)>,
    }

    impl Request {
        fn param(&self, key: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Replies with canned bodies chosen by URL suffix and records requests.
    #[derive(Debug, Default)]
    struct StubFetch {
        routes: Vec<(&'static str, u16, String)>,
        requests: Mutex<Vec<Request>>,
    }

    impl StubFetch {
        fn route(mut self, suffix: &'static str, status: u16, body: impl Into<String>) -> Self {
            self.routes.push((suffix, status, body.into()));
            self
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpFetch for StubFetch {
        async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, WeatherError> {
            self.requests.lock().unwrap().push(Request {
                url: url.to_string(),
                query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            });

            let (_, status, body) = self
                .routes
                .iter()
                .find(|(suffix, _, _)| url.ends_with(suffix))
                .unwrap_or_else(|| panic!("no stub route for {url}"));

            Ok(HttpReply { status: *status, body: body.clone().into_bytes() })
        }
    }

    const LONDON: &str = r#"{"results": [
        {"name": "London", "latitude": 51.50853, "longitude": -0.12574,
         "country": "United Kingdom", "admin1": "England", "timezone": "Europe/London"}
    ]}"#;

    const CURRENT: &str = r#"{
        "latitude": 51.5, "longitude": -0.12, "timezone": "Europe/London",
        "utc_offset_seconds": 3600,
        "current": {"time": "2024-07-15T14:00", "temperature_2m": 18.5, "weather_code": 3}
    }"#;

    fn hourly(hours: usize) -> String {
        let times: Vec<String> = (0..hours).map(|h| format!("\"2024-07-15T{:02}:00\"", h % 24)).collect();
        let zeros = vec!["0"; hours].join(",");
        let fields = HOURLY_FIELDS
            .iter()
            .map(|f| format!("\"{f}\": [{zeros}]"))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            r#"{{"latitude": 51.5, "longitude": -0.12, "hourly": {{"time": [{}], {}}}}}"#,
            times.join(","),
            fields
        )
    }

    fn client(stub: StubFetch) -> (WeatherClient, Arc<StubFetch>) {
        let stub = Arc::new(stub);
        let options = ClientOptions {
            base_url: "http://weather.test/v1/".into(),
            geo_base_url: "http://geo.test/v1".into(),
            timeout: DEFAULT_TIMEOUT,
        };
        (WeatherClient::with_transport(options, stub.clone()), stub)
    }

    #[test]
    fn default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.geo_base_url, DEFAULT_GEO_BASE_URL);
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn search_sends_geocoding_params() {
        let (client, stub) = client(StubFetch::default().route("/search", 200, LONDON));

        let locations = client.search_location("London").await.unwrap();
        assert_eq!(locations[0].name.as_deref(), Some("London"));

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://geo.test/v1/search");
        assert_eq!(requests[0].param("name"), Some("London"));
        assert_eq!(requests[0].param("count"), Some("10"));
        assert_eq!(requests[0].param("language"), Some("en"));
        assert_eq!(requests[0].param("format"), Some("json"));
    }

    #[tokio::test]
    async fn search_with_zero_results_is_not_found() {
        let (client, _) = client(StubFetch::default().route("/search", 200, r#"{"generationtime_ms": 0.4}"#));

        let err = client
            .search_location("ThisLocationDoesNotExist12345")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "location not found: ThisLocationDoesNotExist12345");
    }

    #[tokio::test]
    async fn current_by_name_searches_then_fetches() {
        let (client, stub) = client(
            StubFetch::default()
                .route("/search", 200, LONDON)
                .route("/forecast", 200, CURRENT),
        );

        let current = client.current(&Place::Name("London".into())).await.unwrap();

        assert_eq!(current.location.name.as_deref(), Some("London"));
        assert_eq!(current.location.country.as_deref(), Some("United Kingdom"));
        assert_eq!(current.temperature, 18.5);
        assert_eq!(current.condition, "Overcast");

        let requests = stub.requests();
        assert_eq!(requests.len(), 2);

        let data = &requests[1];
        assert_eq!(data.url, "http://weather.test/v1/forecast");
        assert_eq!(data.param("latitude"), Some("51.5085"));
        assert_eq!(data.param("longitude"), Some("-0.1257"));
        assert_eq!(data.param("timezone"), Some("auto"));
        assert_eq!(data.param("current"), Some(CURRENT_FIELDS.join(",").as_str()));
    }

    #[tokio::test]
    async fn current_by_coordinates_skips_search() {
        let (client, stub) = client(StubFetch::default().route("/forecast", 200, CURRENT));

        let place = Place::Coordinates { latitude: 51.5, longitude: -0.12 };
        let current = client.current(&place).await.unwrap();

        assert_eq!(current.location.name, None);
        assert_eq!(current.location.timezone.as_deref(), Some("Europe/London"));
        assert_eq!(stub.requests().len(), 1);
        assert_eq!(stub.requests()[0].param("latitude"), Some("51.5000"));
    }

    #[tokio::test]
    async fn not_found_stops_before_data_call() {
        let (client, stub) = client(StubFetch::default().route("/search", 200, r#"{"results": []}"#));

        let err = client.current(&Place::Name("Nowhere".into())).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let (client, _) = client(
            StubFetch::default().route("/forecast", 400, r#"{"error":true,"reason":"bad"}"#),
        );

        let err = client.current_at(1.0, 2.0, None).await.unwrap_err();

        match err {
            WeatherError::Transport { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"error":true,"reason":"bad"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn forecast_sends_mode_fields_and_days() {
        let (client, stub) = client(StubFetch::default().route("/forecast", 200, hourly(24)));

        let forecast = client
            .forecast_at(51.5, -0.12, 1, ForecastMode::Hourly, None)
            .await
            .unwrap();
        assert_eq!(forecast.hourly.len(), 24);

        let request = &stub.requests()[0];
        assert_eq!(request.param("forecast_days"), Some("1"));
        assert_eq!(request.param("hourly"), Some(HOURLY_FIELDS.join(",").as_str()));
        assert_eq!(request.param("daily"), None);
    }

    #[tokio::test]
    async fn hourly_truncated_to_requested_hours() {
        let (client, _) = client(
            StubFetch::default()
                .route("/search", 200, LONDON)
                .route("/forecast", 200, hourly(30)),
        );

        let mut forecast = client
            .forecast(&Place::Name("London".into()), 1, ForecastMode::Hourly)
            .await
            .unwrap();
        forecast.limit_hours(24);

        assert_eq!(forecast.hourly.len(), 24);
        assert!(forecast.daily.is_empty());
        assert_eq!(forecast.location.name.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn days_out_of_range_rejected_without_request() {
        let (client, stub) = client(StubFetch::default());

        for days in [0, 17] {
            let err = client
                .forecast(&Place::Name("London".into()), days, ForecastMode::Daily)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert!(stub.requests().is_empty());
    }
}
