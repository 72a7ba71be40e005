use thiserror::Error;

/// Coarse classification of a [`WeatherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-2xx status or a network-level fault.
    Transport,
    /// Geocoding returned zero results.
    NotFound,
    /// Malformed or incomplete response body.
    Decode,
    /// A single timestamp field could not be parsed.
    Timestamp,
    /// The caller passed an out-of-range argument.
    InvalidArgument,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("location not found: {query}")]
    NotFound { query: String },

    #[error("failed to parse response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("array `{field}` has {actual} elements, expected {expected} to match `time`")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid date `{0}`")]
    InvalidDate(String),

    #[error("invalid timestamp `{value}`")]
    Timestamp { value: String },

    #[error("{0}")]
    InvalidArgument(String),
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Transport { .. } | WeatherError::Network(_) => ErrorKind::Transport,
            WeatherError::NotFound { .. } => ErrorKind::NotFound,
            WeatherError::Json(_)
            | WeatherError::MissingKey(_)
            | WeatherError::LengthMismatch { .. }
            | WeatherError::InvalidDate(_) => ErrorKind::Decode,
            WeatherError::Timestamp { .. } => ErrorKind::Timestamp,
            WeatherError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}
