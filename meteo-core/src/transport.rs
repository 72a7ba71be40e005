use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::error::WeatherError;

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx reply into a transport error carrying status and body.
    pub fn error_for_status(self) -> Result<Self, WeatherError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(WeatherError::Transport {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }
}

/// Issues a single GET request.
#[async_trait]
pub trait HttpFetch: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, WeatherError>;
}

/// [`HttpFetch`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    http: Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .user_agent(concat!("meteo/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, WeatherError> {
        tracing::debug!(url, ?query, "sending request");

        let res = self.http.get(url).query(query).send().await?;
        let status = res.status().as_u16();
        let body = res.bytes().await?.to_vec();

        tracing::debug!(url, status, bytes = body.len(), "received response");

        Ok(HttpReply { status, body })
    }
}
