use super::{parse_url, HttpClient, HttpResponse};
use crate::error::ClientError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Connection(error.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
        let url = parse_url(url)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        // Non-JSON bodies are reported as absent.
        let body = serde_json::from_slice(&bytes).ok();
        Ok(HttpResponse { status, body })
    }

    async fn head(&self, url: &str) -> Result<u16, ClientError> {
        let url = parse_url(url)?;
        debug!("HEAD {}", url);
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        Ok(response.status().as_u16())
    }
}
