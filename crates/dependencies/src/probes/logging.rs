use crate::clients::{host_and_port, HttpClient, TcpConnector};
use crate::error::ClientError;
use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use scale_core::{codes, dependency_names, DependencyConfig, DependencyStatus};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Buffer metrics reported by the log shipper's monitoring endpoint.
#[derive(Debug, Deserialize)]
struct ShipperHealth {
    #[serde(default)]
    plugins: Vec<PluginHealth>,
}

#[derive(Debug, Deserialize)]
struct PluginHealth {
    #[serde(default)]
    buffer_queue_length: Option<u64>,
    #[serde(default)]
    buffer_total_queued_size: Option<u64>,
}

impl ShipperHealth {
    fn max_queue_length(&self) -> u64 {
        self.plugins
            .iter()
            .filter_map(|p| p.buffer_queue_length)
            .max()
            .unwrap_or(0)
    }

    fn max_queued_size(&self) -> u64 {
        self.plugins
            .iter()
            .filter_map(|p| p.buffer_total_queued_size)
            .max()
            .unwrap_or(0)
    }
}

/// Checks the log shipper: its forward address over TCP and its buffer
/// metrics over HTTP.
pub struct LoggingProbe {
    logging_address: Option<String>,
    logging_health_address: Option<String>,
    buffer_warn: u64,
    buffer_size_warn: u64,
    http: Arc<dyn HttpClient>,
    connector: Arc<dyn TcpConnector>,
}

impl LoggingProbe {
    pub fn new(
        config: &DependencyConfig,
        http: Arc<dyn HttpClient>,
        connector: Arc<dyn TcpConnector>,
    ) -> Self {
        Self {
            logging_address: config.logging_address.clone(),
            logging_health_address: config.logging_health_address.clone(),
            buffer_warn: config.fluentd_buffer_warn,
            buffer_size_warn: config.fluentd_buffer_size_warn,
            http,
            connector,
        }
    }

    async fn shipper_health(&self, url: &str) -> Result<ShipperHealth, ClientError> {
        let response = self.http.get(url).await?;
        if !(200..300).contains(&response.status) {
            return Err(ClientError::Protocol(format!(
                "health endpoint returned HTTP {}",
                response.status
            )));
        }
        let body = response
            .body
            .ok_or_else(|| ClientError::Protocol("health endpoint returned no JSON body".to_string()))?;
        serde_json::from_value(body)
            .map_err(|e| ClientError::Protocol(format!("malformed health response: {}", e)))
    }

    async fn check_health_address(&self, url: &str, status: &mut DependencyStatus) {
        match self.shipper_health(url).await {
            Ok(health) => {
                let length = health.max_queue_length();
                if length > self.buffer_warn {
                    status.push_warning(
                        codes::LARGE_BUFFER,
                        format!("Length of log buffer is too long: {} > {}", length, self.buffer_warn),
                    );
                }
                let size = health.max_queued_size();
                if size > self.buffer_size_warn {
                    status.push_warning(
                        codes::LARGE_BUFFER_SIZE,
                        format!(
                            "Size of log buffer is too large: {} > {}",
                            size, self.buffer_size_warn
                        ),
                    );
                }
            }
            Err(e) => status.push_error(
                codes::UNKNOWN_ERROR,
                format!("Error with LOGGING_HEALTH_ADDRESS: {}", e),
            ),
        }
    }

    async fn check_address(&self, address: &str, status: &mut DependencyStatus) {
        let result = match host_and_port(address, None) {
            Ok((host, port)) => self.connector.connect(&host, port).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            status.push_error(codes::UNKNOWN_ERROR, format!("Error with LOGGING_ADDRESS: {}", e));
        }
    }
}

#[async_trait]
impl DependencyProbe for LoggingProbe {
    fn name(&self) -> &'static str {
        dependency_names::LOGS
    }

    async fn check(&self) -> ProbeResult {
        let mut status = DependencyStatus::healthy();
        let mut detail = Map::new();

        match &self.logging_health_address {
            Some(url) => {
                detail.insert("logging_health_address".to_string(), Value::from(url.as_str()));
                self.check_health_address(url, &mut status).await;
            }
            None => status.push_error(codes::NO_LOGGING_HEALTH_DEFINED, "No logging health URL defined"),
        }

        match &self.logging_address {
            Some(address) => {
                detail.insert("logging_address".to_string(), Value::from(address.as_str()));
                self.check_address(address, &mut status).await;
            }
            None => status.push_error(codes::NO_LOGGING_DEFINED, "No logging address defined"),
        }

        if !detail.is_empty() {
            status = status.with_detail(detail);
        }
        Ok(status)
    }
}
