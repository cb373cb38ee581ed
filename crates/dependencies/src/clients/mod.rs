//! Capability interfaces for the external systems the probes talk to.
//!
//! Each probe depends only on one of these traits, so real network clients
//! and test doubles are interchangeable.

mod broker;
mod elasticsearch;
mod http;
mod tcp;

pub use broker::TcpBrokerClient;
pub use elasticsearch::ElasticsearchClient;
pub use http::ReqwestHttpClient;
pub use tcp::TokioTcpConnector;

use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and JSON body (if any) of an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Value>,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError>;

    /// Status code only.
    async fn head(&self, url: &str) -> Result<u16, ClientError>;
}

#[async_trait]
pub trait TcpConnector: Send + Sync {
    /// Open and immediately close a TCP connection.
    async fn connect(&self, host: &str, port: u16) -> Result<(), ClientError>;
}

#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Broker address with credentials removed.
    fn address(&self) -> String;

    async fn verify_connection(&self) -> Result<(), ClientError>;
}

/// Subset of the search cluster's `_cluster/health` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub status: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub number_of_nodes: Option<u64>,
}

impl ClusterHealth {
    pub fn is_red(&self) -> bool {
        self.status.eq_ignore_ascii_case("red")
    }
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Cluster address with credentials removed.
    fn address(&self) -> String;

    /// `Ok(false)` when the index answered but refused the ping.
    async fn ping(&self) -> Result<bool, ClientError>;

    async fn cluster_health(&self) -> Result<ClusterHealth, ClientError>;

    async fn info(&self) -> Result<Value, ClientError>;
}

/// Parse an absolute URL, rejecting anything without a scheme.
pub fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| ClientError::InvalidAddress(format!("invalid URL '{}': {}", raw, e)))
}

/// Host and port of a `scheme://host:port` address.
pub fn host_and_port(raw: &str, default_port: Option<u16>) -> Result<(String, u16), ClientError> {
    let url = parse_url(raw)?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ClientError::InvalidAddress(format!("no host in address '{}'", raw)))?;
    let port = url
        .port_or_known_default()
        .or(default_port)
        .ok_or_else(|| ClientError::InvalidAddress(format!("no port in address '{}'", raw)))?;
    Ok((host.to_string(), port))
}

/// Strip any password so the address is safe to echo in a status report.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}
