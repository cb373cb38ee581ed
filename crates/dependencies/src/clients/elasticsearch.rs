use super::{redact_url, ClusterHealth, HttpClient, SearchIndex};
use crate::error::ClientError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Search index client speaking the Elasticsearch REST API.
#[derive(Clone)]
pub struct ElasticsearchClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ElasticsearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchClient")
            .field("base_url", &redact_url(&self.base_url))
            .finish()
    }
}

impl ElasticsearchClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.http.get(&self.endpoint(path)).await?;
        if !(200..300).contains(&response.status) {
            return Err(ClientError::Protocol(format!(
                "GET {} returned HTTP {}",
                path, response.status
            )));
        }
        response
            .body
            .ok_or_else(|| ClientError::Protocol(format!("GET {} returned no JSON body", path)))
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchClient {
    fn address(&self) -> String {
        redact_url(&self.base_url)
    }

    async fn ping(&self) -> Result<bool, ClientError> {
        let status = self.http.head(&self.endpoint("/")).await?;
        Ok((200..300).contains(&status))
    }

    async fn cluster_health(&self) -> Result<ClusterHealth, ClientError> {
        let body = self.get_json("/_cluster/health").await?;
        serde_json::from_value(body)
            .map_err(|e| ClientError::Protocol(format!("malformed cluster health: {}", e)))
    }

    async fn info(&self) -> Result<Value, ClientError> {
        self.get_json("/").await
    }
}
