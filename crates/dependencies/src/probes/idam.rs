use crate::clients::HttpClient;
use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use scale_core::{codes, dependency_names, DependencyStatus};
use serde_json::json;
use std::sync::Arc;

const LOCAL_AUTH_DETAIL: &str = "No external identity provider configured; local authentication in use";

/// Checks the external identity provider, if one is configured.
pub struct IdamProbe {
    url: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl IdamProbe {
    pub fn new(url: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        Self { url, http }
    }
}

#[async_trait]
impl DependencyProbe for IdamProbe {
    fn name(&self) -> &'static str {
        dependency_names::IDAM
    }

    async fn check(&self) -> ProbeResult {
        let Some(url) = &self.url else {
            return Ok(DependencyStatus::healthy().with_detail(LOCAL_AUTH_DETAIL));
        };

        let status = match self.http.head(url).await {
            Ok(code) if (200..300).contains(&code) => DependencyStatus::healthy(),
            Ok(code) => DependencyStatus::failed(
                codes::UNEXPECTED_STATUS,
                format!("Identity provider responded with HTTP {}", code),
            ),
            Err(e) => DependencyStatus::failed(
                codes::UNKNOWN_ERROR,
                format!("Error reaching identity provider: {}", e),
            ),
        };
        Ok(status.with_detail(json!({ "url": url })))
    }
}
