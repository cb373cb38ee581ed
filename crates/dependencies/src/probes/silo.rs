use crate::clients::HttpClient;
use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use scale_core::{codes, dependency_names, DependencyStatus};
use serde_json::json;
use std::sync::Arc;

/// Checks that the silo image registry answers with HTTP 200.
pub struct SiloProbe {
    url: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl SiloProbe {
    pub fn new(url: Option<String>, http: Arc<dyn HttpClient>) -> Self {
        Self { url, http }
    }
}

#[async_trait]
impl DependencyProbe for SiloProbe {
    fn name(&self) -> &'static str {
        dependency_names::SILO
    }

    async fn check(&self) -> ProbeResult {
        let Some(url) = &self.url else {
            return Ok(DependencyStatus::failed(
                codes::NO_SILO_DEFINED,
                "No silo URL defined in environment. SOS.",
            ));
        };

        let status = match self.http.get(url).await {
            Ok(response) if response.status == 200 => DependencyStatus::healthy(),
            Ok(response) => DependencyStatus::failed(
                codes::UNEXPECTED_STATUS,
                format!("Silo responded with HTTP {}", response.status),
            ),
            Err(e) => DependencyStatus::failed(codes::UNKNOWN_ERROR, format!("Error reaching silo: {}", e)),
        };
        Ok(status.with_detail(json!({ "url": url })))
    }
}
