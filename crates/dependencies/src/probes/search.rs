use crate::clients::SearchIndex;
use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use scale_core::{codes, dependency_names, DependencyStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Checks the search index and its cluster health.
pub struct SearchProbe {
    index: Option<Arc<dyn SearchIndex>>,
}

impl SearchProbe {
    pub fn new(index: Option<Arc<dyn SearchIndex>>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl DependencyProbe for SearchProbe {
    fn name(&self) -> &'static str {
        dependency_names::ELASTICSEARCH
    }

    async fn check(&self) -> ProbeResult {
        let Some(index) = &self.index else {
            return Ok(DependencyStatus::failed(
                codes::NO_ELASTICSEARCH_DEFINED,
                "No Elasticsearch URL defined",
            ));
        };
        let address = json!({ "url": index.address() });

        match index.ping().await {
            Err(e) => {
                debug!("Elasticsearch ping failed: {}", e);
                return Ok(DependencyStatus::failed(
                    codes::UNKNOWN_ERROR,
                    "Elasticsearch is unreachable. SOS.",
                )
                .with_detail(address));
            }
            // The index answered but refused the ping.
            Ok(false) => {
                return Ok(DependencyStatus::failed(
                    codes::CLUSTER_ERROR,
                    "Elasticsearch cluster is unreachable. SOS.",
                )
                .with_detail(address));
            }
            Ok(true) => {}
        }

        let health = match index.cluster_health().await {
            Ok(health) => health,
            Err(e) => {
                debug!("Elasticsearch cluster health failed: {}", e);
                return Ok(DependencyStatus::failed(
                    codes::CLUSTER_ERROR,
                    "Elasticsearch cluster is unreachable. SOS.",
                )
                .with_detail(address));
            }
        };

        if health.is_red() {
            return Ok(DependencyStatus::failed(
                codes::CLUSTER_RED,
                "Elasticsearch cluster health is red. SOS.",
            )
            .with_detail(address));
        }

        match index.info().await {
            Ok(info) => Ok(DependencyStatus::healthy().with_detail(info)),
            Err(e) => {
                warn!("Elasticsearch is healthy but info is unavailable: {}", e);
                Ok(DependencyStatus::healthy().with_detail(address))
            }
        }
    }
}
