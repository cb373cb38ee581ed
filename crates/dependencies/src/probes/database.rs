use crate::clients::{host_and_port, redact_url, TcpConnector};
use crate::error::ClientError;
use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use node_manager::NodeStore;
use scale_core::{codes, dependency_names, DependencyStatus};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Default PostgreSQL port when the database URL omits one.
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Checks that the configured database accepts connections and that the
/// node store can reach it.
pub struct DatabaseProbe {
    store: Arc<dyn NodeStore>,
    database_url: Option<String>,
    connector: Arc<dyn TcpConnector>,
}

impl DatabaseProbe {
    pub fn new(
        store: Arc<dyn NodeStore>,
        database_url: Option<String>,
        connector: Arc<dyn TcpConnector>,
    ) -> Self {
        Self {
            store,
            database_url,
            connector,
        }
    }

    async fn connect(&self, url: &str) -> Result<(), ClientError> {
        let (host, port) = host_and_port(url, Some(DEFAULT_DATABASE_PORT))?;
        self.connector.connect(&host, port).await
    }
}

#[async_trait]
impl DependencyProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        dependency_names::DATABASE
    }

    async fn check(&self) -> ProbeResult {
        let reachable = match &self.database_url {
            Some(url) => self.connect(url).await.map_err(|e| e.to_string()),
            None => Ok(()),
        };
        let result = match reachable {
            Ok(()) => self.store.ensure_connection().await.map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(DependencyStatus::healthy().with_detail("Database alive and well")),
            Err(e) => {
                warn!("Database connection check failed: {}", e);
                let mut status = DependencyStatus::failed(codes::OPERATIONAL_ERROR, "Database unavailable.");
                if let Some(url) = &self.database_url {
                    status = status.with_detail(json!({ "database_url": redact_url(url) }));
                }
                Ok(status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnector;
    use node_manager::MemoryNodeStore;

    const DATABASE_URL: &str = "postgis://scale:secret@db:5432/scale";

    #[tokio::test]
    async fn test_database_alive() {
        let probe = DatabaseProbe::new(
            Arc::new(MemoryNodeStore::new()),
            Some(DATABASE_URL.to_string()),
            Arc::new(FakeConnector::listening("db", 5432)),
        );
        let status = probe.check().await.unwrap();

        assert!(status.ok);
        assert_eq!(status.detail, Some(json!("Database alive and well")));
        assert!(status.errors.is_empty());
    }

    #[tokio::test]
    async fn test_store_without_url_is_checked_alone() {
        let probe = DatabaseProbe::new(
            Arc::new(MemoryNodeStore::new()),
            None,
            Arc::new(FakeConnector::default()),
        );
        assert!(probe.check().await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_unreachable_database_url() {
        let probe = DatabaseProbe::new(
            Arc::new(MemoryNodeStore::new()),
            Some(DATABASE_URL.to_string()),
            Arc::new(FakeConnector::default()),
        );
        let status = probe.check().await.unwrap();

        assert!(!status.ok);
        assert_eq!(status.error_codes(), vec![codes::OPERATIONAL_ERROR]);
        assert_eq!(
            status.detail,
            Some(json!({"database_url": "postgis://scale:****@db:5432/scale"}))
        );
    }

    #[tokio::test]
    async fn test_default_port_is_used() {
        let probe = DatabaseProbe::new(
            Arc::new(MemoryNodeStore::new()),
            Some("postgres://scale@db/scale".to_string()),
            Arc::new(FakeConnector::listening("db", DEFAULT_DATABASE_PORT)),
        );
        assert!(probe.check().await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_store_unavailable() {
        let store = MemoryNodeStore::new();
        store.set_available(false);
        let probe = DatabaseProbe::new(
            Arc::new(store),
            Some(DATABASE_URL.to_string()),
            Arc::new(FakeConnector::listening("db", 5432)),
        );
        let status = probe.check().await.unwrap();

        assert!(!status.ok);
        assert_eq!(status.error_codes(), vec![codes::OPERATIONAL_ERROR]);
        assert_eq!(status.errors[0].message, "Database unavailable.");
        assert_eq!(
            status.detail,
            Some(json!({"database_url": "postgis://scale:****@db:5432/scale"}))
        );
    }
}
