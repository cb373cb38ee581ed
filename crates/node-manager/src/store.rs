//! Node persistence
//!
//! The schema and ORM live outside this crate; [`NodeStore`] is the contract
//! the node manager and the database probe rely on.

use async_trait::async_trait;
use scale_core::{Node, Result, ScaleError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// All node changes produced by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationBatch {
    pub created: Vec<Node>,
    pub updated: Vec<Node>,
}

impl ReconciliationBatch {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    async fn create_node(&self, node: Node) -> Result<()>;

    async fn update_node(&self, node: Node) -> Result<()>;

    /// Apply a whole batch or nothing.
    async fn commit(&self, batch: ReconciliationBatch) -> Result<()>;

    /// Cheap round trip proving the backing database is reachable.
    async fn ensure_connection(&self) -> Result<()>;
}

/// In-process node table, one row per hostname.
#[derive(Debug, Clone)]
pub struct MemoryNodeStore {
    rows: Arc<RwLock<HashMap<String, Node>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the database going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(ScaleError::persistence("database connection unavailable"))
        }
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.check_available()?;
        let rows = self.rows.read().await;
        let mut nodes: Vec<Node> = rows.values().cloned().collect();
        nodes.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        Ok(nodes)
    }

    async fn create_node(&self, node: Node) -> Result<()> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&node.hostname) {
            return Err(ScaleError::ReconciliationConflict {
                reason: format!("node {} already exists", node.hostname),
            });
        }
        rows.insert(node.hostname.clone(), node);
        Ok(())
    }

    async fn update_node(&self, node: Node) -> Result<()> {
        self.check_available()?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(&node.hostname) {
            Some(row) => {
                *row = node;
                Ok(())
            }
            None => Err(ScaleError::NodeNotFound {
                hostname: node.hostname,
            }),
        }
    }

    async fn commit(&self, batch: ReconciliationBatch) -> Result<()> {
        self.check_available()?;
        let mut rows = self.rows.write().await;

        // Validate the whole batch before touching any row.
        for node in &batch.created {
            if rows.contains_key(&node.hostname) {
                return Err(ScaleError::ReconciliationConflict {
                    reason: format!("node {} already exists", node.hostname),
                });
            }
        }
        for node in &batch.updated {
            if !rows.contains_key(&node.hostname) {
                return Err(ScaleError::NodeNotFound {
                    hostname: node.hostname.clone(),
                });
            }
        }

        for node in batch.created.into_iter().chain(batch.updated) {
            rows.insert(node.hostname.clone(), node);
        }
        Ok(())
    }

    async fn ensure_connection(&self) -> Result<()> {
        self.check_available()
    }
}
