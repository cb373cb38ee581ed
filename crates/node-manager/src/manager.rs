//! Node Manager
//!
//! Reconciles live agent offers against persisted node records. Offer
//! ingestion is lock-free; reconciliation is single-writer and publishes an
//! immutable snapshot that status queries read without waiting on a pass.

use crate::registry::{AgentOffer, AgentRegistry};
use crate::store::{NodeStore, ReconciliationBatch};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use scale_core::codes;
use scale_core::{Agent, DependencyStatus, Node, NodeConfig, NodeState, Result, ScaleError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

type NodeSnapshot = Arc<BTreeMap<String, Node>>;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub online: usize,
    pub offline: usize,
}

/// Counters for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeManagerStats {
    pub registered_agents: usize,
    pub known_nodes: usize,
    pub schedulable_nodes: usize,
}

#[derive(Clone)]
pub struct NodeManager {
    registry: AgentRegistry,
    store: Arc<dyn NodeStore>,
    /// Last reconciled view of the node table
    snapshot: Arc<RwLock<NodeSnapshot>>,
    /// Held for the duration of every write to the node table
    writer: Arc<Mutex<()>>,
}

impl std::fmt::Debug for NodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeManager")
            .field("registered_agents", &self.registry.len())
            .field("known_nodes", &self.snapshot.read().len())
            .finish()
    }
}

impl NodeManager {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        info!("Initializing Scale Node Manager");
        Self {
            registry: AgentRegistry::new(),
            store,
            snapshot: Arc::new(RwLock::new(Arc::new(BTreeMap::new()))),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Record the latest offers. Safe to call from any number of offer callbacks.
    pub fn register_agents<I>(&self, agents: I)
    where
        I: IntoIterator<Item = Agent>,
    {
        self.registry.register(agents);
    }

    /// Record offers with an explicit observation time.
    pub fn register_agents_at<I>(&self, agents: I, seen_at: DateTime<Utc>)
    where
        I: IntoIterator<Item = Agent>,
    {
        self.registry.register_at(agents, seen_at);
    }

    /// Forget an agent the cluster manager reported as gone. Its host goes
    /// offline on the next pass unless it re-registers first.
    pub fn lost_agent(&self, agent_id: &str) -> bool {
        let removed = self.registry.remove_agent(agent_id);
        if removed {
            info!(agent_id, "Agent lost");
        }
        removed
    }

    /// Run one reconciliation pass of live offers against the node table.
    ///
    /// Passes never overlap: a caller arriving mid-pass waits for it to
    /// finish. On a persistence error nothing is applied and the published
    /// snapshot is left as it was.
    #[instrument(skip(self, config), fields(agent_timeout_secs = config.agent_timeout_secs))]
    pub async fn sync_with_database(&self, config: &NodeConfig) -> Result<SyncSummary> {
        let _writer = self.writer.lock().await;
        let now = Utc::now();

        let pruned = self.registry.prune_expired(now, config.agent_timeout());
        if pruned > 0 {
            info!(pruned, "Dropped expired agent offers");
        }

        let persisted = self.store.list_nodes().await?;
        let mut live: HashMap<String, AgentOffer> = self
            .registry
            .live_offers(now, config.agent_timeout())
            .into_iter()
            .map(|offer| (offer.agent.hostname.clone(), offer))
            .collect();

        let mut batch = ReconciliationBatch::default();
        let mut next = BTreeMap::new();

        for node in persisted {
            let offer = live.remove(&node.hostname);
            let reconciled = reconcile_node(&node, offer.as_ref(), now);
            if reconciled != node {
                batch.updated.push(reconciled.clone());
            }
            next.insert(reconciled.hostname.clone(), reconciled);
        }

        // Whatever is left in `live` has no node yet.
        for (hostname, offer) in live {
            let node = Node::from_offer(&offer.agent, offer.seen_at);
            batch.created.push(node.clone());
            next.insert(hostname, node);
        }

        let online = next.values().filter(|node| node.is_online).count();
        let summary = SyncSummary {
            created: batch.created.len(),
            updated: batch.updated.len(),
            online,
            offline: next.len() - online,
        };

        if !batch.is_empty() {
            if let Err(e) = self.store.commit(batch).await {
                error!(error = %e, "Node reconciliation failed, keeping previous node state");
                return Err(e);
            }
        }

        *self.snapshot.write() = Arc::new(next);

        info!(
            created = summary.created,
            updated = summary.updated,
            online = summary.online,
            offline = summary.offline,
            "Node reconciliation complete"
        );
        Ok(summary)
    }

    /// Register a host that is expected to join but has not offered yet.
    ///
    /// Returns the node and `true` if this call created it; an existing
    /// node is returned unchanged with `false`.
    #[instrument(skip(self))]
    pub async fn add_node(&self, hostname: &str) -> Result<(Node, bool)> {
        let _writer = self.writer.lock().await;

        if let Some(existing) = self.find_persisted(hostname).await? {
            return Ok((existing, false));
        }

        let node = Node::unknown(hostname);
        self.store.create_node(node.clone()).await?;
        self.publish(node.clone());
        info!(hostname, "Node added in UNKNOWN state");
        Ok((node, true))
    }

    /// Apply an operator override such as PAUSED or DEPRECATED.
    #[instrument(skip(self, state), fields(state = %state))]
    pub async fn set_node_state(&self, hostname: &str, state: NodeState) -> Result<Node> {
        let _writer = self.writer.lock().await;

        let mut node = self
            .find_persisted(hostname)
            .await?
            .ok_or_else(|| ScaleError::NodeNotFound {
                hostname: hostname.to_string(),
            })?;

        if node.state != state {
            node.state = state;
            node.last_state_change = Utc::now();
            self.store.update_node(node.clone()).await?;
            info!(hostname, "Node state changed");
        }

        self.publish(node.clone());
        Ok(node)
    }

    /// Fleet health from the last reconciled snapshot.
    pub fn node_status(&self, min_online_nodes: usize) -> DependencyStatus {
        let nodes = self.snapshot.read().clone();
        let schedulable = nodes.values().filter(|node| node.is_schedulable()).count();

        if schedulable >= min_online_nodes {
            return DependencyStatus::healthy().with_detail("Enough nodes are online to function.");
        }

        if nodes.is_empty() {
            return DependencyStatus::failed(codes::NO_NODES, "No nodes reported");
        }

        warn!(
            schedulable,
            required = min_online_nodes,
            "Not enough nodes online"
        );
        let mut status = DependencyStatus::healthy()
            .with_detail(json!({
                "online": schedulable,
                "required": min_online_nodes,
                "total": nodes.len(),
            }))
            .with_warning(
                codes::NODES_OFFLINE,
                format!(
                    "Only {} of {} required nodes are online",
                    schedulable, min_online_nodes
                ),
            );
        status.ok = false;
        status
    }

    /// All nodes in the last reconciled snapshot, ordered by hostname.
    pub fn nodes(&self) -> Vec<Node> {
        self.snapshot.read().values().cloned().collect()
    }

    pub fn node(&self, hostname: &str) -> Option<Node> {
        self.snapshot.read().get(hostname).cloned()
    }

    pub fn get_stats(&self) -> NodeManagerStats {
        let nodes = self.snapshot.read().clone();
        NodeManagerStats {
            registered_agents: self.registry.len(),
            known_nodes: nodes.len(),
            schedulable_nodes: nodes.values().filter(|node| node.is_schedulable()).count(),
        }
    }

    pub fn store(&self) -> Arc<dyn NodeStore> {
        self.store.clone()
    }

    /// Reconcile every `sync_interval` until `shutdown` fires. A failed pass
    /// is logged and retried on the next tick.
    pub fn spawn_sync_loop(&self, config: NodeConfig, shutdown: CancellationToken) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            info!(
                interval_secs = config.sync_interval_secs,
                "Starting node sync loop"
            );
            let mut interval = tokio::time::interval(config.sync_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Node sync loop stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = manager.sync_with_database(&config).await {
                            warn!(error = %e, "Node sync failed, retrying next interval");
                        }
                    }
                }
            }
        })
    }

    async fn find_persisted(&self, hostname: &str) -> Result<Option<Node>> {
        Ok(self
            .store
            .list_nodes()
            .await?
            .into_iter()
            .find(|node| node.hostname == hostname))
    }

    fn publish(&self, node: Node) {
        let mut snapshot = self.snapshot.write();
        let mut next = (**snapshot).clone();
        next.insert(node.hostname.clone(), node);
        *snapshot = Arc::new(next);
    }
}

/// Apply one host's live offer (or its absence) to its node record.
fn reconcile_node(node: &Node, offer: Option<&AgentOffer>, now: DateTime<Utc>) -> Node {
    let mut next = node.clone();
    match offer {
        Some(offer) => {
            next.agent_id = Some(offer.agent.agent_id.clone());
            next.is_online = true;
            next.last_seen = Some(offer.seen_at);
            if next.state == NodeState::Unknown {
                next.state = NodeState::Running;
            }
        }
        None => {
            next.agent_id = None;
            next.is_online = false;
        }
    }
    if next.is_online != node.is_online || next.state != node.state {
        next.last_state_change = now;
    }
    next
}
