use crate::probe::{DependencyProbe, ProbeResult};
use async_trait::async_trait;
use node_manager::NodeManager;
use scale_core::dependency_names;

/// Reports whether enough worker nodes are online, from the last
/// reconciled snapshot.
pub struct NodesProbe {
    manager: NodeManager,
    min_online_nodes: usize,
}

impl NodesProbe {
    pub fn new(manager: NodeManager, min_online_nodes: usize) -> Self {
        Self {
            manager,
            min_online_nodes,
        }
    }
}

#[async_trait]
impl DependencyProbe for NodesProbe {
    fn name(&self) -> &'static str {
        dependency_names::NODES
    }

    async fn check(&self) -> ProbeResult {
        Ok(self.manager.node_status(self.min_online_nodes))
    }
}
