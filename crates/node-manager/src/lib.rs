pub use scale_core;

mod manager;
mod registry;
mod store;

pub use manager::{NodeManager, NodeManagerStats, SyncSummary};
pub use registry::{AgentOffer, AgentRegistry};
pub use store::{MemoryNodeStore, NodeStore, ReconciliationBatch};

// Re-export core types for convenience
pub use scale_core::{Agent, AgentId, Node, NodeConfig, NodeState, Result, ScaleError};
