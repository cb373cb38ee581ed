//! Agent offer types

use serde::{Deserialize, Serialize};

/// Opaque identifier the cluster manager assigns to an agent for the
/// lifetime of one offer stream.
pub type AgentId = String;

/// A live resource offer from a worker host.
///
/// Agents are never mutated. When a host restarts its worker it comes back
/// under a new `agent_id` and the new offer supersedes the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub hostname: String,
}

impl Agent {
    pub fn new(agent_id: impl Into<AgentId>, hostname: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            hostname: hostname.into(),
        }
    }
}
