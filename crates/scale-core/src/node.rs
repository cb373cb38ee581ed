//! Node records

use crate::agent::{Agent, AgentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative state of a node.
///
/// `Paused` and `Deprecated` are operator overrides and are never changed
/// by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    Running,
    Paused,
    Deprecated,
    Unknown,
}

impl NodeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Running => "RUNNING",
            NodeState::Paused => "PAUSED",
            NodeState::Deprecated => "DEPRECATED",
            NodeState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NodeState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(NodeState::Running),
            "PAUSED" => Ok(NodeState::Paused),
            "DEPRECATED" => Ok(NodeState::Deprecated),
            "UNKNOWN" => Ok(NodeState::Unknown),
            other => Err(format!("unknown node state '{}'", other)),
        }
    }
}

/// The scheduler's durable record of a worker host, keyed by hostname.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hostname: String,
    /// Most recent agent seen for this host; `None` while the host is not offering.
    pub agent_id: Option<AgentId>,
    pub is_online: bool,
    pub state: NodeState,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_state_change: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// A freshly discovered host, created from its first live offer.
    pub fn from_offer(agent: &Agent, seen_at: DateTime<Utc>) -> Self {
        Self {
            hostname: agent.hostname.clone(),
            agent_id: Some(agent.agent_id.clone()),
            is_online: true,
            state: NodeState::Running,
            last_seen: Some(seen_at),
            last_state_change: seen_at,
            created_at: seen_at,
        }
    }

    /// A host known to the scheduler that has not offered yet.
    pub fn unknown(hostname: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            hostname: hostname.into(),
            agent_id: None,
            is_online: false,
            state: NodeState::Unknown,
            last_seen: None,
            last_state_change: now,
            created_at: now,
        }
    }

    /// Online and running: the only nodes jobs may be scheduled on.
    pub fn is_schedulable(&self) -> bool {
        self.is_online && self.state == NodeState::Running
    }
}
