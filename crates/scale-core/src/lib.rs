//! # Scale Core
//!
//! Core types shared by the Scale scheduler's health and node lifecycle
//! subsystem.
//!
//! ## Node lifecycle
//! - Agents are live resource offers from worker hosts
//! - Nodes are the durable per-hostname records reconciled from those offers
//!
//! ## Dependency health
//! - Every external dependency reports a uniform [`DependencyStatus`]
//! - Statuses are merged into an [`AggregateHealthReport`] per request

pub mod agent;
pub mod codes;
pub mod config;
pub mod error;
pub mod node;
pub mod report;
pub mod status;

pub use agent::{Agent, AgentId};
pub use config::{DependencyConfig, NodeConfig, SchedulerConfig};
pub use error::{Result, ScaleError};
pub use node::{Node, NodeState};
pub use report::AggregateHealthReport;
pub use status::{DependencyStatus, StatusMessage};

/// Current Scale version for compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scale build information for telemetry and debugging
pub const BUILD_INFO: &str = concat!(
    "Scale ",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_NAME"),
    ")"
);

/// Standard API endpoints for the scheduler service
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const API_V1_STATUS: &str = "/api/v1/status";
    pub const API_V1_NODES: &str = "/api/v1/nodes";
    pub const API_V1_NODE: &str = "/api/v1/nodes/{hostname}";
    pub const API_V1_NODE_STATE: &str = "/api/v1/nodes/{hostname}/state";
    pub const API_V1_AGENTS: &str = "/api/v1/agents";
    pub const API_V1_AGENT: &str = "/api/v1/agents/{agent_id}";
}

/// Dependency names used as keys in the aggregate report
pub mod dependency_names {
    pub const DATABASE: &str = "database";
    pub const MSG_QUEUE: &str = "msg_queue";
    pub const ELASTICSEARCH: &str = "elasticsearch";
    pub const LOGS: &str = "logs";
    pub const SILO: &str = "silo";
    pub const IDAM: &str = "idam";
    pub const NODES: &str = "nodes";
}
