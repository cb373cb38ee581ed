//! Error and warning codes carried in dependency status entries

// Configuration missing
pub const NO_BROKER_DEFINED: &str = "NO_BROKER_DEFINED";
pub const NO_ELASTICSEARCH_DEFINED: &str = "NO_ELASTICSEARCH_DEFINED";
pub const NO_LOGGING_DEFINED: &str = "NO_LOGGING_DEFINED";
pub const NO_LOGGING_HEALTH_DEFINED: &str = "NO_LOGGING_HEALTH_DEFINED";
pub const NO_SILO_DEFINED: &str = "NO_SILO_DEFINED";

// Reachability
pub const OPERATIONAL_ERROR: &str = "OPERATIONAL_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
pub const CLUSTER_ERROR: &str = "CLUSTER_ERROR";
pub const UNEXPECTED_STATUS: &str = "UNEXPECTED_STATUS";
pub const TIMEOUT: &str = "TIMEOUT";

// Degraded
pub const CLUSTER_RED: &str = "CLUSTER_RED";
pub const LARGE_BUFFER: &str = "LARGE_BUFFER";
pub const LARGE_BUFFER_SIZE: &str = "LARGE_BUFFER_SIZE";
pub const NO_NODES: &str = "NO_NODES";
pub const NODES_OFFLINE: &str = "NODES_OFFLINE";
