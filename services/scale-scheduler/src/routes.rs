use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use dependencies::DependencyManager;
use node_manager::NodeManager;
use scale_core::{endpoints, Agent, AggregateHealthReport, Node, NodeState, ScaleError, VERSION};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, warn};

#[derive(Clone, Debug)]
pub struct SchedulerState {
    nodes: NodeManager,
    dependencies: DependencyManager,
}

impl SchedulerState {
    pub fn new(nodes: NodeManager, dependencies: DependencyManager) -> Self {
        Self {
            nodes,
            dependencies,
        }
    }
}

pub fn router(state: Arc<SchedulerState>) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(health_check))
        .route(endpoints::API_V1_STATUS, get(dependency_status))
        .route(endpoints::API_V1_NODES, get(list_nodes).post(add_node))
        .route(endpoints::API_V1_NODE, get(get_node))
        .route(endpoints::API_V1_NODE_STATE, put(set_node_state))
        .route(endpoints::API_V1_AGENTS, post(register_agents))
        .route(endpoints::API_V1_AGENT, delete(lost_agent))
        .with_state(state)
}

/// Maps core errors onto HTTP responses.
#[derive(Debug)]
struct ApiError(ScaleError);

impl From<ScaleError> for ApiError {
    fn from(error: ScaleError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ScaleError::NodeNotFound { .. } => StatusCode::NOT_FOUND,
            ScaleError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ScaleError::ReconciliationConflict { .. } => StatusCode::CONFLICT,
            ScaleError::Configuration { .. } | ScaleError::SerializationError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct NewNode {
    hostname: String,
}

#[derive(Debug, Deserialize)]
struct StateChange {
    state: NodeState,
}

#[derive(Debug, Deserialize)]
struct AgentOffers {
    agents: Vec<Agent>,
}

#[instrument(skip(state))]
async fn health_check(State(state): State<Arc<SchedulerState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "scale-scheduler",
        "version": VERSION,
        "nodes": state.nodes.get_stats(),
        "dependencies": state.dependencies.get_stats(),
    }))
}

/// Always 200: an unhealthy dependency is reported in the body.
#[instrument(skip(state))]
async fn dependency_status(State(state): State<Arc<SchedulerState>>) -> Json<AggregateHealthReport> {
    Json(state.dependencies.generate_status().await)
}

#[instrument(skip(state))]
async fn list_nodes(State(state): State<Arc<SchedulerState>>) -> Json<Value> {
    let nodes = state.nodes.nodes();
    Json(json!({
        "total": nodes.len(),
        "nodes": nodes,
    }))
}

#[instrument(skip(state, payload))]
async fn add_node(
    State(state): State<Arc<SchedulerState>>,
    Json(payload): Json<NewNode>,
) -> Result<(StatusCode, Json<Node>), ApiError> {
    let (node, created) = state.nodes.add_node(&payload.hostname).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(node)))
}

#[instrument(skip(state))]
async fn get_node(
    State(state): State<Arc<SchedulerState>>,
    Path(hostname): Path<String>,
) -> Result<Json<Node>, ApiError> {
    state
        .nodes
        .node(&hostname)
        .map(Json)
        .ok_or_else(|| ApiError(ScaleError::NodeNotFound { hostname }))
}

#[instrument(skip(state, payload))]
async fn set_node_state(
    State(state): State<Arc<SchedulerState>>,
    Path(hostname): Path<String>,
    Json(payload): Json<StateChange>,
) -> Result<Json<Node>, ApiError> {
    let node = state.nodes.set_node_state(&hostname, payload.state).await?;
    Ok(Json(node))
}

#[instrument(skip(state, payload))]
async fn register_agents(
    State(state): State<Arc<SchedulerState>>,
    Json(payload): Json<AgentOffers>,
) -> (StatusCode, Json<Value>) {
    let registered = payload.agents.len();
    state.nodes.register_agents(payload.agents);
    (StatusCode::ACCEPTED, Json(json!({ "registered": registered })))
}

#[instrument(skip(state))]
async fn lost_agent(
    State(state): State<Arc<SchedulerState>>,
    Path(agent_id): Path<String>,
) -> StatusCode {
    if state.nodes.lost_agent(&agent_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
