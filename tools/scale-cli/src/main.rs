use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use scale_core::{Agent, AggregateHealthReport, Node, NodeState};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const DEFAULT_URL: &str = "http://localhost:8081";

#[derive(Parser)]
#[command(name = "scale")]
#[command(about = "Scale CLI - Dependency health and node management")]
#[command(version = scale_core::VERSION)]
struct Cli {
    /// Base URL of the scheduler service
    #[arg(long, global = true, env = "SCALE_URL", default_value = DEFAULT_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dependency health report
    Status {
        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },
    /// Node management commands
    Nodes {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Agent offer commands
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },
}

#[derive(Subcommand)]
enum NodeAction {
    /// List all nodes
    List,
    /// Show node details
    Show { hostname: String },
    /// Register a host before its agent offers
    Add { hostname: String },
    /// Stop scheduling onto a node
    Pause { hostname: String },
    /// Resume scheduling onto a node
    Resume { hostname: String },
    /// Retire a node permanently
    Deprecate { hostname: String },
}

#[derive(Subcommand)]
enum AgentAction {
    /// Record a live offer from an agent
    Offer { agent_id: String, hostname: String },
    /// Report an agent as lost
    Lost { agent_id: String },
}

/// Thin JSON client for the scheduler API.
struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        decode(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Value,
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> anyhow::Result<reqwest::StatusCode> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.base_url))?;
        Ok(response.status())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        match body.get("error").and_then(Value::as_str) {
            Some(message) => bail!("{} ({})", message, status),
            None => bail!("request failed with {}", status),
        }
    }
    response.json().await.context("invalid response body")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.url);

    match cli.command {
        Commands::Status { json } => handle_status(&client, json).await,
        Commands::Nodes { action } => handle_node_action(&client, action).await,
        Commands::Agents { action } => handle_agent_action(&client, action).await,
    }
}

async fn handle_status(client: &ApiClient, raw: bool) -> anyhow::Result<()> {
    let report: AggregateHealthReport = client.get("/api/v1/status").await?;
    if raw {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

async fn handle_node_action(client: &ApiClient, action: NodeAction) -> anyhow::Result<()> {
    match action {
        NodeAction::List => {
            let listing: Value = client.get("/api/v1/nodes").await?;
            let nodes: Vec<Node> = serde_json::from_value(listing["nodes"].clone())
                .context("invalid node listing")?;
            println!("🖥️  {} node(s)", nodes.len());
            for node in &nodes {
                println!("{}", render_node(node));
            }
        }
        NodeAction::Show { hostname } => {
            let node: Node = client.get(&format!("/api/v1/nodes/{}", hostname)).await?;
            println!("{}", serde_json::to_string_pretty(&node)?);
        }
        NodeAction::Add { hostname } => {
            let node: Node = client
                .send_json(reqwest::Method::POST, "/api/v1/nodes", json!({ "hostname": hostname }))
                .await?;
            println!("➕ Added node {} ({})", node.hostname, node.state);
        }
        NodeAction::Pause { hostname } => set_state(client, &hostname, NodeState::Paused).await?,
        NodeAction::Resume { hostname } => set_state(client, &hostname, NodeState::Running).await?,
        NodeAction::Deprecate { hostname } => {
            set_state(client, &hostname, NodeState::Deprecated).await?
        }
    }
    Ok(())
}

async fn set_state(client: &ApiClient, hostname: &str, state: NodeState) -> anyhow::Result<()> {
    let node: Node = client
        .send_json(
            reqwest::Method::PUT,
            &format!("/api/v1/nodes/{}/state", hostname),
            json!({ "state": state }),
        )
        .await?;
    println!("✏️  Node {} is now {}", node.hostname, node.state);
    Ok(())
}

async fn handle_agent_action(client: &ApiClient, action: AgentAction) -> anyhow::Result<()> {
    match action {
        AgentAction::Offer { agent_id, hostname } => {
            let agent = Agent::new(agent_id, hostname);
            let _: Value = client
                .send_json(reqwest::Method::POST, "/api/v1/agents", json!({ "agents": [agent] }))
                .await?;
            println!("🤖 Offer recorded for {} on {}", agent.agent_id, agent.hostname);
        }
        AgentAction::Lost { agent_id } => {
            let status = client.delete(&format!("/api/v1/agents/{}", agent_id)).await?;
            match status {
                reqwest::StatusCode::NO_CONTENT => println!("🗑️  Agent {} removed", agent_id),
                reqwest::StatusCode::NOT_FOUND => bail!("agent {} is not registered", agent_id),
                other => bail!("request failed with {}", other),
            }
        }
    }
    Ok(())
}

fn render_report(report: &AggregateHealthReport) -> String {
    let mut out = String::new();
    let overall = if report.is_ok() { "✅ OK" } else { "❌ DEGRADED" };
    out.push_str(&format!("📊 Scale dependency status: {}\n", overall));
    for (name, status) in report.iter() {
        let mark = if status.ok { "✅" } else { "❌" };
        out.push_str(&format!("{} {}\n", mark, name));
        for error in &status.errors {
            out.push_str(&format!("    error   {}: {}\n", error.code, error.message));
        }
        for warning in &status.warnings {
            out.push_str(&format!("    warning {}: {}\n", warning.code, warning.message));
        }
    }
    out
}

fn render_node(node: &Node) -> String {
    format!(
        "{:<24} {:<10} {:<8} {}",
        node.hostname,
        node.state,
        if node.is_online { "online" } else { "offline" },
        node.agent_id.as_deref().unwrap_or("-")
    )
}
