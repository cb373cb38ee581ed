//! Aggregation of every dependency probe into one health report

use crate::clients::{
    ElasticsearchClient, HttpClient, MessageBroker, ReqwestHttpClient, SearchIndex, TcpBrokerClient,
    TcpConnector, TokioTcpConnector,
};
use crate::error::{ClientError, ProbeError};
use crate::probe::{DependencyProbe, ProbeResult};
use crate::probes::{
    BrokerProbe, DatabaseProbe, IdamProbe, LoggingProbe, NodesProbe, SearchProbe, SiloProbe,
};
use node_manager::NodeManager;
use scale_core::{codes, AggregateHealthReport, DependencyConfig, DependencyStatus, NodeConfig};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at};
use tracing::{debug, error, info, instrument, warn};

/// Counters describing the reports produced so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyManagerStats {
    pub registered_probes: usize,
    pub reports_generated: u64,
    pub unhealthy_reports: u64,
}

/// Runs every registered probe and merges the results.
///
/// Probes run concurrently, each under its own timeout, and the whole
/// report under a second deadline. A probe that fails, panics or runs out
/// of time only affects its own entry.
#[derive(Clone)]
pub struct DependencyManager {
    probes: Vec<Arc<dyn DependencyProbe>>,
    probe_timeout: Duration,
    report_timeout: Duration,
    reports_generated: Arc<AtomicU64>,
    unhealthy_reports: Arc<AtomicU64>,
}

impl std::fmt::Debug for DependencyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyManager")
            .field("probes", &self.probe_names())
            .field("probe_timeout", &self.probe_timeout)
            .field("report_timeout", &self.report_timeout)
            .finish()
    }
}

impl DependencyManager {
    pub fn new(probe_timeout: Duration, report_timeout: Duration) -> Self {
        info!(
            probe_timeout_ms = probe_timeout.as_millis() as u64,
            report_timeout_ms = report_timeout.as_millis() as u64,
            "Creating dependency manager"
        );
        Self {
            probes: Vec::new(),
            probe_timeout,
            report_timeout,
            reports_generated: Arc::new(AtomicU64::new(0)),
            unhealthy_reports: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wire up the standard probe set against real network clients.
    pub fn from_config(
        config: &DependencyConfig,
        node_config: &NodeConfig,
        nodes: NodeManager,
    ) -> Result<Self, ClientError> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(config.probe_timeout())?);
        let connector: Arc<dyn TcpConnector> = Arc::new(TokioTcpConnector::new(config.probe_timeout()));

        let broker = config.broker_url.as_ref().map(|url| {
            Arc::new(TcpBrokerClient::new(url.clone(), connector.clone())) as Arc<dyn MessageBroker>
        });
        let index = config.elasticsearch_url.as_ref().map(|url| {
            Arc::new(ElasticsearchClient::new(url.clone(), http.clone())) as Arc<dyn SearchIndex>
        });

        Ok(Self::new(config.probe_timeout(), config.report_timeout())
            .with_probe(DatabaseProbe::new(
                nodes.store(),
                config.database_url.clone(),
                connector.clone(),
            ))
            .with_probe(BrokerProbe::new(broker))
            .with_probe(SearchProbe::new(index))
            .with_probe(LoggingProbe::new(config, http.clone(), connector))
            .with_probe(SiloProbe::new(config.silo_url.clone(), http.clone()))
            .with_probe(IdamProbe::new(config.idam_url.clone(), http))
            .with_probe(NodesProbe::new(nodes, node_config.min_online_nodes)))
    }

    pub fn with_probe<P>(mut self, probe: P) -> Self
    where
        P: DependencyProbe + 'static,
    {
        self.register(Arc::new(probe));
        self
    }

    /// Add a probe, replacing any probe already registered under its name.
    pub fn register(&mut self, probe: Arc<dyn DependencyProbe>) {
        let name = probe.name();
        if let Some(existing) = self.probes.iter_mut().find(|p| p.name() == name) {
            debug!(probe = name, "Replacing dependency probe");
            *existing = probe;
        } else {
            self.probes.push(probe);
        }
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Check every dependency now and return the merged report.
    ///
    /// Nothing is cached between calls.
    #[instrument(skip(self), fields(probes = self.probes.len()))]
    pub async fn generate_status(&self) -> AggregateHealthReport {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.report_timeout;

        let running: Vec<(&'static str, JoinHandle<ProbeResult>)> = self
            .probes
            .iter()
            .map(|probe| (probe.name(), self.spawn_probe(Arc::clone(probe))))
            .collect();

        let mut report = AggregateHealthReport::new();
        for (name, mut handle) in running {
            let status = match timeout_at(deadline, &mut handle).await {
                Ok(Ok(result)) => Self::status_from_result(name, result),
                Ok(Err(join_error)) => {
                    error!(probe = name, error = %join_error, "Dependency probe aborted");
                    DependencyStatus::failed(
                        codes::UNKNOWN_ERROR,
                        format!("Unexpected failure checking {}", name),
                    )
                }
                Err(_) => {
                    handle.abort();
                    warn!(probe = name, "Status report deadline reached before probe finished");
                    DependencyStatus::failed(
                        codes::TIMEOUT,
                        format!(
                            "Status report timed out after {:?} before {} was checked",
                            self.report_timeout, name
                        ),
                    )
                }
            };
            report.insert(name, status);
        }

        self.reports_generated.fetch_add(1, Ordering::Relaxed);
        if !report.is_ok() {
            self.unhealthy_reports.fetch_add(1, Ordering::Relaxed);
        }
        info!(
            ok = report.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated dependency status report"
        );
        report
    }

    pub fn get_stats(&self) -> DependencyManagerStats {
        DependencyManagerStats {
            registered_probes: self.probes.len(),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
            unhealthy_reports: self.unhealthy_reports.load(Ordering::Relaxed),
        }
    }

    fn spawn_probe(&self, probe: Arc<dyn DependencyProbe>) -> JoinHandle<ProbeResult> {
        let probe_timeout = self.probe_timeout;
        tokio::spawn(async move {
            match timeout(probe_timeout, probe.check()).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(probe_timeout)),
            }
        })
    }

    fn status_from_result(name: &str, result: ProbeResult) -> DependencyStatus {
        match result {
            Ok(status) => status,
            Err(ProbeError::Timeout(after)) => {
                warn!(probe = name, "Dependency probe timed out");
                DependencyStatus::failed(
                    codes::TIMEOUT,
                    format!("Checking {} timed out after {:?}", name, after),
                )
            }
            Err(e) => {
                warn!(probe = name, error = %e, "Dependency probe failed");
                DependencyStatus::failed(codes::UNKNOWN_ERROR, e.to_string())
            }
        }
    }
}
