//! The uniform contract every dependency check implements

use crate::error::ProbeError;
use async_trait::async_trait;
use scale_core::DependencyStatus;

/// Outcome of one probe run.
///
/// `Ok` carries the dependency's status, healthy or not. `Err` means the
/// probe itself could not produce one; the dependency manager turns it
/// into an `UNKNOWN_ERROR` entry for this probe.
pub type ProbeResult = std::result::Result<DependencyStatus, ProbeError>;

#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Key of this probe's entry in the aggregate report.
    fn name(&self) -> &'static str;

    async fn check(&self) -> ProbeResult;
}
