//! # Dependencies
//!
//! Health checks for everything the Scale scheduler relies on: the
//! database, message broker, search index, log shipper, silo registry,
//! identity provider and the worker node fleet.
//!
//! Each check is a [`DependencyProbe`] talking to its dependency through
//! one of the capability traits in [`clients`]. The [`DependencyManager`]
//! runs them all and merges the results into an
//! [`AggregateHealthReport`](scale_core::AggregateHealthReport).

pub mod clients;
pub mod error;
pub mod manager;
pub mod probe;
pub mod probes;

#[cfg(test)]
mod testing;

pub use error::{ClientError, ProbeError};
pub use manager::{DependencyManager, DependencyManagerStats};
pub use probe::{DependencyProbe, ProbeResult};
