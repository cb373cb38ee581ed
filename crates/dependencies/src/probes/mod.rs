//! One probe per external dependency

mod broker;
mod database;
mod idam;
mod logging;
mod nodes;
mod search;
mod silo;

pub use broker::BrokerProbe;
pub use database::DatabaseProbe;
pub use idam::IdamProbe;
pub use logging::LoggingProbe;
pub use nodes::NodesProbe;
pub use search::SearchProbe;
pub use silo::SiloProbe;
