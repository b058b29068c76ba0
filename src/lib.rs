//! As-built cabling core.
//!
//! Reconciles a storage cluster's hardware inventory with the cabling observed
//! by a link-discovery tool: every node port gets a canonical slot designation
//! and every cable landing on the wrong redundant switch is flagged.

pub mod config;
pub mod domain;
pub mod logging;

pub use domain::diagnostics::{CollectingDiagnostics, Diagnostics, SharedDiagnostics, TracingDiagnostics};
pub use domain::inventory::Inventory;
pub use domain::port_mapping::{PortMapper, PortMapping};
pub use domain::topology_parser::{Connection, CrossConnectionIssue, ParsedTopology, TopologyParse};
