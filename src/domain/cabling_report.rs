//! Cabling report: everything the renderer needs from one run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diagnostics::{CollectingDiagnostics, Gap};
use super::inventory::Inventory;
use super::port_mapping::{
    cross_connection_summary, group_by_node, group_by_switch, HardwareSummary, PortMapper,
    PortMapping,
};
use super::topology_parser::{CrossConnectionIssue, TopologyParse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CablingReport {
    pub generated_at: DateTime<Utc>,
    pub summary: HardwareSummary,
    pub topology_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_error: Option<String>,
    pub port_mappings: Vec<PortMapping>,
    pub tool_issues: Vec<CrossConnectionIssue>,
    pub cross_connection_summary: String,
    /// Unresolved references an operator has to look at.
    pub gaps: Vec<Gap>,
}

impl CablingReport {
    pub fn build(inventory: &Inventory, topology: &TopologyParse) -> Self {
        let diagnostics = CollectingDiagnostics::new();
        let mapper = PortMapper::new(inventory, diagnostics.clone());

        let (port_mappings, tool_issues, topology_error) = match topology {
            TopologyParse::Parsed(parsed) => (
                mapper.map_connections(&parsed.connections),
                parsed.issues.clone(),
                None,
            ),
            TopologyParse::Unavailable { error } => (Vec::new(), Vec::new(), Some(error.clone())),
        };

        Self {
            generated_at: Utc::now(),
            summary: mapper.summary(),
            topology_available: topology_error.is_none(),
            topology_error,
            cross_connection_summary: cross_connection_summary(&port_mappings, &tool_issues),
            port_mappings,
            tool_issues,
            gaps: diagnostics.gaps(),
        }
    }

    pub fn cross_connection_count(&self) -> usize {
        self.port_mappings.iter().filter(|m| m.cross_connected).count() + self.tool_issues.len()
    }

    pub fn by_switch(&self) -> BTreeMap<String, Vec<PortMapping>> {
        group_by_switch(&self.port_mappings)
    }

    pub fn by_node(&self) -> BTreeMap<String, Vec<PortMapping>> {
        group_by_node(&self.port_mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::port_mapping::NO_CROSS_CONNECTIONS;

    #[test]
    fn test_unavailable_topology_still_reports() {
        let report = CablingReport::build(
            &Inventory::default(),
            &TopologyParse::Unavailable {
                error: "reading topology from lldp.txt: not found".into(),
            },
        );
        assert!(!report.topology_available);
        assert!(report.port_mappings.is_empty());
        assert_eq!(report.cross_connection_summary, NO_CROSS_CONNECTIONS);
        assert_eq!(report.cross_connection_count(), 0);
    }
}
