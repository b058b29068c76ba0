//! Port mapping: enriches observed connections for the report renderer.
//!
//! `PortMapper` is built once from the inventory. Every connection is then
//! run through the designation generator and the cross-connection detector.
//! All per-connection work takes `&self`, so a built mapper can be shared
//! across threads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cross_connection::CrossConnectionDetector;
use super::designation::DesignationGenerator;
use super::diagnostics::SharedDiagnostics;
use super::enclosure_resolver::{Assignment, PlacedNode};
use super::inventory::{Inventory, NodeKind};
use super::topology_parser::{port_sort_key, Connection, CrossConnectionIssue};

pub const NO_CROSS_CONNECTIONS: &str = "No cross-connections detected. All cabling is correct.";

/// A connection with both ends designated and its cabling judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub connection: Connection,
    pub node_designation: String,
    pub node_type: NodeKind,
    pub switch_designation: String,
    pub expected_network: String,
    pub observed_network: String,
    pub cross_connected: bool,
}

/// Node placement for one enclosure. `nodes` holds the designations and
/// `members` the matching API records, index for index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclosureMap {
    pub enclosure: String,
    pub enclosure_id: Option<u64>,
    pub capacity: usize,
    pub nodes: Vec<String>,
    pub members: Vec<PlacedNode>,
}

/// Hardware counts and the full node-to-enclosure maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSummary {
    pub cbox_count: usize,
    pub dbox_count: usize,
    pub cnode_count: usize,
    pub dnode_count: usize,
    pub switch_count: usize,
    pub cbox_map: Vec<EnclosureMap>,
    pub dbox_map: Vec<EnclosureMap>,
    /// Nodes no enclosure had room for (informational).
    pub unplaced_nodes: Vec<String>,
}

fn enclosure_maps(kind: NodeKind, assignment: &Assignment) -> Vec<EnclosureMap> {
    assignment
        .enclosures
        .iter()
        .map(|slot| EnclosureMap {
            enclosure: format!("{}{}", kind.enclosure_prefix(), slot.ordinal),
            enclosure_id: slot.id,
            capacity: slot.capacity,
            nodes: slot
                .nodes
                .iter()
                .map(|node| format!("{}{}", kind.node_prefix(), node.ordinal))
                .collect(),
            members: slot.nodes.clone(),
        })
        .collect()
}

pub struct PortMapper {
    designations: DesignationGenerator,
    detector: CrossConnectionDetector,
    counts: (usize, usize, usize, usize, usize),
}

impl PortMapper {
    pub fn new(inventory: &Inventory, diagnostics: SharedDiagnostics) -> Self {
        let designations = DesignationGenerator::new(inventory, diagnostics.clone());
        let detector =
            CrossConnectionDetector::from_directory(designations.switches().clone(), diagnostics);
        Self {
            designations,
            detector,
            counts: (
                inventory.cboxes.len(),
                inventory.dboxes.len(),
                inventory.cnodes.len(),
                inventory.dnodes.len(),
                inventory.switches.len(),
            ),
        }
    }

    pub fn designations(&self) -> &DesignationGenerator {
        &self.designations
    }

    pub fn detector(&self) -> &CrossConnectionDetector {
        &self.detector
    }

    pub fn enrich(&self, connection: &Connection) -> PortMapping {
        let node = self
            .designations
            .node_designation(&connection.node_ip, &connection.network);
        let switch_designation = self
            .designations
            .switch_designation(&connection.switch_ip, &connection.port);
        let check = self.detector.check(&connection.switch_ip, &connection.network);

        PortMapping {
            connection: connection.clone(),
            node_designation: node.designation,
            node_type: node.node_type,
            switch_designation,
            expected_network: check.expected,
            observed_network: connection.network.clone(),
            cross_connected: check.cross_connected,
        }
    }

    pub fn map_connections(&self, connections: &[Connection]) -> Vec<PortMapping> {
        connections.iter().map(|conn| self.enrich(conn)).collect()
    }

    pub fn summary(&self) -> HardwareSummary {
        let resolver = self.designations.resolver();
        let compute = resolver.assignment(NodeKind::Compute);
        let storage = resolver.assignment(NodeKind::Storage);

        let unplaced_nodes = [(NodeKind::Compute, compute), (NodeKind::Storage, storage)]
            .into_iter()
            .flat_map(|(kind, assignment)| {
                assignment
                    .unassigned()
                    .into_iter()
                    .map(move |ordinal| format!("{}{}", kind.node_prefix(), ordinal))
            })
            .collect();

        let (cbox_count, dbox_count, cnode_count, dnode_count, switch_count) = self.counts;
        HardwareSummary {
            cbox_count,
            dbox_count,
            cnode_count,
            dnode_count,
            switch_count,
            cbox_map: enclosure_maps(NodeKind::Compute, compute),
            dbox_map: enclosure_maps(NodeKind::Storage, storage),
            unplaced_nodes,
        }
    }
}

/// Mappings grouped by switch designation letter (switch IP when the switch
/// is unknown), each group ordered by port number.
pub fn group_by_switch(mappings: &[PortMapping]) -> BTreeMap<String, Vec<PortMapping>> {
    let mut groups: BTreeMap<String, Vec<PortMapping>> = BTreeMap::new();
    for mapping in mappings {
        let key = match mapping.switch_designation.split_once('-') {
            Some((switch, _)) if !switch.contains('?') => switch.to_string(),
            _ => mapping.connection.switch_ip.clone(),
        };
        groups.entry(key).or_default().push(mapping.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|m| port_sort_key(&m.connection.port));
    }
    groups
}

/// Mappings grouped by node hostname.
pub fn group_by_node(mappings: &[PortMapping]) -> BTreeMap<String, Vec<PortMapping>> {
    let mut groups: BTreeMap<String, Vec<PortMapping>> = BTreeMap::new();
    for mapping in mappings {
        groups
            .entry(mapping.connection.hostname.clone())
            .or_default()
            .push(mapping.clone());
    }
    groups
}

/// One line per detected mismatch and per tool-reported issue.
pub fn cross_connection_summary(
    mappings: &[PortMapping],
    issues: &[CrossConnectionIssue],
) -> String {
    let mut lines: Vec<String> = mappings
        .iter()
        .filter(|m| m.cross_connected)
        .map(|m| {
            format!(
                "{} ({} {}) is cabled to {} ({} {}) on network {}, expected network {}",
                m.node_designation,
                m.connection.hostname,
                m.connection.interface,
                m.switch_designation,
                m.connection.switch_ip,
                m.connection.port,
                m.observed_network,
                m.expected_network
            )
        })
        .collect();

    for issue in issues {
        let networks = issue
            .networks
            .iter()
            .enumerate()
            .map(|(idx, net)| match issue.network_labels.get(idx) {
                Some(label) => format!("{} ({})", net, label),
                None => net.clone(),
            })
            .collect::<Vec<_>>();
        let detail = if networks.is_empty() {
            "networks not reported".to_string()
        } else {
            networks.join(", ")
        };
        lines.push(format!(
            "Switch {} carries more than one internal network: {}",
            issue.switch_ip, detail
        ));
    }

    if lines.is_empty() {
        NO_CROSS_CONNECTIONS.to_string()
    } else {
        lines.join("\n")
    }
}
