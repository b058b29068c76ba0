//! Designation generator: canonical slot labels for both ends of a cable.
//!
//! Node side:   `{CB|DB}{enclosure}-{CN|DN}{node}-{R|L}`, e.g. `CB1-CN1-R`
//! Switch side: `SW{letter}-P{port}`, e.g. `SWA-P20`
//!
//! Anything that cannot be resolved is rendered as `?` and reported through
//! the injected diagnostics handle. Generation never fails.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::diagnostics::SharedDiagnostics;
use super::enclosure_resolver::EnclosureResolver;
use super::inventory::{last_octet, order_nodes, Inventory, NodeKind, OCTET_SENTINEL};
use super::switches::SwitchDirectory;

const COMPONENT: &str = "designation";
const PLACEHOLDER: &str = "?";

/// Port side code for an observed network label. "A" is the right-hand
/// (primary) port, "B" the left-hand one. Other labels pass through.
pub fn port_side(network: &str) -> &str {
    match network {
        "A" => "R",
        "B" => "L",
        other => other,
    }
}

/// Port number used in switch designations: the digits of the last
/// `/`-separated segment of the port name (`swp20` -> `20`, `eth1/1` -> `1`).
pub fn port_number(port: &str) -> Option<String> {
    let segment = port.rsplit('/').next().unwrap_or(port);
    let digits: String = segment.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDesignation {
    pub designation: String,
    pub node_type: NodeKind,
}

pub struct DesignationGenerator {
    resolver: EnclosureResolver,
    compute_ordinals: HashMap<u32, usize>,
    storage_ordinals: HashMap<u32, usize>,
    switches: SwitchDirectory,
    diagnostics: SharedDiagnostics,
}

fn octet_index(inventory: &Inventory, kind: NodeKind) -> HashMap<u32, usize> {
    let mut index = HashMap::new();
    for node in order_nodes(inventory.nodes(kind)) {
        let octet = node.record.octet();
        if octet != OCTET_SENTINEL {
            index.entry(octet).or_insert(node.ordinal);
        }
    }
    index
}

impl DesignationGenerator {
    pub fn new(inventory: &Inventory, diagnostics: SharedDiagnostics) -> Self {
        Self {
            resolver: EnclosureResolver::new(inventory),
            compute_ordinals: octet_index(inventory, NodeKind::Compute),
            storage_ordinals: octet_index(inventory, NodeKind::Storage),
            switches: SwitchDirectory::new(&inventory.switches),
            diagnostics,
        }
    }

    pub fn resolver(&self) -> &EnclosureResolver {
        &self.resolver
    }

    pub fn switches(&self) -> &SwitchDirectory {
        &self.switches
    }

    /// Ordinal of the node with this IP's last octet, among nodes of the kind
    /// the octet implies.
    pub fn node_ordinal(&self, node_ip: &str) -> Option<usize> {
        let octet = last_octet(node_ip);
        if octet == OCTET_SENTINEL {
            return None;
        }
        let index = match NodeKind::from_octet(octet) {
            NodeKind::Compute => &self.compute_ordinals,
            NodeKind::Storage => &self.storage_ordinals,
        };
        index.get(&octet).copied()
    }

    pub fn node_designation(&self, node_ip: &str, network: &str) -> NodeDesignation {
        let kind = NodeKind::from_ip(node_ip);
        let side = port_side(network);

        let (enclosure, node) = match self.node_ordinal(node_ip) {
            Some(ordinal) => match self.resolver.enclosure_of(kind, ordinal) {
                Some(enclosure) => (enclosure.to_string(), ordinal.to_string()),
                None => {
                    self.diagnostics.warn(
                        COMPONENT,
                        &format!(
                            "{} {} ({}) is not placed in any {}",
                            kind.node_label(),
                            ordinal,
                            node_ip,
                            kind.enclosure_label()
                        ),
                    );
                    (PLACEHOLDER.to_string(), ordinal.to_string())
                }
            },
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    &format!("no {} matches node IP {}", kind.node_label(), node_ip),
                );
                (PLACEHOLDER.to_string(), PLACEHOLDER.to_string())
            }
        };

        NodeDesignation {
            designation: format!(
                "{}{}-{}{}-{}",
                kind.enclosure_prefix(),
                enclosure,
                kind.node_prefix(),
                node,
                side
            ),
            node_type: kind,
        }
    }

    pub fn switch_designation(&self, switch_ip: &str, port: &str) -> String {
        let letter = match self.switches.letter(switch_ip) {
            Some(letter) => letter.to_string(),
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    &format!("no switch matches management IP {}", switch_ip),
                );
                PLACEHOLDER.to_string()
            }
        };
        let number = match port_number(port) {
            Some(number) => number,
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    &format!("port {:?} on switch {} has no port number", port, switch_ip),
                );
                PLACEHOLDER.to_string()
            }
        };
        format!("SW{}-P{}", letter, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::CollectingDiagnostics;
    use crate::domain::inventory::{EnclosureRecord, NodeRecord, SwitchRecord};
    use std::sync::Arc;

    fn node(octet: u32) -> NodeRecord {
        NodeRecord {
            ip: Some(format!("172.16.1.{}", octet)),
            ..Default::default()
        }
    }

    fn inventory() -> Inventory {
        Inventory {
            cboxes: vec![EnclosureRecord {
                id: Some(1),
                box_vendor: Some("Dell IceLake".into()),
                ..Default::default()
            }],
            dboxes: vec![
                EnclosureRecord {
                    id: Some(7),
                    hardware_type: Some("Ceres_v2".into()),
                    ..Default::default()
                },
                EnclosureRecord {
                    id: Some(8),
                    hardware_type: Some("Ceres_v2".into()),
                    ..Default::default()
                },
            ],
            cnodes: vec![node(7), node(5), node(4), node(6)],
            dnodes: vec![node(100), node(101), node(102)],
            switches: vec![
                SwitchRecord {
                    mgmt_ip: Some("10.0.0.2".into()),
                    ..Default::default()
                },
                SwitchRecord {
                    mgmt_ip: Some("10.0.0.1".into()),
                    ..Default::default()
                },
            ],
        }
    }

    fn generator() -> (DesignationGenerator, Arc<CollectingDiagnostics>) {
        let diag = CollectingDiagnostics::new();
        (DesignationGenerator::new(&inventory(), diag.clone()), diag)
    }

    #[test]
    fn test_compute_node_network_a() {
        let (namer, diag) = generator();
        let result = namer.node_designation("172.16.1.4", "A");
        assert_eq!(result.designation, "CB1-CN1-R");
        assert_eq!(result.node_type.node_label(), "CNode");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_network_b_flips_side() {
        let (namer, _) = generator();
        assert_eq!(namer.node_designation("172.16.1.4", "B").designation, "CB1-CN1-L");
        assert_eq!(namer.node_designation("172.16.1.7", "B").designation, "CB1-CN4-L");
    }

    #[test]
    fn test_other_labels_pass_through() {
        let (namer, _) = generator();
        assert_eq!(namer.node_designation("172.16.1.5", "C").designation, "CB1-CN2-C");
    }

    #[test]
    fn test_storage_nodes_span_dboxes() {
        let (namer, _) = generator();
        let result = namer.node_designation("172.16.1.102", "A");
        assert_eq!(result.designation, "DB2-DN3-R");
        assert_eq!(result.node_type, NodeKind::Storage);
    }

    #[test]
    fn test_unknown_node_gets_placeholder() {
        let (namer, diag) = generator();
        let result = namer.node_designation("172.16.1.50", "A");
        assert_eq!(result.designation, "CB?-CN?-R");
        assert_eq!(diag.gaps().len(), 1);

        let result = namer.node_designation("garbage", "B");
        assert!(result.designation.contains('?'));
    }

    #[test]
    fn test_unplaced_node_keeps_ordinal() {
        let mut inv = inventory();
        inv.dboxes.truncate(1);
        let diag = CollectingDiagnostics::new();
        let namer = DesignationGenerator::new(&inv, diag.clone());
        assert_eq!(namer.node_designation("172.16.1.102", "A").designation, "DB?-DN3-R");
        assert!(diag.gaps()[0].message.contains("not placed"));
    }

    #[test]
    fn test_switch_designation() {
        let (namer, diag) = generator();
        assert_eq!(namer.switch_designation("10.0.0.1", "swp20"), "SWA-P20");
        assert_eq!(namer.switch_designation("10.0.0.2", "eth1/1"), "SWB-P1");
        assert!(diag.is_empty());
        assert_eq!(namer.switch_designation("10.9.9.9", "swp3"), "SW?-P3");
        assert_eq!(diag.gaps().len(), 1);
    }

    #[test]
    fn test_port_number_extraction() {
        assert_eq!(port_number("swp20").as_deref(), Some("20"));
        assert_eq!(port_number("eth1/1").as_deref(), Some("1"));
        assert_eq!(port_number("Ethernet1/10").as_deref(), Some("10"));
        assert_eq!(port_number("mgmt"), None);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let (namer, _) = generator();
        let first = namer.node_designation("172.16.1.101", "B");
        let second = namer.node_designation("172.16.1.101", "B");
        assert_eq!(first, second);
        assert_eq!(
            namer.switch_designation("10.0.0.1", "swp7"),
            namer.switch_designation("10.0.0.1", "swp7")
        );
    }
}
