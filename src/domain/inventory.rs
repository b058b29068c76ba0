//! Inventory: hardware records as returned by the cluster API.
//!
//! Records are loose: every field is optional and unknown fields
//! are ignored, so raw API payloads deserialize without a mapping layer.
//! Ordering rules (which give enclosures, nodes and switches their 1-based
//! ordinals) live here as well.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Octet used when no IPv4 last octet can be extracted. Sorts after every real
/// address and never matches one.
pub const OCTET_SENTINEL: u32 = 999;

/// Last octets at or above this value belong to storage nodes.
pub const STORAGE_OCTET_THRESHOLD: u32 = 100;

/// Address fields probed on a node record, in priority order.
pub const NODE_IP_FIELDS: [&str; 4] = ["ip", "mgmt_ip", "ipv4_address", "address"];

/// Compute (CNode in a CBox) or storage (DNode in a DBox). Serialized as
/// the node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "CNode")]
    Compute,
    #[serde(rename = "DNode")]
    Storage,
}

impl NodeKind {
    pub fn from_octet(octet: u32) -> Self {
        if octet >= STORAGE_OCTET_THRESHOLD {
            NodeKind::Storage
        } else {
            NodeKind::Compute
        }
    }

    pub fn from_ip(ip: &str) -> Self {
        Self::from_octet(last_octet(ip))
    }

    /// "CNode" / "DNode".
    pub fn node_label(&self) -> &'static str {
        match self {
            NodeKind::Compute => "CNode",
            NodeKind::Storage => "DNode",
        }
    }

    /// "CBox" / "DBox".
    pub fn enclosure_label(&self) -> &'static str {
        match self {
            NodeKind::Compute => "CBox",
            NodeKind::Storage => "DBox",
        }
    }

    pub fn node_prefix(&self) -> &'static str {
        match self {
            NodeKind::Compute => "CN",
            NodeKind::Storage => "DN",
        }
    }

    pub fn enclosure_prefix(&self) -> &'static str {
        match self {
            NodeKind::Compute => "CB",
            NodeKind::Storage => "DB",
        }
    }
}

/// Numeric value of the last IPv4 octet, or [`OCTET_SENTINEL`].
pub fn last_octet(ip: &str) -> u32 {
    ip.trim()
        .rsplit_once('.')
        .and_then(|(_, tail)| tail.trim().parse::<u32>().ok())
        .unwrap_or(OCTET_SENTINEL)
}

// ── Records ────────────────────────────────────────────────

/// A CBox or DBox as reported by the cluster API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnclosureRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub box_vendor: Option<String>,
    #[serde(default)]
    pub hardware_type: Option<String>,
}

/// A CNode or DNode as reported by the cluster API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mgmt_ip: Option<String>,
    #[serde(default)]
    pub ipv4_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NodeRecord {
    /// First non-empty address among [`NODE_IP_FIELDS`].
    pub fn primary_ip(&self) -> Option<&str> {
        [&self.ip, &self.mgmt_ip, &self.ipv4_address, &self.address]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Sort key: last octet of the primary address, or the sentinel.
    pub fn octet(&self) -> u32 {
        self.primary_ip().map(last_octet).unwrap_or(OCTET_SENTINEL)
    }
}

/// A data-network switch as reported by the cluster API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mgmt_ip: Option<String>,
}

impl SwitchRecord {
    pub fn mgmt_ip(&self) -> Option<&str> {
        self.mgmt_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}

// ── Ordering ───────────────────────────────────────────────

/// A record paired with its 1-based ordinal.
#[derive(Debug, Clone, Copy)]
pub struct Ordered<'a, T> {
    pub ordinal: usize,
    pub record: &'a T,
}

fn number<'a, T>(records: Vec<&'a T>) -> Vec<Ordered<'a, T>> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| Ordered {
            ordinal: idx + 1,
            record,
        })
        .collect()
}

/// Enclosures ordered by numeric `id`. Records without an id keep their input
/// order after every record that has one.
pub fn order_enclosures(records: &[EnclosureRecord]) -> Vec<Ordered<'_, EnclosureRecord>> {
    let mut sorted: Vec<&EnclosureRecord> = records.iter().collect();
    sorted.sort_by(|a, b| match (a.id, b.id) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    number(sorted)
}

/// Nodes ordered by last octet of their primary address.
pub fn order_nodes(records: &[NodeRecord]) -> Vec<Ordered<'_, NodeRecord>> {
    let mut sorted: Vec<&NodeRecord> = records.iter().collect();
    sorted.sort_by_key(|node| node.octet());
    number(sorted)
}

/// Switches ordered by management IP string. Switches with no management IP
/// come last.
pub fn order_switches(records: &[SwitchRecord]) -> Vec<Ordered<'_, SwitchRecord>> {
    let mut sorted: Vec<&SwitchRecord> = records.iter().collect();
    sorted.sort_by(|a, b| match (a.mgmt_ip(), b.mgmt_ip()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    number(sorted)
}

// ── Inventory bundle ───────────────────────────────────────

/// Everything the cluster API hands over for one cabling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub cboxes: Vec<EnclosureRecord>,
    #[serde(default)]
    pub dboxes: Vec<EnclosureRecord>,
    #[serde(default)]
    pub cnodes: Vec<NodeRecord>,
    #[serde(default)]
    pub dnodes: Vec<NodeRecord>,
    #[serde(default)]
    pub switches: Vec<SwitchRecord>,
}

impl Inventory {
    pub fn enclosures(&self, kind: NodeKind) -> &[EnclosureRecord] {
        match kind {
            NodeKind::Compute => &self.cboxes,
            NodeKind::Storage => &self.dboxes,
        }
    }

    pub fn nodes(&self, kind: NodeKind) -> &[NodeRecord] {
        match kind {
            NodeKind::Compute => &self.cnodes,
            NodeKind::Storage => &self.dnodes,
        }
    }

    /// Load an inventory dump. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let inventory = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        };
        Ok(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(ip: &str) -> NodeRecord {
        NodeRecord {
            ip: Some(ip.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_last_octet() {
        assert_eq!(last_octet("172.16.1.4"), 4);
        assert_eq!(last_octet(" 10.0.0.120 "), 120);
        assert_eq!(last_octet("not-an-ip"), OCTET_SENTINEL);
        assert_eq!(last_octet("10.0.0."), OCTET_SENTINEL);
        assert_eq!(last_octet(""), OCTET_SENTINEL);
    }

    #[test]
    fn test_node_kind_threshold() {
        assert_eq!(NodeKind::from_octet(99), NodeKind::Compute);
        assert_eq!(NodeKind::from_octet(100), NodeKind::Storage);
        assert_eq!(NodeKind::from_ip("172.16.1.4"), NodeKind::Compute);
        assert_eq!(NodeKind::from_ip("172.16.1.104"), NodeKind::Storage);
    }

    #[test]
    fn test_node_kind_serializes_as_label() {
        assert_eq!(serde_json::to_value(NodeKind::Compute).unwrap(), "CNode");
        assert_eq!(serde_json::to_value(NodeKind::Storage).unwrap(), "DNode");
        let kind: NodeKind = serde_json::from_str("\"DNode\"").unwrap();
        assert_eq!(kind, NodeKind::Storage);
    }

    #[test]
    fn test_primary_ip_probes_fields_in_order() {
        let record = NodeRecord {
            ip: Some("  ".to_string()),
            mgmt_ip: None,
            ipv4_address: Some("172.16.1.9".to_string()),
            address: Some("172.16.1.200".to_string()),
            ..Default::default()
        };
        assert_eq!(record.primary_ip(), Some("172.16.1.9"));
        assert_eq!(record.octet(), 9);

        let record = NodeRecord {
            mgmt_ip: Some("10.1.1.7".to_string()),
            address: Some("10.1.1.8".to_string()),
            ..Default::default()
        };
        assert_eq!(record.primary_ip(), Some("10.1.1.7"));
    }

    #[test]
    fn test_node_without_address_uses_sentinel() {
        assert_eq!(NodeRecord::default().octet(), OCTET_SENTINEL);
    }

    #[test]
    fn test_order_nodes_is_stable_and_contiguous() {
        let nodes = vec![node("10.0.0.7"), NodeRecord::default(), node("10.0.0.4"), node("10.0.0.5")];
        let ordered = order_nodes(&nodes);
        let octets: Vec<u32> = ordered.iter().map(|o| o.record.octet()).collect();
        let ordinals: Vec<usize> = ordered.iter().map(|o| o.ordinal).collect();
        assert_eq!(octets, vec![4, 5, 7, OCTET_SENTINEL]);
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_order_enclosures_by_id_missing_last() {
        let boxes = vec![
            EnclosureRecord {
                id: None,
                name: Some("orphan".into()),
                ..Default::default()
            },
            EnclosureRecord {
                id: Some(12),
                ..Default::default()
            },
            EnclosureRecord {
                id: Some(3),
                ..Default::default()
            },
        ];
        let ordered = order_enclosures(&boxes);
        assert_eq!(ordered[0].record.id, Some(3));
        assert_eq!(ordered[1].record.id, Some(12));
        assert_eq!(ordered[2].record.name.as_deref(), Some("orphan"));
        assert_eq!(ordered[2].ordinal, 3);
    }

    #[test]
    fn test_order_switches_by_ip_string() {
        let switches = vec![
            SwitchRecord {
                mgmt_ip: Some("10.0.0.2".into()),
                ..Default::default()
            },
            SwitchRecord::default(),
            SwitchRecord {
                mgmt_ip: Some("10.0.0.1".into()),
                ..Default::default()
            },
        ];
        let ordered = order_switches(&switches);
        assert_eq!(ordered[0].record.mgmt_ip(), Some("10.0.0.1"));
        assert_eq!(ordered[1].record.mgmt_ip(), Some("10.0.0.2"));
        assert_eq!(ordered[2].record.mgmt_ip(), None);
    }

    #[test]
    fn test_inventory_deserializes_raw_api_payload() {
        let raw = r#"{
            "cboxes": [{"id": 1, "box_vendor": "Dell IceLake", "state": "ACTIVE"}],
            "cnodes": [{"id": 5, "ipv4_address": "172.16.1.4", "os_version": "x"}],
            "switches": [{"mgmt_ip": "10.0.0.1", "model": "sn2100"}]
        }"#;
        let inventory: Inventory = serde_json::from_str(raw).unwrap();
        assert_eq!(inventory.cboxes.len(), 1);
        assert!(inventory.dboxes.is_empty());
        assert_eq!(inventory.cnodes[0].primary_ip(), Some("172.16.1.4"));
        assert_eq!(inventory.switches[0].mgmt_ip(), Some("10.0.0.1"));
    }

    #[test]
    fn test_inventory_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("inventory.yaml");
        std::fs::write(&yaml_path, "dboxes:\n  - id: 2\n    hardware_type: ceres\n").unwrap();
        let inventory = Inventory::load(&yaml_path).unwrap();
        assert_eq!(inventory.dboxes[0].hardware_type.as_deref(), Some("ceres"));

        let json_path = dir.path().join("inventory.json");
        std::fs::write(&json_path, r#"{"dnodes": [{"ip": "172.16.1.100"}]}"#).unwrap();
        let inventory = Inventory::load(&json_path).unwrap();
        assert_eq!(inventory.dnodes[0].octet(), 100);

        assert!(Inventory::load(&dir.path().join("missing.json")).is_err());
    }
}
