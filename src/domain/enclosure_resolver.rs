//! Enclosure resolver: partitions nodes across their enclosures.
//!
//! The cluster API does not say which CBox houses which CNode (or which DBox
//! houses which DNode). The placement is inferred: enclosures are walked in
//! ordinal order and each one takes the next `capacity` nodes in node-ordinal
//! order, where capacity comes from the enclosure's vendor/model strings.
//!
//! Running out of nodes, or of enclosures, is not an error. The remaining
//! enclosures stay under-filled and the remaining nodes stay unassigned.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::inventory::{
    order_enclosures, order_nodes, EnclosureRecord, Inventory, NodeKind, NodeRecord, Ordered,
};

/// Nodes per CBox for Dell/HPE "Ice" chassis.
pub const MULTI_NODE_CBOX_CAPACITY: usize = 4;
/// Nodes per CBox for every other vendor.
pub const SINGLE_NODE_CBOX_CAPACITY: usize = 1;
/// Nodes per Ceres DBox.
pub const CERES_DBOX_CAPACITY: usize = 4;
/// Nodes per Ceres v2 DBox, and the default for unrecognised hardware.
pub const DEFAULT_DBOX_CAPACITY: usize = 2;

/// Capacity of a CBox given its `box_vendor` string.
pub fn compute_capacity(box_vendor: Option<&str>) -> usize {
    let vendor = box_vendor.unwrap_or_default().to_lowercase();
    let ice = vendor.contains("ice");
    if ice && (vendor.contains("dell") || vendor.contains("hpe")) {
        MULTI_NODE_CBOX_CAPACITY
    } else {
        SINGLE_NODE_CBOX_CAPACITY
    }
}

/// Capacity of a DBox given its `hardware_type` string.
pub fn storage_capacity(hardware_type: Option<&str>) -> usize {
    let hw = hardware_type.unwrap_or_default().to_lowercase();
    if hw.contains("ceres_v2") {
        DEFAULT_DBOX_CAPACITY
    } else if hw.contains("ceres") {
        CERES_DBOX_CAPACITY
    } else {
        DEFAULT_DBOX_CAPACITY
    }
}

pub fn capacity(kind: NodeKind, enclosure: &EnclosureRecord) -> usize {
    match kind {
        NodeKind::Compute => compute_capacity(enclosure.box_vendor.as_deref()),
        NodeKind::Storage => storage_capacity(enclosure.hardware_type.as_deref()),
    }
}

/// A node as placed: its ordinal plus the API identity it came with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub ordinal: usize,
    pub id: Option<u64>,
    pub name: Option<String>,
    pub ip: Option<String>,
}

impl PlacedNode {
    fn from_ordered(node: &Ordered<'_, NodeRecord>) -> Self {
        Self {
            ordinal: node.ordinal,
            id: node.record.id,
            name: node.record.name.clone(),
            ip: node.record.primary_ip().map(str::to_string),
        }
    }
}

/// One enclosure and the nodes placed in it, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclosureSlot {
    pub ordinal: usize,
    pub id: Option<u64>,
    pub capacity: usize,
    pub nodes: Vec<PlacedNode>,
}

impl EnclosureSlot {
    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub fn ordinals(&self) -> Vec<usize> {
        self.nodes.iter().map(|node| node.ordinal).collect()
    }
}

/// Result of placing one class of nodes into one class of enclosures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub enclosures: Vec<EnclosureSlot>,
    /// node ordinal -> enclosure ordinal
    pub node_to_enclosure: BTreeMap<usize, usize>,
    pub node_count: usize,
}

impl Assignment {
    /// enclosure ordinal -> node ordinals
    pub fn by_enclosure(&self) -> BTreeMap<usize, Vec<usize>> {
        self.enclosures
            .iter()
            .map(|slot| (slot.ordinal, slot.ordinals()))
            .collect()
    }

    /// enclosure API id -> API ids of the nodes placed in it.
    ///
    /// Enclosures and nodes without an id have no entry here; they are still
    /// present in `enclosures`.
    pub fn by_enclosure_id(&self) -> BTreeMap<u64, Vec<u64>> {
        self.enclosures
            .iter()
            .filter_map(|slot| {
                let ids = slot.nodes.iter().filter_map(|node| node.id).collect();
                Some((slot.id?, ids))
            })
            .collect()
    }

    pub fn node(&self, node_ordinal: usize) -> Option<&PlacedNode> {
        self.enclosures
            .iter()
            .flat_map(|slot| slot.nodes.iter())
            .find(|node| node.ordinal == node_ordinal)
    }

    pub fn enclosure_of(&self, node_ordinal: usize) -> Option<usize> {
        self.node_to_enclosure.get(&node_ordinal).copied()
    }

    /// Node ordinals that no enclosure had room for.
    pub fn unassigned(&self) -> Vec<usize> {
        (1..=self.node_count)
            .filter(|ordinal| !self.node_to_enclosure.contains_key(ordinal))
            .collect()
    }
}

/// Greedy placement: each enclosure in ordinal order consumes the next
/// `capacity` nodes in ordinal order.
pub fn assign(kind: NodeKind, enclosures: &[EnclosureRecord], nodes: &[NodeRecord]) -> Assignment {
    let ordered_enclosures = order_enclosures(enclosures);
    let ordered_nodes: Vec<PlacedNode> = order_nodes(nodes)
        .iter()
        .map(PlacedNode::from_ordered)
        .collect();

    let mut cursor = 0;
    let mut slots = Vec::with_capacity(ordered_enclosures.len());
    let mut node_to_enclosure = BTreeMap::new();

    for enclosure in &ordered_enclosures {
        let cap = capacity(kind, enclosure.record);
        let end = (cursor + cap).min(ordered_nodes.len());
        let taken = ordered_nodes[cursor..end].to_vec();
        cursor = end;

        for node in &taken {
            node_to_enclosure.insert(node.ordinal, enclosure.ordinal);
        }
        slots.push(EnclosureSlot {
            ordinal: enclosure.ordinal,
            id: enclosure.record.id,
            capacity: cap,
            nodes: taken,
        });
    }

    if cursor < ordered_nodes.len() {
        debug!(
            kind = kind.node_label(),
            unassigned = ordered_nodes.len() - cursor,
            "enclosure capacity exhausted before all nodes were placed"
        );
    }

    Assignment {
        enclosures: slots,
        node_to_enclosure,
        node_count: ordered_nodes.len(),
    }
}

/// Node-to-enclosure lookups for both compute and storage, built once.
#[derive(Debug, Clone, Default)]
pub struct EnclosureResolver {
    compute: Assignment,
    storage: Assignment,
}

impl EnclosureResolver {
    pub fn new(inventory: &Inventory) -> Self {
        Self {
            compute: assign(NodeKind::Compute, &inventory.cboxes, &inventory.cnodes),
            storage: assign(NodeKind::Storage, &inventory.dboxes, &inventory.dnodes),
        }
    }

    pub fn assignment(&self, kind: NodeKind) -> &Assignment {
        match kind {
            NodeKind::Compute => &self.compute,
            NodeKind::Storage => &self.storage,
        }
    }

    pub fn enclosure_of(&self, kind: NodeKind, node_ordinal: usize) -> Option<usize> {
        self.assignment(kind).enclosure_of(node_ordinal)
    }
}
