//! Switch directory: ordinal and letter lookup by management IP.

use std::collections::HashMap;

use super::inventory::{order_switches, SwitchRecord};

/// Switch ordinal -> letter ('A' for 1, 'B' for 2, ...). `None` past 'Z'.
pub fn switch_letter(ordinal: usize) -> Option<char> {
    if (1..=26).contains(&ordinal) {
        char::from_u32('A' as u32 + (ordinal as u32 - 1))
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwitchDirectory {
    by_ip: HashMap<String, usize>,
    count: usize,
}

impl SwitchDirectory {
    pub fn new(switches: &[SwitchRecord]) -> Self {
        let ordered = order_switches(switches);
        let mut by_ip = HashMap::with_capacity(ordered.len());
        for entry in &ordered {
            if let Some(ip) = entry.record.mgmt_ip() {
                by_ip.entry(ip.to_string()).or_insert(entry.ordinal);
            }
        }
        Self {
            by_ip,
            count: ordered.len(),
        }
    }

    /// Exact management-IP match.
    pub fn ordinal(&self, mgmt_ip: &str) -> Option<usize> {
        self.by_ip.get(mgmt_ip.trim()).copied()
    }

    pub fn letter(&self, mgmt_ip: &str) -> Option<char> {
        self.ordinal(mgmt_ip).and_then(switch_letter)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
