//! Cross-connection detector.
//!
//! The canonical topology has two switches: the first by management IP
//! carries network "A", the second network "B". A node port observed on the
//! other network is cross-connected. Anything the detector cannot judge
//! (unknown switch, third switch onward) is reported as "Unknown" and never
//! flagged.

use serde::{Deserialize, Serialize};

use super::diagnostics::SharedDiagnostics;
use super::inventory::SwitchRecord;
use super::switches::SwitchDirectory;

pub const UNKNOWN_NETWORK: &str = "Unknown";

const COMPONENT: &str = "cross_connection";

/// Network a switch ordinal is expected to carry.
pub fn expected_network_for(ordinal: usize) -> &'static str {
    match ordinal {
        1 => "A",
        2 => "B",
        _ => UNKNOWN_NETWORK,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossConnectionCheck {
    pub cross_connected: bool,
    pub expected: String,
}

pub struct CrossConnectionDetector {
    switches: SwitchDirectory,
    diagnostics: SharedDiagnostics,
}

impl CrossConnectionDetector {
    pub fn new(switches: &[SwitchRecord], diagnostics: SharedDiagnostics) -> Self {
        Self::from_directory(SwitchDirectory::new(switches), diagnostics)
    }

    pub fn from_directory(switches: SwitchDirectory, diagnostics: SharedDiagnostics) -> Self {
        Self {
            switches,
            diagnostics,
        }
    }

    pub fn expected_network(&self, switch_ip: &str) -> &'static str {
        self.switches
            .ordinal(switch_ip)
            .map(expected_network_for)
            .unwrap_or(UNKNOWN_NETWORK)
    }

    pub fn check(&self, switch_ip: &str, observed: &str) -> CrossConnectionCheck {
        let expected = match self.switches.ordinal(switch_ip) {
            Some(ordinal) => expected_network_for(ordinal),
            None => {
                self.diagnostics.warn(
                    COMPONENT,
                    &format!("switch {} is not in the inventory, cabling not judged", switch_ip),
                );
                UNKNOWN_NETWORK
            }
        };
        CrossConnectionCheck {
            cross_connected: expected != UNKNOWN_NETWORK && expected != observed,
            expected: expected.to_string(),
        }
    }

    pub fn is_cross_connected(&self, switch_ip: &str, observed: &str) -> bool {
        self.check(switch_ip, observed).cross_connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::CollectingDiagnostics;

    fn detector(ips: &[&str]) -> CrossConnectionDetector {
        let switches: Vec<SwitchRecord> = ips
            .iter()
            .map(|ip| SwitchRecord {
                mgmt_ip: Some(ip.to_string()),
                ..Default::default()
            })
            .collect();
        CrossConnectionDetector::new(&switches, CollectingDiagnostics::new())
    }

    #[test]
    fn test_switch_one_observing_b_is_flagged() {
        let det = detector(&["10.0.0.2", "10.0.0.1"]);
        let check = det.check("10.0.0.1", "B");
        assert!(check.cross_connected);
        assert_eq!(check.expected, "A");
    }

    #[test]
    fn test_switch_two_observing_b_is_fine() {
        let det = detector(&["10.0.0.2", "10.0.0.1"]);
        assert!(!det.is_cross_connected("10.0.0.2", "B"));
        assert_eq!(det.expected_network("10.0.0.2"), "B");
        assert!(det.is_cross_connected("10.0.0.2", "A"));
    }

    #[test]
    fn test_third_switch_is_never_flagged() {
        let det = detector(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        let check = det.check("10.0.0.3", "A");
        assert!(!check.cross_connected);
        assert_eq!(check.expected, UNKNOWN_NETWORK);
    }

    #[test]
    fn test_unknown_switch_reports_unknown() {
        let diag = CollectingDiagnostics::new();
        let det = CrossConnectionDetector::new(&[], diag.clone());
        let check = det.check("192.168.0.1", "A");
        assert_eq!(
            check,
            CrossConnectionCheck {
                cross_connected: false,
                expected: UNKNOWN_NETWORK.to_string(),
            }
        );
        assert_eq!(det.expected_network("192.168.0.1"), UNKNOWN_NETWORK);
        assert_eq!(diag.gaps().len(), 1);
    }

    #[test]
    fn test_repeated_checks_are_identical() {
        let det = detector(&["10.0.0.1", "10.0.0.2"]);
        assert_eq!(det.check("10.0.0.1", "B"), det.check("10.0.0.1", "B"));
    }
}
