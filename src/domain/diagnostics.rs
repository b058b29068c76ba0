//! Diagnostics: advisory warnings raised while resolving inventory and cabling.
//!
//! Components never fail on data-quality problems. Instead they report what
//! they could not resolve through a `Diagnostics` handle injected at
//! construction, and carry on with a placeholder.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sink for advisory warnings.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, component: &str, message: &str);
}

/// Shared diagnostics handle passed into each component.
pub type SharedDiagnostics = Arc<dyn Diagnostics>;

/// Forwards every warning to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    pub fn shared() -> SharedDiagnostics {
        Arc::new(Self)
    }
}

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, component: &str, message: &str) {
        warn!(component = component, "{}", message);
    }
}

/// A single recorded warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub component: String,
    pub message: String,
}

/// Records warnings in memory (and still forwards them to `tracing`) so a
/// report can list the gaps an operator has to look at. A warning repeated
/// for every connection that hits the same problem is recorded once.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    gaps: Mutex<Vec<Gap>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of every warning recorded so far, in arrival order.
    pub fn gaps(&self) -> Vec<Gap> {
        match self.gaps.lock() {
            Ok(gaps) => gaps.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gaps().is_empty()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, component: &str, message: &str) {
        let gap = Gap {
            component: component.to_string(),
            message: message.to_string(),
        };
        let mut gaps = match self.gaps.lock() {
            Ok(gaps) => gaps,
            Err(poisoned) => poisoned.into_inner(),
        };
        if gaps.contains(&gap) {
            return;
        }
        warn!(component = component, "{}", message);
        gaps.push(gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_records_in_order() {
        let diag = CollectingDiagnostics::new();
        diag.warn("designation", "first");
        diag.warn("resolver", "second");

        let gaps = diag.gaps();
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].component, "designation");
        assert_eq!(gaps[1].message, "second");
    }

    #[test]
    fn test_collecting_records_repeats_once() {
        let diag = CollectingDiagnostics::new();
        for _ in 0..3 {
            diag.warn("designation", "no switch matches management IP 10.9.9.9");
            diag.warn("detector", "switch 10.9.9.9 is not in the inventory");
        }
        diag.warn("designation", "no switch matches management IP 10.9.9.8");

        let gaps = diag.gaps();
        assert_eq!(gaps.len(), 3);
        assert_eq!(gaps[1].component, "detector");
        assert!(gaps[2].message.ends_with("10.9.9.8"));
    }

    #[test]
    fn test_collecting_usable_as_shared_handle() {
        let diag = CollectingDiagnostics::new();
        let shared: SharedDiagnostics = diag.clone();
        shared.warn("detector", "unknown switch");
        assert!(!diag.is_empty());
    }
}
