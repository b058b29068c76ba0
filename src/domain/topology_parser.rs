//! Topology parser: reads the text report of the link-discovery tool.
//!
//! Two shapes are extracted, both owned by the external tool and matched
//! exactly as it prints them:
//!
//! ```text
//! Full topology
//! hostname  switch_ip  port   node_ip      interface  mac                network
//! cnode-1   10.0.0.1   swp1   172.16.1.4   enp1s0f0   b8:ce:f6:00:00:01  A
//!
//! Connectivity issue detected, switch 10.0.0.1 has more then one internal network
//! Switch 10.0.0.1 has {'net1', 'net2'}, network {'A', 'B'}
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::inventory::{last_octet, NodeKind};

const TOPOLOGY_HEADING: &str = "Full topology";
const TOPOLOGY_FIELDS: usize = 7;

/// "more then" is what the tool prints.
static ISSUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Connectivity issue detected, switch `?([^\s`]+)`? has more then one internal network")
        .unwrap()
});

static ISSUE_DETAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Switch `?([^\s`]+)`? has `?\{([^}]*)\}`?, network `?\{([^}]*)\}`?").unwrap()
});

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("reading topology from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("topology file {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}

/// One observed cable: switch port to node interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub hostname: String,
    pub switch_ip: String,
    pub port: String,
    pub node_ip: String,
    pub interface: String,
    pub mac: String,
    pub network: String,
}

/// A switch the discovery tool saw straddling more than one internal network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossConnectionIssue {
    pub switch_ip: String,
    pub networks: Vec<String>,
    pub network_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTopology {
    pub connections: Vec<Connection>,
    pub issues: Vec<CrossConnectionIssue>,
}

/// Outcome of reading a topology source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopologyParse {
    Parsed(ParsedTopology),
    Unavailable { error: String },
}

impl TopologyParse {
    pub fn parsed(&self) -> Option<&ParsedTopology> {
        match self {
            TopologyParse::Parsed(topology) => Some(topology),
            TopologyParse::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.parsed().is_some()
    }
}

/// Numeric sort key of a port name: its rightmost run of digits
/// (`eth1/1` -> 1, `swp20` -> 20). Ports without digits sort first.
pub fn port_sort_key(port: &str) -> u32 {
    let mut run: Vec<char> = port
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    run.reverse();
    run.into_iter().collect::<String>().parse().unwrap_or(0)
}

fn is_table_header(line: &str) -> bool {
    let first = line.split_whitespace().next().unwrap_or_default();
    first.eq_ignore_ascii_case("hostname")
        || line.chars().all(|c| matches!(c, '-' | '=' | '+' | '|' | ' ' | '\t'))
}

fn is_section_heading(line: &str) -> bool {
    line.ends_with(':')
        || line.starts_with('#')
        || line.starts_with("Connectivity issue detected")
        || ISSUE_DETAIL_REGEX.is_match(line)
}

fn parse_connections(text: &str) -> Vec<Connection> {
    let mut lines = text.lines();
    if !lines.by_ref().any(|line| line.contains(TOPOLOGY_HEADING)) {
        debug!("no topology block found");
        return Vec::new();
    }

    let mut connections = Vec::new();
    let mut in_table = false;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            if in_table {
                break;
            }
            continue;
        }
        if is_section_heading(line) {
            break;
        }
        in_table = true;
        if is_table_header(line) {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < TOPOLOGY_FIELDS {
            continue;
        }
        connections.push(Connection {
            hostname: fields[0].to_string(),
            switch_ip: fields[1].to_string(),
            port: fields[2].to_string(),
            node_ip: fields[3].to_string(),
            interface: fields[4].to_string(),
            mac: fields[5].to_string(),
            network: fields[6].to_string(),
        });
    }
    connections
}

fn split_brace_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_issues(text: &str) -> Vec<CrossConnectionIssue> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    // (switch ip, warning start, warning end)
    let warnings: Vec<(&str, usize, usize)> = ISSUE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps.get(1)?.as_str(), whole.start(), whole.end()))
        })
        .collect();

    for (idx, &(ip, _, start)) in warnings.iter().enumerate() {
        // details for a warning sit before the next warning
        let end = warnings.get(idx + 1).map_or(text.len(), |next| next.1);
        let switch_ip = ip.to_string();
        if !seen.insert(switch_ip.clone()) {
            continue;
        }

        let detail = ISSUE_DETAIL_REGEX
            .captures_iter(&text[start..end])
            .find(|detail| detail.get(1).map(|m| m.as_str()) == Some(switch_ip.as_str()));

        let (networks, network_labels) = match detail {
            Some(detail) => (
                split_brace_list(detail.get(2).map_or("", |m| m.as_str())),
                split_brace_list(detail.get(3).map_or("", |m| m.as_str())),
            ),
            None => {
                debug!(switch_ip = %switch_ip, "connectivity issue without network details");
                (Vec::new(), Vec::new())
            }
        };

        issues.push(CrossConnectionIssue {
            switch_ip,
            networks,
            network_labels,
        });
    }
    issues
}

/// Parse topology text already in memory.
pub fn parse(text: &str) -> ParsedTopology {
    ParsedTopology {
        connections: parse_connections(text),
        issues: parse_issues(text),
    }
}

fn read_text(path: &Path) -> Result<String, TopologyError> {
    let bytes = std::fs::read(path).map_err(|source| TopologyError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| TopologyError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Read and parse a topology file. An unreadable source yields
/// [`TopologyParse::Unavailable`] rather than an error.
pub fn parse_file(path: &Path) -> TopologyParse {
    match read_text(path) {
        Ok(text) => TopologyParse::Parsed(parse(&text)),
        Err(e) => TopologyParse::Unavailable {
            error: e.to_string(),
        },
    }
}

impl ParsedTopology {
    /// Connections grouped by switch IP, each group ordered by port number.
    pub fn by_switch(&self) -> BTreeMap<String, Vec<Connection>> {
        let mut groups: BTreeMap<String, Vec<Connection>> = BTreeMap::new();
        for conn in &self.connections {
            groups.entry(conn.switch_ip.clone()).or_default().push(conn.clone());
        }
        for group in groups.values_mut() {
            group.sort_by_key(|conn| port_sort_key(&conn.port));
        }
        groups
    }

    pub fn by_hostname(&self) -> BTreeMap<String, Vec<Connection>> {
        let mut groups: BTreeMap<String, Vec<Connection>> = BTreeMap::new();
        for conn in &self.connections {
            groups.entry(conn.hostname.clone()).or_default().push(conn.clone());
        }
        groups
    }

    /// Distinct node IPs of one kind, ascending by last octet.
    pub fn node_ips(&self, kind: NodeKind) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ips: Vec<String> = self
            .connections
            .iter()
            .map(|conn| conn.node_ip.as_str())
            .filter(|ip| NodeKind::from_ip(ip) == kind)
            .filter(|ip| seen.insert(*ip))
            .map(str::to_string)
            .collect();
        ips.sort_by_key(|ip| last_octet(ip));
        ips
    }

    pub fn compute_node_ips(&self) -> Vec<String> {
        self.node_ips(NodeKind::Compute)
    }

    pub fn storage_node_ips(&self) -> Vec<String> {
        self.node_ips(NodeKind::Storage)
    }
}
