//! `asbuilt topology <file>`: parse discovery output without an inventory.

use std::path::Path;

use anyhow::{bail, Result};
use colored::Colorize;

use asbuilt_cabling::config::OutputFormat;
use asbuilt_cabling::domain::inventory::NodeKind;
use asbuilt_cabling::domain::topology_parser::{self, TopologyParse};

use super::{is_json, print_json};

pub fn run(file: &Path, format: OutputFormat) -> Result<()> {
    let parsed = match topology_parser::parse_file(file) {
        TopologyParse::Parsed(parsed) => parsed,
        TopologyParse::Unavailable { error } => bail!("topology unavailable: {}", error),
    };

    if is_json(format) {
        return print_json(&parsed);
    }

    println!("{}", "═══ Observed Topology ═══".cyan().bold());
    println!("  Connections:     {}", parsed.connections.len());
    println!(
        "  CNode IPs:       {}",
        parsed.node_ips(NodeKind::Compute).join(", ")
    );
    println!(
        "  DNode IPs:       {}",
        parsed.node_ips(NodeKind::Storage).join(", ")
    );

    for (switch, conns) in parsed.by_switch() {
        println!();
        println!("{}", format!("── Switch {} ──", switch).yellow());
        for c in &conns {
            println!(
                "    {:<10} -> {:<16} {:<16} {:<12} {:<18} {}",
                c.port, c.hostname, c.node_ip, c.interface, c.mac, c.network
            );
        }
    }

    if !parsed.issues.is_empty() {
        println!();
        println!("{}", "── Reported Connectivity Issues ──".yellow());
        for issue in &parsed.issues {
            println!(
                "  {} switch {} spans networks [{}] labelled [{}]",
                "!!".red().bold(),
                issue.switch_ip,
                issue.networks.join(", "),
                issue.network_labels.join(", ")
            );
        }
    }
    Ok(())
}
