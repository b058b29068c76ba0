//! `asbuilt report`: full as-built cabling report.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use asbuilt_cabling::config::{Config, OutputFormat};
use asbuilt_cabling::domain::cabling_report::CablingReport;
use asbuilt_cabling::domain::port_mapping::{EnclosureMap, PortMapping};
use asbuilt_cabling::Inventory;

use super::{is_json, print_json, read_topology};

pub fn run(
    cfg: &Config,
    inventory: Option<&Path>,
    topology: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let inventory_path = cfg.inventory_path(inventory)?;
    let inventory = Inventory::load(&inventory_path)?;
    let topology = read_topology(cfg.topology_path(topology).as_deref());

    let report = CablingReport::build(&inventory, &topology);
    info!(
        connections = report.port_mappings.len(),
        cross_connections = report.cross_connection_count(),
        gaps = report.gaps.len(),
        "cabling report built"
    );

    if is_json(format) {
        return print_json(&report);
    }
    print_table(&report);
    Ok(())
}

fn print_enclosures(label: &str, maps: &[EnclosureMap]) {
    if maps.is_empty() {
        return;
    }
    println!("  {}", format!("{}:", label).dimmed());
    for map in maps {
        let fill = format!("{}/{}", map.nodes.len(), map.capacity);
        let fill = if map.nodes.len() < map.capacity {
            fill.yellow().to_string()
        } else {
            fill
        };
        let id = map
            .enclosure_id
            .map(|id| format!("id {}", id))
            .unwrap_or_else(|| "no id".to_string());
        let nodes = if map.nodes.is_empty() {
            "-".to_string()
        } else {
            map.nodes
                .iter()
                .zip(&map.members)
                .map(|(designation, member)| match member.id {
                    Some(id) => format!("{} (id {})", designation, id),
                    None => designation.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("    {:<6} ({}) [{}]  {}", map.enclosure.bold(), id, fill, nodes);
    }
}

fn network_cell(mapping: &PortMapping) -> String {
    if mapping.cross_connected {
        format!(
            "{} (expected {})",
            mapping.observed_network, mapping.expected_network
        )
        .red()
        .bold()
        .to_string()
    } else {
        mapping.observed_network.clone()
    }
}

fn print_table(report: &CablingReport) {
    let summary = &report.summary;

    println!("{}", "═══ As-Built Cabling Report ═══".cyan().bold());
    println!();

    // ── Hardware ──
    println!("{}", "── Hardware ──".yellow());
    println!("  CBoxes:          {}", summary.cbox_count);
    println!("  CNodes:          {}", summary.cnode_count);
    println!("  DBoxes:          {}", summary.dbox_count);
    println!("  DNodes:          {}", summary.dnode_count);
    println!("  Switches:        {}", summary.switch_count);
    println!();
    print_enclosures("CBox placement", &summary.cbox_map);
    print_enclosures("DBox placement", &summary.dbox_map);
    if !summary.unplaced_nodes.is_empty() {
        println!(
            "  {} {}",
            "Unplaced nodes:".dimmed(),
            summary.unplaced_nodes.join(", ").yellow()
        );
    }

    // ── Switch ports ──
    println!();
    println!("{}", "── Switch Ports ──".yellow());
    if let Some(ref err) = report.topology_error {
        println!("  {} {}", "Topology unavailable:".red(), err);
    } else if report.port_mappings.is_empty() {
        println!("  {}", "No connections found in topology".dimmed());
    }
    for (switch, mappings) in report.by_switch() {
        println!("  {}", switch.bold());
        for m in &mappings {
            println!(
                "    {:<10} {:<10} -> {:<12} {:<16} {:<12} {}",
                m.switch_designation,
                m.connection.port,
                m.node_designation,
                m.connection.node_ip,
                m.connection.interface,
                network_cell(m)
            );
        }
    }

    // ── Node ports ──
    if !report.port_mappings.is_empty() {
        println!();
        println!("{}", "── Node Ports ──".yellow());
        for (host, mappings) in report.by_node() {
            println!("  {}", host.bold());
            for m in &mappings {
                println!(
                    "    {:<12} {:<12} {:<18} -> {:<10} {}",
                    m.node_designation,
                    m.connection.interface,
                    m.connection.mac,
                    m.switch_designation,
                    network_cell(m)
                );
            }
        }
    }

    // ── Cross-connections ──
    println!();
    println!("{}", "── Cross-Connections ──".yellow());
    if report.cross_connection_count() == 0 {
        println!("  {}", report.cross_connection_summary.green());
    } else {
        for line in report.cross_connection_summary.lines() {
            println!("  {} {}", "!!".red().bold(), line);
        }
    }

    if !report.gaps.is_empty() {
        println!();
        println!("{}", "── Gaps ──".yellow());
        for gap in &report.gaps {
            println!("  {} {}", format!("[{}]", gap.component).dimmed(), gap.message);
        }
    }

    println!();
    println!(
        "{} {}",
        "Report generated at:".dimmed(),
        report.generated_at.to_rfc3339()
    );
}
