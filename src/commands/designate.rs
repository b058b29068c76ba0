//! `asbuilt designate node|switch`: one-shot designation lookups.

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use asbuilt_cabling::config::{Config, OutputFormat};
use asbuilt_cabling::domain::designation::DesignationGenerator;
use asbuilt_cabling::{Inventory, TracingDiagnostics};

use super::{is_json, print_json};

#[derive(Subcommand)]
pub enum DesignateCommands {
    /// Designation of a node port, e.g. CB1-CN1-R
    Node {
        /// Node data-network IP
        ip: String,
        /// Observed network label (A or B)
        network: String,
    },
    /// Designation of a switch port, e.g. SWA-P20
    Switch {
        /// Switch management IP
        ip: String,
        /// Switch port name (swp20, eth1/1, ...)
        port: String,
    },
}

#[derive(Serialize)]
struct DesignationOutput<'a> {
    designation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_type: Option<&'a str>,
}

pub fn run(
    cfg: &Config,
    inventory: Option<&Path>,
    format: OutputFormat,
    command: &DesignateCommands,
) -> Result<()> {
    let inventory = Inventory::load(&cfg.inventory_path(inventory)?)?;
    let namer = DesignationGenerator::new(&inventory, TracingDiagnostics::shared());

    let (designation, node_type) = match command {
        DesignateCommands::Node { ip, network } => {
            let node = namer.node_designation(ip, network);
            (node.designation, Some(node.node_type.node_label()))
        }
        DesignateCommands::Switch { ip, port } => (namer.switch_designation(ip, port), None),
    };

    if is_json(format) {
        return print_json(&DesignationOutput {
            designation: &designation,
            node_type,
        });
    }
    match node_type {
        Some(kind) => println!("{}  ({})", designation, kind),
        None => println!("{}", designation),
    }
    Ok(())
}
