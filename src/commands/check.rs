//! `asbuilt check`: cross-connection gate for scripts.
//!
//! Exit status: 0 clean, 1 cross-connections found, 2 topology unavailable.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use asbuilt_cabling::config::Config;
use asbuilt_cabling::domain::cabling_report::CablingReport;
use asbuilt_cabling::Inventory;

use super::read_topology;

pub fn run(cfg: &Config, inventory: Option<&Path>, topology: Option<&Path>) -> Result<()> {
    let inventory = Inventory::load(&cfg.inventory_path(inventory)?)?;
    let topology = read_topology(cfg.topology_path(topology).as_deref());
    let report = CablingReport::build(&inventory, &topology);

    println!("{}", "asbuilt check".bold());
    if let Some(ref err) = report.topology_error {
        println!("  topology: {}", "unavailable".red());
        println!("  reason:   {}", err);
        std::process::exit(2);
    }

    println!("  connections: {}", report.port_mappings.len());
    let count = report.cross_connection_count();
    if count == 0 {
        println!("  cabling:     {}", "ok".green());
        println!("  {}", report.cross_connection_summary);
        std::process::exit(0);
    } else {
        println!("  cabling:     {}", format!("{} cross-connection(s)", count).red());
        for line in report.cross_connection_summary.lines() {
            println!("  {} {}", "!!".red().bold(), line);
        }
        std::process::exit(1);
    }
}
