pub mod check;
pub mod designate;
pub mod report;
pub mod topology;

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use asbuilt_cabling::config::OutputFormat;
use asbuilt_cabling::domain::topology_parser::{self, TopologyParse};

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn is_json(format: OutputFormat) -> bool {
    matches!(format, OutputFormat::Json)
}

/// Read the topology once, before any fan-out. No path means unavailable.
pub(crate) fn read_topology(path: Option<&Path>) -> TopologyParse {
    match path {
        Some(path) => topology_parser::parse_file(path),
        None => TopologyParse::Unavailable {
            error: "no topology given (pass --topology or set `topology` in config)".to_string(),
        },
    }
}
