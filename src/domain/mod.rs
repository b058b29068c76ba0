pub mod cabling_report;
pub mod cross_connection;
pub mod designation;
pub mod diagnostics;
pub mod enclosure_resolver;
pub mod inventory;
pub mod port_mapping;
pub mod switches;
pub mod topology_parser;
