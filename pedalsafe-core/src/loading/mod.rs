//! This module is responsible for loading bike lane and accident records
//! and building the routing network from them.

pub mod attribution;
mod builder;
mod config;
pub mod records;

pub use attribution::attribute_accidents;
pub use builder::{DatasetRow, build_graph, create_bike_network};
pub use config::{DEFAULT_ACCIDENT_BUFFER, NetworkConfig};
pub use records::LaneRecord;
