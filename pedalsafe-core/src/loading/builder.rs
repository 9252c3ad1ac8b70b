use log::info;

use super::attribution::attribute_accidents;
use super::config::NetworkConfig;
use super::records::{LaneRecord, read_accidents_file, read_lanes_file};
use crate::model::NetworkBuilder;
use crate::{BikeNetwork, Error, LaneGeometry, RiskWeight};

/// Decoded bike lane ready to be folded into the network
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub geometry: LaneGeometry,
    pub risk_weight: RiskWeight,
}

impl From<LaneRecord> for DatasetRow {
    fn from(lane: LaneRecord) -> Self {
        DatasetRow {
            geometry: lane.geometry,
            risk_weight: lane.accident_count.unwrap_or(0),
        }
    }
}

/// Builds the bike lane network from decoded dataset rows
///
/// Rows are folded in input order. When several segments join the same two
/// coordinates, the edge keeps the weight of the last one.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] if a row has non-finite coordinates and
/// [`Error::EmptyDataset`] if the rows contain no segments
pub fn build_graph<I>(rows: I) -> Result<BikeNetwork, Error>
where
    I: IntoIterator<Item = DatasetRow>,
{
    let mut builder = NetworkBuilder::new();
    let mut lane_count = 0usize;

    for row in rows {
        lane_count += 1;
        if !row.geometry.is_finite() {
            return Err(Error::InvalidData(format!(
                "lane {lane_count} has non-finite coordinates"
            )));
        }
        builder.extend(row.geometry.segments(row.risk_weight));
    }

    let network = builder.build()?;
    info!(
        "Built bike lane network from {lane_count} lanes: {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Loads bike lanes (and optionally accidents) and builds the network
///
/// # Errors
///
/// Returns an error if input files are missing or malformed, or if they
/// contain no bike lane segments
pub fn create_bike_network(config: &NetworkConfig) -> Result<BikeNetwork, Error> {
    validate_config(config)?;

    info!("Reading bike lanes: {}", config.lanes_path.display());
    let mut lanes = read_lanes_file(&config.lanes_path)?;

    if let Some(accidents_path) = &config.accidents_path {
        info!("Reading accidents: {}", accidents_path.display());
        let accidents = read_accidents_file(accidents_path)?;
        attribute_accidents(&mut lanes, &accidents, config.accident_buffer);
        info!(
            "Attributed {} accidents to {} bike lanes",
            accidents.len(),
            lanes.len()
        );
    } else if lanes.iter().all(|lane| lane.accident_count.is_none()) {
        log::warn!("Bike lane dataset carries no accident counts - all risk weights are 0");
    }

    build_graph(lanes.into_iter().map(DatasetRow::from))
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    if !config.lanes_path.exists() {
        return Err(Error::InvalidData(format!(
            "Bike lanes file not found: {}",
            config.lanes_path.display()
        )));
    }

    if let Some(path) = &config.accidents_path
        && !path.exists()
    {
        return Err(Error::InvalidData(format!(
            "Accidents file not found: {}",
            path.display()
        )));
    }

    if !config.accident_buffer.is_finite() || config.accident_buffer < 0.0 {
        return Err(Error::InvalidData(format!(
            "Accident buffer must be a non-negative distance, got {}",
            config.accident_buffer
        )));
    }

    Ok(())
}
