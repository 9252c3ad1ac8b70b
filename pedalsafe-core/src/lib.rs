//! Route planning over a bike-lane network weighted by accident history.
//!
//! The crate builds an undirected graph from bike-lane geometries, snaps
//! query points onto it and finds the route with the fewest segments between
//! them. Accident counts never change the chosen route; they are surfaced
//! through [`styling`] so the rendering layer can color each segment by risk.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod styling;

pub use error::Error;
pub use loading::{NetworkConfig, build_graph, create_bike_network};
pub use model::{BikeNetwork, LaneGeometry, Segment};
pub use routing::{RoutePlan, RouteQuery, SnapResult, plan, plan_route};
pub use styling::{RiskBucket, StyleMode, StyledRoute, style};

/// Accident count attributed to a bike lane
pub type RiskWeight = u32;

/// Maximum haversine distance (km) between a query point and its snapped node
pub const MAX_SNAP_DISTANCE_KM: f64 = 1.5;

/// Earth radius (km) used for snap distance validation
pub const EARTH_RADIUS_KM: f64 = 6371.0;
