//! Snapping, path search and route planning over the bike lane network

mod planner;
mod search;
mod snap;

pub use planner::{
    Connector, DEFAULT_DESTINATION, DEFAULT_START, Endpoint, OutOfRange, RouteOutcome, RoutePath,
    RoutePlan, RouteQuery, plan, plan_route,
};
pub use search::{PathSearch, shortest_hop_path};
pub use snap::{SnapResult, snap, snap_linear};
