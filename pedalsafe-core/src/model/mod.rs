//! Data model for the bike lane network
//!
//! Contains lane geometries, the segments decoded from them and the
//! undirected graph the router searches.

pub mod components;
pub mod geometry;
pub mod network;

pub use components::{LaneEdge, LaneNode};
pub use geometry::{LaneGeometry, Segment};
pub use network::{BikeNetwork, IndexedPoint, NetworkBuilder};
