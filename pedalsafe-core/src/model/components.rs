//! Bike lane graph components - nodes and edges

use geo::{Coord, Point};

use crate::RiskWeight;

/// Bike lane graph node, an endpoint of at least one lane segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneNode {
    /// Node coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
}

impl LaneNode {
    pub fn coord(&self) -> Coord<f64> {
        self.geometry.0
    }
}

/// Bike lane graph edge (single lane segment)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneEdge {
    /// Accidents attributed to the lane this segment was decoded from
    pub weight: RiskWeight,
}

impl LaneEdge {
    pub fn risk_weight(&self) -> RiskWeight {
        self.weight
    }
}
