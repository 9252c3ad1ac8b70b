//! Conversion of route plans into styled, render-ready segments
//!
//! Styling only assigns colors, stroke widths and dash patterns.
//! [`StyledRoute::to_geojson`] turns the result into a figure a web map can
//! draw.

mod to_geojson;

use geo::{Coord, Line, coord};
use serde::{Deserialize, Serialize};

use crate::RiskWeight;
use crate::routing::{Endpoint, RouteOutcome, RoutePlan};

/// Color of a route drawn in [`StyleMode::Uniform`]
pub const ROUTE_COLOR: &str = "#1f77b4";
pub const CONNECTOR_COLOR: &str = "black";
pub const CONNECTOR_DASH: &str = "5,5";

const ROUTE_STROKE: u8 = 10;
const RISK_FALLBACK_STROKE: u8 = 5;
const CONNECTOR_STROKE: u8 = 5;
const MARKER_RADIUS: u8 = 2;
const MARKER_STROKE: u8 = 5;

/// Map center (lon, lat) shown unless the route needs a closer look
pub const DEFAULT_CENTER: Coord<f64> = coord! { x: 144.951780451295, y: -37.790231531464 };
pub const DEFAULT_ZOOM: u8 = 14;
pub const FALLBACK_ZOOM: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleMode {
    /// Route in a single color
    #[default]
    Uniform,
    /// Every segment colored by its accident count
    Risk,
}

/// Accident risk class of a segment, ordered from safest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBucket {
    Lowest,
    Low,
    Medium,
    Highest,
}

impl RiskBucket {
    pub fn from_weight(weight: RiskWeight) -> Self {
        match weight {
            0 => RiskBucket::Lowest,
            1..=4 => RiskBucket::Low,
            5..=9 => RiskBucket::Medium,
            10.. => RiskBucket::Highest,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskBucket::Lowest => "green",
            RiskBucket::Low => "yellow",
            RiskBucket::Medium => "orange",
            RiskBucket::Highest => "red",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskBucket::Lowest => "lowest",
            RiskBucket::Low => "low",
            RiskBucket::Medium => "medium",
            RiskBucket::Highest => "highest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Part of a found route
    Route,
    /// Lane shown in fallback mode
    Neighborhood,
    /// Link from a query point to the network
    Connector,
}

impl SegmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Route => "route",
            SegmentKind::Neighborhood => "neighborhood",
            SegmentKind::Connector => "connector",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledSegment {
    pub kind: SegmentKind,
    pub line: Line<f64>,
    pub color: &'static str,
    pub stroke_width: u8,
    pub dash_array: Option<&'static str>,
    /// Accident count of the underlying lane; connectors have none
    pub risk_weight: Option<RiskWeight>,
}

impl StyledSegment {
    fn lane(
        kind: SegmentKind,
        line: Line<f64>,
        weight: RiskWeight,
        color: &'static str,
        stroke_width: u8,
    ) -> Self {
        StyledSegment {
            kind,
            line,
            color,
            stroke_width,
            dash_array: None,
            risk_weight: Some(weight),
        }
    }

    pub fn risk_bucket(&self) -> Option<RiskBucket> {
        self.risk_weight.map(RiskBucket::from_weight)
    }
}

/// Circle marking a raw query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub endpoint: Endpoint,
    pub location: Coord<f64>,
    pub color: &'static str,
    pub radius: u8,
    pub stroke_width: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// x = longitude, y = latitude
    pub center: Coord<f64>,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Route plan together with everything needed to draw it
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRoute {
    pub plan: RoutePlan,
    pub mode: StyleMode,
    /// Lane segments first, connectors last
    pub segments: Vec<StyledSegment>,
    /// Start marker, then destination marker
    pub markers: [Marker; 2],
    pub viewport: Viewport,
}

/// Styles a plan for rendering
pub fn style(plan: RoutePlan, mode: StyleMode) -> StyledRoute {
    let mut segments = Vec::new();
    let mut viewport = Viewport::default();

    match &plan.outcome {
        RouteOutcome::Found(path) => {
            segments.extend(path.segments().map(|segment| {
                let color = match mode {
                    StyleMode::Uniform => ROUTE_COLOR,
                    StyleMode::Risk => RiskBucket::from_weight(segment.weight).color(),
                };
                StyledSegment::lane(
                    SegmentKind::Route,
                    segment.line(),
                    segment.weight,
                    color,
                    ROUTE_STROKE,
                )
            }));
        }
        RouteOutcome::Fallback { bounds, edges } => {
            let stroke_width = match mode {
                StyleMode::Uniform => ROUTE_STROKE,
                StyleMode::Risk => RISK_FALLBACK_STROKE,
            };
            segments.extend(edges.iter().map(|edge| {
                StyledSegment::lane(
                    SegmentKind::Neighborhood,
                    edge.line(),
                    edge.weight,
                    RiskBucket::from_weight(edge.weight).color(),
                    stroke_width,
                )
            }));
            viewport = Viewport {
                center: bounds.center(),
                zoom: FALLBACK_ZOOM,
            };
        }
        RouteOutcome::OutOfRange(_) => {}
    }

    segments.extend(plan.connectors.iter().map(|connector| StyledSegment {
        kind: SegmentKind::Connector,
        line: connector.line,
        color: CONNECTOR_COLOR,
        stroke_width: CONNECTOR_STROKE,
        dash_array: Some(CONNECTOR_DASH),
        risk_weight: None,
    }));

    let marker = |endpoint: Endpoint, color: &'static str| Marker {
        endpoint,
        location: plan.query.point(endpoint),
        color,
        radius: MARKER_RADIUS,
        stroke_width: MARKER_STROKE,
    };
    let markers = [
        marker(Endpoint::Start, "green"),
        marker(Endpoint::Destination, "red"),
    ];

    StyledRoute {
        plan,
        mode,
        segments,
        markers,
        viewport,
    }
}
