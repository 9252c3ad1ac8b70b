//! Route planning between two query points

use std::fmt;

use geo::{Coord, Intersects, Line, Rect, coord};
use petgraph::graph::NodeIndex;

use super::search::{PathSearch, shortest_hop_path};
use super::snap::{SnapResult, snap};
use crate::styling::{StyleMode, StyledRoute, style};
use crate::{BikeNetwork, Error, RiskWeight, Segment};

/// Default start point when a request omits it (Carlton North)
pub const DEFAULT_START: Coord<f64> = coord! { x: 144.96, y: -37.768 };
/// Default destination when a request omits it (Docklands)
pub const DEFAULT_DESTINATION: Coord<f64> = coord! { x: 144.9512, y: -37.796 };

/// Validated pair of query coordinates (x = longitude, y = latitude)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub start: Coord<f64>,
    pub destination: Coord<f64>,
}

impl RouteQuery {
    /// # Errors
    ///
    /// Returns [`Error::MalformedQuery`] if a coordinate is not finite or lies
    /// outside the longitude/latitude ranges
    pub fn new(start: Coord<f64>, destination: Coord<f64>) -> Result<Self, Error> {
        validate_coord(Endpoint::Start, start)?;
        validate_coord(Endpoint::Destination, destination)?;
        Ok(RouteQuery { start, destination })
    }

    /// Axis-aligned rectangle spanned by the two query points
    pub fn bounds(&self) -> Rect<f64> {
        Rect::new(self.start, self.destination)
    }

    pub fn point(&self, endpoint: Endpoint) -> Coord<f64> {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::Destination => self.destination,
        }
    }
}

impl Default for RouteQuery {
    fn default() -> Self {
        RouteQuery {
            start: DEFAULT_START,
            destination: DEFAULT_DESTINATION,
        }
    }
}

fn validate_coord(endpoint: Endpoint, coord: Coord<f64>) -> Result<(), Error> {
    if !coord.x.is_finite() || !coord.y.is_finite() {
        return Err(Error::MalformedQuery(format!(
            "{endpoint} coordinates must be finite numbers"
        )));
    }
    if !(-180.0..=180.0).contains(&coord.x) || !(-90.0..=90.0).contains(&coord.y) {
        return Err(Error::MalformedQuery(format!(
            "{endpoint} coordinates ({}, {}) are outside longitude/latitude range",
            coord.x, coord.y
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Endpoint too far from every bike lane node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfRange {
    pub endpoint: Endpoint,
    pub distance_km: f64,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.endpoint {
            Endpoint::Start => "Start",
            Endpoint::Destination => "Destination",
        };
        write!(
            f,
            "{name} point is out of range of bike lanes ({:.2} km away).",
            self.distance_km
        )
    }
}

/// Path through the network, `weights[i]` belonging to the edge between
/// `coords[i]` and `coords[i + 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub coords: Vec<Coord<f64>>,
    pub weights: Vec<RiskWeight>,
}

impl RoutePath {
    pub fn hop_count(&self) -> usize {
        self.weights.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.coords
            .windows(2)
            .zip(&self.weights)
            .map(|(pair, &weight)| Segment::new(pair[0], pair[1], weight))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Both endpoints snapped and connected
    Found(RoutePath),
    /// Both endpoints snapped but lie in disconnected parts of the network;
    /// carries the edges lying entirely within the query bounds
    Fallback {
        bounds: Rect<f64>,
        edges: Vec<Segment>,
    },
    /// At least one endpoint is too far from the network, start listed first
    OutOfRange(Vec<OutOfRange>),
}

/// Dashed link from a raw query point to its snapped node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub endpoint: Endpoint,
    pub line: Line<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub query: RouteQuery,
    pub start: SnapResult,
    pub destination: SnapResult,
    pub outcome: RouteOutcome,
    pub connectors: Vec<Connector>,
}

impl RoutePlan {
    pub fn snap_result(&self, endpoint: Endpoint) -> &SnapResult {
        match endpoint {
            Endpoint::Start => &self.start,
            Endpoint::Destination => &self.destination,
        }
    }
}

/// Plans a route between the two query points.
///
/// Snaps both points; if both are within range, searches for the path with
/// the fewest segments and falls back to the network inside the query bounds
/// when the snapped nodes are disconnected. Connectors are produced for every
/// endpoint that snapped within range, whatever the outcome.
///
/// # Errors
///
/// Fails only if the network cannot be snapped onto, which a built
/// [`BikeNetwork`] rules out
pub fn plan(network: &BikeNetwork, query: &RouteQuery) -> Result<RoutePlan, Error> {
    let start = snap(network, query.start)?;
    let destination = snap(network, query.destination)?;

    let endpoints = [
        (Endpoint::Start, &start),
        (Endpoint::Destination, &destination),
    ];

    let out_of_range: Vec<OutOfRange> = endpoints
        .into_iter()
        .filter(|(_, snapped)| !snapped.valid)
        .map(|(endpoint, snapped)| OutOfRange {
            endpoint,
            distance_km: snapped.distance_km,
        })
        .collect();

    let outcome = if out_of_range.is_empty() {
        match shortest_hop_path(network, start.node, destination.node) {
            PathSearch::Found(nodes) => RouteOutcome::Found(route_path(network, &nodes)?),
            PathSearch::NotFound => {
                let bounds = query.bounds();
                let edges: Vec<Segment> = network
                    .edges()
                    .filter(|edge| bounds.intersects(&edge.start) && bounds.intersects(&edge.end))
                    .collect();
                log::debug!(
                    "No path found between the start and end points, showing {} lane segments in query bounds",
                    edges.len()
                );
                RouteOutcome::Fallback { bounds, edges }
            }
        }
    } else {
        for condition in &out_of_range {
            log::warn!("{condition}");
        }
        RouteOutcome::OutOfRange(out_of_range)
    };

    let connectors = endpoints
        .into_iter()
        .filter(|(_, snapped)| snapped.valid)
        .map(|(endpoint, snapped)| Connector {
            endpoint,
            line: Line::new(query.point(endpoint), snapped.coord),
        })
        .collect();

    Ok(RoutePlan {
        query: *query,
        start,
        destination,
        outcome,
        connectors,
    })
}

fn route_path(network: &BikeNetwork, nodes: &[NodeIndex]) -> Result<RoutePath, Error> {
    let coords = nodes
        .iter()
        .map(|&node| network.coord(node).ok_or(Error::InvalidNodeIndex))
        .collect::<Result<Vec<_>, _>>()?;
    let weights = nodes
        .windows(2)
        .map(|pair| network.edge_weight(pair[0], pair[1]).ok_or(Error::InvalidNodeIndex))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RoutePath { coords, weights })
}

/// Validates the query, plans the route and styles it for rendering
///
/// # Errors
///
/// Returns [`Error::MalformedQuery`] for invalid coordinates
pub fn plan_route(
    network: &BikeNetwork,
    start: Coord<f64>,
    destination: Coord<f64>,
    mode: StyleMode,
) -> Result<StyledRoute, Error> {
    let query = RouteQuery::new(start, destination)?;
    Ok(style(plan(network, &query)?, mode))
}

#[cfg(test)]
mod tests {
    use geo::{Destination, HaversineMeasure, Point};

    use super::*;
    use crate::loading::{DatasetRow, build_graph};
    use crate::{EARTH_RADIUS_KM, LaneGeometry};

    fn network(lines: Vec<(Vec<(f64, f64)>, RiskWeight)>) -> BikeNetwork {
        build_graph(lines.into_iter().map(|(coords, risk_weight)| DatasetRow {
            geometry: LaneGeometry::Line(coords.into()),
            risk_weight,
        }))
        .unwrap()
    }

    /// Two triangles roughly 2 km apart along the same latitude
    fn two_triangles() -> BikeNetwork {
        network(vec![
            (
                vec![
                    (144.950, -37.800),
                    (144.952, -37.800),
                    (144.951, -37.799),
                    (144.950, -37.800),
                ],
                2,
            ),
            (
                vec![
                    (144.975, -37.800),
                    (144.977, -37.800),
                    (144.976, -37.799),
                    (144.975, -37.800),
                ],
                7,
            ),
        ])
    }

    #[test]
    fn finds_path_with_weights() {
        let network = network(vec![
            (vec![(144.950, -37.800), (144.955, -37.800)], 0),
            (vec![(144.955, -37.800), (144.960, -37.800)], 6),
        ]);
        let query = RouteQuery::new(
            coord! { x: 144.9501, y: -37.8001 },
            coord! { x: 144.9599, y: -37.7999 },
        )
        .unwrap();

        let plan = plan(&network, &query).unwrap();

        let RouteOutcome::Found(path) = &plan.outcome else {
            panic!("expected a route, got {:?}", plan.outcome);
        };
        assert_eq!(
            path.coords,
            vec![
                coord! { x: 144.950, y: -37.800 },
                coord! { x: 144.955, y: -37.800 },
                coord! { x: 144.960, y: -37.800 },
            ]
        );
        assert_eq!(path.weights, vec![0, 6]);
        assert_eq!(plan.connectors.len(), 2);
        assert_eq!(plan.connectors[0].line.start, query.start);
        assert_eq!(plan.connectors[0].line.end, path.coords[0]);
    }

    #[test]
    fn one_hop_beats_low_risk_detour() {
        let network = network(vec![
            (
                vec![(144.950, -37.800), (144.951, -37.801), (144.952, -37.800)],
                0,
            ),
            (vec![(144.950, -37.800), (144.952, -37.800)], 25),
        ]);
        let query = RouteQuery::new(
            coord! { x: 144.950, y: -37.800 },
            coord! { x: 144.952, y: -37.800 },
        )
        .unwrap();

        let RouteOutcome::Found(path) = plan(&network, &query).unwrap().outcome else {
            panic!("expected a route");
        };
        assert_eq!(path.hop_count(), 1);
        assert_eq!(path.weights, vec![25]);
    }

    #[test]
    fn disconnected_components_fall_back_to_bounds() {
        let network = two_triangles();
        let query = RouteQuery::new(
            coord! { x: 144.9495, y: -37.8005 },
            coord! { x: 144.9775, y: -37.7989 },
        )
        .unwrap();

        let plan = plan(&network, &query).unwrap();

        assert!(plan.start.valid && plan.destination.valid);
        let RouteOutcome::Fallback { bounds, edges } = &plan.outcome else {
            panic!("expected fallback, got {:?}", plan.outcome);
        };
        assert_eq!(*bounds, query.bounds());
        // every triangle edge lies within the query rectangle
        assert_eq!(edges.len(), 6);
        assert_eq!(plan.connectors.len(), 2);
    }

    #[test]
    fn fallback_bounds_are_inclusive_and_exclude_partial_edges() {
        let network = network(vec![
            // inside, touching the corner exactly
            (vec![(0.0, 0.0), (0.5, 0.5)], 1),
            // crosses the border
            (vec![(0.5, 0.5), (2.0, 0.5)], 1),
            // separate component, on the far corner
            (vec![(1.0, 1.0), (0.9, 0.9)], 1),
            // entirely outside
            (vec![(3.0, 3.0), (4.0, 4.0)], 1),
        ]);
        let query = RouteQuery::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).unwrap();

        let plan = plan(&network, &query).unwrap();
        let RouteOutcome::Fallback { edges, .. } = plan.outcome else {
            panic!("expected fallback");
        };

        assert_eq!(
            edges,
            vec![
                Segment::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.5, y: 0.5 }, 1),
                Segment::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 0.9, y: 0.9 }, 1),
            ]
        );
    }

    #[test]
    fn far_start_is_reported_and_skips_search() {
        let network = two_triangles();
        let start = HaversineMeasure::new(EARTH_RADIUS_KM)
            .destination(Point::new(144.950, -37.800), 180.0, 5.0)
            .0;
        let query = RouteQuery::new(start, coord! { x: 144.9511, y: -37.7995 }).unwrap();

        let plan = plan(&network, &query).unwrap();

        let RouteOutcome::OutOfRange(conditions) = &plan.outcome else {
            panic!("expected out of range, got {:?}", plan.outcome);
        };
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].endpoint, Endpoint::Start);
        assert!((conditions[0].distance_km - 5.0).abs() < 0.01);
        assert_eq!(
            conditions[0].to_string(),
            "Start point is out of range of bike lanes (5.00 km away)."
        );

        // the valid destination still gets its connector
        assert_eq!(plan.connectors.len(), 1);
        assert_eq!(plan.connectors[0].endpoint, Endpoint::Destination);

        assert!(!plan.snap_result(Endpoint::Start).valid);
        assert!(plan.snap_result(Endpoint::Destination).valid);
        assert_eq!(
            plan.snap_result(Endpoint::Destination).coord,
            coord! { x: 144.951, y: -37.799 }
        );
    }

    #[test]
    fn both_endpoints_out_of_range() {
        let network = two_triangles();
        let query =
            RouteQuery::new(coord! { x: 145.5, y: -37.0 }, coord! { x: 143.0, y: -38.0 }).unwrap();

        let plan = plan(&network, &query).unwrap();

        let RouteOutcome::OutOfRange(conditions) = &plan.outcome else {
            panic!("expected out of range");
        };
        let endpoints: Vec<_> = conditions.iter().map(|c| c.endpoint).collect();
        assert_eq!(endpoints, vec![Endpoint::Start, Endpoint::Destination]);
        assert!(plan.connectors.is_empty());
    }

    #[test]
    fn rejects_malformed_coordinates() {
        let bad = [
            coord! { x: f64::NAN, y: -37.8 },
            coord! { x: 144.9, y: f64::INFINITY },
            coord! { x: 200.0, y: -37.8 },
            coord! { x: 144.9, y: -95.0 },
        ];
        for coord in bad {
            assert!(matches!(
                RouteQuery::new(coord, DEFAULT_DESTINATION),
                Err(Error::MalformedQuery(_))
            ));
        }
        assert!(matches!(
            RouteQuery::new(DEFAULT_START, coord! { x: f64::NAN, y: 0.0 }),
            Err(Error::MalformedQuery(msg)) if msg.starts_with("destination")
        ));
    }

    #[test]
    fn planning_is_deterministic_across_builds() {
        let query = RouteQuery::new(
            coord! { x: 144.9495, y: -37.8005 },
            coord! { x: 144.9775, y: -37.7989 },
        )
        .unwrap();

        let first = plan(&two_triangles(), &query).unwrap();
        let second = plan(&two_triangles(), &query).unwrap();
        assert_eq!(first, second);
    }
}
