//! Nearest-node snapping of query points

use geo::{Coord, Distance, HaversineMeasure, Point};
use petgraph::graph::NodeIndex;

use crate::{BikeNetwork, EARTH_RADIUS_KM, Error, MAX_SNAP_DISTANCE_KM};

/// Network node chosen for a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    pub node: NodeIndex,
    pub coord: Coord<f64>,
    /// Haversine distance between the query point and the node, in km
    pub distance_km: f64,
    /// `distance_km <= MAX_SNAP_DISTANCE_KM`
    pub valid: bool,
}

impl SnapResult {
    fn new(query: Coord<f64>, node: NodeIndex, coord: Coord<f64>) -> Self {
        let distance_km = haversine_km(query, coord);
        SnapResult {
            node,
            coord,
            distance_km,
            valid: distance_km <= MAX_SNAP_DISTANCE_KM,
        }
    }
}

pub(crate) fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    HaversineMeasure::new(EARTH_RADIUS_KM).distance(Point(a), Point(b))
}

fn planar_distance_2(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Snaps `query` to the node with the smallest planar distance.
///
/// Among equidistant nodes the one inserted first wins. Validity is judged
/// on haversine distance, independently of how the node was picked.
///
/// # Errors
///
/// Returns [`Error::NoPointsFound`] if the network has no nodes
pub fn snap(network: &BikeNetwork, query: Coord<f64>) -> Result<SnapResult, Error> {
    let node = network
        .rtree()
        .nearest_neighbors(&[query.x, query.y])
        .into_iter()
        .map(|point| point.data)
        .min()
        .ok_or(Error::NoPointsFound)?;
    let coord = network.coord(node).ok_or(Error::InvalidNodeIndex)?;

    Ok(SnapResult::new(query, node, coord))
}

/// Exhaustive O(V) variant of [`snap`] with identical results
///
/// # Errors
///
/// Returns [`Error::NoPointsFound`] if the network has no nodes
pub fn snap_linear(network: &BikeNetwork, query: Coord<f64>) -> Result<SnapResult, Error> {
    let (node, coord) = network
        .nodes()
        .min_by(|a, b| planar_distance_2(a.1, query).total_cmp(&planar_distance_2(b.1, query)))
        .ok_or(Error::NoPointsFound)?;

    Ok(SnapResult::new(query, node, coord))
}

#[cfg(test)]
mod tests {
    use geo::{Destination, coord};

    use super::*;
    use crate::LaneGeometry;
    use crate::loading::{DatasetRow, build_graph};

    fn network(lines: Vec<Vec<(f64, f64)>>) -> BikeNetwork {
        build_graph(lines.into_iter().map(|coords| DatasetRow {
            geometry: LaneGeometry::Line(coords.into()),
            risk_weight: 0,
        }))
        .unwrap()
    }

    fn grid() -> BikeNetwork {
        network(vec![
            vec![(144.95, -37.80), (144.96, -37.80), (144.97, -37.80)],
            vec![(144.95, -37.79), (144.96, -37.79), (144.97, -37.79)],
            vec![(144.96, -37.80), (144.96, -37.79)],
        ])
    }

    #[test]
    fn snaps_to_planar_minimizer() {
        let network = grid();
        let queries = [
            coord! { x: 144.951, y: -37.801 },
            coord! { x: 144.969, y: -37.7905 },
            coord! { x: 144.90, y: -37.70 },
            coord! { x: 145.5, y: -38.5 },
        ];

        for query in queries {
            let snapped = snap(&network, query).unwrap();
            let best = planar_distance_2(snapped.coord, query);
            assert!(
                network
                    .nodes()
                    .all(|(_, coord)| planar_distance_2(coord, query) >= best)
            );
            assert_eq!(snapped, snap_linear(&network, query).unwrap());
        }
    }

    #[test]
    fn ties_go_to_first_inserted_node() {
        let network = network(vec![
            vec![(1.0, 0.0), (-1.0, 0.0)],
            vec![(0.0, 1.0), (0.0, -1.0)],
        ]);
        let query = coord! { x: 0.0, y: 0.0 };

        let snapped = snap(&network, query).unwrap();
        assert_eq!(snapped.node, NodeIndex::new(0));
        assert_eq!(snapped.coord, coord! { x: 1.0, y: 0.0 });
        assert_eq!(snap_linear(&network, query).unwrap().node, NodeIndex::new(0));
    }

    #[test]
    fn distance_is_haversine_km() {
        let network = grid();
        let query = coord! { x: 144.955, y: -37.805 };
        let snapped = snap(&network, query).unwrap();

        let (lat1, lon1) = (query.y.to_radians(), query.x.to_radians());
        let (lat2, lon2) = (snapped.coord.y.to_radians(), snapped.coord.x.to_radians());
        let a = ((lat2 - lat1) / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
        let expected = 2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt());

        assert!((snapped.distance_km - expected).abs() < 1e-9);
        assert!(snapped.valid);
    }

    #[test]
    fn far_point_is_invalid_but_reports_distance() {
        let network = grid();
        let node = Point::new(144.95, -37.80);
        let start = node.0;
        // 5 km due south of the south-west corner node
        let query = HaversineMeasure::new(EARTH_RADIUS_KM).destination(node, 180.0, 5.0);

        let snapped = snap(&network, query.0).unwrap();
        assert_eq!(snapped.coord, start);
        assert!(!snapped.valid);
        assert!((snapped.distance_km - 5.0).abs() < 0.01);
    }

    #[test]
    fn validity_boundary_is_inclusive() {
        let network = grid();
        let node = Point::new(144.95, -37.80);
        let measure = HaversineMeasure::new(EARTH_RADIUS_KM);

        let inside = measure.destination(node, 225.0, MAX_SNAP_DISTANCE_KM - 1e-6);
        let outside = measure.destination(node, 225.0, MAX_SNAP_DISTANCE_KM + 1e-6);

        assert!(snap(&network, inside.0).unwrap().valid);
        assert!(!snap(&network, outside.0).unwrap().valid);
    }
}
