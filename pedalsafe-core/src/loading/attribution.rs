//! Attribution of accidents to the bike lanes they happened on
//!
//! Every accident is assigned to the closest lane whose geometry passes
//! within a planar buffer (in degrees) of the accident location. Accidents
//! with no lane inside the buffer are not counted.

use geo::{BoundingRect, Distance, Euclidean, Point};
use rayon::prelude::*;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use super::LaneRecord;
use crate::{LaneGeometry, RiskWeight};

type IndexedLane = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn build_lane_rtree(lanes: &[LaneRecord]) -> RTree<IndexedLane> {
    let envelopes = lanes
        .iter()
        .enumerate()
        .filter_map(|(idx, lane)| {
            let rect = match &lane.geometry {
                LaneGeometry::Line(line) => line.bounding_rect(),
                LaneGeometry::MultiLine(lines) => lines.bounding_rect(),
            }?;
            let (min, max) = (rect.min(), rect.max());
            Some(GeomWithData::new(
                Rectangle::from_corners([min.x, min.y], [max.x, max.y]),
                idx,
            ))
        })
        .collect();

    RTree::bulk_load(envelopes)
}

fn lane_distance(lane: &LaneRecord, point: &Point<f64>) -> f64 {
    lane.geometry
        .lines()
        .map(|line| Euclidean.distance(point, line))
        .fold(f64::INFINITY, f64::min)
}

/// Index of the lane nearest to `accident` within `buffer`; ties go to the
/// lane listed first
fn nearest_lane(
    rtree: &RTree<IndexedLane>,
    lanes: &[LaneRecord],
    accident: &Point<f64>,
    buffer: f64,
) -> Option<usize> {
    let envelope = AABB::from_corners(
        [accident.x() - buffer, accident.y() - buffer],
        [accident.x() + buffer, accident.y() + buffer],
    );

    rtree
        .locate_in_envelope_intersecting(&envelope)
        .map(|candidate| (candidate.data, lane_distance(&lanes[candidate.data], accident)))
        .filter(|&(_, distance)| distance <= buffer)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(idx, _)| idx)
}

/// Counts accidents per lane. The result is parallel to `lanes`.
pub fn count_accidents(
    lanes: &[LaneRecord],
    accidents: &[Point<f64>],
    buffer: f64,
) -> Vec<RiskWeight> {
    let rtree = build_lane_rtree(lanes);

    let assignments: Vec<Option<usize>> = accidents
        .par_iter()
        .map(|accident| nearest_lane(&rtree, lanes, accident, buffer))
        .collect();

    let mut counts = vec![0; lanes.len()];
    let mut unmatched = 0usize;
    for assignment in assignments {
        match assignment {
            Some(idx) => counts[idx] += 1,
            None => unmatched += 1,
        }
    }

    if unmatched > 0 {
        log::info!(
            "{unmatched} of {} accidents are farther than {buffer} degrees from any bike lane",
            accidents.len()
        );
    }

    counts
}

/// Overwrites every lane's accident count with counts derived from `accidents`
pub fn attribute_accidents(lanes: &mut [LaneRecord], accidents: &[Point<f64>], buffer: f64) {
    let counts = count_accidents(lanes, accidents, buffer);
    for (lane, count) in lanes.iter_mut().zip(counts) {
        lane.accident_count = Some(count);
    }
}
