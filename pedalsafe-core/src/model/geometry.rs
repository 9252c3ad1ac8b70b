//! Lane geometries and their decomposition into weighted segments

use geo::{Coord, CoordsIter, Geometry, Line, LineString, MultiLineString};
use itertools::Either;

use crate::{Error, RiskWeight};

/// Pair of adjacent lane coordinates carrying the lane's accident count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    pub weight: RiskWeight,
}

impl Segment {
    pub fn new(start: Coord<f64>, end: Coord<f64>, weight: RiskWeight) -> Self {
        Segment { start, end, weight }
    }

    pub fn line(&self) -> Line<f64> {
        Line::new(self.start, self.end)
    }
}

/// Geometry of a single bike lane record
#[derive(Debug, Clone, PartialEq)]
pub enum LaneGeometry {
    Line(LineString<f64>),
    MultiLine(MultiLineString<f64>),
}

impl LaneGeometry {
    /// Lazily decodes the geometry into one segment per consecutive
    /// coordinate pair.
    ///
    /// Each line of a multi-line geometry is decoded on its own, so the last
    /// coordinate of one line is never connected to the first of the next.
    /// Empty and single-point lines produce no segments.
    pub fn segments(&self, weight: RiskWeight) -> impl Iterator<Item = Segment> + '_ {
        match self {
            LaneGeometry::Line(line) => Either::Left(line_segments(line, weight)),
            LaneGeometry::MultiLine(lines) => Either::Right(
                lines
                    .iter()
                    .flat_map(move |line| line_segments(line, weight)),
            ),
        }
    }

    /// Constituent lines of the geometry
    pub fn lines(&self) -> impl Iterator<Item = &LineString<f64>> {
        match self {
            LaneGeometry::Line(line) => Either::Left(std::iter::once(line)),
            LaneGeometry::MultiLine(lines) => Either::Right(lines.iter()),
        }
    }

    pub fn is_finite(&self) -> bool {
        let finite = |c: Coord<f64>| c.x.is_finite() && c.y.is_finite();
        match self {
            LaneGeometry::Line(line) => line.coords_iter().all(finite),
            LaneGeometry::MultiLine(lines) => lines.coords_iter().all(finite),
        }
    }
}

fn line_segments(line: &LineString<f64>, weight: RiskWeight) -> impl Iterator<Item = Segment> + '_ {
    line.lines()
        .map(move |Line { start, end }| Segment::new(start, end, weight))
}

impl From<LineString<f64>> for LaneGeometry {
    fn from(line: LineString<f64>) -> Self {
        LaneGeometry::Line(line)
    }
}

impl From<MultiLineString<f64>> for LaneGeometry {
    fn from(lines: MultiLineString<f64>) -> Self {
        LaneGeometry::MultiLine(lines)
    }
}

impl TryFrom<Geometry<f64>> for LaneGeometry {
    type Error = Error;

    fn try_from(geometry: Geometry<f64>) -> Result<Self, Self::Error> {
        match geometry {
            Geometry::LineString(line) => Ok(LaneGeometry::Line(line)),
            Geometry::MultiLineString(lines) => Ok(LaneGeometry::MultiLine(lines)),
            other => Err(Error::InvalidData(format!(
                "unsupported lane geometry type: {}",
                geometry_type_name(&other)
            ))),
        }
    }
}

fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
