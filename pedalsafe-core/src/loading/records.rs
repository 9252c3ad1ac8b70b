//! CSV readers for bike lane and accident records

use std::{fs::File, io::Read, path::Path};

use geo::{Geometry, Point};
use serde::Deserialize;
use wkt::TryFromWkt;

use crate::{Error, LaneGeometry, RiskWeight};

/// Bike lane as stored in the source dataset
#[derive(Debug, Clone, PartialEq)]
pub struct LaneRecord {
    pub lane_number: String,
    pub geometry: LaneGeometry,
    /// Precomputed accident count, if the dataset carries one
    pub accident_count: Option<RiskWeight>,
}

#[derive(Debug, Deserialize)]
struct RawLane {
    lane_number: String,
    geometry: String,
    #[serde(default)]
    count: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAccident {
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
}

/// Reads bike lanes from CSV
///
/// # Errors
///
/// Returns an error on malformed CSV, WKT that is not a (multi)line string
/// or counts that are not non-negative integers
pub fn read_lanes<R: Read>(reader: R) -> Result<Vec<LaneRecord>, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut lanes = Vec::new();

    for (row, result) in csv_reader.deserialize::<RawLane>().enumerate() {
        let raw = result?;
        let context = || format!("lane {} (row {})", raw.lane_number, row + 1);

        let geometry = Geometry::<f64>::try_from_wkt_str(&raw.geometry)
            .map_err(|e| Error::InvalidData(format!("{}: invalid WKT: {e}", context())))
            .and_then(|geometry| {
                LaneGeometry::try_from(geometry).map_err(|e| match e {
                    Error::InvalidData(msg) => Error::InvalidData(format!("{}: {msg}", context())),
                    other => other,
                })
            })?;

        let accident_count = raw
            .count
            .map(|count| {
                parse_count(count).ok_or_else(|| {
                    Error::InvalidData(format!("{}: invalid accident count {count}", context()))
                })
            })
            .transpose()?;

        lanes.push(LaneRecord {
            lane_number: raw.lane_number,
            geometry,
            accident_count,
        });
    }

    log::debug!("Read {} bike lanes", lanes.len());
    Ok(lanes)
}

pub fn read_lanes_file(path: &Path) -> Result<Vec<LaneRecord>, Error> {
    read_lanes(File::open(path)?)
}

/// Reads accident locations from CSV, skipping rows without coordinates
///
/// # Errors
///
/// Returns an error on malformed CSV or non-finite coordinates
pub fn read_accidents<R: Read>(reader: R) -> Result<Vec<Point<f64>>, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut accidents = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in csv_reader.deserialize::<RawAccident>().enumerate() {
        let raw = result?;
        let (Some(lon), Some(lat)) = (raw.longitude, raw.latitude) else {
            skipped += 1;
            continue;
        };
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::InvalidData(format!(
                "accident row {}: non-finite coordinates",
                row + 1
            )));
        }
        accidents.push(Point::new(lon, lat));
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} accidents without coordinates");
    }
    log::debug!("Read {} accidents", accidents.len());
    Ok(accidents)
}

pub fn read_accidents_file(path: &Path) -> Result<Vec<Point<f64>>, Error> {
    read_accidents(File::open(path)?)
}

// Counts may be exported as floats ("3.0") by the upstream pipeline.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(count: f64) -> Option<RiskWeight> {
    if count.is_finite()
        && count >= 0.0
        && count.fract() == 0.0
        && count <= f64::from(RiskWeight::MAX)
    {
        Some(count as RiskWeight)
    } else {
        None
    }
}
