use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::json;

use super::{Marker, StyledRoute, StyledSegment};
use crate::Error;
use crate::routing::{Endpoint, RouteOutcome};

impl StyledRoute {
    /// Converts the styled route to a `GeoJSON` `FeatureCollection`.
    ///
    /// Lane segments and connectors become `LineString` features carrying
    /// their style as properties, markers become `Point` features. The
    /// viewport and the planning status travel as foreign members.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.segments.len() + self.markers.len());

        for segment in &self.segments {
            features.push(create_segment_feature(segment)?);
        }
        for marker in &self.markers {
            features.push(create_marker_feature(marker)?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: Some(self.foreign_members()),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    fn foreign_members(&self) -> JsonObject {
        let (status, messages) = match &self.plan.outcome {
            RouteOutcome::Found(_) => ("found", Vec::new()),
            RouteOutcome::Fallback { .. } => (
                "fallback",
                vec!["No path found between the start and end points.".to_string()],
            ),
            RouteOutcome::OutOfRange(conditions) => (
                "out_of_range",
                conditions.iter().map(ToString::to_string).collect(),
            ),
        };

        let mut members = JsonObject::new();
        members.insert("status".to_string(), json!(status));
        members.insert("messages".to_string(), json!(messages));
        members.insert("style_mode".to_string(), json!(self.mode));
        members.insert(
            "viewport".to_string(),
            json!({
                "center": [self.viewport.center.x, self.viewport.center.y],
                "zoom": self.viewport.zoom,
            }),
        );
        let mut snaps = JsonObject::new();
        for endpoint in [Endpoint::Start, Endpoint::Destination] {
            let snapped = self.plan.snap_result(endpoint);
            snaps.insert(
                endpoint.to_string(),
                json!({
                    "node": [snapped.coord.x, snapped.coord.y],
                    "distance_km": snapped.distance_km,
                    "valid": snapped.valid,
                }),
            );
        }
        members.insert("snaps".to_string(), snaps.into());
        members
    }
}

fn create_segment_feature(segment: &StyledSegment) -> Result<Feature, Error> {
    let line = LineString::new(vec![segment.line.start, segment.line.end]);
    let geometry = Geometry::new(GeoJsonValue::from(&line));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "kind": segment.kind.as_str(),
            "color": segment.color,
            "weight": segment.stroke_width,
            "dash_array": segment.dash_array,
            "risk_weight": segment.risk_weight,
            "risk_bucket": segment.risk_bucket().map(|bucket| bucket.as_str()),
        }
    });

    serde_json::from_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_marker_feature(marker: &Marker) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&Point(marker.location)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "kind": "marker",
            "endpoint": marker.endpoint.to_string(),
            "color": marker.color,
            "radius": marker.radius,
            "weight": marker.stroke_width,
        }
    });

    serde_json::from_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
