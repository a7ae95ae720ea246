use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ParseError;
use crate::gpx_types::{GpxData, GpxPoint};
use crate::parser::parse_gpx;

/// Name given to a route whose first track carries none.
pub const DEFAULT_ROUTE_NAME: &str = "GPX Route";

/// Label given to a waypoint without a `<name>`.
pub const DEFAULT_WAYPOINT_NAME: &str = "Waypoint";

/// A recorded position on the track, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            timestamp: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl From<&GpxPoint> for TrackPoint {
    fn from(pt: &GpxPoint) -> Self {
        Self {
            latitude: pt.lat,
            longitude: pt.lon,
            elevation: pt.ele,
            timestamp: pt.time,
        }
    }
}

/// A standalone point of interest (`<wpt>`), independent of the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub description: String,
    pub elevation: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&GpxPoint> for Waypoint {
    fn from(pt: &GpxPoint) -> Self {
        Self {
            latitude: pt.lat,
            longitude: pt.lon,
            name: non_empty(pt.name.as_deref()).unwrap_or(DEFAULT_WAYPOINT_NAME).to_string(),
            description: non_empty(pt.desc.as_deref()).unwrap_or_default().to_string(),
            elevation: pt.ele,
            timestamp: pt.time,
        }
    }
}

/// The typed result of parsing a track log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDocument {
    pub name: String,
    pub points: Vec<TrackPoint>,
    pub waypoints: Vec<Waypoint>,
}

impl From<&GpxData> for RouteDocument {
    /// Keeps the first track and, within it, the first segment.
    fn from(data: &GpxData) -> Self {
        if data.tracks.len() > 1 {
            tracing::warn!(tracks = data.tracks.len(), "ignoring tracks after the first");
        }
        let track = data.tracks.first();

        if let Some(segments) = track.map(|t| t.segments.len()).filter(|&n| n > 1) {
            tracing::warn!(segments, "ignoring segments after the first");
        }
        let points = track
            .and_then(|t| t.segments.first())
            .map(|seg| seg.points.iter().map(TrackPoint::from).collect())
            .unwrap_or_default();

        let name = track
            .and_then(|t| non_empty(t.name.as_deref()))
            .unwrap_or(DEFAULT_ROUTE_NAME)
            .to_string();

        Self {
            name,
            points,
            waypoints: data.waypoints.iter().map(Waypoint::from).collect(),
        }
    }
}

/// Parse GPX text into a [`RouteDocument`].
pub fn parse(raw: &str) -> Result<RouteDocument, ParseError> {
    let data = parse_gpx(raw)?;
    let document = RouteDocument::from(&data);
    tracing::debug!(
        name = %document.name,
        points = document.points.len(),
        waypoints = document.waypoints.len(),
        "built route document"
    );
    Ok(document)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_track_and_segment_only() {
        let xml = r#"<gpx>
  <trk>
    <name>Half Marathon</name>
    <trkseg>
      <trkpt lat="1" lon="1"/>
      <trkpt lat="2" lon="2"/>
    </trkseg>
    <trkseg>
      <trkpt lat="3" lon="3"/>
    </trkseg>
  </trk>
  <trk>
    <name>Cool down</name>
    <trkseg><trkpt lat="4" lon="4"/></trkseg>
  </trk>
</gpx>"#;
        let doc = parse(xml).unwrap();
        assert_eq!(doc.name, "Half Marathon");
        assert_eq!(
            doc.points,
            vec![TrackPoint::new(1.0, 1.0), TrackPoint::new(2.0, 2.0)]
        );
    }

    #[test]
    fn test_empty_first_segment_yields_no_points() {
        let xml = r#"<gpx><trk><trkseg/><trkseg><trkpt lat="3" lon="3"/></trkseg></trk></gpx>"#;
        let doc = parse(xml).unwrap();
        assert!(doc.points.is_empty());
    }

    #[test]
    fn test_default_route_name() {
        let doc = parse("<gpx/>").unwrap();
        assert_eq!(doc.name, DEFAULT_ROUTE_NAME);
        assert!(doc.points.is_empty());
        assert!(doc.waypoints.is_empty());

        let doc = parse(r#"<gpx><trk><name></name><trkseg/></trk></gpx>"#).unwrap();
        assert_eq!(doc.name, DEFAULT_ROUTE_NAME);
    }

    #[test]
    fn test_waypoint_defaults() {
        let xml = r#"<gpx>
  <wpt lat="10" lon="20"/>
  <wpt lat="11" lon="21"><name>Aid Station</name><desc>Water</desc><ele>5</ele></wpt>
</gpx>"#;
        let doc = parse(xml).unwrap();
        assert_eq!(doc.waypoints.len(), 2);
        assert_eq!(doc.waypoints[0].name, DEFAULT_WAYPOINT_NAME);
        assert_eq!(doc.waypoints[0].description, "");
        assert_eq!(doc.waypoints[0].elevation, None);
        assert_eq!(doc.waypoints[1].name, "Aid Station");
        assert_eq!(doc.waypoints[1].description, "Water");
        assert_eq!(doc.waypoints[1].elevation, Some(5.0));
    }

    #[test]
    fn test_waypoints_without_track() {
        let doc = parse(r#"<gpx><wpt lat="10" lon="20"/></gpx>"#).unwrap();
        assert!(doc.points.is_empty());
        assert_eq!(doc.waypoints.len(), 1);
        assert_eq!(doc.name, DEFAULT_ROUTE_NAME);
    }

    #[test]
    fn test_invalid_root_aborts() {
        assert!(matches!(
            parse("<route><trk/></route>"),
            Err(ParseError::InvalidRoot)
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let doc = parse(
            r#"<gpx><trk><trkseg><trkpt lat="1" lon="2"><time>2025-01-01T00:00:00Z</time></trkpt></trkseg></trk></gpx>"#,
        )
        .unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["name"], "GPX Route");
        assert_eq!(json["points"][0]["latitude"], 1.0);
        assert_eq!(json["points"][0]["elevation"], serde_json::Value::Null);
        assert_eq!(json["points"][0]["timestamp"], "2025-01-01T00:00:00Z");
    }
}
