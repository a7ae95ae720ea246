use chrono::{DateTime, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Number, Value as JsonValue};

use crate::route::{RouteDocument, TrackPoint, Waypoint};
use crate::sampler::WaypointSummary;

/// Convert a route and its summaries to a GeoJSON FeatureCollection for map layers.
///
/// Feature order: track, document waypoints, summaries.
pub fn to_feature_collection(
    document: &RouteDocument,
    summaries: &[WaypointSummary],
) -> FeatureCollection {
    let mut features = Vec::new();

    if let Some(track) = track_to_feature(document) {
        features.push(track);
    }
    features.extend(document.waypoints.iter().map(waypoint_to_feature));
    features.extend(summaries.iter().map(summary_to_feature));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// `[lat, lon]` pairs in point order, the layout Leaflet polylines expect.
pub fn to_leaflet_coordinates(points: &[TrackPoint]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.latitude, p.longitude]).collect()
}

fn track_to_feature(document: &RouteDocument) -> Option<Feature> {
    let geometry = match document.points.as_slice() {
        [] => return None,
        [only] => Value::Point(coords(only.latitude, only.longitude, only.elevation)),
        points => Value::LineString(
            points
                .iter()
                .map(|p| coords(p.latitude, p.longitude, p.elevation))
                .collect(),
        ),
    };

    let mut props = Map::new();
    props.insert("gpxType".to_string(), JsonValue::from("track"));
    props.insert("name".to_string(), JsonValue::from(document.name.as_str()));
    insert_coordinate_times(&mut props, &document.points);

    Some(feature(geometry, props))
}

fn waypoint_to_feature(wpt: &Waypoint) -> Feature {
    let geometry = Value::Point(coords(wpt.latitude, wpt.longitude, wpt.elevation));

    let mut props = Map::new();
    props.insert("gpxType".to_string(), JsonValue::from("waypoint"));
    props.insert("name".to_string(), JsonValue::from(wpt.name.as_str()));
    if !wpt.description.is_empty() {
        props.insert("desc".to_string(), JsonValue::from(wpt.description.as_str()));
    }
    insert_number(&mut props, "ele", wpt.elevation);
    if let Some(time) = wpt.timestamp {
        props.insert("time".to_string(), JsonValue::from(rfc3339(&time)));
    }

    feature(geometry, props)
}

fn summary_to_feature(summary: &WaypointSummary) -> Feature {
    let (lat, lon) = summary.position;
    let geometry = Value::Point(coords(lat, lon, summary.elevation));

    let mut props = Map::new();
    props.insert("gpxType".to_string(), JsonValue::from("summary"));
    props.insert("id".to_string(), JsonValue::from(summary.index));
    props.insert("label".to_string(), JsonValue::from(summary.label.as_str()));
    insert_number(&mut props, "mile", Some(summary.mile_marker));
    props.insert(
        "narrative".to_string(),
        JsonValue::from(summary.narrative.as_str()),
    );
    props.insert("pace".to_string(), JsonValue::from(summary.pace_text.as_str()));
    props.insert(
        "heartRate".to_string(),
        JsonValue::from(summary.heart_rate_bpm),
    );

    feature(geometry, props)
}

fn feature(geometry: Value, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn coords(lat: f64, lon: f64, ele: Option<f64>) -> Vec<f64> {
    match ele {
        Some(ele) => vec![lon, lat, ele],
        None => vec![lon, lat],
    }
}

fn rfc3339(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn insert_number(props: &mut Map<String, JsonValue>, key: &str, value: Option<f64>) {
    if let Some(n) = value.and_then(Number::from_f64) {
        props.insert(key.to_string(), JsonValue::Number(n));
    }
}

fn insert_coordinate_times(props: &mut Map<String, JsonValue>, points: &[TrackPoint]) {
    let times: Vec<JsonValue> = points
        .iter()
        .map(|pt| match pt.timestamp {
            Some(t) => JsonValue::String(rfc3339(&t)),
            None => JsonValue::Null,
        })
        .collect();

    // Only include if at least one time is present
    if times.iter().any(|t| !t.is_null()) {
        let mut coord_props = Map::new();
        coord_props.insert("times".to_string(), JsonValue::Array(times));
        props.insert(
            "coordinateProperties".to_string(),
            JsonValue::Object(coord_props),
        );
    }
}
