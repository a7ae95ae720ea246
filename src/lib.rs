pub mod analysis;
pub mod converter;
pub mod error;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod route;
pub mod sampler;
pub mod statistics;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::analysis::analyze;
use crate::options::SampleOptions;

pub use crate::analysis::{RouteAnalysis, RouteOverview};
pub use crate::error::{ParseError, RouteError, SamplerError};
pub use crate::route::{RouteDocument, TrackPoint, Waypoint, parse};
pub use crate::sampler::{WaypointSummary, sample, sample_with};
pub use crate::statistics::{RouteStatistics, compute_statistics, haversine_km};

/// Parse a GPX string into a route document (name, points, waypoints).
#[wasm_bindgen(js_name = parseRoute)]
pub fn parse_route(gpx_string: &str) -> Result<JsValue, JsValue> {
    init_hooks();

    let document = parse(gpx_string).map_err(RouteError::from)?;
    Ok(to_js(&document)?)
}

/// Compute distance, elevation and timing statistics for a GPX string.
#[wasm_bindgen(js_name = computeRouteStatistics)]
pub fn compute_route_statistics(gpx_string: &str) -> Result<JsValue, JsValue> {
    init_hooks();

    let document = parse(gpx_string).map_err(RouteError::from)?;
    Ok(to_js(&compute_statistics(&document.points))?)
}

/// Parse, compute statistics and resample into waypoint summaries in one call.
#[wasm_bindgen(js_name = analyzeRoute)]
pub fn analyze_route(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let analysis = analyze(gpx_string, &opts)?;
    Ok(to_js(&analysis)?)
}

/// Convert a GPX string to a GeoJSON FeatureCollection, returned as a JS object.
#[wasm_bindgen(js_name = routeToGeoJson)]
pub fn route_to_geojson(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let analysis = analyze(gpx_string, &opts)?;
    let fc = converter::to_feature_collection(&analysis.document(), &analysis.summaries);
    Ok(to_js(&fc)?)
}

/// Convert a GPX string to a GeoJSON FeatureCollection, returned as a JSON string.
#[wasm_bindgen(js_name = routeToGeoJsonString)]
pub fn route_to_geojson_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    init_hooks();

    let opts = parse_options(options)?;
    let analysis = analyze(gpx_string, &opts)?;
    let fc = converter::to_feature_collection(&analysis.document(), &analysis.summaries);
    serde_json::to_string(&fc).map_err(|e| RouteError::Serialize(e.to_string()).into())
}

/// Track points as an array of `[lat, lon]` arrays for Leaflet polylines.
#[wasm_bindgen(js_name = routeToLeafletCoordinates)]
pub fn route_to_leaflet_coordinates(gpx_string: &str) -> Result<js_sys::Array, JsValue> {
    init_hooks();

    let document = parse(gpx_string).map_err(RouteError::from)?;
    Ok(converter::to_leaflet_coordinates(&document.points)
        .into_iter()
        .map(|[lat, lon]| {
            js_sys::Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lon))
        })
        .collect())
}

fn parse_options(options: JsValue) -> Result<SampleOptions, RouteError> {
    if options.is_undefined() || options.is_null() {
        Ok(SampleOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| RouteError::Options(e.to_string()))
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, RouteError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| RouteError::Serialize(e.to_string()))
}

fn init_hooks() {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    {
        static TRACING: std::sync::Once = std::sync::Once::new();
        TRACING.call_once(|| {
            // Another subscriber may already be installed by the host page.
            let _ = tracing_wasm::try_set_as_global_default();
        });
    }
}
