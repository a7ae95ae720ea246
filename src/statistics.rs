use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::route::TrackPoint;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Aggregate figures for an ordered run of track points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatistics {
    pub total_distance_km: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub max_elevation_m: f64,
    pub min_elevation_m: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: i64,
}

/// Great-circle distance in kilometres between two lat/lon pairs (Haversine formula).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can leave `a` just outside [0, 1] for antipodal pairs.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Compute distance, elevation and timing figures over `points`, in order.
///
/// Never fails: an empty slice gives [`RouteStatistics::default`].
pub fn compute_statistics(points: &[TrackPoint]) -> RouteStatistics {
    if points.is_empty() {
        return RouteStatistics::default();
    }

    let mut total_distance_km = 0.0;
    let mut elevation_gain_m = 0.0;
    let mut elevation_loss_m = 0.0;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        total_distance_km += haversine_km(
            prev.latitude,
            prev.longitude,
            curr.latitude,
            curr.longitude,
        );

        // Only pairs where both ends carry an elevation count.
        if let (Some(a), Some(b)) = (prev.elevation, curr.elevation) {
            let change = b - a;
            if change > 0.0 {
                elevation_gain_m += change;
            } else {
                elevation_loss_m += -change;
            }
        }
    }

    let (min_elevation_m, max_elevation_m) = points
        .iter()
        .filter_map(|p| p.elevation)
        .fold(None, |acc: Option<(f64, f64)>, ele| match acc {
            None => Some((ele, ele)),
            Some((lo, hi)) => Some((lo.min(ele), hi.max(ele))),
        })
        .unwrap_or((0.0, 0.0));

    let start_time = points.iter().find_map(|p| p.timestamp);
    let end_time = points.iter().rev().find_map(|p| p.timestamp);
    let duration_ms = match (start_time, end_time) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().max(0),
        _ => 0,
    };

    tracing::debug!(
        points = points.len(),
        total_distance_km,
        elevation_gain_m,
        duration_ms,
        "computed route statistics"
    );

    RouteStatistics {
        total_distance_km,
        elevation_gain_m,
        elevation_loss_m,
        max_elevation_m,
        min_elevation_m,
        start_time,
        end_time,
        duration_ms,
    }
}
