use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SamplerError;
use crate::options::{MAX_SAMPLE_COUNT, SampleOptions};
use crate::route::RouteDocument;
use crate::statistics::RouteStatistics;

pub const KM_TO_MILES: f64 = 0.621371;

pub const START_LABEL: &str = "Start Line";
pub const FINISH_LABEL: &str = "Finish Line";

const START_NARRATIVE: &str = "Race began with perfect weather conditions. Feeling strong!";
const FINISH_NARRATIVE: &str = "Crossed the finish line with a new PR! Amazing experience.";
const EARLY_NARRATIVE: &str = "Maintaining a steady pace. Feeling good and strong.";
const MIDDLE_NARRATIVE: &str =
    "Starting to feel the effort but pushing through. Great crowd support.";
const LATE_NARRATIVE: &str = "The home stretch! Picking up pace for the strong finish.";

/// One display stop along the resampled route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointSummary {
    /// 1-based position in the summary sequence.
    pub index: i32,
    /// Index of the source point in `RouteDocument::points`.
    pub point_index: usize,
    /// `(latitude, longitude)`
    pub position: (f64, f64),
    pub mile_marker: f64,
    pub label: String,
    pub narrative: String,
    pub pace_text: String,
    pub heart_rate_bpm: i32,
    pub elevation: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

fn validate_sample_count(sample_count: i32) -> Result<usize, SamplerError> {
    if sample_count < 2 {
        return Err(SamplerError::InvalidSampleCount(sample_count));
    }
    if sample_count > MAX_SAMPLE_COUNT {
        return Err(SamplerError::SampleCountTooLarge {
            requested: sample_count,
            max: MAX_SAMPLE_COUNT,
        });
    }
    Ok(sample_count as usize)
}

/// Pick `sample_count` point indices: multiples of `point_count / (sample_count - 1)`,
/// with the final index forced onto the last point.
pub fn select_indices(point_count: usize, sample_count: i32) -> Result<Vec<usize>, SamplerError> {
    let n = validate_sample_count(sample_count)?;
    if point_count == 0 {
        return Ok(Vec::new());
    }

    let interval = point_count / (n - 1);
    let mut indices: Vec<usize> = (0..n - 1).map(|i| i * interval).collect();
    indices.push(point_count - 1);
    Ok(indices)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Proportional mile marker for summary `i` of `n`. The last marker is the exact total.
pub fn mile_marker(i: usize, n: usize, total_miles: f64) -> f64 {
    if i + 1 == n {
        return total_miles;
    }
    // Rounding up must not overtake the finish marker.
    round_to_tenth(i as f64 * total_miles / (n - 1) as f64).min(total_miles)
}

pub fn narrative(i: usize, n: usize) -> &'static str {
    let pos = i as f64;
    let n_f = n as f64;
    if i == 0 {
        START_NARRATIVE
    } else if i + 1 == n {
        FINISH_NARRATIVE
    } else if pos < n_f / 3.0 {
        EARLY_NARRATIVE
    } else if pos < n_f * 2.0 / 3.0 {
        MIDDLE_NARRATIVE
    } else {
        LATE_NARRATIVE
    }
}

pub fn label(i: usize, n: usize, mile: f64) -> String {
    if i == 0 {
        START_LABEL.to_string()
    } else if i + 1 == n {
        FINISH_LABEL.to_string()
    } else {
        format!("Mile {mile}")
    }
}

/// Linear heart-rate ramp from `base_heart_rate` to `base_heart_rate + max_heart_rate_increase`.
pub fn heart_rate(i: usize, n: usize, opts: &SampleOptions) -> i32 {
    let progress = i as f64 / (n - 1) as f64;
    (opts.base_heart_rate + opts.max_heart_rate_increase * progress).round() as i32
}

/// U-shaped pace curve in min/mile, fastest around the middle, rounded to hundredths.
pub fn pace_minutes(i: usize, n: usize, opts: &SampleOptions) -> f64 {
    let middle = n as f64 / 2.0;
    let dist_from_middle = (i as f64 - middle).abs();
    let pace = opts.base_pace + opts.pace_offset + (dist_from_middle / middle) * opts.pace_spread;
    (pace * 100.0).round() / 100.0
}

/// Format decimal minutes as `m:ss`.
pub fn format_pace(pace: f64) -> String {
    let mut minutes = pace.floor();
    let mut seconds = ((pace - minutes) * 60.0).round();
    if seconds >= 60.0 {
        minutes += 1.0;
        seconds -= 60.0;
    }
    format!("{}:{:02}", minutes as i64, seconds as i64)
}

/// Resample `document` into `sample_count` summaries with the default constants.
pub fn sample(
    document: &RouteDocument,
    statistics: &RouteStatistics,
    sample_count: i32,
) -> Result<Vec<WaypointSummary>, SamplerError> {
    sample_with(
        document,
        statistics,
        &SampleOptions::with_sample_count(sample_count),
    )
}

/// Resample `document` using `opts.sample_count` and the synthesis constants in `opts`.
pub fn sample_with(
    document: &RouteDocument,
    statistics: &RouteStatistics,
    opts: &SampleOptions,
) -> Result<Vec<WaypointSummary>, SamplerError> {
    let indices = select_indices(document.points.len(), opts.sample_count)?;
    let n = indices.len();
    let total_miles = statistics.total_distance_km * KM_TO_MILES;
    tracing::debug!(?indices, total_miles, "sampling route");

    let summaries = indices
        .iter()
        .enumerate()
        .map(|(i, &point_index)| {
            let point = &document.points[point_index];
            let mile = mile_marker(i, n, total_miles);
            WaypointSummary {
                index: i as i32 + 1,
                point_index,
                position: (point.latitude, point.longitude),
                mile_marker: mile,
                label: label(i, n, mile),
                narrative: narrative(i, n).to_string(),
                pace_text: format_pace(pace_minutes(i, n, opts)),
                heart_rate_bpm: heart_rate(i, n, opts),
                elevation: point.elevation,
                timestamp: point.timestamp,
            }
        })
        .collect();

    Ok(summaries)
}
