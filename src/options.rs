use serde::Deserialize;

/// Largest accepted `sample_count`. Summaries are allocated up front.
pub const MAX_SAMPLE_COUNT: i32 = 10_000;

/// Options for resampling a route into waypoint summaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SampleOptions {
    /// Number of summaries to produce, between 2 and [`MAX_SAMPLE_COUNT`] (default: 5)
    pub sample_count: i32,

    /// Heart rate at the start line, in bpm (default: 140)
    pub base_heart_rate: f64,

    /// Heart rate added by the finish line, in bpm (default: 40)
    pub max_heart_rate_increase: f64,

    /// Pace around which the curve is centred, in min/mile (default: 9.0)
    pub base_pace: f64,

    /// Pace adjustment at the middle of the route (default: -0.5)
    pub pace_offset: f64,

    /// Pace adjustment added at either end (default: 0.75)
    pub pace_spread: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            sample_count: 5,
            base_heart_rate: 140.0,
            max_heart_rate_increase: 40.0,
            base_pace: 9.0,
            pace_offset: -0.5,
            pace_spread: 0.75,
        }
    }
}

impl SampleOptions {
    pub fn with_sample_count(sample_count: i32) -> Self {
        Self {
            sample_count,
            ..Default::default()
        }
    }
}
