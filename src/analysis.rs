use serde::Serialize;

use crate::error::RouteError;
use crate::options::SampleOptions;
use crate::route::{RouteDocument, TrackPoint, Waypoint, parse};
use crate::sampler::{WaypointSummary, sample_with};
use crate::statistics::{RouteStatistics, compute_statistics};

/// Parsed route and its statistics, without summaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOverview {
    pub document: RouteDocument,
    pub statistics: RouteStatistics,
}

/// Parse `raw` and compute its statistics.
pub fn overview(raw: &str) -> Result<RouteOverview, RouteError> {
    let document = parse(raw)?;
    let statistics = compute_statistics(&document.points);
    Ok(RouteOverview {
        document,
        statistics,
    })
}

/// Everything the upload screen needs from one GPX file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysis {
    pub name: String,
    pub points: Vec<TrackPoint>,
    pub waypoints: Vec<Waypoint>,
    pub statistics: RouteStatistics,
    pub summaries: Vec<WaypointSummary>,
}

impl RouteAnalysis {
    pub fn document(&self) -> RouteDocument {
        RouteDocument {
            name: self.name.clone(),
            points: self.points.clone(),
            waypoints: self.waypoints.clone(),
        }
    }
}

/// Run the whole pipeline: parse, compute statistics, resample.
///
/// A sampling failure still carries the parsed document and statistics, see
/// [`RouteError::partial`].
pub fn analyze(raw: &str, opts: &SampleOptions) -> Result<RouteAnalysis, RouteError> {
    let base = overview(raw)?;
    let summaries = match sample_with(&base.document, &base.statistics, opts) {
        Ok(summaries) => summaries,
        Err(source) => {
            tracing::warn!(error = %source, "sampling failed, keeping document and statistics");
            return Err(RouteError::Sample {
                source,
                partial: Box::new(base),
            });
        }
    };

    let RouteOverview {
        document:
            RouteDocument {
                name,
                points,
                waypoints,
            },
        statistics,
    } = base;

    Ok(RouteAnalysis {
        name,
        points,
        waypoints,
        statistics,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, SamplerError};

    const TRACK: &str = r#"<gpx>
  <wpt lat="0" lon="1"><name>Halfway</name></wpt>
  <trk>
    <name>Equator 10K</name>
    <trkseg>
      <trkpt lat="0" lon="0"><ele>0</ele></trkpt>
      <trkpt lat="0" lon="1"><ele>10</ele></trkpt>
      <trkpt lat="0" lon="2"><ele>5</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_analyze_bundle() {
        let analysis = analyze(TRACK, &SampleOptions::default()).unwrap();
        assert_eq!(analysis.name, "Equator 10K");
        assert_eq!(analysis.points.len(), 3);
        assert_eq!(analysis.waypoints[0].name, "Halfway");
        assert_eq!(analysis.statistics.elevation_gain_m, 10.0);
        assert_eq!(analysis.summaries.len(), 5);
        assert_eq!(analysis.document().points, analysis.points);
    }

    #[test]
    fn test_parse_failure_aborts() {
        let err = analyze("<kml/>", &SampleOptions::default()).unwrap_err();
        assert!(matches!(err, RouteError::Parse(ParseError::InvalidRoot)));
        assert!(err.to_string().starts_with("failed to process route: "));
    }

    #[test]
    fn test_sampler_failure_keeps_overview() {
        let err = analyze(TRACK, &SampleOptions::with_sample_count(1)).unwrap_err();
        assert!(matches!(
            err,
            RouteError::Sample {
                source: SamplerError::InvalidSampleCount(1),
                ..
            }
        ));

        let partial = err.partial().unwrap();
        assert_eq!(partial, &overview(TRACK).unwrap());
        assert_eq!(partial.document.name, "Equator 10K");
        assert_eq!(partial.document.points.len(), 3);
        assert_eq!(partial.statistics.elevation_gain_m, 10.0);
    }

    #[test]
    fn test_overview_parse_failure() {
        assert!(matches!(
            overview("<kml/>"),
            Err(RouteError::Parse(ParseError::InvalidRoot))
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let analysis = analyze(TRACK, &SampleOptions::with_sample_count(3)).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["statistics"]["elevationLossM"], 5.0);
        assert_eq!(json["statistics"]["durationMs"], 0);
        assert!(json["statistics"]["startTime"].is_null());
        assert_eq!(json["summaries"][0]["label"], "Start Line");
        assert_eq!(json["summaries"][0]["position"][1], 0.0);
        assert_eq!(json["summaries"][2]["heartRateBpm"], 180);
        assert_eq!(json["summaries"][2]["pointIndex"], 2);
    }
}
