use gpx_race_recap::converter::to_feature_collection;
use gpx_race_recap::{compute_statistics, parse, sample};
use serde_json::Value;
use std::path::Path;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

/// Round every float to 6 decimals so derived distances survive libm differences.
fn normalize_floats(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n
                .as_f64()
                .and_then(|f| serde_json::Number::from_f64((f * 1e6).round() / 1e6))
            {
                *n = rounded;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_floats),
        Value::Object(map) => map.values_mut().for_each(normalize_floats),
        _ => {}
    }
}

/// Compare actual GeoJSON output against the expected snapshot file.
/// When `UPDATE_SNAPSHOTS=1` is set, write/overwrite the expected file instead.
fn assert_snapshot(actual: &Value, expected_path: &str) {
    let path = format!("tests/fixtures/expected/{expected_path}");
    let mut actual = actual.clone();
    normalize_floats(&mut actual);

    if matches!(std::env::var("UPDATE_SNAPSHOTS").as_deref(), Ok("1")) {
        let dir = Path::new(&path).parent().unwrap();
        std::fs::create_dir_all(dir).unwrap();
        let pretty = serde_json::to_string_pretty(&actual).unwrap();
        std::fs::write(&path, pretty.as_bytes()).unwrap();
        eprintln!("Updated snapshot: {path}");
        return;
    }

    let expected_str = std::fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!("Expected file not found: {path}. Run with UPDATE_SNAPSHOTS=1 to generate.")
    });
    let mut expected: Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"));
    normalize_floats(&mut expected);

    assert_eq!(
        actual, expected,
        "Snapshot mismatch for {path}.\nRun with UPDATE_SNAPSHOTS=1 to update."
    );
}

#[test]
fn snapshot_timed_run_map_layers() {
    let doc = parse(&load_fixture("timed_run.gpx")).unwrap();
    let fc = to_feature_collection(&doc, &[]);
    let actual = serde_json::to_value(&fc).unwrap();
    assert_snapshot(&actual, "timed_run.geojson");
}

#[test]
fn snapshot_timed_run_with_summaries() {
    let doc = parse(&load_fixture("timed_run.gpx")).unwrap();
    let stats = compute_statistics(&doc.points);
    let summaries = sample(&doc, &stats, 5).unwrap();
    let fc = to_feature_collection(&doc, &summaries);
    let actual = serde_json::to_value(&fc).unwrap();
    assert_snapshot(&actual, "timed_run_summaries.geojson");
}
