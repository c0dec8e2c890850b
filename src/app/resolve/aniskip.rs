use serde_json::Value;

use crate::app::params::SkipSegment;
use crate::http;

use super::Endpoints;

pub(crate) fn fetch_timing_entries(
    endpoints: &Endpoints,
    external_id: i64,
    episode: u32,
) -> Vec<Value> {
    let url = format!("{}/{external_id}/{episode}", endpoints.timing_api);
    let query = [
        ("types", "op"),
        ("types", "ed"),
        ("types", "recap"),
        ("episodeLength", "0"),
    ];
    // 404 means no timings exist for this episode; any other failure
    // degrades to the same empty result
    let raw = match http::get_text(&url, &query) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(_) => return Vec::new(),
    };
    if parsed.get("found").and_then(Value::as_bool) != Some(true) {
        return Vec::new();
    }
    parsed
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

pub(crate) fn parse_timing_segments(entries: &[Value]) -> Vec<SkipSegment> {
    entries
        .iter()
        .filter_map(|entry| {
            let interval = entry.get("interval")?;
            let start = interval_field(interval, "startTime", "start_time")?;
            let end = interval_field(interval, "endTime", "end_time")?;
            let kind = entry
                .get("skipType")
                .or_else(|| entry.get("skip_type"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            Some(SkipSegment {
                start,
                end,
                name: segment_name(&kind).to_string(),
            })
        })
        .collect()
}

fn interval_field(interval: &Value, camel: &str, snake: &str) -> Option<f64> {
    interval
        .get(camel)
        .or_else(|| interval.get(snake))
        .and_then(Value::as_f64)
}

fn segment_name(kind: &str) -> &'static str {
    if kind.contains("op") {
        "Opening"
    } else if kind.contains("ed") {
        "Ending"
    } else if kind == "recap" {
        "Recap"
    } else {
        "Skip"
    }
}
