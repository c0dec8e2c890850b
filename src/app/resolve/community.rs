use serde_json::Value;

use crate::app::params::SkipSegment;
use crate::http;

use super::Endpoints;

pub(crate) fn fetch_document(endpoints: &Endpoints, local_id: &str) -> Option<Value> {
    let url = format!("{}/{local_id}.json", endpoints.db_base);
    let raw = http::get_text(&url, &[]).ok()?;
    serde_json::from_str(&raw).ok()
}

pub(crate) fn lookup_segments(
    document: &Value,
    season: u32,
    episode: u32,
) -> Option<Vec<SkipSegment>> {
    if let Some(entry) = document
        .get(season.to_string())
        .and_then(|entries| entries.get(episode.to_string()))
    {
        return parse_segment_list(entry);
    }

    // movie-keyed documents only answer the (1,1) position that non-serial
    // requests are normalized to
    if season == 1 && episode == 1 {
        if let Some(movie) = document.get("movie") {
            return parse_segment_list(movie);
        }
    }

    None
}

fn parse_segment_list(value: &Value) -> Option<Vec<SkipSegment>> {
    let segments: Vec<SkipSegment> = serde_json::from_value(value.clone()).ok()?;
    if segments.is_empty() { None } else { Some(segments) }
}
