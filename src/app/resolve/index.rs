use chrono::{DateTime, Datelike};
use serde_json::Value;

use crate::http;

use super::Endpoints;
use super::classify::season_ordinal;

pub(crate) fn search_external_id(
    endpoints: &Endpoints,
    title: &str,
    season: u32,
    year: Option<i32>,
) -> Option<i64> {
    let query = build_search_query(title, season);
    let raw = http::get_text(&endpoints.index_api, &[("q", query.as_str()), ("limit", "10")]).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    pick_external_id(&parsed, season, year)
}

pub(crate) fn build_search_query(title: &str, season: u32) -> String {
    if season > 1 {
        format!("{title} Season {season}")
    } else {
        title.to_string()
    }
}

pub(crate) fn pick_external_id(parsed: &Value, season: u32, year: Option<i32>) -> Option<i64> {
    let data = parsed.get("data")?.as_array()?;
    if data.is_empty() {
        return None;
    }

    if season == 1
        && let Some(year) = year
        && let Some(candidate) = data.iter().find(|item| candidate_year(item) == Some(year))
    {
        return candidate.get("mal_id").and_then(Value::as_i64);
    }

    if season > 1 {
        let keywords = season_keywords(season);
        if let Some(candidate) = data.iter().find(|item| matches_any_title(item, &keywords)) {
            return candidate.get("mal_id").and_then(Value::as_i64);
        }
    }

    data.first()?.get("mal_id").and_then(Value::as_i64)
}

fn season_keywords(season: u32) -> [String; 3] {
    [
        format!("season {season}"),
        format!("{} season", season_ordinal(season)),
        format!("season{season}"),
    ]
}

fn matches_any_title(item: &Value, keywords: &[String]) -> bool {
    let mut titles: Vec<String> = Vec::new();
    for key in ["title", "title_english"] {
        if let Some(title) = item.get(key).and_then(Value::as_str) {
            titles.push(title.to_lowercase());
        }
    }
    if let Some(synonyms) = item.get("title_synonyms").and_then(Value::as_array) {
        titles.extend(synonyms.iter().filter_map(Value::as_str).map(str::to_lowercase));
    }
    titles
        .iter()
        .any(|title| keywords.iter().any(|keyword| title.contains(keyword.as_str())))
}

pub(crate) fn candidate_year(item: &Value) -> Option<i32> {
    if let Some(year) = item
        .get("year")
        .and_then(Value::as_i64)
        .filter(|year| *year != 0)
    {
        return i32::try_from(year).ok();
    }
    let aired_from = item.pointer("/aired/from")?.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(aired_from) {
        return Some(parsed.year());
    }
    aired_from.get(..4)?.parse().ok()
}
